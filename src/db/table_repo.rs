// src/db/table_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error},
        error::AppError,
    },
    models::tables::{Table, TablePayload, TableStatus},
};

const TABLE_COLUMNS: &str = "id, table_number, capacity, status, qr_code_url, opened_at, closed_at";

#[derive(Clone)]
pub struct TableRepository {
    pool: PgPool,
}

impl TableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Table>, AppError> {
        let tables = sqlx::query_as::<_, Table>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables ORDER BY table_number"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Table>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, Table>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(table)
    }

    // Equivalente ao prefetch: busca de uma vez as mesas de vários pedidos
    pub async fn find_many<'e, E>(&self, executor: E, ids: &[i64]) -> Result<Vec<Table>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tables = sqlx::query_as::<_, Table>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(tables)
    }

    pub async fn create(&self, payload: &TablePayload) -> Result<Table, AppError> {
        sqlx::query_as::<_, Table>(&format!(
            r#"
            INSERT INTO tables (table_number, capacity, status, qr_code_url, opened_at, closed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TABLE_COLUMNS}
            "#
        ))
        .bind(payload.table_number)
        .bind(payload.capacity)
        .bind(payload.status)
        .bind(payload.qr_code_url.as_deref())
        .bind(payload.opened_at)
        .bind(payload.closed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "table_number", "A table with this number"))
    }

    pub async fn update(&self, id: i64, payload: &TablePayload) -> Result<Option<Table>, AppError> {
        sqlx::query_as::<_, Table>(&format!(
            r#"
            UPDATE tables
            SET table_number = $2, capacity = $3, status = $4,
                qr_code_url = $5, opened_at = $6, closed_at = $7
            WHERE id = $1
            RETURNING {TABLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.table_number)
        .bind(payload.capacity)
        .bind(payload.status)
        .bind(payload.qr_code_url.as_deref())
        .bind(payload.opened_at)
        .bind(payload.closed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "table_number", "A table with this number"))
    }

    /// Retorna `false` se a mesa não existe.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "this table"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Transição de ocupação: só muda (e carimba `opened_at`) se a mesa ainda
    /// não estiver ocupada. Retorna se houve transição.
    pub async fn mark_occupied<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tables
            SET status = $2, opened_at = NOW()
            WHERE id = $1 AND status <> $2
            "#,
        )
        .bind(id)
        .bind(TableStatus::Occupied)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn close_out(&self, id: i64) -> Result<Option<Table>, AppError> {
        let table = sqlx::query_as::<_, Table>(&format!(
            r#"
            UPDATE tables
            SET status = $2, closed_at = NOW()
            WHERE id = $1
            RETURNING {TABLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(TableStatus::Available)
        .fetch_optional(&self.pool)
        .await?;
        Ok(table)
    }
}
