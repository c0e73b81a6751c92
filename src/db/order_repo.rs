// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{OrderLineRow, OrderRow, OrderStatus, PricedLine},
};

const ORDER_COLUMNS: &str =
    "id, table_id, status, total_price, created_at, updated_at, special_instructions, served_by";

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<OrderRow>, AppError> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<OrderRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    // Linhas de vários pedidos de uma vez, com o item e a categoria embutidos
    pub async fn list_lines<'e, E>(&self, executor: E, order_ids: &[i64]) -> Result<Vec<OrderLineRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT
                oi.id, oi.order_id, oi.quantity, oi.custom_notes, oi.line_total,
                m.id AS menu_item_id,
                m.name AS menu_item_name,
                m.description AS menu_item_description,
                m.price AS menu_item_price,
                m.is_available AS menu_item_is_available,
                m.image AS menu_item_image,
                c.id AS category_id,
                c.name AS category_name
            FROM order_items oi
            JOIN menu_items m ON m.id = oi.menu_item_id
            JOIN categories c ON c.id = m.category_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        table_id: i64,
        status: OrderStatus,
        special_instructions: &str,
        total_price: Decimal,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (table_id, status, special_instructions, total_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(table_id)
        .bind(status)
        .bind(special_instructions)
        .bind(total_price)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn insert_line<'e, E>(&self, executor: E, order_id: i64, line: &PricedLine) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, menu_item_id, quantity, custom_notes, line_total)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(&line.custom_notes)
        .bind(line.line_total)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, order_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Atualiza os campos escalares; `None` mantém o valor atual.
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: i64,
        table_id: Option<i64>,
        status: Option<OrderStatus>,
        special_instructions: Option<&str>,
        served_by: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE orders
            SET table_id = COALESCE($2, table_id),
                status = COALESCE($3, status),
                special_instructions = COALESCE($4, special_instructions),
                served_by = COALESCE($5, served_by),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(table_id)
        .bind(status)
        .bind(special_instructions)
        .bind(served_by)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_total<'e, E>(&self, executor: E, id: i64, total_price: Decimal) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE orders SET total_price = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(total_price)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_open(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE status <> $1")
            .bind(OrderStatus::Closed)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
