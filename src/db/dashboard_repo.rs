// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{ActiveOrder, DashboardSummary, PopularDish, TableStatusCount},
        orders::OrderStatus,
        tables::TableStatus,
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resumo completo do painel. `day_start`/`day_end` delimitam o "hoje",
    // calculado pela aplicação (não usamos CURRENT_DATE do banco).
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente dos dados
        let mut tx = executor.begin().await?;

        // Status que entram no faturamento, vindos do próprio enum
        let revenue_statuses = OrderStatus::revenue_statuses();

        // A. Faturamento total
        let total_revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE status = ANY($1)",
        )
        .bind(revenue_statuses.as_slice())
        .fetch_one(&mut *tx)
        .await?;

        // B. Faturamento do dia
        let daily_revenue = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_price), 0) FROM orders
            WHERE status = ANY($3)
              AND created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .bind(revenue_statuses.as_slice())
        .fetch_one(&mut *tx)
        .await?;

        // C. Pedidos em aberto (os 20 mais recentes)
        let active_orders = sqlx::query_as::<_, ActiveOrder>(
            r#"
            SELECT o.id, t.table_number, o.status, o.total_price, o.created_at
            FROM orders o
            JOIN tables t ON t.id = o.table_id
            WHERE o.status <> $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT 20
            "#,
        )
        .bind(OrderStatus::Closed)
        .fetch_all(&mut *tx)
        .await?;

        // D. Mesas por status
        let table_stats = sqlx::query_as::<_, TableStatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM tables
            GROUP BY status
            ORDER BY status::text
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // E. Top 5 pratos (quantas linhas de pedido faturado referenciam o item)
        let popular_dishes = sqlx::query_as::<_, PopularDish>(
            r#"
            SELECT m.id AS menu_item_id, m.name, COUNT(oi.id) AS times_ordered
            FROM menu_items m
            JOIN order_items oi ON oi.menu_item_id = m.id
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status = ANY($1)
            GROUP BY m.id, m.name
            ORDER BY times_ordered DESC, m.name
            LIMIT 5
            "#,
        )
        .bind(revenue_statuses.as_slice())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_revenue,
            daily_revenue,
            active_orders,
            table_stats,
            popular_dishes,
        })
    }

    pub async fn count_tables_in_use(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tables WHERE status <> $1")
            .bind(TableStatus::Available)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
