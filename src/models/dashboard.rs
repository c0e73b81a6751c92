// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{orders::OrderStatus, tables::TableStatus};

// Pedido em andamento (lista do painel)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrder {
    pub id: i64,
    pub table_number: i32,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableStatusCount {
    pub status: TableStatus,
    pub count: i64,
}

// Pratos mais pedidos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularDish {
    pub menu_item_id: i64,
    pub name: String,
    pub times_ordered: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: Decimal,
    pub daily_revenue: Decimal,
    pub active_orders: Vec<ActiveOrder>,
    pub table_stats: Vec<TableStatusCount>,
    pub popular_dishes: Vec<PopularDish>,
}

// Os números da página inicial
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeStats {
    pub category_count: i64,
    pub menu_item_count: i64,
    pub active_tables: i64,
    pub open_orders: i64,
}
