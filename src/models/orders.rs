// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    catalog::{Category, MenuItem},
    tables::Table,
};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Received,
    Preparing,
    Ready,
    Served,
    Closed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Closed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Served => "Served",
            OrderStatus::Closed => "Closed",
        }
    }

    /// Pedidos que entram no faturamento.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Closed)
    }

    /// Filtro de faturamento usado nas consultas do painel.
    pub fn revenue_statuses() -> Vec<OrderStatus> {
        Self::ALL.into_iter().filter(|s| s.counts_as_revenue()).collect()
    }
}

// --- Linhas cruas do banco ---

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub table_id: i64,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub special_instructions: String,
    pub served_by: Option<Uuid>,
}

// order_items + menu_items + categories
#[derive(Debug, Clone, FromRow)]
pub struct OrderLineRow {
    pub id: i64,
    pub order_id: i64,
    pub quantity: i32,
    pub custom_notes: String,
    pub line_total: Decimal,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub menu_item_description: String,
    pub menu_item_price: Decimal,
    pub menu_item_is_available: bool,
    pub menu_item_image: Option<String>,
    pub category_id: i64,
    pub category_name: String,
}

// --- Representação da API ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[schema(example = 31)]
    pub id: i64,
    pub menu_item: MenuItem,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "Less spicy")]
    pub custom_notes: String,
    #[schema(example = "380.00")]
    pub line_total: Decimal,
}

impl From<OrderLineRow> for OrderItem {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id,
            menu_item: MenuItem {
                id: row.menu_item_id,
                name: row.menu_item_name,
                description: row.menu_item_description,
                price: row.menu_item_price,
                is_available: row.menu_item_is_available,
                image: row.menu_item_image,
                category: Category {
                    id: row.category_id,
                    name: row.category_name,
                },
            },
            quantity: row.quantity,
            custom_notes: row.custom_notes,
            line_total: row.line_total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(example = 42)]
    pub id: i64,
    pub table: Table,
    pub status: OrderStatus,
    #[schema(example = "250.00")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub special_instructions: String,
    pub served_by: Option<Uuid>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn assemble(row: OrderRow, table: Table, items: Vec<OrderItem>) -> Self {
        Self {
            id: row.id,
            table,
            status: row.status,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
            special_instructions: row.special_instructions,
            served_by: row.served_by,
            items,
        }
    }
}

// --- Entrada do caminho de escrita ---

/// Uma linha pedida: item, quantidade e observação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub custom_notes: String,
}

/// Linha já precificada, pronta para INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub custom_notes: String,
    pub line_total: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: i64,
    pub status: OrderStatus,
    pub special_instructions: String,
    pub items: Vec<NewOrderLine>,
}

/// Alterações de um pedido existente. `None` = não mexer.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub table_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub special_instructions: Option<String>,
    pub items: Option<Vec<NewOrderLine>>,
    pub served_by: Option<Uuid>,
}

// Evento publicado no grupo "orders"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderChangeKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderChange<'a> {
    pub event: OrderChangeKind,
    pub order: &'a Order,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_served_and_closed_count_as_revenue() {
        assert_eq!(
            OrderStatus::revenue_statuses(),
            vec![OrderStatus::Served, OrderStatus::Closed]
        );
    }

    #[test]
    fn status_round_trips_through_json_names() {
        let parsed: OrderStatus = serde_json::from_str("\"preparing\"").unwrap();
        assert_eq!(parsed, OrderStatus::Preparing);
        assert!(serde_json::from_str::<OrderStatus>("\"cooking\"").is_err());
    }
}
