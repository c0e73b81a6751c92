// src/services/order_service.rs
//
// Caminho de escrita dos pedidos. Criação e edição rodam numa transação só:
//
//   1. confere mesa e itens
//   2. precifica as linhas (preço atual × quantidade)
//   3. grava pedido + linhas + total
//   4. (criação) ocupa a mesa, se ainda não estiver ocupada
//   5. commit, recarrega e publica no grupo "orders"

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository, TableRepository},
    models::{
        auth::User,
        live::LiveEvent,
        orders::{
            NewOrder, NewOrderLine, Order, OrderChange, OrderChangeKind, OrderChanges, OrderItem,
            OrderLineRow, OrderRow, OrderStatus, PricedLine,
        },
        tables::Table,
    },
    services::live::{LiveHub, ORDERS_GROUP},
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    table_repo: TableRepository,
    catalog_repo: CatalogRepository,
    live_hub: LiveHub,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        table_repo: TableRepository,
        catalog_repo: CatalogRepository,
        live_hub: LiveHub,
        pool: PgPool,
    ) -> Self {
        Self {
            order_repo,
            table_repo,
            catalog_repo,
            live_hub,
            pool,
        }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        let rows = self.order_repo.list().await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut table_ids: Vec<i64> = rows.iter().map(|r| r.table_id).collect();
        table_ids.sort_unstable();
        table_ids.dedup();
        let order_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let tables = self.table_repo.find_many(&self.pool, &table_ids).await?;
        let lines = self.order_repo.list_lines(&self.pool, &order_ids).await?;

        assemble_orders(rows, tables, lines)
    }

    pub async fn get(&self, id: i64) -> Result<Order, AppError> {
        let row = self
            .order_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;
        let table = self
            .table_repo
            .find_by_id(&self.pool, row.table_id)
            .await?
            .ok_or_else(|| AppError::not_found("Table"))?;
        let lines = self.order_repo.list_lines(&self.pool, &[id]).await?;

        Ok(Order::assemble(row, table, lines.into_iter().map(OrderItem::from).collect()))
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create(&self, new_order: NewOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.table_repo.find_by_id(&mut *tx, new_order.table_id).await?.is_none() {
            return Err(unknown_table(new_order.table_id));
        }

        let (lines, total) = self.price(&mut tx, &new_order.items).await?;

        let order_id = self
            .order_repo
            .insert_order(
                &mut *tx,
                new_order.table_id,
                new_order.status,
                &new_order.special_instructions,
                total,
            )
            .await?;
        for line in &lines {
            self.order_repo.insert_line(&mut *tx, order_id, line).await?;
        }

        // UPDATE condicional: dois primeiros pedidos simultâneos geram uma única transição
        if self.table_repo.mark_occupied(&mut *tx, new_order.table_id).await? {
            tracing::info!(table_id = new_order.table_id, "Table is now occupied");
        }

        tx.commit().await?;
        tracing::info!(order_id, table_id = new_order.table_id, %total, "Order created");

        let order = self.get(order_id).await?;
        self.publish(OrderChangeKind::Created, &order);
        Ok(order)
    }

    pub async fn update(&self, id: i64, changes: OrderChanges) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.order_repo.find_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::not_found("Order"));
        }
        if let Some(table_id) = changes.table_id {
            if self.table_repo.find_by_id(&mut *tx, table_id).await?.is_none() {
                return Err(unknown_table(table_id));
            }
        }

        self.order_repo
            .update_fields(
                &mut *tx,
                id,
                changes.table_id,
                changes.status,
                changes.special_instructions.as_deref(),
                changes.served_by,
            )
            .await?;

        // Itens presentes = substituição completa + novo total
        if let Some(items) = &changes.items {
            let (lines, total) = self.price(&mut tx, items).await?;
            let removed = self.order_repo.delete_lines(&mut *tx, id).await?;
            for line in &lines {
                self.order_repo.insert_line(&mut *tx, id, line).await?;
            }
            self.order_repo.set_total(&mut *tx, id, total).await?;
            tracing::debug!(order_id = id, removed, added = lines.len(), "Order lines replaced");
        }

        tx.commit().await?;
        tracing::info!(order_id = id, status = ?changes.status, "Order updated");

        let order = self.get(id).await?;
        self.publish(OrderChangeKind::Updated, &order);
        Ok(order)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.order_repo.delete(id).await? {
            return Err(AppError::not_found("Order"));
        }
        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    async fn price(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        items: &[NewOrderLine],
    ) -> Result<(Vec<PricedLine>, Decimal), AppError> {
        let ids: Vec<i64> = items.iter().map(|l| l.menu_item_id).collect();
        let prices = self.catalog_repo.prices_for(&mut **tx, &ids).await?;
        price_lines(items, &prices)
    }

    fn publish(&self, event: OrderChangeKind, order: &Order) {
        match serde_json::to_value(OrderChange { event, order }) {
            Ok(data) => {
                let delivered = self.live_hub.publish(ORDERS_GROUP, LiveEvent::OrderUpdated { data });
                tracing::debug!(order_id = order.id, ?event, delivered, "Order change published");
            }
            Err(e) => tracing::warn!(order_id = order.id, "Failed to serialize order change: {}", e),
        }
    }
}

const MAX_ORDER_AMOUNT: i64 = 100_000_000;

fn unknown_table(table_id: i64) -> AppError {
    AppError::field(
        "table_id",
        "does_not_exist",
        format!("Invalid pk \"{}\" - object does not exist.", table_id),
    )
}

/// Precifica as linhas com os preços atuais. Rejeita lista vazia,
/// quantidade < 1, itens inexistentes e totais que não cabem na coluna.
pub fn price_lines(
    items: &[NewOrderLine],
    prices: &HashMap<i64, Decimal>,
) -> Result<(Vec<PricedLine>, Decimal), AppError> {
    if items.is_empty() {
        return Err(AppError::field("items", "empty", "An order needs at least one item."));
    }

    let mut priced = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;

    for line in items {
        if line.quantity < 1 {
            return Err(AppError::field(
                "items",
                "min_value",
                "Ensure quantity is greater than or equal to 1.",
            ));
        }
        let unit_price = prices.get(&line.menu_item_id).ok_or_else(|| {
            AppError::field(
                "items",
                "does_not_exist",
                format!("Invalid pk \"{}\" - object does not exist.", line.menu_item_id),
            )
        })?;

        let line_total = *unit_price * Decimal::from(line.quantity);
        total += line_total;
        // line_total e total_price são NUMERIC(10,2)
        if total >= Decimal::from(MAX_ORDER_AMOUNT) {
            return Err(AppError::field(
                "items",
                "max_value",
                "Ensure the order total is less than 100000000.",
            ));
        }
        priced.push(PricedLine {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            custom_notes: line.custom_notes.clone(),
            line_total,
        });
    }

    Ok((priced, total))
}

/// Quem marca o pedido como servido fica registrado, se for da equipe.
pub fn served_by_for(status: Option<OrderStatus>, caller: Option<&User>) -> Option<Uuid> {
    match (status, caller) {
        (Some(OrderStatus::Served), Some(user)) if user.is_staff => Some(user.id),
        _ => None,
    }
}

/// Junta pedidos, mesas e linhas buscados em lote, mantendo a ordem dos pedidos.
pub fn assemble_orders(
    rows: Vec<OrderRow>,
    tables: Vec<Table>,
    lines: Vec<OrderLineRow>,
) -> Result<Vec<Order>, AppError> {
    let tables: HashMap<i64, Table> = tables.into_iter().map(|t| (t.id, t)).collect();

    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for line in lines {
        items_by_order.entry(line.order_id).or_default().push(OrderItem::from(line));
    }

    rows.into_iter()
        .map(|row| {
            let table = tables
                .get(&row.table_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Mesa {} do pedido {} não encontrada", row.table_id, row.id))?;
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            Ok(Order::assemble(row, table, items))
        })
        .collect()
}
