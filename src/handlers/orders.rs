// src/handlers/orders.rs
//
// Pedidos são abertos ao público (o cliente pede pela mesa); só a
// remoção exige equipe.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{AppError, JsonBody},
    config::AppState,
    middleware::auth::{OptionalUser, StaffUser},
    models::orders::{NewOrder, NewOrderLine, Order, OrderChanges, OrderStatus},
    services::order_service::served_by_for,
};

fn default_quantity() -> i32 {
    1
}

// ---
// Payloads
// ---

// Quantidade < 1 e itens inexistentes são barrados na precificação
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    #[schema(example = 3)]
    pub menu_item_id: i64,
    #[serde(default = "default_quantity")]
    #[schema(example = 2)]
    pub quantity: i32,
    #[serde(default)]
    #[schema(example = "Less spicy")]
    pub custom_notes: String,
}

impl From<OrderLinePayload> for NewOrderLine {
    fn from(p: OrderLinePayload) -> Self {
        NewOrderLine {
            menu_item_id: p.menu_item_id,
            quantity: p.quantity,
            custom_notes: p.custom_notes,
        }
    }
}

/// POST e PUT: mesa e itens obrigatórios.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[schema(example = 1)]
    pub table_id: i64,

    #[validate(length(min = 1, message = "An order needs at least one item."))]
    pub items: Vec<OrderLinePayload>,

    pub status: Option<OrderStatus>,

    pub special_instructions: Option<String>,
}

/// PATCH: qualquer subconjunto.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    pub table_id: Option<i64>,

    #[validate(length(min = 1, message = "An order needs at least one item."))]
    pub items: Option<Vec<OrderLinePayload>>,

    pub status: Option<OrderStatus>,

    pub special_instructions: Option<String>,
}

impl From<OrderPayload> for UpdateOrderPayload {
    fn from(p: OrderPayload) -> Self {
        UpdateOrderPayload {
            table_id: Some(p.table_id),
            items: Some(p.items),
            status: p.status,
            special_instructions: p.special_instructions,
        }
    }
}

impl UpdateOrderPayload {
    fn into_changes(self, caller: &OptionalUser) -> OrderChanges {
        OrderChanges {
            table_id: self.table_id,
            served_by: served_by_for(self.status, caller.0.as_ref()),
            status: self.status,
            special_instructions: self.special_instructions,
            items: self
                .items
                .map(|items| items.into_iter().map(NewOrderLine::from).collect()),
        }
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/orders/",
    tag = "Orders",
    responses((status = 200, description = "Pedidos, do mais novo ao mais antigo", body = [Order]))
)]
pub async fn list_orders(State(app_state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(app_state.order_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/orders/",
    tag = "Orders",
    request_body = OrderPayload,
    responses(
        (status = 201, description = "Pedido criado; a mesa passa a ocupada", body = Order),
        (status = 400, description = "Mesa ou itens inválidos")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<OrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_order = NewOrder {
        table_id: payload.table_id,
        status: payload.status.unwrap_or_default(),
        special_instructions: payload.special_instructions.unwrap_or_default(),
        items: payload.items.into_iter().map(NewOrderLine::from).collect(),
    };
    let order = app_state.order_service.create(new_order).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido com mesa e itens", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do pedido"))
)]
pub async fn get_order(State(app_state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Order>, AppError> {
    Ok(Json(app_state.order_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/",
    tag = "Orders",
    request_body = OrderPayload,
    responses(
        (status = 200, description = "Pedido substituído; total recalculado", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do pedido"))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    caller: OptionalUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<OrderPayload>,
) -> Result<Json<Order>, AppError> {
    payload.validate()?;
    let changes = UpdateOrderPayload::from(payload).into_changes(&caller);
    Ok(Json(app_state.order_service.update(id, changes).await?))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/",
    tag = "Orders",
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do pedido"))
)]
pub async fn patch_order(
    State(app_state): State<AppState>,
    caller: OptionalUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<UpdateOrderPayload>,
) -> Result<Json<Order>, AppError> {
    payload.validate()?;
    let changes = payload.into_changes(&caller);
    Ok(Json(app_state.order_service.update(id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/",
    tag = "Orders",
    responses(
        (status = 204, description = "Pedido e itens removidos"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.order_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
