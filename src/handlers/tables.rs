// src/handlers/tables.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    common::error::{AppError, JsonBody},
    config::AppState,
    middleware::auth::StaffUser,
    models::tables::{Table, TablePayload, UpdateTablePayload},
};

#[utoipa::path(
    get,
    path = "/api/tables/",
    tag = "Tables",
    responses((status = 200, description = "Mesas por número", body = [Table]))
)]
pub async fn list_tables(State(app_state): State<AppState>) -> Result<Json<Vec<Table>>, AppError> {
    Ok(Json(app_state.table_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/tables/",
    tag = "Tables",
    request_body = TablePayload,
    responses(
        (status = 201, description = "Mesa criada", body = Table),
        (status = 409, description = "Número de mesa já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_table(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    WithRejection(Json(payload), _): JsonBody<TablePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let table = app_state.table_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}/",
    tag = "Tables",
    responses(
        (status = 200, description = "Mesa", body = Table),
        (status = 404, description = "Mesa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da mesa"))
)]
pub async fn get_table(State(app_state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Table>, AppError> {
    Ok(Json(app_state.table_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}/",
    tag = "Tables",
    request_body = TablePayload,
    responses((status = 200, description = "Mesa substituída", body = Table)),
    params(("id" = i64, Path, description = "ID da mesa")),
    security(("api_jwt" = []))
)]
pub async fn update_table(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<TablePayload>,
) -> Result<Json<Table>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.table_service.update(id, &payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/",
    tag = "Tables",
    request_body = UpdateTablePayload,
    responses((status = 200, description = "Mesa atualizada", body = Table)),
    params(("id" = i64, Path, description = "ID da mesa")),
    security(("api_jwt" = []))
)]
pub async fn patch_table(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<UpdateTablePayload>,
) -> Result<Json<Table>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.table_service.patch(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}/",
    tag = "Tables",
    responses(
        (status = 204, description = "Mesa removida"),
        (status = 409, description = "Mesa possui pedidos")
    ),
    params(("id" = i64, Path, description = "ID da mesa")),
    security(("api_jwt" = []))
)]
pub async fn delete_table(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.table_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/tables/{id}/close/
#[utoipa::path(
    post,
    path = "/api/tables/{id}/close/",
    tag = "Tables",
    responses(
        (status = 200, description = "Mesa liberada", body = Table),
        (status = 404, description = "Mesa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da mesa")),
    security(("api_jwt" = []))
)]
pub async fn close_table(
    State(app_state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<Table>, AppError> {
    let table = app_state.table_service.close_out(id).await?;
    tracing::info!(table_id = id, staff_id = %staff.id, "Table released");
    Ok(Json(table))
}

// GET /api/tables/{id}/qr.png
#[utoipa::path(
    get,
    path = "/api/tables/{id}/qr.png",
    tag = "Tables",
    responses(
        (status = 200, description = "QR code da página de pedido", content_type = "image/png"),
        (status = 404, description = "Mesa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da mesa"))
)]
pub async fn table_qr(State(app_state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse, AppError> {
    let png = app_state.table_service.qr_png(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
