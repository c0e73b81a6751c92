// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    common::error::{AppError, JsonBody},
    config::AppState,
    middleware::auth::StaffUser,
    models::catalog::{Category, CategoryPayload, MenuItem, MenuItemPayload, UpdateMenuItemPayload},
};

// ---
// CATEGORIAS
// ---

#[utoipa::path(
    get,
    path = "/api/categories/",
    tag = "Catalog",
    responses((status = 200, description = "Categorias em ordem alfabética", body = [Category]))
)]
pub async fn list_categories(State(app_state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(app_state.catalog_service.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/categories/",
    tag = "Catalog",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    WithRejection(Json(payload), _): JsonBody<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let category = app_state.catalog_service.create_category(&payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    responses(
        (status = 200, description = "Categoria", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da categoria"))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(app_state.catalog_service.get_category(id).await?))
}

// PUT e PATCH: a categoria só tem o nome, o corpo é o mesmo
#[utoipa::path(
    put,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da categoria")),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.update_category(id, &payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    request_body = CategoryPayload,
    responses((status = 200, description = "Categoria atualizada", body = Category)),
    params(("id" = i64, Path, description = "ID da categoria")),
    security(("api_jwt" = []))
)]
pub async fn patch_category(
    state: State<AppState>,
    staff: StaffUser,
    id: Path<i64>,
    payload: JsonBody<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    update_category(state, staff, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    responses(
        (status = 204, description = "Categoria e seus itens removidos"),
        (status = 409, description = "Algum item está em um pedido")
    ),
    params(("id" = i64, Path, description = "ID da categoria")),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// ITENS DO CARDÁPIO
// ---

#[utoipa::path(
    get,
    path = "/api/menu-items/",
    tag = "Catalog",
    responses((status = 200, description = "Itens com a categoria embutida", body = [MenuItem]))
)]
pub async fn list_menu_items(State(app_state): State<AppState>) -> Result<Json<Vec<MenuItem>>, AppError> {
    Ok(Json(app_state.catalog_service.list_menu_items().await?))
}

#[utoipa::path(
    post,
    path = "/api/menu-items/",
    tag = "Catalog",
    request_body = MenuItemPayload,
    responses(
        (status = 201, description = "Item criado", body = MenuItem),
        (status = 400, description = "Preço ou categoria inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_menu_item(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    WithRejection(Json(payload), _): JsonBody<MenuItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let item = app_state.catalog_service.create_menu_item(&payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/menu-items/{id}/",
    tag = "Catalog",
    responses(
        (status = 200, description = "Item do cardápio", body = MenuItem),
        (status = 404, description = "Item não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do item"))
)]
pub async fn get_menu_item(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MenuItem>, AppError> {
    Ok(Json(app_state.catalog_service.get_menu_item(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/menu-items/{id}/",
    tag = "Catalog",
    request_body = MenuItemPayload,
    responses((status = 200, description = "Item substituído", body = MenuItem)),
    params(("id" = i64, Path, description = "ID do item")),
    security(("api_jwt" = []))
)]
pub async fn update_menu_item(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<MenuItemPayload>,
) -> Result<Json<MenuItem>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.update_menu_item(id, &payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/menu-items/{id}/",
    tag = "Catalog",
    request_body = UpdateMenuItemPayload,
    responses((status = 200, description = "Item atualizado", body = MenuItem)),
    params(("id" = i64, Path, description = "ID do item")),
    security(("api_jwt" = []))
)]
pub async fn patch_menu_item(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    WithRejection(Json(payload), _): JsonBody<UpdateMenuItemPayload>,
) -> Result<Json<MenuItem>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.patch_menu_item(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/menu-items/{id}/",
    tag = "Catalog",
    responses(
        (status = 204, description = "Item removido"),
        (status = 409, description = "Item referenciado por pedidos")
    ),
    params(("id" = i64, Path, description = "ID do item")),
    security(("api_jwt" = []))
)]
pub async fn delete_menu_item(
    State(app_state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_menu_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
