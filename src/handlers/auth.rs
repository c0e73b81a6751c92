// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    common::error::{AppError, JsonBody},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RoleAdmin},
    },
    models::auth::{
        AccessTokenResponse, CreateStaffPayload, ObtainTokenPayload, RefreshTokenPayload, TokenPairResponse, User,
    },
};

// POST /api/auth/token/
#[utoipa::path(
    post,
    path = "/api/auth/token/",
    tag = "Auth",
    request_body = ObtainTokenPayload,
    responses(
        (status = 200, description = "Par de tokens emitido", body = TokenPairResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn obtain_token(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<ObtainTokenPayload>,
) -> Result<Json<TokenPairResponse>, AppError> {
    payload.validate()?;

    let pair = app_state
        .auth_service
        .obtain_token_pair(&payload.username, &payload.password)
        .await?;

    Ok(Json(pair))
}

// POST /api/auth/token/refresh/
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh/",
    tag = "Auth",
    request_body = RefreshTokenPayload,
    responses(
        (status = 200, description = "Novo access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token inválido ou expirado")
    )
)]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<RefreshTokenPayload>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    payload.validate()?;
    let access = app_state.auth_service.refresh_access(&payload.refresh).await?;
    Ok(Json(access))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// GET /api/staff/
#[utoipa::path(
    get,
    path = "/api/staff/",
    tag = "Staff",
    responses(
        (status = 200, description = "Equipe cadastrada", body = [User]),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    _admin: RequireRole<RoleAdmin>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.auth_service.list_staff().await?))
}

// POST /api/staff/
#[utoipa::path(
    post,
    path = "/api/staff/",
    tag = "Staff",
    request_body = CreateStaffPayload,
    responses(
        (status = 201, description = "Membro da equipe criado", body = User),
        (status = 409, description = "Username já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<RoleAdmin>,
    WithRejection(Json(payload), _): JsonBody<CreateStaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.create_staff_member(&payload).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, "Staff member registered by admin");

    Ok((StatusCode::CREATED, Json(user)))
}

// DELETE /api/staff/{id}/
#[utoipa::path(
    delete,
    path = "/api/staff/{id}/",
    tag = "Staff",
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_staff(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if admin.id == id {
        return Err(AppError::Forbidden("You cannot remove your own account.".into()));
    }
    app_state.auth_service.remove_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
