// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::StaffUser,
    models::dashboard::DashboardSummary,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Faturamento, pedidos em aberto, mesas e pratos populares", body = DashboardSummary),
        (status = 403, description = "Somente equipe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _staff: StaffUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = app_state.dashboard_service.summary(Utc::now()).await?;
    Ok(Json(summary))
}
