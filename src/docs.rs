// src/docs.rs

use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::obtain_token,
        handlers::auth::refresh_token,

        // --- Users / Staff ---
        handlers::auth::get_me,
        handlers::auth::list_staff,
        handlers::auth::create_staff,
        handlers::auth::delete_staff,

        // --- Tables ---
        handlers::tables::list_tables,
        handlers::tables::create_table,
        handlers::tables::get_table,
        handlers::tables::update_table,
        handlers::tables::patch_table,
        handlers::tables::delete_table,
        handlers::tables::close_table,
        handlers::tables::table_qr,

        // --- Catalog ---
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::get_category,
        handlers::catalog::update_category,
        handlers::catalog::patch_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_menu_items,
        handlers::catalog::create_menu_item,
        handlers::catalog::get_menu_item,
        handlers::catalog::update_menu_item,
        handlers::catalog::patch_menu_item,
        handlers::catalog::delete_menu_item,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::patch_order,
        handlers::orders::delete_order,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::StaffRole,
            models::auth::User,
            models::auth::ObtainTokenPayload,
            models::auth::TokenPairResponse,
            models::auth::RefreshTokenPayload,
            models::auth::AccessTokenResponse,
            models::auth::CreateStaffPayload,

            // --- Tables ---
            models::tables::TableStatus,
            models::tables::Table,
            models::tables::TablePayload,
            models::tables::UpdateTablePayload,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::CategoryPayload,
            models::catalog::MenuItem,
            models::catalog::MenuItemPayload,
            models::catalog::UpdateMenuItemPayload,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::Order,
            models::orders::OrderItem,
            handlers::orders::OrderLinePayload,
            handlers::orders::OrderPayload,
            handlers::orders::UpdateOrderPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::ActiveOrder,
            models::dashboard::TableStatusCount,
            models::dashboard::PopularDish,
        )
    ),
    tags(
        (name = "Auth", description = "Emissão e renovação de tokens"),
        (name = "Users", description = "Dados do usuário autenticado"),
        (name = "Staff", description = "Cadastro da equipe (somente admin)"),
        (name = "Tables", description = "Mesas, QR codes e fechamento"),
        (name = "Catalog", description = "Categorias e itens do cardápio"),
        (name = "Orders", description = "Pedidos e seus itens"),
        (name = "Dashboard", description = "Indicadores do restaurante")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

// GET /api/docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
