// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::AppState,
    docs,
    handlers::{auth, catalog, dashboard, live, orders, pages, tables},
    middleware::auth::identify,
};

pub fn build_router(app_state: AppState) -> Router {
    // Páginas HTML (públicas + painel da equipe)
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/menu/", get(pages::menu))
        .route("/order/", get(pages::order_page))
        .route("/order/track/{id}/", get(pages::order_status))
        .route("/staff/login/", get(pages::login_form).post(pages::login_submit))
        .route("/staff/logout/", get(pages::logout))
        .route("/admin/dashboard/", get(pages::admin_dashboard));

    // Define as rotas de autenticação e equipe
    let auth_routes = Router::new()
        .route("/api/auth/token/", post(auth::obtain_token))
        .route("/api/auth/token/refresh/", post(auth::refresh_token))
        .route("/api/users/me/", get(auth::get_me))
        .route("/api/staff/", get(auth::list_staff).post(auth::create_staff))
        .route("/api/staff/{id}/", axum::routing::delete(auth::delete_staff));

    let table_routes = Router::new()
        .route("/api/tables/", get(tables::list_tables).post(tables::create_table))
        .route(
            "/api/tables/{id}/",
            get(tables::get_table)
                .put(tables::update_table)
                .patch(tables::patch_table)
                .delete(tables::delete_table),
        )
        .route("/api/tables/{id}/close/", post(tables::close_table))
        .route("/api/tables/{id}/qr.png", get(tables::table_qr));

    let catalog_routes = Router::new()
        .route("/api/categories/", get(catalog::list_categories).post(catalog::create_category))
        .route(
            "/api/categories/{id}/",
            get(catalog::get_category)
                .put(catalog::update_category)
                .patch(catalog::patch_category)
                .delete(catalog::delete_category),
        )
        .route("/api/menu-items/", get(catalog::list_menu_items).post(catalog::create_menu_item))
        .route(
            "/api/menu-items/{id}/",
            get(catalog::get_menu_item)
                .put(catalog::update_menu_item)
                .patch(catalog::patch_menu_item)
                .delete(catalog::delete_menu_item),
        );

    let order_routes = Router::new()
        .route("/api/orders/", get(orders::list_orders).post(orders::create_order))
        .route(
            "/api/orders/{id}/",
            get(orders::get_order)
                .put(orders::update_order)
                .patch(orders::patch_order)
                .delete(orders::delete_order),
        );

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .route("/api/dashboard/", get(dashboard::get_summary))
        .route("/ws/orders/", get(live::orders_ws))
        .merge(page_routes)
        .merge(auth_routes)
        .merge(table_routes)
        .merge(catalog_routes)
        .merge(order_routes)
        // Identifica o usuário (Bearer ou cookie); a exigência fica com os extratores
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), identify))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Estado sem banco: o pool só conecta no primeiro uso
    fn offline_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://tableside@127.0.0.1:1/unused".to_string()),
            "JWT_SECRET" => Some("router-test-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        AppState::new(config, pool)
    }

    async fn send(request: Request<Body>) -> Response {
        build_router(offline_state()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_check_is_open() {
        let response = send(Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn catalog_writes_need_a_token() {
        let request = Request::post("/api/categories/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Desserts"}"#))
            .unwrap();
        let response = send(request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("\"error\""));
    }

    #[tokio::test]
    async fn malformed_bearer_is_rejected_even_on_open_routes() {
        let request = Request::get("/api/tables/")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn pages_ignore_bearer_headers() {
        let request = Request::get("/staff/login/")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::OK);

        let request = Request::get("/admin/dashboard/")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn malformed_order_bodies_get_field_details() {
        let request = Request::post("/api/orders/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"items": [{"menuItemId": 1}]}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["details"]["tableId"][0], "This field is required.");

        let request = Request::post("/api/orders/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"tableId": "one", "items": []}"#))
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text(send(request).await).await).unwrap();
        assert!(body["details"]["tableId"].is_array());

        let request = Request::post("/api/orders/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["details"]["non_field_errors"].is_array());
    }

    #[tokio::test]
    async fn order_bodies_must_be_json() {
        let request = Request::post("/api/orders/")
            .body(Body::from(r#"{"tableId": 1, "items": []}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_text(response).await.contains("\"error\""));
    }

    #[tokio::test]
    async fn empty_item_lists_fail_validation() {
        let request = Request::post("/api/orders/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"tableId": 1, "items": []}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["details"]["items"].is_array());
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_delete_orders_or_read_me() {
        let delete = Request::delete("/api/orders/1/").body(Body::empty()).unwrap();
        assert_eq!(send(delete).await.status(), StatusCode::UNAUTHORIZED);

        let me = Request::get("/api/users/me/").body(Body::empty()).unwrap();
        assert_eq!(send(me).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dashboard_page_redirects_to_login() {
        let response = send(Request::get("/admin/dashboard/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/staff/login/");

        // Cookie adulterado conta como anônimo
        let forged = Request::get("/admin/dashboard/")
            .header(header::COOKIE, "tableside_session=forged")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(forged).await.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn login_page_renders_a_form() {
        let response = send(Request::get("/staff/login/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<form method=\"post\""));
    }

    #[tokio::test]
    async fn order_page_without_a_table_is_not_found() {
        let response = send(Request::get("/order/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(Request::get("/order/?table=abc").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_lists_the_api() {
        let response = send(Request::get("/api/docs/openapi.json").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(doc["paths"]["/api/orders/"].is_object());
        assert!(doc["paths"]["/api/tables/{id}/close/"]["post"].is_object());
        assert!(doc["components"]["securitySchemes"]["api_jwt"].is_object());
    }
}
