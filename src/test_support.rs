// src/test_support.rs
//
// Testes que precisam de um Postgres de verdade. Rodam apenas quando
// TEST_DATABASE_URL está definida; cada teste ganha um schema próprio.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Executor,
};
use uuid::Uuid;

use crate::{
    config::{AppState, Config},
    models::{
        auth::{CreateStaffPayload, StaffRole},
        catalog::{CategoryPayload, MenuItem, MenuItemPayload},
        tables::{Table, TablePayload, TableStatus},
    },
};

pub const TEST_PASSWORD: &str = "kitchen-pass-123";

/// Estado completo apontando para um schema descartável, já migrado.
/// `None` quando não há banco de testes configurado.
pub async fn database_state() -> Option<AppState> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("TEST_DATABASE_URL não definida; pulando teste de banco");
            return None;
        }
    };

    let schema = format!("tableside_test_{}", Uuid::new_v4().simple());
    let admin_pool = PgPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
    admin_pool
        .execute(format!("CREATE SCHEMA {schema}").as_str())
        .await
        .unwrap();
    admin_pool.close().await;

    let options = PgConnectOptions::from_str(&url)
        .unwrap()
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new().max_connections(4).connect_with(options).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "JWT_SECRET" => Some("db-test-secret".to_string()),
        _ => None,
    })
    .unwrap();
    Some(AppState::new(config, pool))
}

pub async fn make_table(state: &AppState, number: i32) -> Table {
    state
        .table_service
        .create(&TablePayload {
            table_number: number,
            capacity: 4,
            status: TableStatus::Available,
            qr_code_url: None,
            opened_at: None,
            closed_at: None,
        })
        .await
        .unwrap()
}

/// Categoria nova com um item por preço informado. O nome não pode
/// repetir as categorias do cardápio inicial (Veg, Snacks, Main Course, Drinks).
pub async fn make_items(state: &AppState, category: &str, prices: &[&str]) -> Vec<MenuItem> {
    let category = state
        .catalog_service
        .create_category(&CategoryPayload { name: category.to_string() })
        .await
        .unwrap();

    let mut items = Vec::new();
    for (i, price) in prices.iter().enumerate() {
        let item = state
            .catalog_service
            .create_menu_item(&MenuItemPayload {
                name: format!("{} dish {}", category.name, i + 1),
                description: String::new(),
                price: Decimal::from_str(price).unwrap(),
                category_id: category.id,
                is_available: true,
                image: None,
            })
            .await
            .unwrap();
        items.push(item);
    }
    items
}

pub async fn make_staff(state: &AppState, username: &str, role: StaffRole) {
    state
        .auth_service
        .create_staff_member(&CreateStaffPayload {
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            role,
        })
        .await
        .unwrap();
}

/// Usuário comum (sem perfil de equipe), direto no banco.
pub async fn make_customer(state: &AppState, username: &str) {
    let hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    sqlx::query("INSERT INTO users (username, password_hash, is_staff) VALUES ($1, $2, FALSE)")
        .bind(username)
        .bind(hash)
        .execute(&state.db_pool)
        .await
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::AppError,
        models::orders::{NewOrder, NewOrderLine, OrderChanges, OrderStatus},
        routes::build_router,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn line(menu_item_id: i64, quantity: i32) -> NewOrderLine {
        NewOrderLine {
            menu_item_id,
            quantity,
            custom_notes: String::new(),
        }
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn creating_an_order_prices_lines_and_occupies_the_table() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 7).await;
        let items = make_items(&state, "Curries", &["100.00", "50.00"]).await;
        let mut live = state.live_hub.join(crate::services::live::ORDERS_GROUP);

        let order = state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: "No onions".into(),
                items: vec![line(items[0].id, 2), line(items[1].id, 1)],
            })
            .await
            .unwrap();

        assert_eq!(order.total_price, dec("250"));
        let line_totals: Vec<Decimal> = order.items.iter().map(|i| i.line_total).collect();
        assert_eq!(line_totals, vec![dec("200"), dec("50")]);
        assert_eq!(order.table.id, table.id);

        let table = state.table_service.get(table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert!(table.opened_at.is_some());

        let event = live.recv().await.unwrap();
        assert_eq!(event.payload()["event"], "created");
        assert_eq!(event.payload()["order"]["id"], order.id);
    }

    #[tokio::test]
    async fn a_second_order_keeps_the_table_opening_time() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 12).await;
        let items = make_items(&state, "Tandoor", &["80.00"]).await;
        let new_order = || NewOrder {
            table_id: table.id,
            status: OrderStatus::Received,
            special_instructions: String::new(),
            items: vec![line(items[0].id, 1)],
        };

        state.order_service.create(new_order()).await.unwrap();
        let opened = state.table_service.get(table.id).await.unwrap();
        assert_eq!(opened.status, TableStatus::Occupied);

        state.order_service.create(new_order()).await.unwrap();
        let after = state.table_service.get(table.id).await.unwrap();
        assert_eq!(after.status, TableStatus::Occupied);
        assert_eq!(after.opened_at, opened.opened_at);
    }

    #[tokio::test]
    async fn ordered_items_and_their_tables_cannot_be_deleted() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 15).await;
        let idle_table = make_table(&state, 16).await;
        let items = make_items(&state, "Chaat", &["60.00", "45.00"]).await;

        state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(items[0].id, 2)],
            })
            .await
            .unwrap();

        assert!(matches!(
            state.catalog_service.delete_menu_item(items[0].id).await,
            Err(AppError::ProtectedResource(_))
        ));
        assert!(matches!(
            state.table_service.delete(table.id).await,
            Err(AppError::ProtectedResource(_))
        ));

        // Sem pedidos, a remoção passa
        state.catalog_service.delete_menu_item(items[1].id).await.unwrap();
        state.table_service.delete(idle_table.id).await.unwrap();

        assert!(state.catalog_service.get_menu_item(items[0].id).await.is_ok());
        assert!(state.table_service.get(table.id).await.is_ok());
    }

    #[tokio::test]
    async fn oversized_orders_are_rejected_before_hitting_the_column() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 21).await;
        let items = make_items(&state, "Banquet", &["100.00"]).await;

        let result = state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(items[0].id, 2_000_000)],
            })
            .await;

        match result {
            Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("items")),
            other => panic!("expected items error, got {:?}", other.map(|o| o.id)),
        }
        assert_eq!(state.table_service.get(table.id).await.unwrap().status, TableStatus::Available);
    }

    #[tokio::test]
    async fn replacing_items_recomputes_the_total() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 3).await;
        let items = make_items(&state, "Street Food", &["30.00", "12.50"]).await;

        let order = state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(items[0].id, 1)],
            })
            .await
            .unwrap();
        assert_eq!(order.total_price, dec("30"));

        let updated = state
            .order_service
            .update(
                order.id,
                OrderChanges {
                    status: Some(OrderStatus::Preparing),
                    items: Some(vec![line(items[1].id, 4)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Preparing);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.total_price, dec("50"));
    }

    #[tokio::test]
    async fn unknown_table_or_item_is_a_field_error() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 1).await;

        let missing_table = state
            .order_service
            .create(NewOrder {
                table_id: table.id + 100,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(1, 1)],
            })
            .await;
        match missing_table {
            Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("table_id")),
            other => panic!("expected table_id error, got {:?}", other.map(|o| o.id)),
        }

        let missing_item = state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(i64::MAX, 1)],
            })
            .await;
        match missing_item {
            Err(AppError::ValidationError(errors)) => assert!(errors.field_errors().contains_key("items")),
            other => panic!("expected items error, got {:?}", other.map(|o| o.id)),
        }

        // Nada foi gravado nem a mesa foi ocupada
        assert!(state.order_service.list().await.unwrap().is_empty());
        assert_eq!(state.table_service.get(table.id).await.unwrap().status, TableStatus::Available);
    }

    #[tokio::test]
    async fn deleting_a_category_cascades_unless_items_were_ordered() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 9).await;
        let unused = make_items(&state, "Seasonal", &["10.00"]).await;
        let ordered = make_items(&state, "Breads", &["15.00"]).await;

        state.catalog_service.delete_category(unused[0].category.id).await.unwrap();
        assert!(matches!(
            state.catalog_service.get_menu_item(unused[0].id).await,
            Err(AppError::ResourceNotFound(_))
        ));

        state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(ordered[0].id, 1)],
            })
            .await
            .unwrap();

        let blocked = state.catalog_service.delete_category(ordered[0].category.id).await;
        assert!(matches!(blocked, Err(AppError::ProtectedResource(_))));
        assert!(state.catalog_service.get_menu_item(ordered[0].id).await.is_ok());
    }

    #[tokio::test]
    async fn revenue_only_counts_served_and_closed_orders() {
        let Some(state) = database_state().await else { return };
        let table = make_table(&state, 4).await;
        let items = make_items(&state, "Mains", &["250.00", "50.00"]).await;

        let served = state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(items[0].id, 1)],
            })
            .await
            .unwrap();
        state
            .order_service
            .update(
                served.id,
                OrderChanges {
                    status: Some(OrderStatus::Served),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        state
            .order_service
            .create(NewOrder {
                table_id: table.id,
                status: OrderStatus::Received,
                special_instructions: String::new(),
                items: vec![line(items[1].id, 1)],
            })
            .await
            .unwrap();

        let summary = state.dashboard_service.summary(Utc::now()).await.unwrap();
        assert_eq!(summary.total_revenue, dec("250"));
        assert_eq!(summary.daily_revenue, dec("250"));
        assert_eq!(summary.active_orders.len(), 2);
    }

    #[tokio::test]
    async fn catalog_writes_need_a_staff_token() {
        let Some(state) = database_state().await else { return };
        make_customer(&state, "diner").await;
        make_staff(&state, "waiter", StaffRole::Staff).await;

        let customer = state.auth_service.obtain_token_pair("diner", TEST_PASSWORD).await.unwrap();
        let staff = state.auth_service.obtain_token_pair("waiter", TEST_PASSWORD).await.unwrap();
        let app = build_router(state);

        let post = |token: &str| {
            Request::post("/api/categories/")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "Desserts"}"#))
                .unwrap()
        };

        let denied = app.clone().oneshot(post(&customer.access)).await.unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let created = app.clone().oneshot(post(&staff.access)).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let bytes = created.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["name"], "Desserts");

        // Refresh não serve como access
        let refresh_as_access = app.oneshot(post(&staff.refresh)).await.unwrap();
        assert_eq!(refresh_as_access.status(), StatusCode::UNAUTHORIZED);
    }
}
