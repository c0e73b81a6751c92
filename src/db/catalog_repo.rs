// src/db/catalog_repo.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{
        db_utils::{contains_pattern, map_delete_error, map_write_error},
        error::AppError,
    },
    models::catalog::{Category, MenuFilter, MenuItem, MenuItemPayload, MenuItemRow},
};

const MENU_ITEM_SELECT: &str = r#"
    SELECT m.id, m.name, m.description, m.price, m.is_available, m.image,
           c.id AS category_id, c.name AS category_name
    FROM menu_items m
    JOIN categories c ON c.id = m.category_id
"#;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "name", "A category with this name"))
    }

    pub async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "name", "A category with this name"))
    }

    // Os itens vão junto (ON DELETE CASCADE). Se algum deles estiver em um
    // pedido, a FK RESTRICT de order_items barra a operação inteira.
    pub async fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "this category"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_categories(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    //  ITENS DO CARDÁPIO
    // =========================================================================

    pub async fn list_menu_items(&self, filter: &MenuFilter) -> Result<Vec<MenuItem>, AppError> {
        let patterns: Vec<String> = filter
            .excluded_keywords
            .iter()
            .map(|k| contains_pattern(k))
            .collect();

        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            r#"
            {MENU_ITEM_SELECT}
            WHERE ($1 = FALSE OR m.is_available)
              AND NOT (m.name ILIKE ANY($2))
            ORDER BY c.name, m.name
            "#
        ))
        .bind(filter.available_only)
        .bind(patterns)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    // A API lista por nome; as páginas públicas agrupam por categoria.
    pub async fn list_menu_items_by_name(&self) -> Result<Vec<MenuItem>, AppError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!("{MENU_ITEM_SELECT} ORDER BY m.name, m.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    pub async fn newest_available(&self, limit: i64) -> Result<Vec<MenuItem>, AppError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "{MENU_ITEM_SELECT} WHERE m.is_available ORDER BY m.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    pub async fn count_available_items(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_items WHERE is_available")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn find_menu_item(&self, id: i64) -> Result<Option<MenuItem>, AppError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!("{MENU_ITEM_SELECT} WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(MenuItem::from))
    }

    pub async fn create_menu_item(&self, payload: &MenuItemPayload) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO menu_items (name, description, price, category_id, is_available, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.category_id)
        .bind(payload.is_available)
        .bind(payload.image.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "category_id", "Menu item"))
    }

    pub async fn update_menu_item(&self, id: i64, payload: &MenuItemPayload) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET name = $2, description = $3, price = $4,
                category_id = $5, is_available = $6, image = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.category_id)
        .bind(payload.is_available)
        .bind(payload.image.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "category_id", "Menu item"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_menu_item(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error(e, "this menu item"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Preço atual de cada item pedido. Ids ausentes simplesmente não
    /// aparecem no mapa.
    pub async fn prices_for<'e, E>(&self, executor: E, ids: &[i64]) -> Result<HashMap<i64, Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (i64, Decimal)>("SELECT id, price FROM menu_items WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().collect())
    }
}
