// src/services/catalog_service.rs

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{
        Category, CategoryPayload, MenuFilter, MenuItem, MenuItemPayload, UpdateMenuItemPayload,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    // Palavras que tiram um item do cardápio público (ex.: "chicken")
    excluded_keywords: Vec<String>,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, excluded_keywords: Vec<String>) -> Self {
        Self {
            repo,
            excluded_keywords,
        }
    }

    // --- CATEGORIAS ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories().await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, AppError> {
        self.repo
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, AppError> {
        let category = self.repo.create_category(payload.name.trim()).await?;
        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<Category, AppError> {
        self.repo
            .update_category(id, payload.name.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_category(id).await? {
            return Err(AppError::not_found("Category"));
        }
        tracing::info!(category_id = id, "Category deleted with its menu items");
        Ok(())
    }

    // --- ITENS ---

    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, AppError> {
        self.repo.list_menu_items_by_name().await
    }

    pub async fn get_menu_item(&self, id: i64) -> Result<MenuItem, AppError> {
        self.repo
            .find_menu_item(id)
            .await?
            .ok_or_else(|| AppError::not_found("Menu item"))
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), AppError> {
        if self.repo.find_category(category_id).await?.is_none() {
            return Err(AppError::field(
                "category_id",
                "does_not_exist",
                format!("Invalid pk \"{}\" - object does not exist.", category_id),
            ));
        }
        Ok(())
    }

    pub async fn create_menu_item(&self, payload: &MenuItemPayload) -> Result<MenuItem, AppError> {
        self.ensure_category(payload.category_id).await?;
        let id = self.repo.create_menu_item(payload).await?;
        tracing::info!(menu_item_id = id, "Menu item created");
        self.get_menu_item(id).await
    }

    pub async fn update_menu_item(&self, id: i64, payload: &MenuItemPayload) -> Result<MenuItem, AppError> {
        self.ensure_category(payload.category_id).await?;
        if !self.repo.update_menu_item(id, payload).await? {
            return Err(AppError::not_found("Menu item"));
        }
        self.get_menu_item(id).await
    }

    pub async fn patch_menu_item(&self, id: i64, patch: UpdateMenuItemPayload) -> Result<MenuItem, AppError> {
        let current = self.get_menu_item(id).await?;
        let payload = patch.apply_to(&current);
        self.update_menu_item(id, &payload).await
    }

    pub async fn delete_menu_item(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_menu_item(id).await? {
            return Err(AppError::not_found("Menu item"));
        }
        tracing::info!(menu_item_id = id, "Menu item deleted");
        Ok(())
    }

    // --- PÁGINAS PÚBLICAS ---

    /// Itens disponíveis, sem os que batem com as palavras excluídas,
    /// já agrupados por categoria.
    pub async fn public_menu(&self) -> Result<Vec<(Category, Vec<MenuItem>)>, AppError> {
        let items = self.repo.list_menu_items(&self.public_filter()).await?;
        Ok(group_by_category(items))
    }

    /// Mesmo filtro do cardápio, em ordem alfabética (formulário de pedido).
    pub async fn orderable_items(&self) -> Result<Vec<MenuItem>, AppError> {
        let mut items = self.repo.list_menu_items(&self.public_filter()).await?;
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn public_filter(&self) -> MenuFilter {
        MenuFilter {
            available_only: true,
            excluded_keywords: self.excluded_keywords.clone(),
        }
    }

    pub async fn newest_items(&self, limit: i64) -> Result<Vec<MenuItem>, AppError> {
        self.repo.newest_available(limit).await
    }
}

/// Agrupa itens já ordenados por categoria, preservando a ordem de chegada.
pub fn group_by_category(items: Vec<MenuItem>) -> Vec<(Category, Vec<MenuItem>)> {
    let mut groups: Vec<(Category, Vec<MenuItem>)> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some((category, members)) if category.id == item.category.id => members.push(item),
            _ => groups.push((item.category.clone(), vec![item])),
        }
    }
    groups
}
