// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// --- Categorias ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Main Course")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 100, message = "Name must have between 1 and 100 characters."))]
    #[schema(example = "Desserts")]
    pub name: String,
}

// --- Itens do cardápio ---

// Linha crua do JOIN menu_items + categories
#[derive(Debug, Clone, FromRow)]
pub struct MenuItemRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub is_available: bool,
    pub image: Option<String>,
    pub category_id: i64,
    pub category_name: String,
}

// O que a API devolve: item com a categoria embutida
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[schema(example = 5)]
    pub id: i64,
    #[schema(example = "Dal Tadka")]
    pub name: String,
    pub description: String,
    #[schema(example = "190.00")]
    pub price: Decimal,
    pub is_available: bool,
    pub image: Option<String>,
    pub category: Category,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            is_available: row.is_available,
            image: row.image,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
        }
    }
}

// ---
// Validação de preço: NUMERIC(8,2), nunca negativo
// ---
pub(crate) fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Price cannot be negative.".into());
        return Err(err);
    }
    if val.normalize().scale() > 2 {
        let mut err = ValidationError::new("max_decimal_places");
        err.message = Some("Ensure that there are no more than 2 decimal places.".into());
        return Err(err);
    }
    if *val >= Decimal::from(1_000_000) {
        let mut err = ValidationError::new("max_digits");
        err.message = Some("Ensure that there are no more than 8 digits in total.".into());
        return Err(err);
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPayload {
    #[validate(length(min = 1, max = 200, message = "Name must have between 1 and 200 characters."))]
    #[schema(example = "Masala Dosa")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_price"))]
    #[schema(example = "120.00")]
    pub price: Decimal,

    #[schema(example = 3)]
    pub category_id: i64,

    #[serde(default = "default_true")]
    pub is_available: bool,

    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemPayload {
    #[validate(length(min = 1, max = 200, message = "Name must have between 1 and 200 characters."))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,

    pub category_id: Option<i64>,

    pub is_available: Option<bool>,

    // `null` remove a imagem
    #[serde(default, deserialize_with = "crate::common::patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

impl UpdateMenuItemPayload {
    pub fn apply_to(self, current: &MenuItem) -> MenuItemPayload {
        MenuItemPayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
            category_id: self.category_id.unwrap_or(current.category.id),
            is_available: self.is_available.unwrap_or(current.is_available),
            image: self.image.unwrap_or_else(|| current.image.clone()),
        }
    }
}

/// Filtro das listagens públicas do cardápio.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    pub available_only: bool,
    pub excluded_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn price_rules() {
        assert!(validate_price(&Decimal::from_str("190.00").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("0").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("-1").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("10.005").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("1000000").unwrap()).is_err());
    }

    #[test]
    fn menu_item_payload_defaults_to_available() {
        let payload: MenuItemPayload =
            serde_json::from_str(r#"{"name": "Chai", "price": 40, "categoryId": 1}"#).unwrap();

        assert!(payload.is_available);
        assert_eq!(payload.description, "");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn patch_can_clear_the_image() {
        let current: MenuItem = MenuItemRow {
            id: 4,
            name: "Paneer Tikka".into(),
            description: String::new(),
            price: Decimal::from(220),
            is_available: true,
            image: Some("menu/paneer.jpg".into()),
            category_id: 1,
            category_name: "Snacks".into(),
        }
        .into();

        let untouched: UpdateMenuItemPayload = serde_json::from_str(r#"{"price": 240}"#).unwrap();
        assert_eq!(untouched.apply_to(&current).image.as_deref(), Some("menu/paneer.jpg"));

        let cleared: UpdateMenuItemPayload = serde_json::from_str(r#"{"image": null}"#).unwrap();
        let merged = cleared.apply_to(&current);
        assert_eq!(merged.image, None);
        assert_eq!(merged.price, Decimal::from(220));
    }

    #[test]
    fn row_embeds_category() {
        let item: MenuItem = MenuItemRow {
            id: 2,
            name: "Sweet Lassi".into(),
            description: String::new(),
            price: Decimal::from(110),
            is_available: true,
            image: None,
            category_id: 9,
            category_name: "Drinks".into(),
        }
        .into();

        assert_eq!(item.category, Category { id: 9, name: "Drinks".into() });
    }
}
