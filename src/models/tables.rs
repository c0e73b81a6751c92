// src/models/tables.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "table_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TableStatus::Available => "Available",
            TableStatus::Occupied => "Occupied",
            TableStatus::Reserved => "Reserved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 12)]
    pub table_number: i32,
    #[schema(example = 4)]
    pub capacity: i32,
    pub status: TableStatus,
    pub qr_code_url: Option<String>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

fn default_capacity() -> i32 {
    2
}

// POST e PUT: representação completa
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TablePayload {
    #[validate(range(min = 1, message = "Table number must be a positive integer."))]
    #[schema(example = 12)]
    pub table_number: i32,

    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    #[serde(default = "default_capacity")]
    #[schema(example = 4)]
    pub capacity: i32,

    #[serde(default)]
    pub status: TableStatus,

    #[validate(url(message = "Enter a valid URL."))]
    pub qr_code_url: Option<String>,

    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

// PATCH: só o que vier é alterado
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTablePayload {
    #[validate(range(min = 1, message = "Table number must be a positive integer."))]
    pub table_number: Option<i32>,

    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    pub capacity: Option<i32>,

    pub status: Option<TableStatus>,

    // Os três abaixo aceitam `null` para limpar; a URL é validada após o merge
    #[serde(default, deserialize_with = "crate::common::patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub qr_code_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "crate::common::patch::nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub opened_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "crate::common::patch::nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub closed_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTablePayload {
    /// Aplica o patch sobre o registro atual, gerando a representação completa.
    pub fn apply_to(self, current: &Table) -> TablePayload {
        TablePayload {
            table_number: self.table_number.unwrap_or(current.table_number),
            capacity: self.capacity.unwrap_or(current.capacity),
            status: self.status.unwrap_or(current.status),
            qr_code_url: self.qr_code_url.unwrap_or_else(|| current.qr_code_url.clone()),
            opened_at: self.opened_at.unwrap_or(current.opened_at),
            closed_at: self.closed_at.unwrap_or(current.closed_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            id: 7,
            table_number: 3,
            capacity: 4,
            status: TableStatus::Occupied,
            qr_code_url: Some("https://example.com/order/?table=7".into()),
            opened_at: Some(Utc::now()),
            closed_at: None,
        }
    }

    #[test]
    fn payload_defaults_match_a_fresh_table() {
        let payload: TablePayload = serde_json::from_str(r#"{"tableNumber": 5}"#).unwrap();

        assert_eq!(payload.capacity, 2);
        assert_eq!(payload.status, TableStatus::Available);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn zero_table_number_is_rejected() {
        let payload: TablePayload = serde_json::from_str(r#"{"tableNumber": 0}"#).unwrap();
        let errors = payload.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("table_number"));
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let current = table();
        let patch = UpdateTablePayload {
            status: Some(TableStatus::Reserved),
            ..Default::default()
        };

        let merged = patch.apply_to(&current);
        assert_eq!(merged.table_number, 3);
        assert_eq!(merged.capacity, 4);
        assert_eq!(merged.status, TableStatus::Reserved);
        assert_eq!(merged.qr_code_url, current.qr_code_url);
        assert_eq!(merged.opened_at, current.opened_at);
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let current = table();
        let patch: UpdateTablePayload =
            serde_json::from_str(r#"{"qrCodeUrl": null, "openedAt": null, "status": "available"}"#).unwrap();

        let merged = patch.apply_to(&current);
        assert_eq!(merged.qr_code_url, None);
        assert_eq!(merged.opened_at, None);
        assert_eq!(merged.closed_at, None);
        assert_eq!(merged.status, TableStatus::Available);
    }

    #[test]
    fn merged_patch_still_validates_the_url() {
        let patch: UpdateTablePayload = serde_json::from_str(r#"{"qrCodeUrl": "not a url"}"#).unwrap();
        let errors = patch.apply_to(&table()).validate().unwrap_err();

        assert!(errors.field_errors().contains_key("qr_code_url"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TableStatus::Occupied).unwrap(), "\"occupied\"");
    }
}
