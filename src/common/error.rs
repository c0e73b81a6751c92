// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

// Erro de domínio. Os serviços e repositórios só conhecem este tipo;
// a conversão para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    ResourceNotFound(String),

    // Remoção bloqueada por uma referência (FK RESTRICT)
    #[error("Protected: {0}")]
    ProtectedResource(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Corpo que não virou o payload esperado (campo -> mensagens)
    #[error("Invalid request body")]
    InvalidBody(HashMap<String, Vec<String>>),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O corpo de erro que vai para o cliente
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl AppError {
    /// Erro de validação atrelado a um único campo, no mesmo formato que o
    /// `validator` produz.
    pub fn field(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::ResourceNotFound(what.into())
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "One or more fields are invalid.".to_string(),
                    details: Some(details),
                }
            }
            AppError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "No active account found with the given credentials.")
            }
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided or are invalid.",
            ),
            AppError::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, msg.clone()),
            AppError::ResourceNotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} not found.", what))
            }
            AppError::ProtectedResource(msg) => ApiError::new(StatusCode::CONFLICT, msg.clone()),
            AppError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidBody(details) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: "One or more fields are invalid.".to_string(),
                details: Some(details.clone()),
            },
            AppError::UnsupportedMediaType(msg) => ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone()),

            // O resto vira 500; o detalhe fica só no log.
            e => {
                tracing::error!("Internal server error: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error()
    }
}

/// Corpo JSON cuja rejeição vira `AppError` (400 com detalhes por campo).
pub type JsonBody<T> = WithRejection<Json<T>, AppError>;

// Rejeições do `Json` entram no mesmo formato de erro da API
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                let detail = std::error::Error::source(&e)
                    .map(|inner| inner.to_string())
                    .unwrap_or_else(|| e.body_text());
                let (field, message) = body_error_detail(&detail);
                AppError::InvalidBody(HashMap::from([(field, vec![message])]))
            }
            JsonRejection::JsonSyntaxError(e) => {
                let detail = std::error::Error::source(&e)
                    .map(|inner| inner.to_string())
                    .unwrap_or_else(|| e.body_text());
                AppError::InvalidBody(HashMap::from([(
                    NON_FIELD_ERRORS.to_string(),
                    vec![format!("JSON parse error - {}", detail)],
                )]))
            }
            JsonRejection::MissingJsonContentType(e) => AppError::UnsupportedMediaType(e.body_text()),
            other => AppError::InvalidBody(HashMap::from([(NON_FIELD_ERRORS.to_string(), vec![other.body_text()])])),
        }
    }
}

const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Separa o campo da mensagem de erro do serde.
/// "missing field `tableId` at ..." e "items[0].quantity: invalid type ..." viram
/// ("tableId", ...) e ("items[0].quantity", ...).
fn body_error_detail(detail: &str) -> (String, String) {
    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return (field.to_string(), "This field is required.".to_string());
        }
    }
    if let Some((path, message)) = detail.split_once(": ") {
        if !path.is_empty() && !path.contains(' ') {
            return (path.to_string(), message.to_string());
        }
    }
    (NON_FIELD_ERRORS.to_string(), detail.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_carries_field_details() {
        let api = AppError::field("table_id", "does_not_exist", "Table 9 does not exist.").to_api_error();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["table_id"], vec!["Table 9 does not exist.".to_string()]);
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::InvalidToken.to_api_error().status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("staff only".into()).to_api_error().status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::not_found("Order 3").to_api_error().status, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ProtectedResource("in use".into()).to_api_error().status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn body_errors_name_the_offending_field() {
        assert_eq!(
            body_error_detail("missing field `tableId` at line 1 column 27"),
            ("tableId".to_string(), "This field is required.".to_string())
        );
        assert_eq!(
            body_error_detail("items[0].quantity: invalid type: string \"two\", expected i32 at line 1 column 40"),
            (
                "items[0].quantity".to_string(),
                "invalid type: string \"two\", expected i32 at line 1 column 40".to_string()
            )
        );
        assert_eq!(
            body_error_detail("invalid type: integer `1`, expected a map").0,
            "non_field_errors"
        );
    }

    #[test]
    fn invalid_body_is_a_bad_request_with_details() {
        let api = AppError::InvalidBody(HashMap::from([(
            "tableId".to_string(),
            vec!["This field is required.".to_string()],
        )]))
        .to_api_error();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["tableId"], vec!["This field is required.".to_string()]);
    }

    #[test]
    fn internal_errors_hide_the_detail() {
        let api = AppError::InternalServerError(anyhow::anyhow!("pool exploded")).to_api_error();

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("pool exploded"));
        assert!(api.details.is_none());
    }
}
