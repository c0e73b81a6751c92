// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Tradução de violações de constraint do Postgres
// ---

/// Erros de escrita (INSERT/UPDATE): chave única duplicada vira conflito,
/// FK inexistente vira erro de validação no campo informado.
pub(crate) fn map_write_error(e: sqlx::Error, field: &'static str, what: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{} already exists.", what));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::field(field, "does_not_exist", format!("Referenced {} does not exist.", field));
        }
    }
    AppError::DatabaseError(e)
}

/// Erros de DELETE: FK RESTRICT significa que ainda há referências.
pub(crate) fn map_delete_error(e: sqlx::Error, what: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::ProtectedResource(format!(
                "Cannot delete {} because it is referenced by existing orders.",
                what
            ));
        }
    }
    AppError::DatabaseError(e)
}

/// Monta o padrão de `ILIKE` para "contém", escapando os curingas do LIKE.
pub(crate) fn contains_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
