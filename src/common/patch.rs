// src/common/patch.rs

use serde::{Deserialize, Deserializer};

/// Campo anulável de PATCH: ausente = `None` (mantém), `null` = `Some(None)` (limpa).
/// Usar junto com `#[serde(default)]`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
