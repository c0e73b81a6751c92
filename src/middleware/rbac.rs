// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::StaffUser,
    models::auth::{StaffRole, User},
};

/// 1. O Trait que define o cargo exigido
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> StaffRole;
}

/// 2. O Extractor (Guardião): equipe com o cargo `T`
pub struct RequireRole<T>(pub User, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A. Precisa ser equipe (401/403 vêm daqui)
        let StaffUser(user) = StaffUser::from_request_parts(parts, state).await?;

        // B. Confere o cargo
        let required = T::role();
        if !user.has_role(required) {
            return Err(AppError::Forbidden(format!("This action requires the {:?} role.", required)));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS CARGOS (TIPOS)
// ---

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    fn role() -> StaffRole { StaffRole::Admin }
}
