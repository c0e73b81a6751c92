// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{TokenKind, User},
};

pub const SESSION_COOKIE: &str = "tableside_session";

// De onde veio a identidade. A API só aceita Bearer; as páginas só a sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Bearer,
    Session,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub source: AuthSource,
}

// O middleware em si: identifica, mas não bloqueia. Quem exige
// autenticação são os extratores abaixo.
pub async fn identify(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Bearer só vale na API; páginas e /ws/ o ignoram
    let bearer = if request.uri().path().starts_with("/api/") {
        request.headers().typed_get::<Authorization<Bearer>>()
    } else {
        None
    };

    if let Some(Authorization(bearer)) = bearer {
        // Token enviado e inválido = 401, mesmo em rota aberta da API
        let user = app_state
            .auth_service
            .resolve_token(bearer.token(), TokenKind::Access)
            .await?;

        // Insere o usuário nos "extensions" da requisição
        request.extensions_mut().insert(CurrentUser {
            user,
            source: AuthSource::Bearer,
        });
    } else if let Some(cookie) = jar.get(SESSION_COOKIE) {
        // Sessão vencida ou adulterada: segue como anônimo
        match app_state
            .auth_service
            .resolve_token(cookie.value(), TokenKind::Session)
            .await
        {
            Ok(user) => {
                request.extensions_mut().insert(CurrentUser {
                    user,
                    source: AuthSource::Session,
                });
            }
            Err(AppError::InvalidToken) => tracing::debug!("Ignoring invalid session cookie"),
            Err(e) => return Err(e),
        }
    }

    Ok(next.run(request).await)
}

fn bearer_user(parts: &Parts) -> Option<User> {
    parts
        .extensions
        .get::<CurrentUser>()
        .filter(|c| c.source == AuthSource::Bearer)
        .map(|c| c.user.clone())
}

// Extrator para obter o usuário autenticado (Bearer) diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_user(parts).map(AuthenticatedUser).ok_or(AppError::InvalidToken)
    }
}

/// Bearer de um membro da equipe. Sem token = 401, sem permissão = 403.
pub struct StaffUser(pub User);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = bearer_user(parts).ok_or(AppError::InvalidToken)?;
        if !user.is_staff {
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action.".into(),
            ));
        }
        Ok(StaffUser(user))
    }
}

/// Usuário do Bearer, se houver. Nunca rejeita.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(bearer_user(parts)))
    }
}

/// Equipe logada pelo formulário (cookie). Caso contrário, volta ao login.
pub struct SessionStaff(pub User);

impl<S> FromRequestParts<S> for SessionStaff
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .filter(|c| c.source == AuthSource::Session && c.user.is_staff)
            .map(|c| SessionStaff(c.user.clone()))
            .ok_or_else(|| Redirect::to("/staff/login/"))
    }
}
