// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{
        AccessTokenResponse, Claims, CreateStaffPayload, StaffRole, TokenKind, TokenPairResponse, User,
    },
};

// Emissão e leitura dos JWTs. Os três tipos (access, refresh, sessão) usam o
// mesmo segredo; o campo `token_type` impede que um seja usado no lugar do outro.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    session_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: String, access_ttl: Duration, refresh_ttl: Duration, session_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
            session_ttl,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
            TokenKind::Session => self.session_ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
        self.issue_at(user_id, kind, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, kind: TokenKind, now: DateTime<Utc>) -> Result<String, AppError> {
        let expires_at = now + self.ttl(kind);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
            jti: Uuid::new_v4(),
            token_type: kind,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// Valida assinatura, expiração e tipo. Qualquer falha vira `InvalidToken`.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        if token_data.claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }
        Ok(token_data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenCodec,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenCodec, pool: PgPool) -> Self {
        Self {
            user_repo,
            tokens,
            pool,
        }
    }

    // Confere usuário e senha; contas inativas contam como credencial inválida
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn obtain_token_pair(&self, username: &str, password: &str) -> Result<TokenPairResponse, AppError> {
        let user = self.authenticate(username, password).await?;
        tracing::info!(user_id = %user.id, "Issued token pair");

        Ok(TokenPairResponse {
            access: self.tokens.issue(user.id, TokenKind::Access)?,
            refresh: self.tokens.issue(user.id, TokenKind::Refresh)?,
        })
    }

    pub async fn refresh_access(&self, refresh: &str) -> Result<AccessTokenResponse, AppError> {
        let user = self.resolve_token(refresh, TokenKind::Refresh).await?;
        Ok(AccessTokenResponse {
            access: self.tokens.issue(user.id, TokenKind::Access)?,
        })
    }

    /// Login do painel: só equipe. Retorna o token que vai no cookie.
    pub async fn login_session(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self.authenticate(username, password).await?;
        if !user.is_staff {
            return Err(AppError::InvalidCredentials);
        }
        tracing::info!(user_id = %user.id, "Staff session opened");
        self.tokens.issue(user.id, TokenKind::Session)
    }

    /// Token válido do tipo esperado + usuário existente e ativo.
    pub async fn resolve_token(&self, token: &str, kind: TokenKind) -> Result<User, AppError> {
        let claims = self.tokens.decode(token, kind)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)
    }

    pub async fn create_staff_member(&self, payload: &CreateStaffPayload) -> Result<User, AppError> {
        self.create_staff(&payload.username, &payload.password, payload.role).await
    }

    async fn create_staff(&self, username: &str, password: &str, role: StaffRole) -> Result<User, AppError> {
        // Hashing fora da transação, não toca no banco
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // Usuário e perfil entram juntos ou não entram
        let mut tx = self.pool.begin().await?;
        let user_id = self
            .user_repo
            .create_user(&mut *tx, username, &hashed_password, true)
            .await?;
        self.user_repo.upsert_profile(&mut *tx, user_id, role).await?;
        tx.commit().await?;

        tracing::info!(%user_id, ?role, "Staff member created");

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn list_staff(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_staff().await
    }

    pub async fn remove_user(&self, id: Uuid) -> Result<(), AppError> {
        if !self.user_repo.delete_user(id).await? {
            return Err(AppError::not_found("User"));
        }
        tracing::info!(user_id = %id, "User removed");
        Ok(())
    }

    /// Garante um admin inicial. Não mexe em um usuário que já exista.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "Bootstrap admin already present");
            return Ok(());
        }
        self.create_staff(username, password, StaffRole::Admin).await?;
        tracing::info!(username, "Bootstrap admin created");
        Ok(())
    }
}
