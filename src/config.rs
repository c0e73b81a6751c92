// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CatalogRepository, DashboardRepository, OrderRepository, TableRepository, UserRepository},
    services::{
        auth::{AuthService, TokenCodec},
        catalog_service::CatalogService,
        dashboard_service::DashboardService,
        live::LiveHub,
        order_service::OrderService,
        table_service::TableService,
    },
};

// Configuração lida do ambiente (.env incluso)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub access_token_ttl: chrono::Duration,
    pub refresh_token_ttl: chrono::Duration,
    pub session_ttl: chrono::Duration,
    pub restaurant_offset: FixedOffset,
    pub public_base_url: String,
    pub menu_excluded_keywords: Vec<String>,
    // (usuário, senha) do admin criado na subida, se informado
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} deve ser definida", key))
        };

        let offset_minutes: i32 = parse_or(&lookup, "RESTAURANT_UTC_OFFSET_MINUTES", 0)?;
        let restaurant_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("RESTAURANT_UTC_OFFSET_MINUTES fora do intervalo: {}", offset_minutes))?;

        let menu_excluded_keywords = lookup("MENU_EXCLUDED_KEYWORDS")
            .unwrap_or_else(|| "chicken,mutton,egg".to_string())
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let bootstrap_admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(user), Some(password)) if !user.trim().is_empty() && !password.is_empty() => {
                Some((user.trim().to_string(), password))
            }
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            access_token_ttl: chrono::Duration::minutes(parse_or(&lookup, "ACCESS_TOKEN_MINUTES", 5)?),
            refresh_token_ttl: chrono::Duration::days(parse_or(&lookup, "REFRESH_TOKEN_DAYS", 1)?),
            session_ttl: chrono::Duration::hours(parse_or(&lookup, "SESSION_HOURS", 12)?),
            restaurant_offset,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            menu_excluded_keywords,
            bootstrap_admin,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub table_service: TableService,
    pub order_service: OrderService,
    pub dashboard_service: DashboardService,
    pub live_hub: LiveHub,
}

impl AppState {
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::new(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn new(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let table_repo = TableRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let live_hub = LiveHub::new();

        let tokens = TokenCodec::new(
            config.jwt_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
            config.session_ttl,
        );
        let auth_service = AuthService::new(user_repo, tokens, db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), config.menu_excluded_keywords.clone());
        let table_service = TableService::new(table_repo.clone(), db_pool.clone(), config.public_base_url.clone());
        let order_service = OrderService::new(
            order_repo.clone(),
            table_repo,
            catalog_repo.clone(),
            live_hub.clone(),
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(
            dashboard_repo,
            catalog_repo,
            order_repo,
            db_pool.clone(),
            config.restaurant_offset,
        );

        Self {
            db_pool,
            auth_service,
            catalog_service,
            table_service,
            order_service,
            dashboard_service,
            live_hub,
        }
    }
}
