use std::env;

use crate::crypto::MasterKey;
use crate::error::{AppError, Result};

const DEV_ADMIN_API_KEY: &str = "dev-admin-key";
const DEFAULT_ASAAS_SANDBOX_URL: &str = "https://sandbox.asaas.com/api/v3";
const DEFAULT_ASAAS_PRODUCTION_URL: &str = "https://api.asaas.com/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub dev_mode: bool,
    /// Bearer key for the /admin surface
    pub admin_api_key: String,
    /// Hex-encoded 32-byte key used for envelope encryption of processor secrets
    pub master_key_hex: Option<String>,
    /// Overrides the Asaas API base URL (both environments), mainly for testing
    pub asaas_base_url: Option<String>,
    /// Orders a single client may create per minute
    pub order_rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("VITRINE_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let admin_api_key = env::var("ADMIN_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEV_ADMIN_API_KEY.to_string());

        let order_rate_limit_per_minute: u32 = env::var("ORDER_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(5);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "vitrine.db".to_string()),
            base_url,
            dev_mode,
            admin_api_key,
            master_key_hex: env::var("MASTER_KEY").ok(),
            asaas_base_url: env::var("ASAAS_BASE_URL").ok(),
            order_rate_limit_per_minute,
        }
    }

    /// The admin key is the built-in dev key, which is only acceptable in dev mode.
    pub fn uses_dev_admin_key(&self) -> bool {
        self.admin_api_key == DEV_ADMIN_API_KEY
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load the master key. Outside dev mode a missing or malformed key is fatal.
    pub fn master_key(&self) -> Result<MasterKey> {
        match &self.master_key_hex {
            Some(hex_key) => MasterKey::from_hex(hex_key),
            None if self.dev_mode => {
                tracing::warn!("MASTER_KEY not set, using the insecure dev key");
                Ok(MasterKey::dev())
            }
            None => Err(AppError::Internal(
                "MASTER_KEY must be set (64 hex characters)".into(),
            )),
        }
    }
}

/// Base URL for the Asaas API in the given environment.
pub fn asaas_base_url(environment: &str, override_url: Option<&str>) -> String {
    if let Some(url) = override_url {
        return url.trim_end_matches('/').to_string();
    }
    match environment {
        "production" => DEFAULT_ASAAS_PRODUCTION_URL.to_string(),
        _ => DEFAULT_ASAAS_SANDBOX_URL.to_string(),
    }
}
