use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let token = TokenConfig {
            ttl_days: std::env::var("TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(180),
        };
        // CORS is a development convenience only
        let cors = CorsConfig {
            enabled: std::env::var("IS_DEV").map(|v| v == "true").unwrap_or(false),
            origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        };
        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
            token,
            cors,
        })
    }

    /// `memory:` URLs select the in-process store instead of Postgres.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(url: &str) -> AppConfig {
        AppConfig {
            database_url: url.into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            token: TokenConfig { ttl_days: 180 },
            cors: CorsConfig {
                enabled: false,
                origin: "http://localhost:3000".into(),
            },
        }
    }

    #[test]
    fn memory_scheme_selects_memory_store() {
        assert!(config_with_url("memory:").uses_memory_store());
        assert!(config_with_url("memory://contacts").uses_memory_store());
        assert!(!config_with_url("postgres://localhost/contacts").uses_memory_store());
    }
}
