use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, Store};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = if config.uses_memory_store() {
            info!("using in-memory store");
            Arc::new(MemoryStore::new()) as Arc<dyn Store>
        } else {
            Arc::new(PgStore::connect(&config.database_url, config.max_connections).await?)
                as Arc<dyn Store>
        };
        store.setup().await.context("store setup")?;

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Memory-backed state with test defaults.
    pub fn fake() -> Self {
        use crate::config::{CorsConfig, TokenConfig};

        let config = Arc::new(AppConfig {
            database_url: "memory:".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            token: TokenConfig { ttl_days: 180 },
            cors: CorsConfig {
                enabled: false,
                origin: "http://localhost:3000".into(),
            },
        });

        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
