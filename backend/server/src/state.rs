use std::sync::Arc;

use clicker::{
    catalog::Catalog,
    resolver::ClickResolver,
    store::{MemoryStore, UserStore},
};
use tracing::{info, warn};

use super::{
    config::{Config, StoreKind},
    database::RedisStore,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn UserStore>,
    pub resolver: ClickResolver<'static>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Arc<Self>> {
        let config = Config::load();

        let store: Arc<dyn UserStore> = match config.store {
            StoreKind::Redis => {
                info!("Connecting to Redis...");
                Arc::new(RedisStore::connect(&config.redis_url, config.redis_timeout_ms).await?)
            }
            StoreKind::Memory => {
                warn!("Using in-memory store, records are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn UserStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            resolver: ClickResolver::new(Catalog::standard()),
        })
    }
}
