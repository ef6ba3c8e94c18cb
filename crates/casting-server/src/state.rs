use casting_auth::Authorizer;
use casting_core::AppConfig;
use casting_store::{CastingStore, SqliteStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub cfg: AppConfig,
    pub store: Arc<dyn CastingStore>,
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    pub fn new(cfg: AppConfig, store: Arc<dyn CastingStore>, authorizer: Arc<Authorizer>) -> Self {
        Self {
            cfg,
            store,
            authorizer,
        }
    }

    /// Open the database and build the token verifier described by `cfg`.
    pub async fn init(cfg: &AppConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&cfg.database).await?;
        let authorizer = Authorizer::from_config(&cfg.auth)?;

        // A cold cache is not fatal: keys are fetched again on first use.
        match authorizer.preload().await {
            Ok(keys) => tracing::info!(keys, "signing keys preloaded"),
            Err(e) => tracing::warn!(error = %e, "could not preload signing keys"),
        }

        Ok(Self::new(cfg.clone(), Arc::new(store), Arc::new(authorizer)))
    }

    pub fn items_per_page(&self) -> u32 {
        self.cfg.pagination.items_per_page.max(1)
    }
}
