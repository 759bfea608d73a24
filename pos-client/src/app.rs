use std::sync::Arc;

use common_observability::ClientMetrics;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::routes::{Route, Router};
use crate::session::SessionContext;
use crate::token_store::{FileTokenStore, TokenStore};
use crate::views::{mount, MountedView};

/// Shared client state, created once at start-up.
#[derive(Clone)]
pub struct ClientState {
    pub config: Arc<ClientConfig>,
    pub api: ApiClient,
    pub session: SessionContext,
    pub router: Router,
}

impl ClientState {
    /// Persist the session under `config.state_dir`.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let store = Arc::new(FileTokenStore::new(&config.state_dir));
        Self::with_store(config, store, ClientMetrics::new())
    }

    pub fn with_store(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        metrics: ClientMetrics,
    ) -> ClientResult<Self> {
        let api = ApiClient::with_timeout(config.api_url.clone(), config.http_timeout)?;
        let session = SessionContext::init(store, metrics);
        let router = Router::new(session.clone());
        Ok(Self {
            config: Arc::new(config),
            api,
            session,
            router,
        })
    }

    pub fn mount(&self, route: Route) -> MountedView {
        mount(self, route)
    }
}
