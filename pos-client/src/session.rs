//! Process-wide session holder.
//!
//! The session owns the in-memory copy of the token and decodes its claims
//! once per token change. Everything else reads snapshots or subscribes to
//! changes instead of decoding the token on its own.

use std::sync::Arc;

use common_auth::{decode_claims, AuthError, Claims};
use common_observability::ClientMetrics;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::routes::{Navigator, Route};
use crate::token_store::TokenStore;

/// Immutable view of the session at one point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub claims: Result<Claims, AuthError>,
    /// Bumped on every token change.
    pub generation: u64,
}

impl SessionSnapshot {
    fn decode(token: Option<String>, generation: u64) -> Self {
        let claims = match token.as_deref() {
            Some(raw) => decode_claims(raw),
            None => Err(AuthError::MissingToken),
        };
        Self {
            token,
            claims,
            generation,
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref().ok()
    }

    pub fn decoded(&self) -> Result<&Claims, &AuthError> {
        self.claims.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_ok()
    }
}

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<Arc<SessionSnapshot>>,
    navigator: Navigator,
    metrics: ClientMetrics,
}

impl SessionContext {
    /// Build the session from whatever the store currently holds.
    pub fn init(store: Arc<dyn TokenStore>, metrics: ClientMetrics) -> Self {
        let snapshot = SessionSnapshot::decode(store.get(), 0);
        record_decode_failure(&snapshot, &metrics);
        let (state, _) = watch::channel(Arc::new(snapshot));

        Self {
            inner: Arc::new(SessionInner {
                store,
                state,
                navigator: Navigator::new(Route::Login),
                metrics,
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.inner.state.borrow().clone()
    }

    pub fn current_token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn claims(&self) -> Option<Claims> {
        self.inner.state.borrow().claims().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.inner.state.subscribe()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.inner.metrics
    }

    /// Persist a freshly issued token and make it current.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.inner.store.set(&token);
        if self.replace(Some(token)) {
            info!("session token updated");
        }
    }

    /// Forget the session everywhere and show the login view.
    pub fn logout(&self) {
        self.inner.store.clear();
        if self.replace(None) {
            self.inner.metrics.logouts_total.inc();
            info!("session logged out");
        }
        self.inner.navigator.navigate(Route::Login);
    }

    /// Pick up changes made to the store by another process.
    ///
    /// Returns `true` when the current token changed.
    pub fn sync_from_store(&self) -> bool {
        let stored = self.inner.store.get();
        let changed = self.replace(stored);
        if changed {
            info!("session token changed in storage");
        }
        changed
    }

    fn replace(&self, token: Option<String>) -> bool {
        let metrics = &self.inner.metrics;
        self.inner.state.send_if_modified(|current| {
            if current.token == token {
                return false;
            }
            let next = SessionSnapshot::decode(token, current.generation + 1);
            record_decode_failure(&next, metrics);
            *current = Arc::new(next);
            true
        })
    }
}

fn record_decode_failure(snapshot: &SessionSnapshot, metrics: &ClientMetrics) {
    if let Err(err @ AuthError::MalformedToken(_)) = &snapshot.claims {
        metrics.token_decode_failures.inc();
        warn!(error = %err, "stored session token cannot be decoded");
    }
}
