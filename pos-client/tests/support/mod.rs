#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common_observability::ClientMetrics;
use jsonwebtoken::{encode, EncodingKey, Header};
use pos_client::{MemoryTokenStore, Router, SessionContext};
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"pos-test-secret";

/// Sign `claims` the way the backend does (HS256).
pub fn issue_token(claims: &Value) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(TEST_SECRET)).expect("sign token")
}

/// Token with a fixed header and a fake signature, as in hand-written fixtures.
pub fn unsigned_token(payload: &str) -> String {
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
}

pub struct TestSession {
    pub store: Arc<MemoryTokenStore>,
    pub session: SessionContext,
    pub router: Router,
    pub metrics: ClientMetrics,
}

pub fn session_with(token: Option<String>) -> TestSession {
    let store = Arc::new(match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });
    let metrics = ClientMetrics::new();
    let session = SessionContext::init(store.clone(), metrics.clone());
    let router = Router::new(session.clone());
    TestSession {
        store,
        session,
        router,
        metrics,
    }
}
