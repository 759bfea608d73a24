use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Counters describing how the client session and its polling loops behave.
#[derive(Clone)]
pub struct ClientMetrics {
    pub registry: Registry,
    pub polls_total: IntCounterVec,
    pub guard_decisions_total: IntCounterVec,
    pub token_decode_failures: IntCounter,
    pub logouts_total: IntCounter,
}

impl ClientMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let polls_total = IntCounterVec::new(
            Opts::new("pos_client_polls_total", "Feed poll attempts by outcome"),
            &["feed", "outcome"],
        )
        .expect("valid polls_total metric");
        let guard_decisions_total = IntCounterVec::new(
            Opts::new(
                "pos_client_guard_decisions_total",
                "Route guard decisions by outcome",
            ),
            &["outcome"],
        )
        .expect("valid guard_decisions_total metric");
        let token_decode_failures = IntCounter::new(
            "pos_client_token_decode_failures_total",
            "Stored session tokens that could not be decoded",
        )
        .expect("valid token_decode_failures metric");
        let logouts_total = IntCounter::new("pos_client_logouts_total", "Session logouts")
            .expect("valid logouts_total metric");

        let _ = registry.register(Box::new(polls_total.clone()));
        let _ = registry.register(Box::new(guard_decisions_total.clone()));
        let _ = registry.register(Box::new(token_decode_failures.clone()));
        let _ = registry.register(Box::new(logouts_total.clone()));

        ClientMetrics {
            registry,
            polls_total,
            guard_decisions_total,
            token_decode_failures,
            logouts_total,
        }
    }

    pub fn record_poll(&self, feed: &str, outcome: &str) {
        self.polls_total.with_label_values(&[feed, outcome]).inc();
    }

    pub fn record_guard(&self, outcome: &str) {
        self.guard_decisions_total.with_label_values(&[outcome]).inc();
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}
