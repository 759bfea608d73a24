use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5050";
const DEFAULT_STATE_DIR: &str = ".pos-client";
const MIN_POLL_MILLIS: u64 = 250;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub poll_interval: Duration,
    pub shipment_poll_interval: Duration,
    pub low_stock_threshold: i64,
    pub http_timeout: Option<Duration>,
    pub view_all_branches: bool,
    pub email: Option<String>,
    pub password: Option<String>,
    pub start_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            poll_interval: Duration::from_millis(5_000),
            shipment_poll_interval: Duration::from_millis(2_000),
            low_stock_threshold: 10,
            http_timeout: None,
            view_all_branches: false,
            email: None,
            password: None,
            start_route: "/".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }
}

pub fn load_client_config() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let api_url = env::var("POS_API_URL")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or(defaults.api_url);
    if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
        return Err(anyhow!("POS_API_URL must be an http(s) URL, got '{api_url}'"));
    }

    let state_dir = env::var("POS_STATE_DIR")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .map(PathBuf::from)
        .unwrap_or(defaults.state_dir);

    let poll_interval = millis_from_env("POS_POLL_INTERVAL_MS")
        .context("Failed to parse POS_POLL_INTERVAL_MS")?
        .unwrap_or(defaults.poll_interval);
    let shipment_poll_interval = millis_from_env("POS_SHIPMENT_POLL_INTERVAL_MS")
        .context("Failed to parse POS_SHIPMENT_POLL_INTERVAL_MS")?
        .unwrap_or(defaults.shipment_poll_interval);

    let low_stock_threshold = env::var("POS_LOW_STOCK_THRESHOLD")
        .ok()
        .map(|value| value.trim().parse::<i64>())
        .transpose()
        .context("Failed to parse POS_LOW_STOCK_THRESHOLD")?
        .unwrap_or(defaults.low_stock_threshold);

    let http_timeout = env::var("POS_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .map(|value| value.parse::<u64>().map(Duration::from_secs))
        .transpose()
        .context("Failed to parse POS_HTTP_TIMEOUT_SECS")?;

    let view_all_branches = bool_from_env("POS_VIEW_ALL_BRANCHES").unwrap_or(false);
    let email = env::var("POS_EMAIL")
        .ok()
        .and_then(|value| normalize_optional(&value));
    let password = env::var("POS_PASSWORD").ok().filter(|value| !value.is_empty());
    let start_route = env::var("POS_ROUTE")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or(defaults.start_route);

    Ok(ClientConfig {
        api_url,
        state_dir,
        poll_interval,
        shipment_poll_interval,
        low_stock_threshold,
        http_timeout,
        view_all_branches,
        email,
        password,
        start_route,
    })
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn millis_from_env(key: &str) -> Result<Option<Duration>> {
    let Some(raw) = env::var(key).ok().and_then(|value| normalize_optional(&value)) else {
        return Ok(None);
    };
    let millis = raw
        .parse::<u64>()
        .map_err(|err| anyhow!("Invalid millisecond value '{raw}': {err}"))?;
    Ok(Some(Duration::from_millis(millis.max(MIN_POLL_MILLIS))))
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
