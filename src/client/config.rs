use crate::types::{
    DEFAULT_HEARTBEAT_INTERVAL_SECS, GATEWAY_URL, GatewayError, MAX_HEARTBEAT_INTERVAL_SECS,
    RECONNECT_BACKOFF_INTERVALS, Result,
};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Configuration options for the vote gateway.
///
/// Options are validated once, when the client is constructed, and are
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    /// Bot tokens sent in the identify frame. Required, each non-empty.
    pub tokens: Vec<String>,
    /// Create a new connection after every disconnect. Default: `true`.
    pub reconnect: bool,
    /// Seconds between heartbeats, in `1..=50`. Default: `30`.
    pub heartbeat_interval: u64,
    /// Gateway URL. Default: [`GATEWAY_URL`].
    pub endpoint: String,
    /// Reconnect backoff schedule in milliseconds. Empty means reconnect immediately.
    pub reconnect_intervals: Vec<u64>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            reconnect: true,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            endpoint: GATEWAY_URL.to_string(),
            reconnect_intervals: Vec::new(),
        }
    }
}

/// Loosely-typed shape accepted by [`GatewayOptions::from_value`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    tokens: Vec<String>,
    #[serde(default)]
    reconnect: Option<bool>,
    #[serde(default)]
    heartbeat_interval: Option<u64>,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    reconnect_intervals: Option<Vec<u64>>,
}

impl GatewayOptions {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_heartbeat_interval(mut self, seconds: u64) -> Self {
        self.heartbeat_interval = seconds;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_reconnect_intervals(mut self, intervals: Vec<u64>) -> Self {
        self.reconnect_intervals = intervals;
        self
    }

    /// Use the bundled backoff schedule ([`RECONNECT_BACKOFF_INTERVALS`]).
    pub fn with_backoff(self) -> Self {
        self.with_reconnect_intervals(RECONNECT_BACKOFF_INTERVALS.to_vec())
    }

    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }

    /// Checks every option, failing with [`GatewayError::Config`].
    pub fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(GatewayError::config(
                "tokens must contain at least one token",
            ));
        }
        if self.tokens.iter().any(|token| token.is_empty()) {
            return Err(GatewayError::config("tokens must be non-empty strings"));
        }
        if self.heartbeat_interval == 0 || self.heartbeat_interval > MAX_HEARTBEAT_INTERVAL_SECS {
            return Err(GatewayError::config(format!(
                "heartbeatInterval must be between 1 and {} seconds, got {}",
                MAX_HEARTBEAT_INTERVAL_SECS, self.heartbeat_interval
            )));
        }

        let url = Url::parse(&self.endpoint).map_err(|e| {
            GatewayError::config(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(GatewayError::config(format!(
                "endpoint must use ws:// or wss://, got '{}'",
                self.endpoint
            )));
        }

        Ok(())
    }

    /// Builds options from untyped JSON such as
    /// `{"tokens": ["..."], "reconnect": true, "heartbeatInterval": 30}`.
    ///
    /// Wrong types and out-of-range values fail with [`GatewayError::Config`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawOptions = serde_json::from_value(value)
            .map_err(|e| GatewayError::config(format!("invalid gateway options: {}", e)))?;

        let defaults = Self::default();
        let options = Self {
            tokens: raw.tokens,
            reconnect: raw.reconnect.unwrap_or(defaults.reconnect),
            heartbeat_interval: raw.heartbeat_interval.unwrap_or(defaults.heartbeat_interval),
            endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
            reconnect_intervals: raw
                .reconnect_intervals
                .unwrap_or(defaults.reconnect_intervals),
        };
        options.validate()?;
        Ok(options)
    }

    /// Reads `DBG_TOKENS` (comma separated), `DBG_RECONNECT`,
    /// `DBG_HEARTBEAT_INTERVAL` and `DBG_GATEWAY_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tokens =
            lookup("DBG_TOKENS").ok_or_else(|| GatewayError::config("DBG_TOKENS must be set"))?;
        let mut options = Self::new(
            tokens
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty()),
        );

        if let Some(reconnect) = lookup("DBG_RECONNECT") {
            options.reconnect = reconnect.trim().parse().map_err(|_| {
                GatewayError::config(format!(
                    "DBG_RECONNECT must be true or false, got '{}'",
                    reconnect
                ))
            })?;
        }
        if let Some(interval) = lookup("DBG_HEARTBEAT_INTERVAL") {
            options.heartbeat_interval = interval.trim().parse().map_err(|_| {
                GatewayError::config(format!(
                    "DBG_HEARTBEAT_INTERVAL must be an integer, got '{}'",
                    interval
                ))
            })?;
        }
        if let Some(endpoint) = lookup("DBG_GATEWAY_URL") {
            options.endpoint = endpoint;
        }

        options.validate()?;
        Ok(options)
    }
}
