use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur when using the discordbots.group client.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Invalid options supplied at construction time; the gateway never starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket protocol error (connection failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Transport-level failure that is not a tungstenite error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inbound frame is not valid JSON or is missing expected fields
    #[error("Failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// Outbound frame could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error (REST client)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the REST API
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Attempted to send while the transport is not open
    #[error("Not connected")]
    NotConnected,

    /// The gateway task has already stopped
    #[error("Gateway closed")]
    Closed,
}

impl GatewayError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error came from decoding an inbound frame.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Convenience type alias for `Result<T, GatewayError>`.
pub type Result<T> = std::result::Result<T, GatewayError>;
