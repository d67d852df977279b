use super::transport::{TransportHandle, WebSocketTransport};
use std::time::Duration;

/// Creates a fresh transport on every entry into `Connecting`.
///
/// `delay` is the reconnect backoff; the returned transport exists
/// immediately and dials once the delay has elapsed.
pub trait TransportFactory: Send + Sync {
    fn create(&self, endpoint: &str, delay: Duration) -> TransportHandle;
}

/// WebSocket factory for creating WebSocket connections
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketFactory;

impl TransportFactory for WebSocketFactory {
    fn create(&self, endpoint: &str, delay: Duration) -> TransportHandle {
        tracing::debug!("Creating WebSocket connection to: {}", endpoint);
        WebSocketTransport::spawn(endpoint.to_string(), delay)
    }
}
