// WebSocket module - Transport abstraction and the tungstenite implementation
pub mod factory;
#[cfg(test)]
pub(crate) mod mock;
pub mod transport;

pub use factory::{TransportFactory, WebSocketFactory};
pub use transport::{Transport, TransportEvent, TransportHandle, WebSocketTransport};
