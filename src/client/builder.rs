use super::connection::GatewayConnection;
use super::{ChannelState, GatewayClient, GatewayOptions};
use crate::infrastructure::TaskManager;
use crate::messaging::EventSink;
use crate::types::Result;
use crate::websocket::{TransportFactory, WebSocketFactory};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};

/// Builder for GatewayClient that handles initialization
///
/// Subscribing through [`events`](Self::events) before [`build`](Self::build)
/// guarantees no event of the first connection is missed.
pub struct GatewayClientBuilder {
    options: GatewayOptions,
    factory: Arc<dyn TransportFactory>,
    events: EventSink,
}

impl GatewayClientBuilder {
    /// Create a new builder, validating `options`
    pub fn new(options: GatewayOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            options,
            factory: Arc::new(WebSocketFactory),
            events: EventSink::new(),
        })
    }

    /// Replace the tungstenite transport, e.g. with a proxy-aware one
    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// Build the client and spawn the gateway task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> GatewayClient {
        let (state_tx, state_rx) = watch::channel(ChannelState::Idle);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let mut connection =
            GatewayConnection::new(self.options, self.factory, self.events.clone(), state_tx);
        connection.start();

        let mut tasks = TaskManager::new();
        tasks.spawn(connection.run(command_rx));

        GatewayClient {
            commands: command_tx,
            events: self.events,
            state: state_rx,
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }
}
