use super::{ChannelState, GatewayOptions};
use crate::infrastructure::{HeartbeatTimer, Timer};
use crate::messaging::{CloseInfo, EventSink, FrameRouter, GatewayEvent};
use crate::types::{Frame, GatewayError, WS_CLOSE_ABNORMAL, WS_CLOSE_NORMAL};
use crate::websocket::{TransportEvent, TransportFactory, TransportHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

/// Requests from client handles to the gateway task
pub(crate) enum Command {
    Shutdown(oneshot::Sender<()>),
}

/// The gateway state machine.
///
/// Owns the single live transport and the heartbeat timer. Every transition
/// happens on the task running [`run`](Self::run), so transitions never
/// interleave.
pub(crate) struct GatewayConnection {
    options: GatewayOptions,
    factory: Arc<dyn TransportFactory>,
    events: EventSink,
    heartbeat: HeartbeatTimer,
    backoff: Timer,
    transport: Option<TransportHandle>,
    state: ChannelState,
    state_tx: watch::Sender<ChannelState>,
}

impl GatewayConnection {
    pub(crate) fn new(
        options: GatewayOptions,
        factory: Arc<dyn TransportFactory>,
        events: EventSink,
        state_tx: watch::Sender<ChannelState>,
    ) -> Self {
        Self {
            heartbeat: HeartbeatTimer::new(options.heartbeat_period()),
            backoff: Timer::new(options.reconnect_intervals.clone()),
            options,
            factory,
            events,
            transport: None,
            state: ChannelState::Idle,
            state_tx,
        }
    }

    /// Drives the state machine until shutdown or until every client handle is dropped.
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    match command {
                        Some(Command::Shutdown(ack)) => {
                            self.shutdown();
                            let _ = ack.send(());
                        }
                        None => {
                            tracing::debug!("All client handles dropped");
                            self.shutdown();
                        }
                    }
                    break;
                }
                event = next_transport_event(&mut self.transport) => match event {
                    Some(event) => self.handle_transport_event(event),
                    None => {
                        tracing::warn!("Transport went away without a close event");
                        self.on_closed(WS_CLOSE_ABNORMAL, "transport dropped".to_string());
                    }
                },
                _ = self.heartbeat.tick() => self.on_heartbeat_tick(),
            }
        }

        tracing::debug!("Gateway task finished");
    }

    fn set_state(&mut self, new_state: ChannelState) {
        if self.state != new_state {
            tracing::debug!("Gateway state: {} -> {}", self.state, new_state);
            self.state = new_state;
            self.state_tx.send_replace(new_state);
        }
    }

    /// `Idle -> Connecting`
    pub(crate) fn start(&mut self) {
        if self.state != ChannelState::Idle || self.transport.is_some() {
            return;
        }
        tracing::info!("Connecting to {}", self.options.endpoint);
        self.connect(Duration::ZERO);
    }

    /// Replaces whatever transport is held with a fresh one from the factory.
    fn connect(&mut self, delay: Duration) {
        self.set_state(ChannelState::Connecting);
        let handle = self.factory.create(&self.options.endpoint, delay);
        // Dropping the previous handle unsubscribes from its events
        self.transport = Some(handle);
    }

    pub(crate) fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_opened(),
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Error(err) => self.on_error(err),
            TransportEvent::Closed { code, reason } => self.on_closed(code, reason),
        }
    }

    fn on_opened(&mut self) {
        if self.state != ChannelState::Connecting {
            tracing::warn!("Ignoring open event in state {}", self.state);
            return;
        }

        self.set_state(ChannelState::Open);
        self.backoff.reset();
        tracing::info!("Connected to gateway");
        self.events.emit(GatewayEvent::Connected);

        self.send_frame(Frame::identify(&self.options.tokens));
        tracing::info!("Identified with {} token(s)", self.options.tokens.len());

        self.heartbeat.arm();
    }

    fn on_message(&mut self, text: &str) {
        match FrameRouter::route(text) {
            Ok(Some(event)) => self.events.emit(event),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Dropping undecodable frame: {}", e);
                self.events.emit(GatewayEvent::error(e));
            }
        }
    }

    fn on_error(&mut self, err: GatewayError) {
        tracing::warn!("Transport error: {}", err);
        self.events.emit(GatewayEvent::error(err));
    }

    fn on_closed(&mut self, code: u16, reason: String) {
        self.heartbeat.disarm();
        self.set_state(ChannelState::Closing);
        tracing::info!("Disconnected: code={}, reason='{}'", code, reason);
        self.events
            .emit(GatewayEvent::Disconnected(CloseInfo::new(code, reason)));

        if self.options.reconnect {
            self.set_state(ChannelState::Reconnecting);
            self.events.emit(GatewayEvent::Reconnecting);
            let delay = self.backoff.next_delay();
            tracing::info!(
                "Reconnecting (attempt {}) in {:?}",
                self.backoff.attempts(),
                delay
            );
            self.connect(delay);
        } else {
            self.transport = None;
            self.set_state(ChannelState::Idle);
            tracing::info!("Reconnect disabled, gateway stays closed");
        }
    }

    pub(crate) fn on_heartbeat_tick(&mut self) {
        let open = self
            .transport
            .as_ref()
            .is_some_and(|handle| handle.transport.is_open());

        if open {
            self.send_frame(Frame::heartbeat());
            tracing::debug!("Sent heartbeat");
        } else {
            tracing::warn!("[Heartbeat] Transport is not open, stopping heartbeat");
            self.heartbeat.disarm();
        }
    }

    /// `* -> Terminated`. Closes the live transport without reconnecting.
    pub(crate) fn shutdown(&mut self) {
        if self.state == ChannelState::Terminated {
            return;
        }
        tracing::info!("Shutting down gateway");

        let was_open = self.state == ChannelState::Open;
        self.heartbeat.disarm();
        if let Some(mut handle) = self.transport.take() {
            handle.transport.close();
        }
        self.set_state(ChannelState::Terminated);

        if was_open {
            self.events.emit(GatewayEvent::Disconnected(CloseInfo::new(
                WS_CLOSE_NORMAL,
                "client shutdown",
            )));
        }
    }

    fn send_frame(&mut self, frame: Frame) {
        let op = frame.op;
        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize op {} frame: {}", op, e);
                self.events.emit(GatewayEvent::error(e));
                return;
            }
        };

        let Some(handle) = self.transport.as_mut() else {
            tracing::warn!("No transport, dropping op {} frame", op);
            return;
        };
        if let Err(e) = handle.transport.send(text) {
            tracing::warn!("Failed to send op {} frame: {}", op, e);
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ChannelState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn heartbeat_armed(&self) -> bool {
        self.heartbeat.is_armed()
    }
}

async fn next_transport_event(transport: &mut Option<TransportHandle>) -> Option<TransportEvent> {
    match transport {
        Some(handle) => handle.events.recv().await,
        None => std::future::pending().await,
    }
}
