use crate::types::{
    CLOSE_HANDSHAKE_TIMEOUT_SECS, GatewayError, Result, WS_CLOSE_ABNORMAL, WS_CLOSE_NORMAL,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Lifecycle callbacks produced by a transport, in the order they happened.
///
/// `Closed` is delivered exactly once and nothing follows it.
#[derive(Debug)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(GatewayError),
    Closed { code: u16, reason: String },
}

/// Outbound half of a full-duplex connection to the gateway.
pub trait Transport: Send {
    /// Queues a text frame. Fails with `NotConnected` unless the transport is open.
    fn send(&mut self, text: String) -> Result<()>;

    /// Requests a close; the matching `Closed` event follows.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// A freshly created transport plus the receiver carrying its events
pub struct TransportHandle {
    pub transport: Box<dyn Transport>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

enum Outbound {
    Text(String),
    Close,
}

/// `tokio-tungstenite` backed transport driven by its own task
pub struct WebSocketTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
}

impl WebSocketTransport {
    /// Spawns the connection task. The dial starts after `delay`.
    pub fn spawn(endpoint: String, delay: Duration) -> TransportHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        tokio::spawn(drive(
            endpoint,
            delay,
            outbound_rx,
            events_tx,
            Arc::clone(&open),
        ));

        TransportHandle {
            transport: Box::new(Self {
                outbound: outbound_tx,
                open,
            }),
            events: events_rx,
        }
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, text: String) -> Result<()> {
        if !self.is_open() {
            return Err(GatewayError::NotConnected);
        }
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| GatewayError::NotConnected)
    }

    fn close(&mut self) {
        // Task already gone means Closed was already produced
        let _ = self.outbound.send(Outbound::Close);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

/// Resolves once a close is requested or the transport handle is dropped.
async fn close_requested(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    loop {
        match outbound.recv().await {
            Some(Outbound::Close) | None => return,
            Some(Outbound::Text(_)) => {
                tracing::debug!("Dropping frame queued before the socket opened");
            }
        }
    }
}

/// Pending forever until a close deadline is set.
async fn close_deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn drive(
    endpoint: String,
    delay: Duration,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<AtomicBool>,
) {
    let dial = async {
        if !delay.is_zero() {
            tracing::info!("Waiting {:?} before dialing {}", delay, endpoint);
            tokio::time::sleep(delay).await;
        }
        tracing::info!("Connecting to {}", endpoint);
        connect_async(endpoint.as_str()).await
    };

    let stream = tokio::select! {
        result = dial => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                tracing::error!("WebSocket connect failed: {}", e);
                let reason = e.to_string();
                let _ = events.send(TransportEvent::Error(e.into()));
                let _ = events.send(TransportEvent::Closed {
                    code: WS_CLOSE_ABNORMAL,
                    reason,
                });
                return;
            }
        },
        _ = close_requested(&mut outbound) => {
            tracing::debug!("Close requested before the socket opened");
            let _ = events.send(TransportEvent::Closed {
                code: WS_CLOSE_NORMAL,
                reason: "closed before open".to_string(),
            });
            return;
        }
    };

    open.store(true, Ordering::Release);
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = stream.split();
    let mut close_info: Option<(u16, String)> = None;
    let mut closing = false;
    let mut close_deadline: Option<Instant> = None;
    let close_timeout = Duration::from_secs(CLOSE_HANDSHAKE_TIMEOUT_SECS);

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::trace!("Received text message: {}", text);
                    let _ = events.send(TransportEvent::Message(text.to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Received binary message ({} bytes)", data.len());
                    let text = String::from_utf8_lossy(&data).into_owned();
                    let _ = events.send(TransportEvent::Message(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(close_frame) = frame {
                        tracing::info!(
                            "Server closed connection: code={:?}, reason='{}'",
                            close_frame.code,
                            close_frame.reason
                        );
                        close_info = Some((u16::from(close_frame.code), close_frame.reason.to_string()));
                    } else {
                        tracing::warn!("Server closed connection without close frame");
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    tracing::trace!("Received ping ({} bytes)", data.len());
                }
                Some(Ok(Message::Pong(data))) => {
                    tracing::trace!("Received pong ({} bytes)", data.len());
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => {
                    tracing::error!("WebSocket read error: {}", e);
                    let _ = events.send(TransportEvent::Error(e.into()));
                    break;
                }
                None => break,
            },
            command = outbound.recv(), if !closing => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::error!("WebSocket write error: {}", e);
                        let _ = events.send(TransportEvent::Error(e.into()));
                    }
                }
                Some(Outbound::Close) | None => {
                    closing = true;
                    close_deadline = Some(Instant::now() + close_timeout);
                    open.store(false, Ordering::Release);
                    close_info.get_or_insert((WS_CLOSE_NORMAL, String::new()));
                    match tokio::time::timeout(close_timeout, write.close()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::debug!("Close handshake failed: {}", e);
                            break;
                        }
                        Err(_) => {
                            tracing::warn!("Timed out sending close frame");
                            break;
                        }
                    }
                }
            },
            _ = close_deadline_elapsed(close_deadline) => {
                tracing::warn!("Server did not answer the close handshake within {:?}", close_timeout);
                break;
            }
        }
    }

    open.store(false, Ordering::Release);
    let (code, reason) = close_info.unwrap_or_else(|| (WS_CLOSE_ABNORMAL, String::new()));
    let _ = events.send(TransportEvent::Closed { code, reason });
}
