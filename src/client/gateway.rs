use super::connection::Command;
use super::{ChannelState, GatewayClientBuilder, GatewayOptions};
use crate::infrastructure::TaskManager;
use crate::messaging::EventSink;
use crate::types::{GatewayError, Result, TASK_SHUTDOWN_GRACE_SECS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot, watch};

/// The main entry point for the discordbots.group vote gateway.
///
/// Construction validates the options and immediately starts connecting on a
/// background task. That task sends the identify frame on every (re)connect,
/// keeps the connection alive with heartbeats, and reconnects after
/// disconnects unless `reconnect` is disabled.
///
/// # Example
///
/// ```no_run
/// use discordbots_group_rs::{GatewayClient, GatewayOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let builder = GatewayClient::builder(GatewayOptions::new(["your-bot-token"]))?;
/// builder.events().on_upvote(|vote| {
///     println!("{} voted for {}", vote.user, vote.bot);
/// });
///
/// let client = builder.build();
/// // ...
/// client.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    pub(crate) commands: mpsc::UnboundedSender<Command>,
    pub(crate) events: EventSink,
    pub(crate) state: watch::Receiver<ChannelState>,
    pub(crate) tasks: Arc<Mutex<TaskManager>>,
}

impl GatewayClient {
    /// Creates a client and starts connecting.
    ///
    /// Handlers registered on [`events`](Self::events) afterwards may miss
    /// the first `connected` event; use [`builder`](Self::builder) to
    /// subscribe beforehand.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the options are invalid; no
    /// connection is attempted in that case.
    pub fn new(options: GatewayOptions) -> Result<Self> {
        GatewayClientBuilder::new(options).map(|builder| builder.build())
    }

    pub fn builder(options: GatewayOptions) -> Result<GatewayClientBuilder> {
        GatewayClientBuilder::new(options)
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Open
    }

    /// A receiver notified on every state transition
    pub fn state_changes(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Waits until the gateway reaches `target`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Closed`] if the gateway task stops first.
    pub async fn wait_for_state(&self, target: ChannelState) -> Result<()> {
        let mut rx = self.state.clone();
        rx.wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| GatewayError::Closed)
    }

    /// Permanently closes the gateway.
    ///
    /// Stops the heartbeat, closes the current connection and suppresses
    /// reconnection, then waits for the background task to finish. A task
    /// that outlives the grace period is aborted. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        } else {
            tracing::debug!("Gateway task already stopped");
        }

        self.tasks
            .lock()
            .await
            .shutdown(Duration::from_secs(TASK_SHUTDOWN_GRACE_SECS))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{EventKind, GatewayEvent};
    use crate::websocket::mock::MockFactory;
    use std::sync::Mutex as StdMutex;

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn build(options: GatewayOptions) -> (GatewayClient, MockFactory, Arc<StdMutex<Vec<EventKind>>>) {
        let factory = MockFactory::new();
        let builder = GatewayClient::builder(options)
            .unwrap()
            .with_transport_factory(Arc::new(factory.clone()));

        let kinds = Arc::new(StdMutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let kinds = Arc::clone(&kinds);
            builder
                .events()
                .on(kind, move |event: &GatewayEvent| kinds.lock().unwrap().push(event.kind()));
        }
        (builder.build(), factory, kinds)
    }

    #[tokio::test]
    async fn test_build_connects_immediately() {
        let (client, factory, _) = build(GatewayOptions::new(["t"]));

        assert_eq!(factory.created(), 1);
        assert_eq!(client.state(), ChannelState::Connecting);
        assert!(!client.is_connected());

        factory.last().open();
        client.wait_for_state(ChannelState::Open).await.unwrap();
        assert!(client.is_connected());
    }

    #[test]
    fn test_invalid_options_fail_before_connecting() {
        let result = GatewayClient::builder(GatewayOptions::new(Vec::<String>::new()));
        assert!(matches!(result, Err(GatewayError::Config(_))));

        let result = GatewayClient::new(GatewayOptions::new(["t"]).with_heartbeat_interval(60));
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_cadence() {
        let (client, factory, kinds) = build(GatewayOptions::new(["t"]).with_heartbeat_interval(5));
        let first = factory.last();

        // Nothing is sent before the transport opens
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert!(first.sent().is_empty());

        first.open();
        settle().await;
        assert_eq!(first.sent_ops(), vec![0]);

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(first.sent_ops(), vec![0, 1, 1, 1]);

        first.close(1006, "");
        settle().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(first.sent_ops(), vec![0, 1, 1, 1]);
        assert!(factory.last().sent().is_empty());

        assert_eq!(
            *kinds.lock().unwrap(),
            vec![
                EventKind::Connected,
                EventKind::Disconnected,
                EventKind::Reconnecting
            ]
        );
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_acks_are_delivered() {
        let (client, factory, kinds) = build(GatewayOptions::new(["t"]).with_heartbeat_interval(1));
        let remote = factory.last();
        remote.open();
        settle().await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(remote.sent_ops(), vec![0, 1]);
        remote.message(r#"{"op":2,"t":0,"data":null}"#);
        settle().await;

        assert_eq!(
            *kinds.lock().unwrap(),
            vec![EventKind::Connected, EventKind::HeartbeatAck]
        );
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_suppresses_reconnect() {
        let (client, factory, kinds) = build(GatewayOptions::new(["t"]));
        let remote = factory.last();
        remote.open();
        client.wait_for_state(ChannelState::Open).await.unwrap();

        client.shutdown().await;
        assert_eq!(client.state(), ChannelState::Terminated);
        assert_eq!(remote.close_requests(), 1);

        remote.close(1000, "");
        settle().await;
        assert_eq!(factory.created(), 1);
        assert_eq!(
            *kinds.lock().unwrap(),
            vec![EventKind::Connected, EventKind::Disconnected]
        );

        // Idempotent
        client.shutdown().await;
        assert!(client.wait_for_state(ChannelState::Open).await.is_err());
    }

    #[tokio::test]
    async fn test_reconnect_disabled_stays_idle() {
        let (client, factory, _) = build(GatewayOptions::new(["t"]).with_reconnect(false));
        factory.last().open();
        client.wait_for_state(ChannelState::Open).await.unwrap();

        factory.last().close(4001, "invalid token");
        client.wait_for_state(ChannelState::Idle).await.unwrap();
        settle().await;
        assert_eq!(factory.created(), 1);

        client.shutdown().await;
        assert_eq!(client.state(), ChannelState::Terminated);
    }

    #[tokio::test]
    async fn test_dropping_all_handles_shuts_down() {
        let (client, factory, _) = build(GatewayOptions::new(["t"]));
        let remote = factory.last();
        let mut state = client.state_changes();
        let other = client.clone();

        drop(client);
        settle().await;
        assert_ne!(*state.borrow_and_update(), ChannelState::Terminated);

        drop(other);
        state
            .wait_for(|state| *state == ChannelState::Terminated)
            .await
            .unwrap();
        assert_eq!(remote.close_requests(), 1);
    }

    #[tokio::test]
    async fn test_old_transport_events_never_follow_new_connection() {
        let (client, factory, kinds) = build(GatewayOptions::new(["t"]));
        let first = factory.last();
        first.open();
        first.close(1006, "");
        // Would violate ordering if it were still delivered
        first.message(r#"{"op":3,"data":{"bot":"B","user":"U"}}"#);
        settle().await;

        assert_eq!(factory.created(), 2);
        factory.last().open();
        settle().await;

        assert_eq!(
            *kinds.lock().unwrap(),
            vec![
                EventKind::Connected,
                EventKind::Disconnected,
                EventKind::Reconnecting,
                EventKind::Connected
            ]
        );
        client.shutdown().await;
    }
}
