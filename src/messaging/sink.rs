use super::event::{CloseInfo, EventKind, GatewayEvent, PageViewEvent, UpvoteEvent};
use crate::types::{EVENT_CHANNEL_CAPACITY, GatewayError};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

type Handler = Arc<dyn Fn(&GatewayEvent) + Send + Sync + 'static>;

struct EventBinding {
    kind: EventKind,
    handler: Handler,
}

/// Consumer-facing subscription point for gateway events.
///
/// Handlers are invoked synchronously on the gateway task, in the order they
/// were registered. Cloning the sink shares the same subscriber list.
#[derive(Clone, Default)]
pub struct EventSink {
    bindings: Arc<RwLock<Vec<EventBinding>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one event kind.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&GatewayEvent) + Send + Sync + 'static,
    {
        let binding = EventBinding {
            kind,
            handler: Arc::new(handler),
        };
        self.bindings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(binding);
    }

    /// Returns a receiver fed with every event of `kind`.
    ///
    /// Events are dropped (with a warning) when the receiver falls
    /// behind by more than the channel capacity.
    pub fn subscribe(&self, kind: EventKind) -> mpsc::Receiver<GatewayEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.on(kind, move |event| {
            if let Err(e) = tx.try_send(event.clone()) {
                tracing::warn!(
                    "Failed to send event '{}' to listener: {}. Channel may be closed or full.",
                    event.kind(),
                    e
                );
            }
        });
        rx
    }

    pub fn on_connected<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on(EventKind::Connected, move |_| handler());
    }

    pub fn on_disconnected<F>(&self, handler: F)
    where
        F: Fn(&CloseInfo) + Send + Sync + 'static,
    {
        self.on(EventKind::Disconnected, move |event| {
            if let GatewayEvent::Disconnected(info) = event {
                handler(info);
            }
        });
    }

    pub fn on_reconnecting<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on(EventKind::Reconnecting, move |_| handler());
    }

    pub fn on_heartbeat_ack<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on(EventKind::HeartbeatAck, move |_| handler());
    }

    pub fn on_upvote<F>(&self, handler: F)
    where
        F: Fn(&UpvoteEvent) + Send + Sync + 'static,
    {
        self.on(EventKind::Upvote, move |event| {
            if let GatewayEvent::Upvote(upvote) = event {
                handler(upvote);
            }
        });
    }

    pub fn on_page_view<F>(&self, handler: F)
    where
        F: Fn(&PageViewEvent) + Send + Sync + 'static,
    {
        self.on(EventKind::PageView, move |event| {
            if let GatewayEvent::PageView(view) = event {
                handler(view);
            }
        });
    }

    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&GatewayError) + Send + Sync + 'static,
    {
        self.on(EventKind::Error, move |event| {
            if let GatewayEvent::Error(err) = event {
                handler(err);
            }
        });
    }

    /// Delivers an event to every matching handler.
    pub(crate) fn emit(&self, event: GatewayEvent) {
        let kind = event.kind();
        // Snapshot so handlers may subscribe without deadlocking
        let handlers: Vec<Handler> = {
            let bindings = self
                .bindings
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            bindings
                .iter()
                .filter(|binding| binding.kind == kind)
                .map(|binding| Arc::clone(&binding.handler))
                .collect()
        };

        tracing::trace!("Emitting '{}' to {} handler(s)", kind, handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.bindings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|binding| binding.kind == kind)
            .count()
    }
}
