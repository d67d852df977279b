use crate::types::GatewayError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A user upvoted a bot (op 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteEvent {
    pub bot: String,
    pub user: String,
}

/// A bot's listing page was viewed (op 4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewEvent {
    pub bot: String,
}

/// Close code and reason reported once per disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Type-safe gateway events delivered to subscribers
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// Transport opened; identify is about to be sent
    Connected,
    /// Transport closed
    Disconnected(CloseInfo),
    /// A fresh transport is being created after a disconnect
    Reconnecting,
    /// Server acknowledged a heartbeat
    HeartbeatAck,
    Upvote(UpvoteEvent),
    PageView(PageViewEvent),
    /// Non-fatal transport or decode failure
    Error(Arc<GatewayError>),
}

impl GatewayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected(_) => EventKind::Disconnected,
            Self::Reconnecting => EventKind::Reconnecting,
            Self::HeartbeatAck => EventKind::HeartbeatAck,
            Self::Upvote(_) => EventKind::Upvote,
            Self::PageView(_) => EventKind::PageView,
            Self::Error(_) => EventKind::Error,
        }
    }

    pub(crate) fn error(err: GatewayError) -> Self {
        Self::Error(Arc::new(err))
    }
}

/// Discriminant of [`GatewayEvent`], used to subscribe to a single event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Reconnecting,
    HeartbeatAck,
    Upvote,
    PageView,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        Self::Connected,
        Self::Disconnected,
        Self::Reconnecting,
        Self::HeartbeatAck,
        Self::Upvote,
        Self::PageView,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnecting => "reconnecting",
            Self::HeartbeatAck => "heartbeatAck",
            Self::Upvote => "upvote",
            Self::PageView => "pageView",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
