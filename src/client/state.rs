/// Lifecycle state of the gateway connection.
///
/// Only the gateway task changes it; consumers observe it through
/// [`GatewayClient::state`](super::GatewayClient::state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// No transport; initial state, and the resting state after a close
    /// when reconnect is disabled
    Idle,
    Connecting,
    Open,
    Closing,
    Reconnecting,
    /// Shut down by the consumer; no transport will be created again
    Terminated,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Reconnecting => "reconnecting",
            Self::Terminated => "terminated",
        }
    }

    /// States in which exactly one transport is held; the closed transport
    /// is kept through `Closing` and `Reconnecting` until its replacement exists
    pub fn has_transport(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Open | Self::Closing | Self::Reconnecting
        )
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
