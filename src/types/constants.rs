/// Gateway opcodes (wire `op` values)
pub mod opcodes {
    pub const IDENTIFY: i64 = 0;
    pub const HEARTBEAT: i64 = 1;
    pub const HEARTBEAT_ACK: i64 = 2;
    pub const UPVOTE: i64 = 3;
    pub const PAGE_VIEW: i64 = 4;
}

/// Vote gateway endpoint
pub const GATEWAY_URL: &str = "wss://gateway.discordbots.group";

/// REST API base URL
pub const API_BASE_URL: &str = "https://discordbots.group/api";

/// Default heartbeat interval (seconds)
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Upper bound accepted by the gateway for the heartbeat interval (seconds)
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 50;

/// Opt-in reconnect backoff schedule (milliseconds)
pub const RECONNECT_BACKOFF_INTERVALS: [u64; 4] = [1000, 2000, 5000, 10000];

/// Bounded capacity of receivers returned by `EventSink::subscribe`
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// WebSocket close codes
pub const WS_CLOSE_NORMAL: u16 = 1000;
pub const WS_CLOSE_ABNORMAL: u16 = 1006;

/// How long a client-initiated close waits for the server's close frame (seconds)
pub const CLOSE_HANDSHAKE_TIMEOUT_SECS: u64 = 3;

/// How long shutdown waits for background tasks before aborting them (seconds)
pub const TASK_SHUTDOWN_GRACE_SECS: u64 = 5;
