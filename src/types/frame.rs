use super::constants::opcodes;
use super::error::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Gateway opcodes known to this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Client → server authentication
    Identify,
    /// Client → server keep-alive
    Heartbeat,
    /// Server → client keep-alive acknowledgment
    HeartbeatAck,
    /// Server → client upvote notification
    Upvote,
    /// Server → client page view notification
    PageView,
}

impl OpCode {
    /// Maps a wire value to a known opcode; unknown values yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            opcodes::IDENTIFY => Some(Self::Identify),
            opcodes::HEARTBEAT => Some(Self::Heartbeat),
            opcodes::HEARTBEAT_ACK => Some(Self::HeartbeatAck),
            opcodes::UPVOTE => Some(Self::Upvote),
            opcodes::PAGE_VIEW => Some(Self::PageView),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Identify => opcodes::IDENTIFY,
            Self::Heartbeat => opcodes::HEARTBEAT,
            Self::HeartbeatAck => opcodes::HEARTBEAT_ACK,
            Self::Upvote => opcodes::UPVOTE,
            Self::PageView => opcodes::PAGE_VIEW,
        }
    }
}

/// One discrete message exchanged over the gateway.
///
/// `op` is kept as the raw integer so that frames with opcodes this client
/// does not know about still decode and can be skipped. Integral floats
/// such as `3.0` are accepted. The server's `t` is informational: anything
/// that isn't a non-negative integer (or a string holding one) reads as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    #[serde(deserialize_with = "deserialize_op")]
    pub op: i64,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub t: Option<u64>,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Builds an outbound frame stamped with the current time.
    pub fn new(op: OpCode, data: Value) -> Self {
        Self {
            op: op.code(),
            t: Some(now_millis()),
            data,
        }
    }

    pub fn identify(tokens: &[String]) -> Self {
        Self::new(OpCode::Identify, serde_json::json!({ "tokens": tokens }))
    }

    pub fn heartbeat() -> Self {
        Self::new(OpCode::Heartbeat, serde_json::json!({}))
    }

    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_code(self.op)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn deserialize_op<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(op) = number.as_i64() {
        return Ok(op);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(D::Error::custom(format!(
            "op must be an integer, got {}",
            number
        ))),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Current time in millis since Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
