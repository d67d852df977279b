use super::event::{GatewayEvent, PageViewEvent, UpvoteEvent};
use crate::types::{Frame, GatewayError, OpCode, Result};

/// Decodes inbound gateway text and classifies it into domain events
pub struct FrameRouter;

impl FrameRouter {
    /// Routes a raw inbound payload.
    ///
    /// Returns `Ok(None)` for frames that produce no event (unknown or
    /// client-only opcodes) and `Err(GatewayError::Decode)` for payloads that
    /// are not valid JSON frames or lack the fields their opcode requires.
    pub fn route(text: &str) -> Result<Option<GatewayEvent>> {
        let frame = serde_json::from_str::<Frame>(text).map_err(GatewayError::Decode)?;
        Self::classify(frame)
    }

    fn classify(frame: Frame) -> Result<Option<GatewayEvent>> {
        match frame.opcode() {
            Some(OpCode::HeartbeatAck) => {
                tracing::debug!("Received heartbeat ack");
                Ok(Some(GatewayEvent::HeartbeatAck))
            }
            Some(OpCode::Upvote) => {
                let upvote = serde_json::from_value::<UpvoteEvent>(frame.data)
                    .map_err(GatewayError::Decode)?;
                tracing::debug!("Received upvote for bot {} from {}", upvote.bot, upvote.user);
                Ok(Some(GatewayEvent::Upvote(upvote)))
            }
            Some(OpCode::PageView) => {
                let view = serde_json::from_value::<PageViewEvent>(frame.data)
                    .map_err(GatewayError::Decode)?;
                tracing::debug!("Received page view for bot {}", view.bot);
                Ok(Some(GatewayEvent::PageView(view)))
            }
            Some(op @ (OpCode::Identify | OpCode::Heartbeat)) => {
                tracing::debug!("Ignoring client-only opcode {:?} from server", op);
                Ok(None)
            }
            None => {
                tracing::trace!("Ignoring unknown opcode {}", frame.op);
                Ok(None)
            }
        }
    }
}
