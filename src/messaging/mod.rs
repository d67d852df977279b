// Messaging module - Event types, dispatch and frame routing
pub mod event;
pub mod router;
pub mod sink;

pub use event::{CloseInfo, EventKind, GatewayEvent, PageViewEvent, UpvoteEvent};
pub use router::FrameRouter;
pub use sink::EventSink;
