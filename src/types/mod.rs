pub mod constants;
pub mod error;
pub mod frame;

pub use constants::*;
pub use error::{GatewayError, Result};
pub use frame::{Frame, OpCode};
