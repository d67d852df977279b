//! # discordbots.group for Rust
//!
//! An unofficial Rust client for the discordbots.group vote gateway and REST API.
//!
//! ## Example
//!
//! ```no_run
//! use discordbots_group_rs::{GatewayClient, GatewayOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let builder = GatewayClient::builder(GatewayOptions::new(["your-bot-token"]))?;
//!     builder.events().on_upvote(|vote| {
//!         println!("{} upvoted {}", vote.user, vote.bot);
//!     });
//!
//!     let client = builder.build();
//!     tokio::signal::ctrl_c().await?;
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod rest;
pub mod types;
pub mod websocket;

pub use client::{ChannelState, GatewayClient, GatewayClientBuilder, GatewayOptions};
pub use messaging::{CloseInfo, EventKind, EventSink, GatewayEvent, PageViewEvent, UpvoteEvent};
pub use rest::{RestClient, ServerCount};
pub use types::{Frame, GatewayError, OpCode, Result};
pub use websocket::{Transport, TransportEvent, TransportFactory, TransportHandle};
