// Module declarations
mod builder;
mod config;
mod connection;
mod gateway;
mod state;

// Public API exports
pub use builder::GatewayClientBuilder;
pub use config::GatewayOptions;
pub use gateway::GatewayClient;
pub use state::ChannelState;
