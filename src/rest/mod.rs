// REST module - Request/response wrappers for the listing API
mod client;
mod models;

pub use client::RestClient;
pub use models::ServerCount;
