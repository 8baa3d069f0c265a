//! Domain models shared between the client, core, and server crates.

mod config;
mod credential;

pub use config::{ServerConfig, UpstreamConfig, DEFAULT_API_BASE, DEFAULT_PORT};
pub use credential::Credential;
