//! Typed error definitions shared across Vista crates.

mod config;

pub use config::ConfigError;
