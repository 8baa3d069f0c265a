//! # Vista Types
//!
//! Core types, models, and error definitions for Vista.
//!
//! - **`error`** - Configuration errors
//! - **`models`** - Credential and process configuration models
//! - **`protocol`** - Chat completions request/stream payloads
//!
//! ## Architecture Role
//!
//! `vista-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!                vista-types (this crate)
//!                        │
//!              ┌─────────┴─────────┐
//!              ▼                   ▼
//!        vista-client ──────► vista-core
//!                                  │
//!                                  ▼
//!                            vista-server
//! ```

pub mod error;
pub mod models;
pub mod protocol;

pub use error::ConfigError;
pub use models::{Credential, ServerConfig, UpstreamConfig};
pub use protocol::{ChatCompletionRequest, StreamChunk};
