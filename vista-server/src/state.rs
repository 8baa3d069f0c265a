//! Application State
//!
//! Holds the session store and the inference source shared by all handlers.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use vista_client::VisionClient;
use vista_core::renderer::FragmentSource;
use vista_core::SessionStore;
use vista_types::models::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub sessions: Arc<SessionStore>,
    pub source: Arc<dyn FragmentSource>,
    pub config: ServerConfig,
}

impl AppState {
    /// Build state talking to the configured upstream API.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = VisionClient::new(config.upstream.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self::new_with_components(config, Arc::new(client)))
    }

    /// Create AppState with a pre-built source (tests swap in scripted ones).
    pub fn new_with_components(config: ServerConfig, source: Arc<dyn FragmentSource>) -> Self {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(config.session_ttl_secs)));
        Self { inner: Arc::new(AppStateInner { sessions, source, config }) }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.inner.sessions
    }

    pub fn source(&self) -> Arc<dyn FragmentSource> {
        Arc::clone(&self.inner.source)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }
}
