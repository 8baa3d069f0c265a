//! In-memory session store keyed by an opaque cookie id.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::{FormUpdate, ImageKind, SessionState, UploadedImage, Warning};
use crate::analysis::AnalysisInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

struct SessionEntry {
    state: SessionState,
    created_at: DateTime<Utc>,
    last_seen: Instant,
    in_flight: bool,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            state: SessionState::default(),
            created_at: Utc::now(),
            last_seen: Instant::now(),
            in_flight: false,
        }
    }
}

/// What the page may show about a session. Never includes the credential.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub credential_present: bool,
    pub has_image: bool,
    pub filename: Option<String>,
    pub image_kind: Option<ImageKind>,
    pub image_bytes: usize,
    pub show_details: bool,
    pub details: String,
    pub analysis_running: bool,
}

/// Result of applying one form submission.
pub struct Submission {
    pub warnings: Vec<Warning>,
    /// Set only when an analysis was requested and may start now.
    pub ready: Option<(AnalysisInput, InFlightGuard)>,
}

/// Marks a session as busy until dropped.
pub struct InFlightGuard {
    store: Arc<SessionStore>,
    id: SessionId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(mut entry) = self.store.sessions.get_mut(&self.id) {
            entry.in_flight = false;
            entry.last_seen = Instant::now();
        }
    }
}

pub struct SessionStore {
    sessions: DashMap<SessionId, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: DashMap::new(), ttl }
    }

    /// Look up the session named by a cookie value, creating a fresh one if
    /// the value is missing, malformed, or expired. Returns `(id, created)`.
    pub fn resolve(&self, cookie: Option<&str>) -> (SessionId, bool) {
        if let Some(id) = cookie.and_then(|c| c.parse::<SessionId>().ok()) {
            if let Some(mut entry) = self.sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, false);
            }
        }
        let id = SessionId::generate();
        self.sessions.insert(id, SessionEntry::new());
        debug!("Session {} started", id);
        (id, true)
    }

    /// Apply a form submission and evaluate it.
    ///
    /// With `requested` set, the button-press flag is raised for the
    /// evaluation only. A ready analysis also claims the session's in-flight
    /// slot; if another analysis holds it, `AnalysisInProgress` is returned
    /// instead.
    pub fn submit(
        self: &Arc<Self>,
        id: SessionId,
        update: FormUpdate,
        requested: bool,
    ) -> Submission {
        let mut entry = self.sessions.entry(id).or_insert_with(SessionEntry::new);
        entry.last_seen = Instant::now();
        entry.state.apply(update);

        entry.state.analysis_requested = requested;
        let evaluation = entry.state.evaluate();
        entry.state.analysis_requested = false;

        let mut warnings = evaluation.warnings;
        let ready = match evaluation.ready {
            Some(_) if entry.in_flight => {
                warnings.push(Warning::AnalysisInProgress);
                None
            },
            Some(input) => {
                entry.in_flight = true;
                Some(input)
            },
            None => None,
        };
        drop(entry);

        Submission {
            warnings,
            ready: ready.map(|input| (input, InFlightGuard { store: Arc::clone(self), id })),
        }
    }

    pub fn summary(&self, id: SessionId) -> Option<SessionSummary> {
        self.sessions.get(&id).map(|entry| {
            let state = &entry.state;
            SessionSummary {
                id: id.to_string(),
                created_at: entry.created_at,
                credential_present: state.credential.is_present(),
                has_image: state.image.is_some(),
                filename: state.image.as_ref().map(|i| i.filename().to_string()),
                image_kind: state.image.as_ref().map(UploadedImage::kind),
                image_bytes: state.image.as_ref().map_or(0, |i| i.bytes().len()),
                show_details: state.show_details,
                details: state.details.clone(),
                analysis_running: entry.in_flight,
            }
        })
    }

    pub fn image(&self, id: SessionId) -> Option<UploadedImage> {
        self.sessions.get(&id).and_then(|entry| entry.state.image.clone())
    }

    /// End a session, dropping everything it held. Returns whether it existed.
    pub fn end(&self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            debug!("Session {} ended", id);
        }
        removed
    }

    /// Drop sessions idle for longer than the TTL. Busy sessions are kept.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, entry| entry.in_flight || entry.last_seen.elapsed() < ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawn the background sweeper.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = store.sweep_expired();
                if removed > 0 {
                    info!("🧹 Expired {} idle sessions ({} active)", removed, store.len());
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ready_update() -> FormUpdate {
        FormUpdate {
            credential: Some("sk-test".to_string()),
            image: Some(UploadedImage::new("a.jpg", vec![1, 2, 3]).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_reuses_known_and_replaces_unknown() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, created) = store.resolve(None);
        assert!(created);

        let cookie = id.to_string();
        assert_eq!(store.resolve(Some(&cookie)), (id, false));

        let (other, created) = store.resolve(Some("garbage"));
        assert!(created);
        assert_ne!(other, id);

        let (fresh, created) = store.resolve(Some(&SessionId::generate().to_string()));
        assert!(created);
        assert_ne!(fresh, id);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_submit_without_request_never_starts() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let (id, _) = store.resolve(None);

        let submission = store.submit(id, ready_update(), false);
        assert!(submission.ready.is_none());
        assert!(submission.warnings.is_empty());
        assert!(store.summary(id).unwrap().has_image);
    }

    #[test]
    fn test_single_in_flight_analysis_per_session() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let (id, _) = store.resolve(None);

        let first = store.submit(id, ready_update(), true);
        assert!(first.ready.is_some());
        assert!(store.summary(id).unwrap().analysis_running);

        let second = store.submit(id, FormUpdate::default(), true);
        assert!(second.ready.is_none());
        assert_eq!(second.warnings, vec![Warning::AnalysisInProgress]);

        drop(first);
        assert!(!store.summary(id).unwrap().analysis_running);

        let third = store.submit(id, FormUpdate::default(), true);
        assert!(third.ready.is_some());
    }

    #[test]
    fn test_summary_hides_credential() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let (id, _) = store.resolve(None);
        let _ = store.submit(id, ready_update(), false);

        let json = serde_json::to_string(&store.summary(id).unwrap()).unwrap();
        assert!(!json.contains("sk-test"));
        assert!(json.contains("\"credential_present\":true"));
    }

    #[test]
    fn test_end_and_sweep() {
        let store = Arc::new(SessionStore::new(Duration::ZERO));
        let (idle, _) = store.resolve(None);
        let (busy, _) = store.resolve(None);
        let running = store.submit(busy, ready_update(), true);

        assert_eq!(store.sweep_expired(), 1);
        assert!(store.summary(idle).is_none());
        assert!(store.summary(busy).is_some());

        drop(running);
        assert!(store.end(busy));
        assert!(!store.end(busy));
        assert!(store.is_empty());
    }
}
