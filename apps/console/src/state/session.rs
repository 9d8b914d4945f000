//! # Session State
//!
//! Keeps the operator signed in between console invocations.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  startup ── SessionStore::load ──► AuthClient::restore                  │
//! │                                                                         │
//! │  AuthClient::changes() ──► persist_changes                              │
//! │       SignedIn / Refreshed ──► session.json written                     │
//! │       SignedOut            ──► session.json removed                     │
//! │                                                                         │
//! │  The stream ends when the last Backend handle is dropped, after the    │
//! │  command finishes.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use depot_store::{Session, SessionEvent};

/// Session file name inside the platform data directory.
pub const SESSION_FILE: &str = "session.json";

/// The saved session on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    /// `<data_dir>/session.json`
    pub fn default_path() -> Option<PathBuf> {
        super::ConsoleConfig::project_dirs().map(|dirs| dirs.data_dir().join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved session. A missing file means signed out; an unreadable
    /// one is logged and treated the same way.
    pub async fn load(&self) -> io::Result<Option<Session>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session).map_err(io::Error::other)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = ?self.path, user_id = %session.user_id, "Session saved");
        Ok(())
    }

    pub async fn clear(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = ?self.path, "Session removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Mirrors session transitions to disk until the stream ends.
pub async fn persist_changes<S>(store: SessionStore, mut changes: S)
where
    S: Stream<Item = SessionEvent> + Unpin,
{
    while let Some(event) = changes.next().await {
        let result = match &event {
            SessionEvent::SignedIn(session) | SessionEvent::Refreshed(session) => {
                store.save(session).await
            }
            SessionEvent::SignedOut => store.clear().await,
            SessionEvent::Initial => Ok(()),
        };
        if let Err(e) = result {
            warn!(path = ?store.path(), error = %e, "Failed to persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + Duration::hours(1),
            user_id: "u-1".into(),
            email: Some("ana@depot.com".into()),
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join(SESSION_FILE));

        assert_eq!(store.load().await.unwrap(), None);

        let saved = session();
        store.save(&saved).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(saved));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert_eq!(SessionStore::new(path).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persist_changes_follows_events() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join(SESSION_FILE));

        let signed_in = tokio_stream::iter(vec![SessionEvent::SignedIn(session())]);
        persist_changes(store.clone(), signed_in).await;
        assert!(store.load().await.unwrap().is_some());

        let signed_out = tokio_stream::iter(vec![SessionEvent::SignedOut]);
        persist_changes(store.clone(), signed_out).await;
        assert_eq!(store.load().await.unwrap(), None);
    }
}
