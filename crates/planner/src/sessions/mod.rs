//! Per-session registry of schedule cursors.
//!
//! Every planning session owns one cursor, stored under an opaque
//! [`SessionKey`]. A session is advanced by one request at a time; a second
//! concurrent `next` on the same session is refused rather than queued.

mod error;

pub use error::SessionError;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::planner::{CursorStep, ScheduleCursor};

const KEY_HEX_LEN: usize = 32;

/// An opaque identifier handed to clients for one planning session.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a fresh key by hashing random bytes.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);

        let mut hasher = Sha256::new();
        hasher.update(seed);
        let result = hasher.finalize();
        // Use first 16 bytes as hex string
        Self(hex::encode(&result[..16]))
    }

    /// Wraps a key received from a client. Returns `None` unless the input is
    /// a well-formed key (32 hex characters).
    pub fn from_client(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == KEY_HEX_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show first 8 chars in logs
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "{}...", prefix)
    }
}

/// A cursor plus bookkeeping for one session.
pub struct SessionEntry {
    cursor: ScheduleCursor,
    created_at: DateTime<Utc>,
    last_used: Instant,
}

impl SessionEntry {
    fn new(cursor: ScheduleCursor) -> Self {
        Self {
            cursor,
            created_at: Utc::now(),
            last_used: Instant::now(),
        }
    }
}

/// A step handed back to the caller with the position it was served at.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStep {
    /// 1-based position of this candidate; 0 when nothing was served
    pub index: u64,
    pub step: CursorStep,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe registry of planning sessions.
///
/// Uses DashMap for concurrent access to different sessions; each session has
/// its own lock.
pub struct SessionStore {
    sessions: DashMap<SessionKey, Arc<Mutex<SessionEntry>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            max_sessions,
        }
    }

    /// Registers a cursor under a new key.
    ///
    /// Expired sessions are evicted first; if the store is still full the
    /// cursor is refused.
    pub fn create(&self, cursor: ScheduleCursor) -> Result<SessionKey, SessionError> {
        self.cleanup_expired();

        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::TooManySessions {
                limit: self.max_sessions,
            });
        }

        let key = SessionKey::generate();
        self.sessions
            .insert(key.clone(), Arc::new(Mutex::new(SessionEntry::new(cursor))));

        info!("Created planning session {}", key);
        Ok(key)
    }

    /// Advances the session's cursor by one candidate.
    ///
    /// Fails with `OperationInProgress` if another call is already advancing
    /// the same session.
    pub fn advance(&self, key: &SessionKey) -> Result<SessionStep, SessionError> {
        let entry = self
            .sessions
            .get(key)
            .map(|e| Arc::clone(e.value()))
            .ok_or(SessionError::NotFound)?;

        let mut guard = entry
            .try_lock()
            .map_err(|_| SessionError::OperationInProgress)?;

        if guard.last_used.elapsed() >= self.ttl {
            drop(guard);
            self.sessions.remove(key);
            debug!("Session {} expired", key);
            return Err(SessionError::Expired);
        }

        guard.last_used = Instant::now();
        let step = guard.cursor.next();
        let index = match step {
            CursorStep::Candidate(_) => guard.cursor.served(),
            CursorStep::Exhausted => 0,
        };

        Ok(SessionStep {
            index,
            step,
            created_at: guard.created_at,
        })
    }

    /// Drops a session. Returns false if it did not exist.
    pub fn remove(&self, key: &SessionKey) -> bool {
        let removed = self.sessions.remove(key).is_some();
        if removed {
            info!("Closed planning session {}", key);
        }
        removed
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Removes sessions idle past the TTL. Sessions currently being advanced
    /// are kept.
    pub fn cleanup_expired(&self) {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| match entry.try_lock() {
            Ok(guard) => guard.last_used.elapsed() < self.ttl,
            Err(_) => true,
        });

        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!("Evicted {} expired sessions", evicted);
        }
    }

    pub fn stats(&self) -> SessionStats {
        let mut total = 0;
        let mut expired = 0;
        let mut busy = 0;

        for entry in self.sessions.iter() {
            total += 1;
            match entry.value().try_lock() {
                Ok(guard) => {
                    if guard.last_used.elapsed() >= self.ttl {
                        expired += 1;
                    }
                }
                Err(_) => busy += 1,
            }
        }

        SessionStats {
            total_sessions: total,
            expired_sessions: expired,
            busy_sessions: busy,
            max_sessions: self.max_sessions,
        }
    }
}

/// Session statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub expired_sessions: usize,
    pub busy_sessions: usize,
    pub max_sessions: usize,
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{CatalogBuilder, Meeting, RequestedCourse, SectionKind, SectionRow};

    fn cursor() -> ScheduleCursor {
        let rows = ["A", "B"].into_iter().map(|id| SectionRow {
            course: "INFO200".to_string(),
            kind: SectionKind::Lecture,
            identifier: id.to_string(),
            lecture: None,
            meeting: Meeting {
                days: "TTh".to_string(),
                time: if id == "A" { "1030-1120" } else { "130-220" }.to_string(),
                building: "MGH".to_string(),
                room: "389".to_string(),
                seats: String::new(),
            },
        });
        let catalog = CatalogBuilder::from_rows(rows).unwrap();
        ScheduleCursor::start(&catalog, vec![RequestedCourse::any("INFO200")]).unwrap()
    }

    #[test]
    fn test_session_keys_are_unique() {
        let a = SessionKey::generate();
        let b = SessionKey::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert_eq!(SessionKey::from_client(&a.as_str().to_uppercase()), Some(a.clone()));
    }

    #[test]
    fn test_malformed_client_keys_are_rejected() {
        assert_eq!(SessionKey::from_client(""), None);
        assert_eq!(SessionKey::from_client("aéééé"), None);
        assert_eq!(SessionKey::from_client(&"g".repeat(32)), None);
        assert_eq!(SessionKey::from_client(&"a".repeat(33)), None);
        assert!(SessionKey::from_client(&format!(" {} ", "0f".repeat(16))).is_some());
    }

    #[test]
    fn test_display_never_splits_a_character() {
        let key = SessionKey("aéééééééééé".to_string());
        assert_eq!(key.to_string(), "aééééééé...");
    }

    #[test]
    fn test_advance_until_exhausted() {
        let store = SessionStore::new(Duration::from_secs(60), 4);
        let key = store.create(cursor()).unwrap();

        assert_eq!(store.advance(&key).unwrap().index, 1);
        assert_eq!(store.advance(&key).unwrap().index, 2);
        let last = store.advance(&key).unwrap();
        assert!(last.step.is_exhausted());
        assert_eq!(last.index, 0);

        assert!(store.remove(&key));
        assert!(matches!(store.advance(&key), Err(SessionError::NotFound)));
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::new(Duration::from_secs(60), 4);
        let first = store.create(cursor()).unwrap();
        let second = store.create(cursor()).unwrap();

        store.advance(&first).unwrap();
        store.advance(&first).unwrap();
        assert_eq!(store.advance(&second).unwrap().index, 1);
    }

    #[test]
    fn test_capacity_limit() {
        let store = SessionStore::new(Duration::from_secs(60), 1);
        store.create(cursor()).unwrap();
        assert!(matches!(
            store.create(cursor()),
            Err(SessionError::TooManySessions { limit: 1 })
        ));
    }

    #[test]
    fn test_expired_sessions_are_evicted() {
        let store = SessionStore::new(Duration::ZERO, 1);
        let key = store.create(cursor()).unwrap();
        assert!(matches!(store.advance(&key), Err(SessionError::Expired)));
        assert!(!store.contains(&key));

        // a full store of expired sessions still accepts new ones
        store.create(cursor()).unwrap();
        store.create(cursor()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_advance_is_refused() {
        let store = SessionStore::new(Duration::from_secs(60), 4);
        let key = store.create(cursor()).unwrap();

        let entry = store.sessions.get(&key).map(|e| Arc::clone(e.value())).unwrap();
        let _held = entry.lock().await;

        assert!(matches!(
            store.advance(&key),
            Err(SessionError::OperationInProgress)
        ));
        assert_eq!(store.stats().busy_sessions, 1);
    }
}
