//! Session Store
//!
//! In-memory per-client session state, addressed by the id in the
//! session cookie. Entries idle longer than the TTL count as gone.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque session identifier carried by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
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
        Uuid::parse_str(s).map(Self)
    }
}

/// Customer a session is logged in as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub customer_id: i64,
    pub customer_name: String,
}

/// State of one client session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Set once the customer has logged in
    pub identity: Option<Identity>,
    /// Failed PIN entries in the current login sequence
    pub pin_attempts: u8,
    /// Balance last shown to the customer
    pub cached_balance: Option<i64>,
}

impl SessionData {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: DateTime<Utc>,
}

/// Shared session map
#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }

    /// Current state of a session. Reading counts as activity: a live
    /// session's idle timer restarts. Unknown ids read as fresh and create no
    /// entry; expired ones are dropped.
    pub async fn touch(&self, id: SessionId) -> SessionData {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let expired = match entries.get_mut(&id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                return entry.data.clone();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(&id);
        }

        SessionData::default()
    }

    /// Mutate a session under the write lock and refresh its idle timer.
    pub async fn update<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let entry = entries.entry(id).or_insert_with(|| SessionEntry {
            data: SessionData::default(),
            last_seen: now,
        });
        if self.is_expired(entry, now) {
            tracing::debug!(session_id = %id, "Session expired");
            entry.data = SessionData::default();
        }
        entry.last_seen = now;

        f(&mut entry.data)
    }

    /// Drop a session entirely
    pub async fn destroy(&self, id: SessionId) {
        self.entries.write().await.remove(&id);
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
