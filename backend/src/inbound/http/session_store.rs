//! Server-side session records for the session middleware.
//!
//! The cookie carries only an opaque key. Capability flags live here, so
//! logging out deletes the record and any copy of the old cookie stops
//! working. Records vanish on restart, which logs everyone out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use actix_session::storage::{
    LoadError, SaveError, SessionKey, SessionStore, UpdateError, generate_session_key,
};
use actix_web::cookie::time::Duration as CookieDuration;
use tracing::debug;

type SessionState = HashMap<String, String>;

struct StoredSession {
    state: SessionState,
    expires_at: Instant,
}

impl StoredSession {
    fn new(state: SessionState, ttl: &CookieDuration) -> Self {
        Self {
            state,
            expires_at: expiry(ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

fn expiry(ttl: &CookieDuration) -> Instant {
    let ttl = Duration::try_from(*ttl).unwrap_or(Duration::ZERO);
    Instant::now() + ttl
}

/// Session records held in process memory, shared by every worker.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<HashMap<String, StoredSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, StoredSession>> {
        // Each critical section is a single map operation, so a poisoned map
        // is still consistent.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when a live record satisfies `predicate`.
    pub fn any_live(&self, predicate: impl Fn(&SessionState) -> bool) -> bool {
        let now = Instant::now();
        self.records()
            .values()
            .any(|record| record.is_live(now) && predicate(&record.state))
    }

    /// Number of live records.
    pub fn live_count(&self) -> usize {
        let now = Instant::now();
        self.records()
            .values()
            .filter(|record| record.is_live(now))
            .count()
    }

    fn insert_new(&self, record: StoredSession) -> SessionKey {
        let key = generate_session_key();
        let mut records = self.records();
        let now = Instant::now();
        records.retain(|_, stored| stored.is_live(now));
        records.insert(key.as_ref().to_owned(), record);
        key
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let records = self.records();
        Ok(records
            .get(session_key.as_ref())
            .filter(|record| record.is_live(Instant::now()))
            .map(|record| record.state.clone()))
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &CookieDuration,
    ) -> Result<SessionKey, SaveError> {
        Ok(self.insert_new(StoredSession::new(session_state, ttl)))
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &CookieDuration,
    ) -> Result<SessionKey, UpdateError> {
        let record = StoredSession::new(session_state, ttl);
        {
            let mut records = self.records();
            if let Some(stored) = records.get_mut(session_key.as_ref()) {
                *stored = record;
                return Ok(session_key);
            }
        }
        debug!("session record missing on update; issuing a new key");
        Ok(self.insert_new(record))
    }

    async fn update_ttl(
        &self,
        session_key: &SessionKey,
        ttl: &CookieDuration,
    ) -> Result<(), anyhow::Error> {
        if let Some(stored) = self.records().get_mut(session_key.as_ref()) {
            stored.expires_at = expiry(ttl);
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.records().remove(session_key.as_ref());
        Ok(())
    }
}
