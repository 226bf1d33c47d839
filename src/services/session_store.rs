use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::Session;

/// Where sessions live between requests.
///
/// Every write replaces or removes a whole `Session`, so a reader sees either
/// the old session, the new one, or none, never a mix of fields.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &Uuid) -> Option<Session>;
    fn set(&self, id: Uuid, session: Session);
    fn clear(&self, id: &Uuid) -> Option<Session>;
    /// Whether `id` is still held, without counting as activity.
    fn contains(&self, id: &Uuid) -> bool;
    /// Drop sessions that sat idle too long or whose token expired.
    fn sweep(&self, now: DateTime<Utc>) -> Vec<Uuid>;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

pub const DEFAULT_IDLE_MINUTES: i64 = 120;

struct Entry {
    session: Session,
    last_seen: DateTime<Utc>,
}

impl Entry {
    fn is_stale(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_seen > idle_timeout || self.session.is_expired(now)
    }
}

pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        MemorySessionStore::new(Duration::minutes(DEFAULT_IDLE_MINUTES))
    }
}

impl MemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        MemorySessionStore {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn shared(idle_timeout: Duration) -> SharedSessionStore {
        Arc::new(MemorySessionStore::new(idle_timeout))
    }

    fn sweep_locked(&self, sessions: &mut HashMap<Uuid, Entry>, now: DateTime<Utc>) -> Vec<Uuid> {
        let stale: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| entry.is_stale(now, self.idle_timeout))
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            sessions.remove(id);
        }
        stale
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let entry = sessions.get_mut(id)?;
        if now - entry.last_seen > self.idle_timeout {
            sessions.remove(id);
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    fn set(&self, id: Uuid, session: Session) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        self.sweep_locked(&mut sessions, now);
        sessions.insert(
            id,
            Entry {
                session,
                last_seen: now,
            },
        );
    }

    fn clear(&self, id: &Uuid) -> Option<Session> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|entry| entry.session)
    }

    fn contains(&self, id: &Uuid) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn sweep(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        self.sweep_locked(&mut sessions, now)
    }
}
