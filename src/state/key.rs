//! Per-session key material.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rand::RngCore;
use zeroize::Zeroize;

use super::session::SessionId;

/// 256-bit symmetric key owned by one session.
///
/// The bytes are wiped on drop and never exposed via `Debug`.
pub struct SessionKey([u8; 32]);

impl SessionKey {
    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionKey(••••••••)")
    }
}

/// Default cap on sessions holding a key.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
/// Default idle time after which a session's key is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct StoredKey {
    key: Arc<SessionKey>,
    /// Milliseconds since the store's epoch.
    last_used: AtomicU64,
}

/// Session-scoped key storage.
///
/// Keys are created on first use and read-only afterwards. Creation happens
/// under the write lock so that concurrent first requests of a new session
/// agree on a single key.
///
/// The store is bounded. Keys idle for longer than the idle timeout are
/// treated as gone, and when a new session would exceed `max_sessions` the
/// least recently used key is evicted. Tokens sealed under a dropped key no
/// longer validate.
pub struct SessionKeyStore {
    keys: RwLock<HashMap<SessionId, StoredKey>>,
    max_sessions: usize,
    idle_timeout: Duration,
    epoch: Instant,
}

impl Default for SessionKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeyStore")
            .field("sessions", &self.len())
            .field("max_sessions", &self.max_sessions)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl SessionKeyStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TIMEOUT)
    }

    /// Store holding at most `max_sessions` keys (at least one), each
    /// dropped after `idle_timeout` without use.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
            epoch: Instant::now(),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Key for `session`, creating it if the session has none yet.
    pub fn key_for(&self, session: &SessionId) -> Arc<SessionKey> {
        let now = self.now_millis();
        if let Some(key) = self.live_key(session, now) {
            return key;
        }

        let mut keys = self.keys.write();
        if let Some(stored) = keys.get(session) {
            if !self.is_idle(stored, now) {
                stored.last_used.store(now, Ordering::Relaxed);
                return stored.key.clone();
            }
        }
        keys.remove(session);
        self.make_room(&mut keys, now);

        tracing::debug!(session = %session, "Created view state key for session");
        let key = Arc::new(SessionKey::generate());
        keys.insert(
            session.clone(),
            StoredKey {
                key: key.clone(),
                last_used: AtomicU64::new(now),
            },
        );
        key
    }

    /// Key for `session` if one was created and has not expired.
    pub fn existing_key(&self, session: &SessionId) -> Option<Arc<SessionKey>> {
        self.live_key(session, self.now_millis())
    }

    /// Drop the key of an ended session. Tokens it sealed become unreadable.
    pub fn invalidate(&self, session: &SessionId) -> bool {
        self.keys.write().remove(session).is_some()
    }

    /// Drop every idle key. Returns how many were removed.
    pub fn purge_idle(&self) -> usize {
        let now = self.now_millis();
        let mut keys = self.keys.write();
        let before = keys.len();
        keys.retain(|_, stored| !self.is_idle(stored, now));
        before - keys.len()
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    fn live_key(&self, session: &SessionId, now: u64) -> Option<Arc<SessionKey>> {
        let keys = self.keys.read();
        let stored = keys.get(session)?;
        if self.is_idle(stored, now) {
            return None;
        }
        stored.last_used.store(now, Ordering::Relaxed);
        Some(stored.key.clone())
    }

    /// Called with the write lock held, before inserting a new key.
    fn make_room(&self, keys: &mut HashMap<SessionId, StoredKey>, now: u64) {
        if keys.len() < self.max_sessions {
            return;
        }
        keys.retain(|_, stored| !self.is_idle(stored, now));
        while keys.len() >= self.max_sessions {
            let Some(oldest) = keys
                .iter()
                .min_by_key(|(_, stored)| stored.last_used.load(Ordering::Relaxed))
                .map(|(session, _)| session.clone())
            else {
                break;
            };
            keys.remove(&oldest);
            tracing::debug!(session = %oldest, "Evicted least recently used session key");
        }
    }

    fn is_idle(&self, stored: &StoredKey, now: u64) -> bool {
        let last_used = stored.last_used.load(Ordering::Relaxed);
        Duration::from_millis(now.saturating_sub(last_used)) > self.idle_timeout
    }

    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
