//! Token-keyed in-memory document storage with TTL
//!
//! Uploaded and signed PDFs live behind opaque tokens for a fixed window,
//! then expire. The store is the only shared mutable state in the
//! service; all access goes through its mutex, which also serializes
//! per-token updates. The clock is injected so tests control time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Time source for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed implementation used by the server.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct StoredDocument {
    bytes: Vec<u8>,
    created: Instant,
}

/// In-memory PDF store keyed by opaque tokens.
pub struct TokenStore<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<String, StoredDocument>>,
}

impl TokenStore<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> TokenStore<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a document under a fresh token.
    pub fn put(&self, bytes: Vec<u8>) -> String {
        let token = Uuid::new_v4().to_string();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            token.clone(),
            StoredDocument {
                bytes,
                created: self.clock.now(),
            },
        );
        token
    }

    /// Fetch a copy of the stored bytes. Expired entries read as absent.
    pub fn get(&self, token: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(token)?;
        if now.duration_since(entry.created) > self.ttl {
            return None;
        }
        Some(entry.bytes.clone())
    }

    /// Replace the content behind an existing live token, refreshing its
    /// expiry window. Returns false when the token is absent or expired.
    pub fn replace(&self, token: &str, bytes: Vec<u8>) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(token) {
            Some(entry) if now.duration_since(entry.created) <= self.ttl => {
                entry.bytes = bytes;
                entry.created = now;
                true
            }
            _ => false,
        }
    }

    /// Drop all expired entries, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.created) <= self.ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Manually advanced clock for expiry tests.
    struct TestClock {
        now: Mutex<Instant>,
    }

    impl TestClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for &TestClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn test_get_after_put_returns_bytes() {
        let store = TokenStore::new(Duration::from_secs(3600));
        let token = store.put(b"%PDF-1.7 data".to_vec());
        assert_eq!(store.get(&token), Some(b"%PDF-1.7 data".to_vec()));
    }

    #[test]
    fn test_unknown_token_is_absent() {
        let store = TokenStore::new(Duration::from_secs(3600));
        assert_eq!(store.get("no-such-token"), None);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let store = TokenStore::new(Duration::from_secs(3600));
        let a = store.put(vec![1]);
        let b = store.put(vec![2]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let clock = TestClock::new();
        let store = TokenStore::with_clock(Duration::from_secs(60), &clock);
        let token = store.put(vec![1, 2, 3]);

        clock.advance(Duration::from_secs(61));
        assert_eq!(store.get(&token), None);
    }

    #[test]
    fn test_entry_survives_until_ttl() {
        let clock = TestClock::new();
        let store = TokenStore::with_clock(Duration::from_secs(60), &clock);
        let token = store.put(vec![7]);

        clock.advance(Duration::from_secs(60));
        assert_eq!(store.get(&token), Some(vec![7]));
    }

    #[test]
    fn test_replace_refreshes_expiry() {
        let clock = TestClock::new();
        let store = TokenStore::with_clock(Duration::from_secs(60), &clock);
        let token = store.put(vec![1]);

        clock.advance(Duration::from_secs(50));
        assert!(store.replace(&token, vec![2]));

        // 50s after the replace, 100s after the put: still alive.
        clock.advance(Duration::from_secs(50));
        assert_eq!(store.get(&token), Some(vec![2]));
    }

    #[test]
    fn test_replace_expired_token_fails() {
        let clock = TestClock::new();
        let store = TokenStore::with_clock(Duration::from_secs(60), &clock);
        let token = store.put(vec![1]);

        clock.advance(Duration::from_secs(120));
        assert!(!store.replace(&token, vec![2]));
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let clock = TestClock::new();
        let store = TokenStore::with_clock(Duration::from_secs(60), &clock);
        let old = store.put(vec![1]);

        clock.advance(Duration::from_secs(45));
        let fresh = store.put(vec![2]);

        clock.advance(Duration::from_secs(30));
        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.get(&old), None);
        assert_eq!(store.get(&fresh), Some(vec![2]));
    }
}
