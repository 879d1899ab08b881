//! Expiring key/value store for deduplication.
//!
//! Keyed on content fingerprints, holding only opaque markers and never
//! message plaintext. Entries expire after a category-dependent TTL and
//! are evicted both lazily (on lookup) and actively (periodic
//! [`TtlStore::purge_expired`] sweeps), so memory stays bounded even for
//! keys that are never looked up again.
//!
//! # Security
//!
//! No persistence of any kind: entries never survive a process restart.
//! That is a data-minimization invariant, not an optimization: do not
//! add a disk- or network-backed implementation that outlives the
//! process working set.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use sealpost_proto::MessageCategory;

use crate::{clock::Clock, config::ConfigError};

/// Upper bound on any configured TTL. Anything past this is treated as a
/// misconfiguration rather than a very patient cache.
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Capability interface over an expiring key/value store.
///
/// A process-local map and an external cache are interchangeable
/// implementations of this contract; Sealpost ships only the in-process
/// one (see module docs).
pub trait TtlStore: Send + Sync + 'static {
    /// Insert or overwrite `key` with the given TTL.
    fn put(&self, key: &str, value: &str, ttl: Duration);

    /// Value for `key` if present and not expired. An expired entry is
    /// removed and reported as absent; no code path reads it as live.
    fn get_if_present(&self, key: &str) -> Option<String>;

    /// Atomic insert-if-absent: the dedup primitive.
    ///
    /// Returns `true` when the key was fresh and is now stored, `false`
    /// when a live entry already existed. Two concurrent calls with the
    /// same key see exactly one `true`.
    fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> bool;

    /// Drop every expired entry; returns how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// True when no live entries exist.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-category TTLs for the dedup store.
///
/// Shorter for OTPs (stale OTPs are worthless and the dedup window can be
/// tight), longer for lower-urgency categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// OTP window (default 5 min).
    pub otp: Duration,
    /// Transaction window (default 10 min).
    pub transaction: Duration,
    /// Bill window (default 15 min).
    pub bill: Duration,
    /// Security-alert window (default 10 min).
    pub security: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            otp: Duration::from_secs(300),
            transaction: Duration::from_secs(600),
            bill: Duration::from_secs(900),
            security: Duration::from_secs(600),
        }
    }
}

impl TtlPolicy {
    /// TTL for a category. Unknown messages use the strict OTP window.
    #[must_use]
    pub fn for_category(&self, category: MessageCategory) -> Duration {
        match category {
            MessageCategory::Otp | MessageCategory::Unknown => self.otp,
            MessageCategory::Transaction => self.transaction,
            MessageCategory::Bill => self.bill,
            MessageCategory::SecurityAlert => self.security,
        }
    }

    /// Reject zero and absurd (> 24 h) TTLs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TtlOutOfBounds`] naming the offending category.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            (MessageCategory::Otp, self.otp),
            (MessageCategory::Transaction, self.transaction),
            (MessageCategory::Bill, self.bill),
            (MessageCategory::SecurityAlert, self.security),
        ];
        for (category, ttl) in entries {
            if ttl.is_zero() || ttl > MAX_TTL {
                return Err(ConfigError::TtlOutOfBounds { category });
            }
        }
        Ok(())
    }
}

/// In-process [`TtlStore`] backed by a mutex-guarded map.
///
/// Clones share the same underlying map (`Arc` inside), which is what
/// makes `put_if_absent` a true atomic across concurrent handlers: every
/// operation runs under one lock.
///
/// # Panics
///
/// Operations panic if the internal mutex is poisoned (a thread panicked
/// while holding the lock); the server treats that as fatal.
#[derive(Clone)]
pub struct MemoryTtlStore<C: Clock> {
    clock: C,
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

struct Entry {
    value: String,
    expires_at: u64,
}

impl<C: Clock> MemoryTtlStore<C> {
    /// Create an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self { clock, inner: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn expiry(&self, ttl: Duration) -> u64 {
        self.clock.now_unix().saturating_add(ttl.as_secs())
    }
}

impl<C: Clock> TtlStore for MemoryTtlStore<C> {
    #[allow(clippy::expect_used)]
    fn put(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at = self.expiry(ttl);
        let mut map = self.inner.lock().expect("Mutex poisoned");
        map.insert(key.to_string(), Entry { value: value.to_string(), expires_at });
    }

    #[allow(clippy::expect_used)]
    fn get_if_present(&self, key: &str) -> Option<String> {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("Mutex poisoned");
        match map.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                // Lazy eviction on lookup.
                map.remove(key);
                None
            },
            None => None,
        }
    }

    #[allow(clippy::expect_used)]
    fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let now = self.clock.now_unix();
        let expires_at = self.expiry(ttl);
        let mut map = self.inner.lock().expect("Mutex poisoned");

        if let Some(entry) = map.get(key) {
            if now < entry.expires_at {
                return false;
            }
        }
        map.insert(key.to_string(), Entry { value: value.to_string(), expires_at });
        true
    }

    #[allow(clippy::expect_used)]
    fn purge_expired(&self) -> usize {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("Mutex poisoned");
        let before = map.len();
        map.retain(|_, entry| now < entry.expires_at);
        before - map.len()
    }

    #[allow(clippy::expect_used)]
    fn len(&self) -> usize {
        let now = self.clock.now_unix();
        let map = self.inner.lock().expect("Mutex poisoned");
        map.values().filter(|entry| now < entry.expires_at).count()
    }
}
