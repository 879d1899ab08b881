//! Clock abstraction for deterministic testing.
//!
//! Decouples replay checks and TTL expiry from system time. Production
//! code uses [`SystemClock`]; tests drive [`ManualClock`] forward
//! explicitly instead of sleeping.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Source of wall-clock Unix time.
///
/// # Invariants
///
/// Implementations must never move backwards within one execution
/// context; the TTL store and replay guard both rely on monotone
/// progression of the returned seconds.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current Unix time in whole seconds.
    fn now_unix(&self) -> u64;
}

/// Production clock backed by the system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[allow(clippy::expect_used)]
    fn now_unix(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_secs()
    }
}

/// Manually advanced clock for tests and simulation.
///
/// Clones share the same underlying time, so a pipeline under test and
/// the test itself observe identical virtual time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at `start` Unix seconds.
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self { secs: Arc::new(AtomicU64::new(start)) }
    }

    /// Advance virtual time by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute Unix time. Must not move backwards.
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}
