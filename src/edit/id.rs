//! Unique identifiers for working directories.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates identifiers that do not collide across concurrent processes.
///
/// Each identifier combines the generator's creation time in milliseconds, a
/// random value drawn once at creation, and a per-generator counter:
/// `<millis>-<random>-<counter>`.
#[derive(Debug)]
pub struct IdGenerator {
    started_millis: u128,
    seed: u64,
    counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator seeded from the clock and the thread RNG.
    pub fn new() -> Self {
        let started_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::with_seed(started_millis, rand::random())
    }

    /// Creates a generator with fixed seed values.
    pub fn with_seed(started_millis: u128, seed: u64) -> Self {
        Self {
            started_millis,
            seed,
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}-{}", self.started_millis, self.seed, count)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
