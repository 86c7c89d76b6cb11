//! Clock and randomness provider for scheduling calls.
//!
//! Strategies are pure given a context: the only non-determinism is the
//! random source used for interval fuzz, so callers needing reproducible
//! output inject a seeded context.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Runtime context for a scheduling call: current time, the collection's
/// creation time (origin of the Review day index), and a random source.
#[derive(Clone, Debug)]
pub struct ReviewContext {
    now: DateTime<Utc>,
    collection_created: DateTime<Utc>,
    rng: StdRng,
}

impl ReviewContext {
    /// Wall-clock context with an entropy-seeded random source
    pub fn new(collection_created: DateTime<Utc>) -> Self {
        Self::at(Utc::now(), collection_created)
    }

    /// Context pinned to a specific instant, entropy-seeded random source
    pub fn at(now: DateTime<Utc>, collection_created: DateTime<Utc>) -> Self {
        Self {
            now,
            collection_created,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fully deterministic context for reproducible scheduling
    pub fn with_seed(now: DateTime<Utc>, collection_created: DateTime<Utc>, seed: u64) -> Self {
        Self {
            now,
            collection_created,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current time as epoch seconds
    pub fn now_secs(&self) -> i64 {
        self.now.timestamp()
    }

    /// Day index of "today" relative to the collection's creation day
    pub fn today(&self) -> i64 {
        (self.now - self.collection_created).num_days().max(0)
    }

    /// Absolute epoch seconds for "n minutes from now"
    pub fn in_minutes(&self, minutes: i64) -> i64 {
        self.now_secs() + minutes * 60
    }

    /// Uniform sample in [0, 1)
    pub fn rand(&mut self) -> f64 {
        self.rng.gen()
    }
}
