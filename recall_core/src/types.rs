//! Core domain types for the recall scheduling engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Grades and card lifecycle states
//! - The card scheduling record and its field-update delta
//! - Learning-step bookkeeping and its packed interchange encoding
//! - The opaque per-strategy state document

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Grades
// ============================================================================

/// A user's graded response to a card.
///
/// Wire values are 1-4. Anything outside that range is a caller contract
/// violation; `TryFrom<u8>` is provided for callers decoding wire values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// All grades in wire order, for preview computations
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = crate::Error;

    fn try_from(value: u8) -> crate::Result<Self> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(crate::Error::Grade(other)),
        }
    }
}

// ============================================================================
// Lifecycle and queue markers
// ============================================================================

/// Where a card sits in the learning process. Governs which transition
/// table a strategy applies.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

/// Scheduling queue marker. Strategies set this; queue semantics (what is
/// shown when) belong to the external orchestrator.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    #[default]
    New,
    Learning,
    Review,
    Suspended,
    Buried,
}

// ============================================================================
// Learning steps
// ============================================================================

/// Remaining/total learning-step counts for a card working through a
/// (re)learning sequence.
///
/// The interchange format packs this pair into a single integer as
/// `remaining * 1000 + total`. That packed form exists only at the storage
/// boundary (see [`packed_steps`]); scheduling logic works with the explicit
/// pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LearnSteps {
    pub remaining: u32,
    pub total: u32,
}

impl LearnSteps {
    /// Start a fresh sequence of `total` steps
    pub fn start(total: u32) -> Self {
        Self {
            remaining: total,
            total,
        }
    }

    /// Cleared state: no steps in flight (set on graduation)
    pub fn done() -> Self {
        Self::default()
    }

    /// Decode from the packed interchange integer.
    ///
    /// `remaining` is clamped to `total` so the invariant holds even for
    /// records written by buggy or foreign producers.
    pub fn from_packed(packed: i64) -> Self {
        let packed = packed.max(0);
        let total = (packed % 1000) as u32;
        let remaining = ((packed / 1000) as u32).min(total);
        Self { remaining, total }
    }

    /// Encode to the packed interchange integer
    pub fn packed(&self) -> i64 {
        i64::from(self.remaining) * 1000 + i64::from(self.total)
    }
}

/// Serde adapter storing [`LearnSteps`] as the packed interchange integer
pub mod packed_steps {
    use super::LearnSteps;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(steps: &LearnSteps, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(steps.packed())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LearnSteps, D::Error> {
        let packed = i64::deserialize(deserializer)?;
        Ok(LearnSteps::from_packed(packed))
    }
}

// ============================================================================
// Opaque per-strategy state
// ============================================================================

/// Free-form, strategy-owned state document carried on every card.
///
/// Each strategy reads and writes only its own named sub-key (RetentionModel
/// uses `"retention"`, FixedBox uses `"boxes"`) and leaves unknown sibling
/// keys untouched, so multiple strategies can coexist on the same card
/// across algorithm switches.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StrategyState(serde_json::Map<String, serde_json::Value>);

impl StrategyState {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a strategy's sub-document. Missing or malformed entries are
    /// reported as `None`; callers treat that as "uninitialized" and reseed.
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.0.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Malformed strategy state under {:?}: {}. Reseeding.", key, e);
                None
            }
        }
    }

    /// Write a strategy's sub-document, preserving sibling keys
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.0.insert(key.to_string(), v);
            }
            Err(e) => {
                // Only reachable for non-string map keys etc.; strategy
                // state structs are plain data so this never fires.
                tracing::warn!("Failed to encode strategy state under {:?}: {}", key, e);
            }
        }
    }

    /// Parse from a JSON string blob. Empty or malformed input yields an
    /// empty document rather than an error.
    pub fn parse(blob: &str) -> Self {
        if blob.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(blob) {
            Ok(map) => Self(map),
            Err(e) => {
                tracing::warn!("Unparseable strategy state blob: {}. Treating as empty.", e);
                Self::default()
            }
        }
    }

    /// Render to a JSON string blob for callers storing the state as text
    pub fn to_json_string(&self) -> String {
        serde_json::Value::Object(self.0.clone()).to_string()
    }
}

// ============================================================================
// Card record
// ============================================================================

/// The mutable scheduling record for one flashcard.
///
/// `due` is overloaded by `lifecycle`, exactly as in the interchange format:
/// an ordering index for New cards, absolute epoch seconds for
/// Learning/Relearning, and a day index relative to the collection's
/// creation day for Review.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: Uuid,
    #[serde(default)]
    pub lifecycle: Lifecycle,
    #[serde(default)]
    pub queue: Queue,
    #[serde(default)]
    pub due: i64,
    /// Last granted interval in days (0 while in Learning/Relearning)
    #[serde(default)]
    pub interval: i64,
    /// Permille ease multiplier (2500 = 2.50x), Classical strategy only
    #[serde(default)]
    pub ease_factor: i64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub lapse_count: u32,
    #[serde(default, with = "packed_steps")]
    pub steps: LearnSteps,
    #[serde(default, skip_serializing_if = "StrategyState::is_empty")]
    pub strategy_state: StrategyState,
}

impl Card {
    /// Create a New card at the given ordering position
    pub fn new(id: Uuid, position: i64) -> Self {
        Self {
            id,
            lifecycle: Lifecycle::New,
            queue: Queue::New,
            due: position,
            interval: 0,
            ease_factor: 0,
            review_count: 0,
            lapse_count: 0,
            steps: LearnSteps::done(),
            strategy_state: StrategyState::default(),
        }
    }
}

// ============================================================================
// Field updates
// ============================================================================

/// Partial update naming exactly the card fields a strategy changed.
///
/// Strategies never mutate their inputs; the caller applies this delta to
/// its own persisted copy of the card.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardUpdate {
    pub lifecycle: Option<Lifecycle>,
    pub queue: Option<Queue>,
    pub due: Option<i64>,
    pub interval: Option<i64>,
    pub ease_factor: Option<i64>,
    pub review_count: Option<u32>,
    pub lapse_count: Option<u32>,
    pub steps: Option<LearnSteps>,
    pub strategy_state: Option<StrategyState>,
}

impl CardUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this delta to a card. Fields not named are left untouched.
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(lifecycle) = self.lifecycle {
            card.lifecycle = lifecycle;
        }
        if let Some(queue) = self.queue {
            card.queue = queue;
        }
        if let Some(due) = self.due {
            card.due = due;
        }
        if let Some(interval) = self.interval {
            card.interval = interval;
        }
        if let Some(ease_factor) = self.ease_factor {
            card.ease_factor = ease_factor;
        }
        if let Some(review_count) = self.review_count {
            card.review_count = review_count;
        }
        if let Some(lapse_count) = self.lapse_count {
            card.lapse_count = lapse_count;
        }
        if let Some(steps) = self.steps {
            card.steps = steps;
        }
        if let Some(ref strategy_state) = self.strategy_state {
            card.strategy_state = strategy_state.clone();
        }
    }
}
