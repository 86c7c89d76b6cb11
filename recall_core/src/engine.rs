//! Strategy selection and dispatch.
//!
//! The three scheduling strategies form a closed set, so dispatch is a sum
//! type rather than open-ended dynamic dispatch. A configuration's declared
//! strategy name maps to a variant here; unknown or absent names resolve to
//! the Classical strategy, which is documented policy rather than an error.

use crate::config::DeckConfig;
use crate::{boxes, classical, retention};
use crate::{Card, CardUpdate, Grade, ReviewContext};

/// The fixed set of scheduling strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Classical,
    RetentionModel,
    FixedBox,
}

impl Strategy {
    /// Resolve a declared strategy name.
    ///
    /// `"auto-tuned"` is a policy label for callers and resolves to the
    /// retention model; it carries no distinct algorithm.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "classical" | "" => Strategy::Classical,
            "retention" | "auto-tuned" => Strategy::RetentionModel,
            "boxes" | "fixed-box" => Strategy::FixedBox,
            other => {
                tracing::debug!("Unknown strategy name {:?}, using classical", other);
                Strategy::Classical
            }
        }
    }

    /// Strategy declared by a deck configuration
    pub fn for_config(config: &DeckConfig) -> Self {
        Self::from_name(&config.strategy)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Classical => "classical",
            Strategy::RetentionModel => "retention",
            Strategy::FixedBox => "boxes",
        }
    }

    /// Compute the field updates for a graded answer.
    ///
    /// Pure given the context: no I/O, inputs are never mutated, and a
    /// seeded context makes the result fully deterministic.
    pub fn schedule_answer(
        &self,
        card: &Card,
        grade: Grade,
        config: &DeckConfig,
        ctx: &mut ReviewContext,
    ) -> CardUpdate {
        match self {
            Strategy::Classical => classical::schedule_answer(card, grade, config, ctx),
            Strategy::RetentionModel => retention::schedule_answer(card, grade, config, ctx),
            Strategy::FixedBox => boxes::schedule_answer(card, grade, config, ctx),
        }
    }

    /// Seed strategy-owned state the first time a New card is introduced.
    /// Only the retention model has state worth seeding eagerly; the others
    /// reseed lazily on first answer.
    pub fn initialize_new(
        &self,
        card: &Card,
        config: &DeckConfig,
        ctx: &mut ReviewContext,
    ) -> CardUpdate {
        match self {
            Strategy::RetentionModel => retention::initialize_new(card, config, ctx),
            Strategy::Classical | Strategy::FixedBox => CardUpdate::default(),
        }
    }
}

/// Schedule a graded answer under the deck's declared strategy
pub fn schedule_answer(
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) -> CardUpdate {
    Strategy::for_config(config).schedule_answer(card, grade, config, ctx)
}

/// Seed strategy state for a newly introduced card
pub fn initialize_new(card: &Card, config: &DeckConfig, ctx: &mut ReviewContext) -> CardUpdate {
    Strategy::for_config(config).initialize_new(card, config, ctx)
}

/// Per-grade next interval in days (0 for sub-day delays), for showing the
/// user what each answer would give. The context is forked per grade so the
/// preview leaves the caller's random source untouched.
pub fn preview_intervals(card: &Card, config: &DeckConfig, ctx: &ReviewContext) -> [i64; 4] {
    let strategy = Strategy::for_config(config);
    let mut intervals = [0_i64; 4];
    for (slot, grade) in intervals.iter_mut().zip(Grade::ALL) {
        let mut fork = ctx.clone();
        let update = strategy.schedule_answer(card, grade, config, &mut fork);
        *slot = update.interval.unwrap_or(card.interval);
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lifecycle, Queue};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn ctx_with_seed(seed: u64) -> ReviewContext {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ReviewContext::with_seed(now, created, seed)
    }

    fn review_card() -> Card {
        let mut card = Card::new(Uuid::new_v4(), 0);
        card.lifecycle = Lifecycle::Review;
        card.queue = Queue::Review;
        card.interval = 10;
        card.ease_factor = 2500;
        card
    }

    #[test]
    fn test_selector_known_names() {
        assert_eq!(Strategy::from_name("classical"), Strategy::Classical);
        assert_eq!(Strategy::from_name("retention"), Strategy::RetentionModel);
        assert_eq!(Strategy::from_name("boxes"), Strategy::FixedBox);
        assert_eq!(Strategy::from_name("fixed-box"), Strategy::FixedBox);
    }

    #[test]
    fn test_selector_auto_tuned_is_retention() {
        assert_eq!(Strategy::from_name("auto-tuned"), Strategy::RetentionModel);
    }

    #[test]
    fn test_selector_unknown_defaults_to_classical() {
        assert_eq!(Strategy::from_name(""), Strategy::Classical);
        assert_eq!(Strategy::from_name("sm18"), Strategy::Classical);
        assert_eq!(Strategy::from_name("  Retention "), Strategy::RetentionModel);
    }

    #[test]
    fn test_default_config_uses_classical() {
        let config = DeckConfig::default();
        assert_eq!(Strategy::for_config(&config), Strategy::Classical);
    }

    #[test]
    fn test_same_seed_same_output() {
        let card = review_card();
        let config = DeckConfig::default();

        let a = schedule_answer(&card, Grade::Good, &config, &mut ctx_with_seed(99));
        let b = schedule_answer(&card, Grade::Good, &config, &mut ctx_with_seed(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_initialize_new_seeds_retention_only() {
        let card = Card::new(Uuid::new_v4(), 0);
        let mut config = DeckConfig::default();

        let update = initialize_new(&card, &config, &mut ctx_with_seed(1));
        assert!(update.is_empty());

        config.strategy = "retention".into();
        let update = initialize_new(&card, &config, &mut ctx_with_seed(1));
        assert!(update.strategy_state.is_some());
    }

    #[test]
    fn test_preview_does_not_touch_caller_context() {
        let card = review_card();
        let config = DeckConfig::default();
        let ctx = ctx_with_seed(5);

        let first = preview_intervals(&card, &config, &ctx);
        let second = preview_intervals(&card, &config, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview_new_card_classical() {
        let card = Card::new(Uuid::new_v4(), 0);
        let config = DeckConfig::default();
        let ctx = ctx_with_seed(5);

        let preview = preview_intervals(&card, &config, &ctx);
        // Again/Hard/Good enter the learning steps (sub-day), Easy graduates
        assert_eq!(preview[0], 0);
        assert_eq!(preview[1], 0);
        assert_eq!(preview[2], 0);
        assert_eq!(preview[3], config.learning.easy_interval);
    }
}
