//! Stability/difficulty retention-model scheduling strategy.
//!
//! Each card carries two hidden parameters under the `"retention"` key of
//! its strategy state: `stability` (days until recall probability decays to
//! the reference threshold) and `difficulty` (bounded 1-10). Answers update
//! both and the new stability is converted into a target interval for the
//! configured retention.
//!
//! The formula set is a simplified approximation of the stability/difficulty
//! retention-model family, not a bit-exact reproduction of any published
//! reference algorithm.

use crate::config::{DeckConfig, RetentionConfig, MINUTES_PER_DAY};
use crate::{Card, CardUpdate, Grade, Lifecycle, Queue, ReviewContext};
use serde::{Deserialize, Serialize};

/// Default weight vector used when the configuration supplies none
pub const DEFAULT_WEIGHTS: [f64; 17] = [
    0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26, 0.29,
    2.61,
];

const STATE_KEY: &str = "retention";

const SEED_STABILITY: f64 = 0.4;
const SEED_DIFFICULTY: f64 = 5.0;
const MIN_STABILITY: f64 = 0.1;
/// 100-year ceiling, in days
const MAX_STABILITY: f64 = 36500.0;
const MIN_INTERVAL_DAYS: f64 = 0.01;

/// Hidden per-card model state
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct RetentionState {
    stability: f64,
    difficulty: f64,
    /// Epoch seconds of the last graded answer
    last_review: i64,
}

/// Seed the hidden state when a New card is introduced
pub fn initialize_new(card: &Card, _config: &DeckConfig, ctx: &mut ReviewContext) -> CardUpdate {
    let mut state = card.strategy_state.clone();
    state.set(
        STATE_KEY,
        &RetentionState {
            stability: SEED_STABILITY,
            difficulty: SEED_DIFFICULTY,
            last_review: ctx.now_secs(),
        },
    );
    CardUpdate {
        strategy_state: Some(state),
        ..Default::default()
    }
}

/// Schedule a graded answer under the retention model
pub fn schedule_answer(
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) -> CardUpdate {
    let state = load_state(card, ctx);
    let stability = state.stability.max(MIN_STABILITY);
    let difficulty = state.difficulty.clamp(1.0, 10.0);

    let elapsed_days = ((ctx.now_secs() - state.last_review) as f64 / 86400.0).max(0.0);
    let retrievability = 1.0 / (1.0 + elapsed_days / (9.0 * stability));

    let new_stability = next_stability(
        stability,
        difficulty,
        retrievability,
        grade,
        &config.retention,
    );
    let new_difficulty = (difficulty + difficulty_delta(grade)).clamp(1.0, 10.0);

    let target = config.retention.target_retention.clamp(0.01, 0.99);
    let interval_days = (9.0 * new_stability * (1.0 / target - 1.0)).max(MIN_INTERVAL_DAYS);

    tracing::debug!(
        "Retention: card {} answered {:?}: s {:.3} -> {:.3}, d {:.2} -> {:.2}, r {:.3}",
        card.id,
        grade,
        stability,
        new_stability,
        difficulty,
        new_difficulty,
        retrievability
    );

    let mut update = CardUpdate {
        review_count: Some(card.review_count + 1),
        ..Default::default()
    };

    let mut next_state = card.strategy_state.clone();
    next_state.set(
        STATE_KEY,
        &RetentionState {
            stability: new_stability,
            difficulty: new_difficulty,
            last_review: ctx.now_secs(),
        },
    );
    update.strategy_state = Some(next_state);

    match grade {
        Grade::Again => {
            if card.lifecycle == Lifecycle::Review {
                update.lapse_count = Some(card.lapse_count + 1);
            }
            // Short relearning delay from the shrunk stability, capped at
            // one day
            let delay_mins = ((interval_days * MINUTES_PER_DAY).round() as i64).clamp(1, 1440);
            update.lifecycle = Some(Lifecycle::Relearning);
            update.queue = Some(Queue::Learning);
            update.due = Some(ctx.in_minutes(delay_mins));
            update.interval = Some(0);
        }
        _ if interval_days < 1.0 => {
            let lifecycle = match card.lifecycle {
                Lifecycle::Review | Lifecycle::Relearning => Lifecycle::Relearning,
                _ => Lifecycle::Learning,
            };
            let delay_mins = ((interval_days * MINUTES_PER_DAY).round() as i64).max(1);
            update.lifecycle = Some(lifecycle);
            update.queue = Some(Queue::Learning);
            update.due = Some(ctx.in_minutes(delay_mins));
            update.interval = Some(0);
        }
        _ => {
            let mut interval = (interval_days.round() as i64).clamp(1, config.review.max_interval);
            if card.lifecycle == Lifecycle::Review {
                // Strict growth over the previous interval on success
                interval = interval.max(card.interval + 1);
            }
            update.lifecycle = Some(Lifecycle::Review);
            update.queue = Some(Queue::Review);
            update.interval = Some(interval);
            update.due = Some(ctx.today() + interval);
        }
    }

    update
}

/// Read the hidden state, reseeding from the card's current interval (or
/// defaults) when it is missing or malformed
fn load_state(card: &Card, ctx: &ReviewContext) -> RetentionState {
    if let Some(state) = card.strategy_state.get::<RetentionState>(STATE_KEY) {
        return state;
    }

    let stability = if card.interval > 0 {
        card.interval as f64
    } else {
        SEED_STABILITY
    };
    tracing::debug!(
        "Retention: no state on card {}, reseeding with stability {}",
        card.id,
        stability
    );
    RetentionState {
        stability,
        difficulty: SEED_DIFFICULTY,
        last_review: ctx.now_secs(),
    }
}

fn next_stability(
    stability: f64,
    difficulty: f64,
    retrievability: f64,
    grade: Grade,
    config: &RetentionConfig,
) -> f64 {
    let w8 = weight(config, 8);
    let w9 = weight(config, 9);
    let w11 = weight(config, 11);

    match grade {
        Grade::Again => {
            (stability * 0.5 * (w11 * (difficulty - 5.0)).exp()).max(MIN_STABILITY)
        }
        _ => {
            let factor = match grade {
                Grade::Hard => 1.2,
                Grade::Good => 2.5,
                Grade::Easy => 3.5,
                Grade::Again => unreachable!(),
            };
            let boost = (w8 * (1.0 - retrievability)).exp() * (w9 * (5.0 - difficulty)).exp();
            (stability * factor * boost).clamp(MIN_STABILITY, MAX_STABILITY)
        }
    }
}

fn difficulty_delta(grade: Grade) -> f64 {
    match grade {
        Grade::Again => 0.8,
        Grade::Hard => 0.2,
        Grade::Good => -0.1,
        Grade::Easy => -0.3,
    }
}

fn weight(config: &RetentionConfig, index: usize) -> f64 {
    config
        .weights
        .as_ref()
        .and_then(|w| w.get(index).copied())
        .unwrap_or(DEFAULT_WEIGHTS[index])
}
