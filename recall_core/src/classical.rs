//! Classical ease-factor scheduling strategy.
//!
//! A four-state machine keyed by card lifecycle:
//! - New cards enter the learning steps (or graduate straight to Review on
//!   Easy)
//! - Learning/Relearning cards walk a short sequence of sub-day delays
//! - Review cards get their interval multiplied by the ease factor, with a
//!   randomized fuzz so cards do not clump on the same day
//!
//! Lapses (Again on a Review card) shrink the interval, charge an ease
//! penalty, and send the card back through the relearning steps.

use crate::config::DeckConfig;
use crate::{Card, CardUpdate, Grade, LearnSteps, Lifecycle, Queue, ReviewContext};

/// Schedule a graded answer under the Classical strategy
pub fn schedule_answer(
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) -> CardUpdate {
    let mut update = CardUpdate {
        review_count: Some(card.review_count + 1),
        ..Default::default()
    };

    match card.lifecycle {
        Lifecycle::New => answer_new(&mut update, card, grade, config, ctx),
        Lifecycle::Learning => answer_learning(&mut update, card, grade, config, ctx),
        Lifecycle::Review => answer_review(&mut update, card, grade, config, ctx),
        Lifecycle::Relearning => answer_relearning(&mut update, card, grade, config, ctx),
    }

    update
}

fn answer_new(
    update: &mut CardUpdate,
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    match grade {
        Grade::Easy => {
            // Graduate immediately with the easy interval and bonus ease
            update.ease_factor =
                Some(config.learning.initial_ease + config.review.easy_ease_bonus);
            graduate(update, config, ctx, config.learning.easy_interval);
        }
        _ => {
            update.ease_factor = Some(config.learning.initial_ease);
            if config.learning.steps_mins.is_empty() {
                // No learning steps configured: straight to Review
                graduate(update, config, ctx, config.learning.graduating_interval);
            } else {
                enter_learning_steps(update, &config.learning.steps_mins, ctx);
            }
        }
    }

    tracing::debug!(
        "Classical: new card {} answered {:?}, -> {:?}",
        card.id,
        grade,
        update.lifecycle
    );
}

fn answer_learning(
    update: &mut CardUpdate,
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    let steps_mins = &config.learning.steps_mins;

    match grade {
        Grade::Again => {
            // Restart at the first step
            restart_steps(update, steps_mins, ctx);
        }
        // Hard is treated identically to Good while in learning
        Grade::Hard | Grade::Good => {
            if card.steps.remaining > 1 && !steps_mins.is_empty() {
                advance_step(update, card, steps_mins, ctx);
            } else {
                graduate(update, config, ctx, config.learning.graduating_interval);
            }
        }
        Grade::Easy => {
            update.ease_factor = Some(card.ease_factor + config.review.easy_ease_bonus);
            graduate(update, config, ctx, config.learning.easy_interval);
        }
    }
}

fn answer_review(
    update: &mut CardUpdate,
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    match grade {
        Grade::Again => lapse(update, card, config, ctx),
        Grade::Hard => {
            update.ease_factor = Some(
                (card.ease_factor - config.review.hard_ease_penalty).max(config.review.min_ease),
            );
            reschedule(update, card, grade, config, ctx);
        }
        Grade::Good => {
            reschedule(update, card, grade, config, ctx);
        }
        Grade::Easy => {
            update.ease_factor = Some(card.ease_factor + config.review.easy_ease_bonus);
            reschedule(update, card, grade, config, ctx);
        }
    }
}

fn answer_relearning(
    update: &mut CardUpdate,
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    let steps_mins = &config.lapse.steps_mins;

    match grade {
        Grade::Again => {
            restart_steps(update, steps_mins, ctx);
        }
        Grade::Hard | Grade::Good => {
            if card.steps.remaining > 1 && !steps_mins.is_empty() {
                advance_step(update, card, steps_mins, ctx);
            } else {
                graduate_from_relearning(update, card, config, ctx);
            }
        }
        // Easy leaves relearning immediately, skipping remaining steps
        Grade::Easy => {
            graduate_from_relearning(update, card, config, ctx);
        }
    }
}

/// Lapse: ease penalty, interval shrink, back into relearning
fn lapse(update: &mut CardUpdate, card: &Card, config: &DeckConfig, ctx: &mut ReviewContext) {
    update.ease_factor =
        Some((card.ease_factor - config.lapse.ease_penalty).max(config.review.min_ease));
    update.lapse_count = Some(card.lapse_count + 1);

    let shrunk = ((card.interval as f64 * config.lapse.interval_multiplier).floor() as i64)
        .max(config.lapse.min_interval);
    update.interval = Some(shrunk);

    if config.lapse.steps_mins.is_empty() {
        // No relearning steps: the card stays in Review at the shrunk interval
        update.due = Some(ctx.today() + shrunk);
        tracing::debug!("Classical: lapse on {} with no relearn steps", card.id);
        return;
    }

    update.lifecycle = Some(Lifecycle::Relearning);
    update.queue = Some(Queue::Learning);
    update.steps = Some(LearnSteps::start(config.lapse.steps_mins.len() as u32));
    update.due = Some(ctx.in_minutes(config.lapse.steps_mins[0]));

    tracing::debug!(
        "Classical: lapse on {}, interval {} -> {}",
        card.id,
        card.interval,
        shrunk
    );
}

/// Compute and apply the next review interval for a successful answer
fn reschedule(
    update: &mut CardUpdate,
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    let ease = card.ease_factor as f64 / 1000.0;
    let raw = match grade {
        Grade::Hard => {
            card.interval as f64 * config.review.hard_interval_factor
        }
        Grade::Good => card.interval as f64 * ease,
        Grade::Easy => card.interval as f64 * ease * config.review.easy_interval_factor,
        // Lapses never reach here
        Grade::Again => unreachable!("lapse handled separately"),
    } * config.review.interval_factor;

    let fuzzed = apply_fuzz(raw.round() as i64, config.review.fuzz_fraction, ctx);
    // Cap first, then enforce strict growth over the previous interval
    let interval = fuzzed.min(config.review.max_interval).max(card.interval + 1);

    update.interval = Some(interval);
    update.due = Some(ctx.today() + interval);
    update.lifecycle = Some(Lifecycle::Review);
    update.queue = Some(Queue::Review);

    tracing::debug!(
        "Classical: review {} answered {:?}, interval {} -> {}",
        card.id,
        grade,
        card.interval,
        interval
    );
}

/// Graduate out of (re)learning into Review at the given interval
fn graduate(update: &mut CardUpdate, config: &DeckConfig, ctx: &mut ReviewContext, interval: i64) {
    let interval = interval.clamp(1, config.review.max_interval);
    update.lifecycle = Some(Lifecycle::Review);
    update.queue = Some(Queue::Review);
    update.interval = Some(interval);
    update.due = Some(ctx.today() + interval);
    update.steps = Some(LearnSteps::done());
}

/// Graduate back to Review after relearning, restoring the shrunk interval
fn graduate_from_relearning(
    update: &mut CardUpdate,
    card: &Card,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) {
    let base = card.interval.max(config.lapse.min_interval);
    let interval = ((base as f64 * config.review.interval_factor).round() as i64).max(1);
    graduate(update, config, ctx, interval);
}

fn enter_learning_steps(update: &mut CardUpdate, steps_mins: &[i64], ctx: &mut ReviewContext) {
    update.lifecycle = Some(Lifecycle::Learning);
    update.queue = Some(Queue::Learning);
    update.steps = Some(LearnSteps::start(steps_mins.len() as u32));
    update.due = Some(ctx.in_minutes(steps_mins[0]));
}

fn restart_steps(update: &mut CardUpdate, steps_mins: &[i64], ctx: &mut ReviewContext) {
    update.steps = Some(LearnSteps::start(steps_mins.len() as u32));
    update.due = Some(ctx.in_minutes(steps_mins.first().copied().unwrap_or(1)));
}

fn advance_step(
    update: &mut CardUpdate,
    card: &Card,
    steps_mins: &[i64],
    ctx: &mut ReviewContext,
) {
    let remaining = card.steps.remaining - 1;
    let steps = LearnSteps {
        remaining,
        total: card.steps.total,
    };
    update.steps = Some(steps);
    update.due = Some(ctx.in_minutes(step_delay(steps_mins, remaining)));
}

/// Delay in minutes for the step that is due when `remaining` steps are left
fn step_delay(steps_mins: &[i64], remaining: u32) -> i64 {
    if steps_mins.is_empty() {
        return 1;
    }
    let idx = steps_mins
        .len()
        .saturating_sub(remaining as usize)
        .min(steps_mins.len() - 1);
    steps_mins[idx]
}

/// Apply the randomized interval perturbation. Intervals under two days are
/// left exact.
fn apply_fuzz(interval: i64, fuzz_fraction: f64, ctx: &mut ReviewContext) -> i64 {
    if interval < 2 || fuzz_fraction <= 0.0 {
        return interval;
    }
    let span = interval as f64 * fuzz_fraction;
    let delta = (ctx.rand() * 2.0 - 1.0) * span;
    (interval as f64 + delta).round() as i64
}
