//! Fixed-box (interval ladder) scheduling strategy.
//!
//! Each card carries a 0-based box index under the `"boxes"` key of its
//! strategy state. Grades move the card along a configured ladder of
//! intervals: Again drops (default: reset to box 0), Hard stays, Good
//! advances one box, Easy advances two. The ladder entry's day value routes
//! the card to the learning queue (sub-day) or the review queue.

use crate::config::{DeckConfig, MINUTES_PER_DAY};
use crate::{Card, CardUpdate, Grade, Lifecycle, Queue, ReviewContext};
use serde::{Deserialize, Serialize};

const STATE_KEY: &str = "boxes";

/// Hidden per-card ladder position
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct BoxState {
    #[serde(rename = "box")]
    index: u32,
    /// Epoch seconds of the last graded answer
    last_review: i64,
}

/// Schedule a graded answer under the fixed-box strategy
pub fn schedule_answer(
    card: &Card,
    grade: Grade,
    config: &DeckConfig,
    ctx: &mut ReviewContext,
) -> CardUpdate {
    let ladder = &config.boxes.ladder_days;
    let top = ladder.len().saturating_sub(1) as u32;

    // Missing or malformed state reseeds at box 0
    let index = card
        .strategy_state
        .get::<BoxState>(STATE_KEY)
        .map(|s| s.index)
        .unwrap_or(0)
        .min(top);

    let next_index = match grade {
        Grade::Again => {
            if config.boxes.drop_boxes == 0 {
                0
            } else {
                index.saturating_sub(config.boxes.drop_boxes)
            }
        }
        Grade::Hard => index,
        Grade::Good => index + 1,
        Grade::Easy => index + 2,
    }
    .min(top);

    let days = ladder.get(next_index as usize).copied().unwrap_or(1.0);

    tracing::debug!(
        "FixedBox: card {} answered {:?}, box {} -> {} ({} days)",
        card.id,
        grade,
        index,
        next_index,
        days
    );

    let mut update = CardUpdate {
        review_count: Some(card.review_count + 1),
        ..Default::default()
    };

    if grade == Grade::Again && card.lifecycle == Lifecycle::Review {
        update.lapse_count = Some(card.lapse_count + 1);
    }

    let mut next_state = card.strategy_state.clone();
    next_state.set(
        STATE_KEY,
        &BoxState {
            index: next_index,
            last_review: ctx.now_secs(),
        },
    );
    update.strategy_state = Some(next_state);

    if days < 1.0 {
        let lifecycle = match card.lifecycle {
            Lifecycle::Review | Lifecycle::Relearning => Lifecycle::Relearning,
            _ => Lifecycle::Learning,
        };
        let delay_mins = ((days * MINUTES_PER_DAY).round() as i64).max(1);
        update.lifecycle = Some(lifecycle);
        update.queue = Some(Queue::Learning);
        update.due = Some(ctx.in_minutes(delay_mins));
        update.interval = Some(0);
    } else {
        let interval = (days.round() as i64).clamp(1, config.review.max_interval);
        update.lifecycle = Some(Lifecycle::Review);
        update.queue = Some(Queue::Review);
        update.interval = Some(interval);
        update.due = Some(ctx.today() + interval);
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn ctx() -> ReviewContext {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        ReviewContext::with_seed(now, created, 11)
    }

    fn card_in_box(index: u32) -> Card {
        let mut card = Card::new(Uuid::new_v4(), 0);
        card.lifecycle = Lifecycle::Review;
        card.queue = Queue::Review;
        card.interval = 2;
        card.strategy_state.set(
            STATE_KEY,
            &BoxState {
                index,
                last_review: 0,
            },
        );
        card
    }

    fn box_of(update: &CardUpdate) -> u32 {
        update
            .strategy_state
            .as_ref()
            .unwrap()
            .get::<BoxState>(STATE_KEY)
            .unwrap()
            .index
    }

    #[test]
    fn test_again_resets_to_box_zero() {
        // Scenario: box 2, Again, default drop_boxes = 0 means full reset
        let card = card_in_box(2);
        let config = DeckConfig::default();

        let update = schedule_answer(&card, Grade::Again, &config, &mut ctx());

        assert_eq!(box_of(&update), 0);
        assert_eq!(update.lapse_count, Some(1));
        // Box 0 is the 10-minute rung: learning queue
        assert_eq!(update.lifecycle, Some(Lifecycle::Relearning));
        assert_eq!(update.queue, Some(Queue::Learning));
        assert_eq!(update.interval, Some(0));
    }

    #[test]
    fn test_configured_drop_boxes() {
        let card = card_in_box(5);
        let mut config = DeckConfig::default();
        config.boxes.drop_boxes = 2;

        let update = schedule_answer(&card, Grade::Again, &config, &mut ctx());
        assert_eq!(box_of(&update), 3);

        // Dropping past the bottom stops at box 0
        let card = card_in_box(1);
        let update = schedule_answer(&card, Grade::Again, &config, &mut ctx());
        assert_eq!(box_of(&update), 0);
    }

    #[test]
    fn test_hard_stays_in_box() {
        let card = card_in_box(3);
        let config = DeckConfig::default();
        let mut ctx = ctx();

        let update = schedule_answer(&card, Grade::Hard, &config, &mut ctx);

        assert_eq!(box_of(&update), 3);
        // Ladder box 3 is 4 days
        assert_eq!(update.interval, Some(4));
        assert_eq!(update.due, Some(ctx.today() + 4));
    }

    #[test]
    fn test_good_advances_one_box() {
        let card = card_in_box(2);
        let config = DeckConfig::default();

        let update = schedule_answer(&card, Grade::Good, &config, &mut ctx());

        assert_eq!(box_of(&update), 3);
        assert_eq!(update.interval, Some(4));
        assert_eq!(update.lifecycle, Some(Lifecycle::Review));
    }

    #[test]
    fn test_easy_advances_two_boxes() {
        let card = card_in_box(2);
        let config = DeckConfig::default();

        let update = schedule_answer(&card, Grade::Easy, &config, &mut ctx());

        assert_eq!(box_of(&update), 4);
        assert_eq!(update.interval, Some(8));
    }

    #[test]
    fn test_box_index_clamped_at_top() {
        let config = DeckConfig::default();
        let top = (config.boxes.ladder_days.len() - 1) as u32;

        let card = card_in_box(top);
        let update = schedule_answer(&card, Grade::Easy, &config, &mut ctx());
        assert_eq!(box_of(&update), top);
        assert_eq!(update.interval, Some(64));
    }

    #[test]
    fn test_box_index_always_in_bounds() {
        let config = DeckConfig::default();
        let top = (config.boxes.ladder_days.len() - 1) as u32;

        for grade in Grade::ALL {
            for index in [0, 1, top, top + 5] {
                let card = card_in_box(index);
                let update = schedule_answer(&card, grade, &config, &mut ctx());
                assert!(box_of(&update) <= top, "{:?} from box {}", grade, index);
            }
        }
    }

    #[test]
    fn test_sub_day_box_routes_to_learning_queue() {
        // A new card's first Good answer lands in box 1 (1 day), but Hard
        // keeps it in box 0 (10 minutes)
        let mut card = Card::new(Uuid::new_v4(), 0);
        card.strategy_state.set(
            STATE_KEY,
            &BoxState {
                index: 0,
                last_review: 0,
            },
        );
        let config = DeckConfig::default();
        let mut ctx = ctx();

        let update = schedule_answer(&card, Grade::Hard, &config, &mut ctx);

        assert_eq!(update.lifecycle, Some(Lifecycle::Learning));
        assert_eq!(update.due, Some(ctx.in_minutes(10)));
        assert_eq!(update.interval, Some(0));
    }

    #[test]
    fn test_missing_state_reseeds_at_box_zero() {
        let card = Card::new(Uuid::new_v4(), 0);
        let config = DeckConfig::default();

        // Good from nothing: box 0 -> 1, a one-day review interval
        let update = schedule_answer(&card, Grade::Good, &config, &mut ctx());
        assert_eq!(box_of(&update), 1);
        assert_eq!(update.interval, Some(1));
        assert_eq!(update.lifecycle, Some(Lifecycle::Review));
    }

    #[test]
    fn test_sibling_keys_survive_updates() {
        let mut card = card_in_box(1);
        card.strategy_state
            .set("retention", &serde_json::json!({"stability": 2.0}));
        let config = DeckConfig::default();

        let update = schedule_answer(&card, Grade::Good, &config, &mut ctx());

        let state = update.strategy_state.unwrap();
        assert_eq!(
            state.get::<serde_json::Value>("retention"),
            Some(serde_json::json!({"stability": 2.0}))
        );
    }

    #[test]
    fn test_empty_ladder_falls_back_to_one_day() {
        let card = Card::new(Uuid::new_v4(), 0);
        let mut config = DeckConfig::default();
        config.boxes.ladder_days.clear();

        let update = schedule_answer(&card, Grade::Good, &config, &mut ctx());
        assert_eq!(update.interval, Some(1));
    }
}
