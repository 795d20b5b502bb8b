//! Spaced repetition scheduling
//!
//! A pure transition function from `(interval, ease factor)` and a review
//! grade to the next schedule. A card has no explicit state enum; its
//! behavioral state is entirely the `(interval, ease_factor)` pair, and
//! grading is the only transition.
//!
//! Grades:
//! - again: forgotten, interval resets to 1 day
//! - hard:  recalled with serious difficulty
//! - good:  recalled correctly
//! - easy:  recalled effortlessly

use chrono::{DateTime, Duration, Utc};

use crate::content::{ReviewGrade, ScheduleState};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// Result of scheduling the next review
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    /// Next interval in days, always >= 1
    pub interval: i64,
    /// Next ease factor, floored at [`MIN_EASE_FACTOR`] and rounded to
    /// two decimal places for storage stability
    pub ease_factor: f32,
    /// When the card comes due again
    pub due_date: DateTime<Utc>,
}

/// Compute the next schedule for a card given a review grade.
///
/// Pure and deterministic: `now` is injected so two calls with identical
/// inputs yield identical outputs.
pub fn schedule(state: &ScheduleState, grade: ReviewGrade, now: DateTime<Utc>) -> ScheduleOutcome {
    let interval = state.interval;
    let ease = state.ease_factor;

    let (next_interval, next_ease) = match grade {
        ReviewGrade::Again => (1, (ease - 0.2).max(MIN_EASE_FACTOR)),
        ReviewGrade::Hard => {
            // interval * 1.2, floored by integer day storage, so intervals
            // of 1-4 days hold flat on a hard answer.
            let scaled = interval * 12 / 10;
            (scaled.max(1), (ease - 0.15).max(MIN_EASE_FACTOR))
        }
        ReviewGrade::Good => {
            let next = match interval {
                0 => 1,
                1 => 3,
                n => ceil_times_ease(n, ease, 100),
            };
            (next, ease)
        }
        ReviewGrade::Easy => {
            let next = match interval {
                0 => 4,
                1 => 7,
                n => ceil_times_ease(n, ease, 130),
            };
            (next, ease + 0.15)
        }
    };

    ScheduleOutcome {
        interval: next_interval,
        ease_factor: round_ease(next_ease),
        due_date: now + Duration::days(next_interval),
    }
}

/// Preview the interval each grade would produce, in grade order
/// (again, hard, good, easy). Used to label grading buttons.
pub fn preview_intervals(state: &ScheduleState, now: DateTime<Utc>) -> [i64; 4] {
    [
        schedule(state, ReviewGrade::Again, now).interval,
        schedule(state, ReviewGrade::Hard, now).interval,
        schedule(state, ReviewGrade::Good, now).interval,
        schedule(state, ReviewGrade::Easy, now).interval,
    ]
}

fn round_ease(ease: f32) -> f32 {
    (ease * 100.0).round() / 100.0
}

/// `ceil(interval * ease * percent / 100)` computed in whole cents.
///
/// The ease factor is stored rounded to two decimals, so treating it as an
/// integer number of cents makes the ceiling exact. Doing the same product
/// in `f32` can land a hair above an exact integer and overshoot the
/// interval by a day (e.g. 660 days at ease 1.45 is exactly 957).
fn ceil_times_ease(interval: i64, ease: f32, percent: i64) -> i64 {
    let cents = (ease * 100.0).round() as i64;
    let numerator = interval * cents * percent;
    (numerator + 9_999) / 10_000
}
