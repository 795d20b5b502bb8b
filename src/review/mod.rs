//! Review engine: scheduling, shuffling and session control
//!
//! This module provides:
//! - The deterministic spaced repetition transition function
//! - Presentation shuffling for quiz options
//! - The sequential review session state machine

pub mod algorithm;
pub mod session;
pub mod shuffle;

pub use algorithm::{preview_intervals, schedule, ScheduleOutcome, MIN_EASE_FACTOR};
pub use session::{
    AnswerFeedback, Presented, ReviewSession, SessionError, SessionState, SessionStats,
};
pub use shuffle::shuffle_options;
