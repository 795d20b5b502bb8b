//! Domain model for the content and review engine
//!
//! This module provides:
//! - The tagged content-kind union used across generation and review
//! - Flashcards and their spaced repetition state (kept separate)
//! - Quiz questions with the correct-answer index invariant
//! - Generation request/draft value objects

mod models;

pub use models::*;
