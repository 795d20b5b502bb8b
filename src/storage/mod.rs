//! Persistence capability for decks, quizzes and schedule state
//!
//! The engine only ever talks to [`ReviewStore`]; [`FileStore`] is the
//! bundled file-backed implementation.

mod file_store;

pub use file_store::{FileStore, StoreError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::{CardDraft, CardWithState, Deck, QuestionDraft, Quiz, QuizQuestion};
use crate::review::ScheduleOutcome;

/// CRUD boundary the review engine writes through. One writer, one record,
/// one operation; no versioning is required.
pub trait ReviewStore: Send + Sync {
    /// Persist a new deck with its cards and fresh schedule state
    /// (interval 0, ease 2.5, due immediately).
    fn save_deck(
        &self,
        name: &str,
        source: Option<&str>,
        cards: &[CardDraft],
    ) -> Result<Deck, StoreError>;

    /// Persist a new quiz with its questions.
    fn save_quiz(
        &self,
        name: &str,
        source: Option<&str>,
        questions: &[QuestionDraft],
    ) -> Result<Quiz, StoreError>;

    /// Cards of a deck due at `as_of`, ascending due date, insertion order
    /// breaking ties.
    fn due_cards(
        &self,
        deck_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<CardWithState>, StoreError>;

    /// All questions of a quiz in insertion order.
    fn quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>, StoreError>;

    /// Write back a scheduler outcome for one card.
    fn update_schedule(
        &self,
        card_id: Uuid,
        outcome: &ScheduleOutcome,
        repetitions: i32,
    ) -> Result<(), StoreError>;
}
