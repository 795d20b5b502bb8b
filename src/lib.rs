//! mneme: adaptive content and review engine for a personal study app.
//!
//! Source text goes in one end; validated flashcards and quiz questions
//! come out the other, land in a pluggable store, and come back up through
//! spaced-repetition review sessions:
//!
//! ```text
//! source text → Orchestrator → AI capability → Validator → drafts
//!             → ReviewStore → ReviewSession → scheduler → ReviewStore
//!                                           → AnalyticsSink
//! ```
//!
//! The AI backend ([`generation::TextGenerator`]), persistence
//! ([`storage::ReviewStore`]) and analytics ([`analytics::AnalyticsSink`])
//! are traits; the crate ships an OpenAI-compatible HTTP client, a
//! file-backed store and a JSONL sink as default implementations.

pub mod analytics;
pub mod content;
pub mod generation;
pub mod review;
pub mod storage;

pub use analytics::{AnalyticsSink, AttemptEvent, JsonlSink, NoopSink, SessionEvent};
pub use content::{
    Card, CardDraft, CardWithState, ContentKind, Deck, Difficulty, GeneratedContent,
    GenerationRequest, QuestionDraft, Quiz, QuizQuestion, RequestedDifficulty, ReviewGrade,
    ScheduleState,
};
pub use generation::{GenerationError, HttpTextGenerator, Orchestrator, TextGenerator};
pub use review::{ReviewSession, ScheduleOutcome, SessionState};
pub use storage::{FileStore, ReviewStore, StoreError};
