//! Data models for decks, cards, quizzes and generation requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of study content. Everything the engine touches is tagged with one
/// of these so downstream code can match exhaustively instead of sniffing
/// fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Note,
    Exercise,
    Flashcards,
    Quiz,
    Mindmap,
    Summary,
}

impl ContentKind {
    /// Kinds the generation pipeline can produce and validate.
    pub fn is_generatable(self) -> bool {
        matches!(self, ContentKind::Flashcards | ContentKind::Quiz)
    }
}

/// Author- or AI-assigned difficulty of a single card or question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Normal
    }
}

/// Difficulty requested for a generation run. `Mixed` asks the model to
/// vary difficulty across the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestedDifficulty {
    Easy,
    Normal,
    Hard,
    Mixed,
}

impl Default for RequestedDifficulty {
    fn default() -> Self {
        Self::Mixed
    }
}

/// Recall-quality signal supplied by the user when grading a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewGrade {
    Again,
    Hard,
    Good,
    Easy,
}

/// A deck is a collection of flashcards generated from one source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub card_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            source: None,
            card_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A quiz is a collection of multiple-choice questions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            source: None,
            question_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A flashcard with question (front) and answer (back). Text content is
/// immutable to the engine; only explicit user edits change it, never
/// scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Insertion order within the deck, used to break due-date ties
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(deck_id: Uuid, front: String, back: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front,
            back,
            difficulty: Difficulty::default(),
            tags: Vec::new(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single multiple-choice question. `options` always holds exactly four
/// entries and `correct_index` always points at the correct answer text,
/// including after any shuffle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub stem: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Insertion order within the quiz
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current spaced repetition state for a card. Mutated exclusively through
/// scheduler outcomes written back by a review session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub card_id: Uuid,
    /// Current interval in days (0 = never reviewed)
    #[serde(default = "default_interval")]
    pub interval: i64,
    /// Ease factor, floored at 1.3 (default 2.5)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// When the card is due for review
    pub due_date: DateTime<Utc>,
    /// Number of completed reviews
    #[serde(default)]
    pub repetitions: i32,
}

fn default_interval() -> i64 {
    0
}

fn default_ease_factor() -> f32 {
    2.5
}

impl ScheduleState {
    pub fn new(card_id: Uuid) -> Self {
        Self {
            card_id,
            interval: 0,
            ease_factor: 2.5,
            due_date: Utc::now(),
            repetitions: 0,
        }
    }

    /// Check whether the card is due at the given instant
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.due_date <= as_of
    }
}

/// A card paired with its schedule state, used for review queues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithState {
    pub card: Card,
    pub state: ScheduleState,
}

/// One generation run. Consumed once by the orchestrator, never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Extracted plain text of the source document (opaque to the engine)
    pub source_text: String,
    /// How many items to ask for
    pub count: usize,
    /// What to generate; must be a generatable kind
    pub kind: ContentKind,
    pub difficulty: RequestedDifficulty,
    /// Content subtypes the model may use (e.g. "definition", "application")
    pub types: Vec<String>,
    /// Provider identifier passed through to the AI capability
    pub provider: String,
    pub model: Option<String>,
}

/// A flashcard as emitted by the generation pipeline, before it is given
/// an identity by the persistence layer. Mirrors the AI output contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A quiz question as emitted by the generation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub stem: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated output of one generation run
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    Flashcards(Vec<CardDraft>),
    Quiz(Vec<QuestionDraft>),
}

impl GeneratedContent {
    pub fn len(&self) -> usize {
        match self {
            GeneratedContent::Flashcards(cards) => cards.len(),
            GeneratedContent::Quiz(questions) => questions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            GeneratedContent::Flashcards(_) => ContentKind::Flashcards,
            GeneratedContent::Quiz(_) => ContentKind::Quiz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_state_defaults() {
        let state = ScheduleState::new(Uuid::new_v4());
        assert_eq!(state.interval, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.repetitions, 0);
        assert!(state.is_due(Utc::now()));
    }

    #[test]
    fn content_kind_generatable() {
        assert!(ContentKind::Flashcards.is_generatable());
        assert!(ContentKind::Quiz.is_generatable());
        assert!(!ContentKind::Note.is_generatable());
        assert!(!ContentKind::Mindmap.is_generatable());
    }

    #[test]
    fn question_draft_deserializes_wire_shape() {
        let json = r#"{
            "stem": "What is the powerhouse of the cell?",
            "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi body"],
            "correctAnswer": 1,
            "explanation": "Mitochondria produce ATP.",
            "difficulty": "easy",
            "type": "definition",
            "tags": ["biology"]
        }"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.correct_answer, 1);
        assert_eq!(draft.question_type, "definition");
        assert_eq!(draft.difficulty, Difficulty::Easy);
    }
}
