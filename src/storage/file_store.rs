//! File-backed store for decks, quizzes and review state
//!
//! Directory layout under the data directory:
//! ```text
//! mneme/
//! ├── decks.json           # Array of all decks
//! ├── quizzes.json         # Array of all quizzes
//! ├── cards/
//! │   └── {card-id}.json   # Individual card files
//! ├── questions/
//! │   └── {question-id}.json
//! └── states/
//!     └── {card-id}.json   # Card spaced repetition state
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::content::{
    Card, CardDraft, CardWithState, Deck, QuestionDraft, Quiz, QuizQuestion, ScheduleState,
};
use crate::review::ScheduleOutcome;

use super::ReviewStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Quiz not found: {0}")]
    QuizNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("No data directory available")]
    NoDataDir,
}

type Result<T> = std::result::Result<T, StoreError>;

/// Store keeping every record as a pretty-printed JSON file
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Default platform data directory (e.g. ~/.local/share/mneme)
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("mneme"))
            .ok_or(StoreError::NoDataDir)
    }

    fn cards_dir(&self) -> PathBuf {
        self.data_dir.join("cards")
    }

    fn questions_dir(&self) -> PathBuf {
        self.data_dir.join("questions")
    }

    fn states_dir(&self) -> PathBuf {
        self.data_dir.join("states")
    }

    fn decks_path(&self) -> PathBuf {
        self.data_dir.join("decks.json")
    }

    fn quizzes_path(&self) -> PathBuf {
        self.data_dir.join("quizzes.json")
    }

    fn card_path(&self, card_id: Uuid) -> PathBuf {
        self.cards_dir().join(format!("{}.json", card_id))
    }

    fn question_path(&self, question_id: Uuid) -> PathBuf {
        self.questions_dir().join(format!("{}.json", question_id))
    }

    fn state_path(&self, card_id: Uuid) -> PathBuf {
        self.states_dir().join(format!("{}.json", card_id))
    }

    /// Create the directory tree and index files if missing
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.cards_dir())?;
        fs::create_dir_all(self.questions_dir())?;
        fs::create_dir_all(self.states_dir())?;

        for path in [self.decks_path(), self.quizzes_path()] {
            if !path.exists() {
                fs::write(&path, "[]")?;
            }
        }

        Ok(())
    }

    /// List all decks
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let path = self.decks_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Get a specific deck
    pub fn get_deck(&self, deck_id: Uuid) -> Result<Deck> {
        self.list_decks()?
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or(StoreError::DeckNotFound(deck_id))
    }

    /// List all quizzes
    pub fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let path = self.quizzes_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Get a specific quiz
    pub fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        self.list_quizzes()?
            .into_iter()
            .find(|q| q.id == quiz_id)
            .ok_or(StoreError::QuizNotFound(quiz_id))
    }

    /// Get a specific card
    pub fn get_card(&self, card_id: Uuid) -> Result<Card> {
        let path = self.card_path(card_id);
        if !path.exists() {
            return Err(StoreError::CardNotFound(card_id));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List all cards of a deck in insertion order
    pub fn list_cards(&self, deck_id: Uuid) -> Result<Vec<Card>> {
        let dir = self.cards_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Card = serde_json::from_str(&content)?;
                if card.deck_id == deck_id {
                    cards.push(card);
                }
            }
        }

        cards.sort_by(|a, b| a.position.cmp(&b.position));
        Ok(cards)
    }

    /// Get the schedule state for a card, defaulting to a fresh state
    pub fn get_state(&self, card_id: Uuid) -> Result<ScheduleState> {
        let path = self.state_path(card_id);
        if !path.exists() {
            return Ok(ScheduleState::new(card_id));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_state(&self, state: &ScheduleState) -> Result<()> {
        let path = self.state_path(state.card_id);
        fs::write(&path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }

    fn write_deck_files(
        &self,
        deck: &Deck,
        cards: &[CardDraft],
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        for (position, draft) in cards.iter().enumerate() {
            let mut card = Card::new(deck.id, draft.front.clone(), draft.back.clone());
            card.difficulty = draft.difficulty;
            card.tags = draft.tags.clone();
            card.position = position as i32;

            written.push(self.card_path(card.id));
            fs::write(self.card_path(card.id), serde_json::to_string_pretty(&card)?)?;
            written.push(self.state_path(card.id));
            self.write_state(&ScheduleState::new(card.id))?;
        }

        // Register the deck last so a failed save is never listed
        let mut decks = self.list_decks()?;
        decks.push(deck.clone());
        fs::write(self.decks_path(), serde_json::to_string_pretty(&decks)?)?;
        Ok(())
    }

    fn write_quiz_files(
        &self,
        quiz: &Quiz,
        questions: &[QuestionDraft],
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let now = Utc::now();
        for (position, draft) in questions.iter().enumerate() {
            let question = QuizQuestion {
                id: Uuid::new_v4(),
                quiz_id: quiz.id,
                stem: draft.stem.clone(),
                options: draft.options.clone(),
                correct_index: draft.correct_answer,
                explanation: draft.explanation.clone(),
                difficulty: draft.difficulty,
                question_type: draft.question_type.clone(),
                tags: draft.tags.clone(),
                position: position as i32,
                created_at: now,
                updated_at: now,
            };
            written.push(self.question_path(question.id));
            fs::write(
                self.question_path(question.id),
                serde_json::to_string_pretty(&question)?,
            )?;
        }

        let mut quizzes = self.list_quizzes()?;
        quizzes.push(quiz.clone());
        fs::write(self.quizzes_path(), serde_json::to_string_pretty(&quizzes)?)?;
        Ok(())
    }

    /// Best-effort removal of files from an aborted save
    fn discard(&self, written: &[PathBuf]) {
        for path in written {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!(
                        "Could not remove {} after failed save: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
    }
}

impl ReviewStore for FileStore {
    fn save_deck(&self, name: &str, source: Option<&str>, cards: &[CardDraft]) -> Result<Deck> {
        self.init()?;

        let mut deck = Deck::new(name.to_string());
        deck.source = source.map(str::to_string);
        deck.card_count = cards.len();

        let mut written = Vec::new();
        if let Err(e) = self.write_deck_files(&deck, cards, &mut written) {
            self.discard(&written);
            return Err(e);
        }

        log::info!("Saved deck '{}' with {} cards", deck.name, deck.card_count);
        Ok(deck)
    }

    fn save_quiz(
        &self,
        name: &str,
        source: Option<&str>,
        questions: &[QuestionDraft],
    ) -> Result<Quiz> {
        self.init()?;

        let mut quiz = Quiz::new(name.to_string());
        quiz.source = source.map(str::to_string);
        quiz.question_count = questions.len();

        let mut written = Vec::new();
        if let Err(e) = self.write_quiz_files(&quiz, questions, &mut written) {
            self.discard(&written);
            return Err(e);
        }

        log::info!(
            "Saved quiz '{}' with {} questions",
            quiz.name,
            quiz.question_count
        );
        Ok(quiz)
    }

    fn due_cards(&self, deck_id: Uuid, as_of: DateTime<Utc>) -> Result<Vec<CardWithState>> {
        let mut due = Vec::new();
        for card in self.list_cards(deck_id)? {
            let state = self.get_state(card.id)?;
            if state.is_due(as_of) {
                due.push(CardWithState { card, state });
            }
        }

        // Stable: insertion order (position) already holds within equal due dates
        due.sort_by(|a, b| a.state.due_date.cmp(&b.state.due_date));
        Ok(due)
    }

    fn quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let dir = self.questions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut questions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let question: QuizQuestion = serde_json::from_str(&content)?;
                if question.quiz_id == quiz_id {
                    questions.push(question);
                }
            }
        }

        questions.sort_by(|a, b| a.position.cmp(&b.position));
        Ok(questions)
    }

    fn update_schedule(
        &self,
        card_id: Uuid,
        outcome: &ScheduleOutcome,
        repetitions: i32,
    ) -> Result<()> {
        // A state file is written alongside every card; its absence means
        // the card was never saved through this store.
        if !self.state_path(card_id).exists() {
            return Err(StoreError::CardNotFound(card_id));
        }

        let mut state = self.get_state(card_id)?;
        state.interval = outcome.interval;
        state.ease_factor = outcome.ease_factor;
        state.due_date = outcome.due_date;
        state.repetitions = repetitions;
        self.write_state(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn drafts(n: usize) -> Vec<CardDraft> {
        (0..n)
            .map(|i| CardDraft {
                front: format!("front {}", i),
                back: format!("back {}", i),
                difficulty: Default::default(),
                tags: vec!["test".into()],
            })
            .collect()
    }

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn save_deck_creates_cards_with_fresh_state() {
        let (_dir, store) = store();
        let deck = store.save_deck("biology", Some("notes.md"), &drafts(5)).unwrap();
        assert_eq!(deck.card_count, 5);

        let due = store.due_cards(deck.id, Utc::now()).unwrap();
        assert_eq!(due.len(), 5);
        for item in &due {
            assert_eq!(item.state.interval, 0);
            assert_eq!(item.state.ease_factor, 2.5);
            assert_eq!(item.state.repetitions, 0);
        }
    }

    #[test]
    fn due_cards_preserves_insertion_order_on_ties() {
        let (_dir, store) = store();
        let deck = store.save_deck("history", None, &drafts(4)).unwrap();
        let due = store.due_cards(deck.id, Utc::now()).unwrap();
        let positions: Vec<i32> = due.iter().map(|c| c.card.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn update_schedule_round_trips() {
        let (_dir, store) = store();
        let deck = store.save_deck("chem", None, &drafts(1)).unwrap();
        let due = store.due_cards(deck.id, Utc::now()).unwrap();
        let card = &due[0].card;

        let due_date = Utc::now() + Duration::days(3);
        let outcome = ScheduleOutcome {
            interval: 3,
            ease_factor: 2.36,
            due_date,
        };
        store.update_schedule(card.id, &outcome, 1).unwrap();

        let state = store.get_state(card.id).unwrap();
        assert_eq!(state.interval, 3);
        assert_eq!(state.ease_factor, 2.36);
        assert_eq!(state.due_date, due_date);
        assert_eq!(state.repetitions, 1);

        // No longer due today
        assert!(store.due_cards(deck.id, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn update_schedule_rejects_unknown_card() {
        let (_dir, store) = store();
        store.init().unwrap();
        let outcome = ScheduleOutcome {
            interval: 1,
            ease_factor: 2.5,
            due_date: Utc::now(),
        };
        let err = store.update_schedule(Uuid::new_v4(), &outcome, 1).unwrap_err();
        assert!(matches!(err, StoreError::CardNotFound(_)));
    }

    #[test]
    fn failed_deck_save_leaves_no_files_behind() {
        let (dir, store) = store();
        store.init().unwrap();

        // A directory where decks.json belongs makes registration fail
        fs::remove_file(dir.path().join("decks.json")).unwrap();
        fs::create_dir(dir.path().join("decks.json")).unwrap();

        let err = store.save_deck("doomed", None, &drafts(3)).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        // No orphaned card or state files survive the aborted save
        assert_eq!(fs::read_dir(dir.path().join("cards")).unwrap().count(), 0);
        assert_eq!(fs::read_dir(dir.path().join("states")).unwrap().count(), 0);
    }

    #[test]
    fn save_quiz_and_read_back_in_order() {
        let (_dir, store) = store();
        let questions: Vec<QuestionDraft> = (0..3)
            .map(|i| QuestionDraft {
                stem: format!("question {}", i),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: 2,
                explanation: String::new(),
                difficulty: Default::default(),
                question_type: "recall".into(),
                tags: Vec::new(),
            })
            .collect();

        let quiz = store.save_quiz("geo", None, &questions).unwrap();
        assert_eq!(quiz.question_count, 3);

        let stored = store.quiz_questions(quiz.id).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].stem, "question 0");
        assert_eq!(stored[2].stem, "question 2");
        assert!(stored.iter().all(|q| q.correct_index == 2));
    }

    #[test]
    fn decks_are_isolated() {
        let (_dir, store) = store();
        let deck_a = store.save_deck("a", None, &drafts(2)).unwrap();
        let deck_b = store.save_deck("b", None, &drafts(3)).unwrap();

        assert_eq!(store.due_cards(deck_a.id, Utc::now()).unwrap().len(), 2);
        assert_eq!(store.due_cards(deck_b.id, Utc::now()).unwrap().len(), 3);
        assert_eq!(store.list_decks().unwrap().len(), 2);
    }
}
