//! Review session controller
//!
//! Drives a queue of due items through grading, strictly one at a time:
//! `Idle → Presenting → (graded) → Presenting … → Complete`. Scheduling
//! writes go through the persistence boundary, one card per grade; attempt
//! and session events go to the analytics sink and never abort a session.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::analytics::{AnalyticsSink, AttemptEvent, SessionEvent};
use crate::content::{CardWithState, ContentKind, QuizQuestion, ReviewGrade};
use crate::storage::{ReviewStore, StoreError};

use super::algorithm::schedule;
use super::shuffle::shuffle_options;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("no item is currently presented")]
    NotPresenting,

    #[error("the presented item is a quiz question; answer it instead of grading")]
    ExpectedCard,

    #[error("the presented item is a card; grade it instead of answering")]
    ExpectedQuestion,
}

/// Controller state. `Complete` is terminal, reached by exhausting the
/// queue or by cancelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Presenting,
    Complete,
}

/// The item currently shown to the user. Quiz options are shuffled exactly
/// once, when the item enters presentation, never again per interaction.
#[derive(Debug, Clone)]
pub enum Presented {
    Card(CardWithState),
    Question(QuizQuestion),
}

/// Outcome of answering a presented quiz question
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_index: usize,
    pub explanation: String,
}

/// Counters exposed when a session ends
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub reviewed: usize,
    pub correct: usize,
}

enum QueueItem {
    Card(CardWithState),
    Question(QuizQuestion),
}

/// Sequential review session over a pluggable store and analytics sink
pub struct ReviewSession<R: Rng> {
    store: Arc<dyn ReviewStore>,
    analytics: Arc<dyn AnalyticsSink>,
    rng: R,
    kind: ContentKind,
    state: SessionState,
    queue: VecDeque<QueueItem>,
    current: Option<Presented>,
    started: Option<Instant>,
    stats: SessionStats,
    topics: Vec<String>,
    session_logged: bool,
}

impl<R: Rng> ReviewSession<R> {
    pub fn new(store: Arc<dyn ReviewStore>, analytics: Arc<dyn AnalyticsSink>, rng: R) -> Self {
        Self {
            store,
            analytics,
            rng,
            kind: ContentKind::Flashcards,
            state: SessionState::Idle,
            queue: VecDeque::new(),
            current: None,
            started: None,
            stats: SessionStats::default(),
            topics: Vec::new(),
            session_logged: false,
        }
    }

    /// Load the cards of a deck due at `as_of` and present the first one.
    /// With nothing due the session completes immediately.
    pub fn begin_deck(&mut self, deck_id: Uuid, as_of: DateTime<Utc>) -> Result<SessionState, SessionError> {
        let due = self.store.due_cards(deck_id, as_of)?;
        log::info!("Starting deck session with {} due card(s)", due.len());
        self.reset(ContentKind::Flashcards, due.into_iter().map(QueueItem::Card).collect());
        Ok(self.state)
    }

    /// Load the questions of a quiz and present the first one.
    pub fn begin_quiz(&mut self, quiz_id: Uuid) -> Result<SessionState, SessionError> {
        let questions = self.store.quiz_questions(quiz_id)?;
        log::info!("Starting quiz session with {} question(s)", questions.len());
        self.reset(ContentKind::Quiz, questions.into_iter().map(QueueItem::Question).collect());
        Ok(self.state)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Items left in the queue, not counting the presented one
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// The item currently being presented
    pub fn current(&self) -> Option<&Presented> {
        self.current.as_ref()
    }

    /// Grade the presented card, persist its new schedule, and move on.
    ///
    /// Returns the state after advancing: `Presenting` while cards remain,
    /// `Complete` when the queue is exhausted.
    pub fn grade(&mut self, grade: ReviewGrade, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        let item = match self.current.take() {
            Some(item) => item,
            None => return Err(SessionError::NotPresenting),
        };

        let card = match item {
            Presented::Card(card) => card,
            Presented::Question(question) => {
                self.current = Some(Presented::Question(question));
                return Err(SessionError::ExpectedCard);
            }
        };

        let outcome = schedule(&card.state, grade, now);
        if let Err(e) = self
            .store
            .update_schedule(card.card.id, &outcome, card.state.repetitions + 1)
        {
            // Keep the card presented so the grade can be retried
            self.current = Some(Presented::Card(card));
            return Err(e.into());
        }

        let is_correct = grade != ReviewGrade::Again;
        self.record_attempt(AttemptEvent {
            question_id: card.card.id,
            topic: primary_topic(&card.card.tags),
            is_correct,
            difficulty: card.card.difficulty,
        });
        self.note_topics(&card.card.tags);
        self.stats.reviewed += 1;
        if is_correct {
            self.stats.correct += 1;
        }

        self.advance();
        Ok(self.state)
    }

    /// Answer the presented quiz question with a chosen option index.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, SessionError> {
        let item = match self.current.take() {
            Some(item) => item,
            None => return Err(SessionError::NotPresenting),
        };

        let question = match item {
            Presented::Question(question) => question,
            Presented::Card(card) => {
                self.current = Some(Presented::Card(card));
                return Err(SessionError::ExpectedQuestion);
            }
        };

        let is_correct = choice == question.correct_index;
        self.record_attempt(AttemptEvent {
            question_id: question.id,
            topic: primary_topic(&question.tags),
            is_correct,
            difficulty: question.difficulty,
        });
        self.note_topics(&question.tags);
        self.stats.reviewed += 1;
        if is_correct {
            self.stats.correct += 1;
        }

        let feedback = AnswerFeedback {
            is_correct,
            correct_index: question.correct_index,
            explanation: question.explanation,
        };
        self.advance();
        Ok(feedback)
    }

    /// Abandon the session. Already-graded cards keep their new schedule;
    /// everything still queued stays due at its original date.
    pub fn cancel(&mut self) {
        // Nothing to wind down unless items are being presented
        if self.state != SessionState::Presenting {
            return;
        }
        log::info!(
            "Session cancelled with {} item(s) unreviewed",
            self.queue.len() + usize::from(self.current.is_some())
        );
        self.queue.clear();
        self.current = None;
        self.finish();
    }

    fn reset(&mut self, kind: ContentKind, queue: VecDeque<QueueItem>) {
        self.kind = kind;
        self.queue = queue;
        self.current = None;
        self.state = SessionState::Idle;
        self.started = Some(Instant::now());
        self.stats = SessionStats::default();
        self.topics.clear();
        self.session_logged = false;
        self.advance();
    }

    /// Pop the next queue item into presentation, shuffling quiz options
    /// exactly once, or complete the session.
    fn advance(&mut self) {
        match self.queue.pop_front() {
            Some(QueueItem::Card(card)) => {
                self.current = Some(Presented::Card(card));
                self.state = SessionState::Presenting;
            }
            Some(QueueItem::Question(question)) => {
                let shuffled = shuffle_options(&question, &mut self.rng);
                self.current = Some(Presented::Question(shuffled));
                self.state = SessionState::Presenting;
            }
            None => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.state = SessionState::Complete;
        if self.session_logged {
            return;
        }
        self.session_logged = true;

        let duration_ms = self
            .started
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or(0);
        let event = SessionEvent {
            session_type: self.kind,
            duration_ms,
            topics_covered: self.topics.clone(),
        };
        if let Err(e) = self.analytics.log_session(&event) {
            log::warn!("Failed to record session event: {}", e);
        }
    }

    fn record_attempt(&self, event: AttemptEvent) {
        if let Err(e) = self.analytics.log_attempt(&event) {
            log::warn!("Failed to record attempt event: {}", e);
        }
    }

    fn note_topics(&mut self, tags: &[String]) {
        for tag in tags {
            if !self.topics.contains(tag) {
                self.topics.push(tag.clone());
            }
        }
    }
}

fn primary_topic(tags: &[String]) -> String {
    tags.first().cloned().unwrap_or_else(|| "general".to_string())
}
