//! Fire-and-forget analytics events
//!
//! Review sessions emit one event per graded attempt and one per finished
//! (or abandoned) session. Sinks may fail; callers log and move on, a
//! broken sink never aborts a review.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::content::{ContentKind, Difficulty};

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single graded attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvent {
    pub question_id: Uuid,
    pub topic: String,
    pub is_correct: bool,
    pub difficulty: Difficulty,
}

/// A completed or abandoned review session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub session_type: ContentKind,
    pub duration_ms: u64,
    pub topics_covered: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum EventRecord<'a> {
    Attempt(&'a AttemptEvent),
    Session(&'a SessionEvent),
}

/// Recording boundary for study analytics
pub trait AnalyticsSink: Send + Sync {
    fn log_attempt(&self, event: &AttemptEvent) -> Result<(), AnalyticsError>;
    fn log_session(&self, event: &SessionEvent) -> Result<(), AnalyticsError>;
}

/// Appends one JSON object per line to an events file
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn append(&self, record: &EventRecord) -> Result<(), AnalyticsError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        // Single write keeps the line whole under concurrent appends
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl AnalyticsSink for JsonlSink {
    fn log_attempt(&self, event: &AttemptEvent) -> Result<(), AnalyticsError> {
        self.append(&EventRecord::Attempt(event))
    }

    fn log_session(&self, event: &SessionEvent) -> Result<(), AnalyticsError> {
        self.append(&EventRecord::Session(event))
    }
}

/// Sink that drops every event, for embedding without analytics
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn log_attempt(&self, _event: &AttemptEvent) -> Result<(), AnalyticsError> {
        Ok(())
    }

    fn log_session(&self, _event: &SessionEvent) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn jsonl_sink_appends_tagged_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = JsonlSink::new(path.clone());

        sink.log_attempt(&AttemptEvent {
            question_id: Uuid::new_v4(),
            topic: "biology".into(),
            is_correct: true,
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        sink.log_session(&SessionEvent {
            session_type: ContentKind::Flashcards,
            duration_ms: 1234,
            topics_covered: vec!["biology".into()],
        })
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let attempt: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(attempt["event"], "attempt");
        assert_eq!(attempt["isCorrect"], true);

        let session: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(session["event"], "session");
        assert_eq!(session["sessionType"], "flashcards");
        assert_eq!(session["durationMs"], 1234);
    }
}
