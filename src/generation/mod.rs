//! Content generation pipeline
//!
//! This module provides:
//! - The [`TextGenerator`] seam over a pluggable AI backend, with an
//!   OpenAI-compatible HTTP implementation
//! - Prompt construction with a bounded source-text budget
//! - Strict validation/sanitization of AI output into drafts
//! - The orchestrator tying prompt, call, retry and validation together

pub mod orchestrator;
pub mod prompts;
pub mod provider;
pub mod validator;

pub use orchestrator::{GenerationError, Orchestrator};
pub use provider::{CompletionRequest, HttpTextGenerator, ProviderError, TextGenerator};
pub use validator::{validate, ValidateError};
