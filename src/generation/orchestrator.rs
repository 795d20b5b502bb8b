//! Generation orchestration
//!
//! Turns a [`GenerationRequest`] into validated drafts: build prompts,
//! invoke the AI capability once under the caller's timeout, validate.
//! Malformed output earns exactly one retry with the same prompt; the
//! operation is interactive, so there is no backoff and no retry loop.
//! Provider failures and timeouts fail immediately.
//!
//! At most one request is in flight per orchestrator: a newer `generate`
//! supersedes an older one instead of queuing behind it, which is what
//! the "regenerate" button means.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::content::{ContentKind, GeneratedContent, GenerationRequest};

use super::prompts;
use super::provider::{CompletionRequest, ProviderError, TextGenerator};
use super::validator::{validate, ValidateError};

#[derive(Error, Debug)]
pub enum GenerationError {
    /// Network or provider failure; not assumed transient, never retried
    #[error("provider failure: {0}")]
    Provider(#[from] ProviderError),

    /// The AI call outlived the caller-supplied budget
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Two consecutive responses failed validation
    #[error("invalid response after retry: {0}")]
    InvalidResponse(ValidateError),

    /// Valid JSON, zero usable items. Not the same as success with zero
    /// items requested.
    #[error("generation produced no usable items")]
    EmptyResult,

    /// A newer generation request replaced this one
    #[error("superseded by a newer generation request")]
    Superseded,

    /// The request asked for a kind the pipeline cannot produce
    #[error("content kind {0:?} cannot be generated")]
    UnsupportedKind(ContentKind),
}

/// Drives generation requests through a pluggable AI capability
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    ticket: AtomicU64,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            ticket: AtomicU64::new(0),
        }
    }

    /// Generate and validate content for one request.
    ///
    /// `budget` bounds each individual AI call; on timeout the request
    /// fails like a provider error, without retry.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        budget: Duration,
    ) -> Result<GeneratedContent, GenerationError> {
        let system_prompt = prompts::system_prompt(request.kind)
            .ok_or(GenerationError::UnsupportedKind(request.kind))?;

        let completion = CompletionRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: prompts::user_prompt(request),
            provider: request.provider.clone(),
            model: request.model.clone(),
        };

        let my_ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;

        match self.attempt(&completion, request.kind, my_ticket, budget).await {
            Err(GenerationError::InvalidResponse(e)) if e.is_malformed() => {
                log::warn!("Response failed validation ({}), retrying once", e);
                self.attempt(&completion, request.kind, my_ticket, budget)
                    .await
            }
            outcome => outcome,
        }
    }

    async fn attempt(
        &self,
        completion: &CompletionRequest,
        kind: ContentKind,
        my_ticket: u64,
        budget: Duration,
    ) -> Result<GeneratedContent, GenerationError> {
        let raw = self.call(completion, budget).await?;
        if self.superseded(my_ticket) {
            return Err(GenerationError::Superseded);
        }

        match validate(&raw, kind) {
            Ok(content) => {
                log::info!("Generated {} {:?} item(s)", content.len(), kind);
                Ok(content)
            }
            Err(ValidateError::Empty) => Err(GenerationError::EmptyResult),
            Err(e) => Err(GenerationError::InvalidResponse(e)),
        }
    }

    async fn call(
        &self,
        completion: &CompletionRequest,
        budget: Duration,
    ) -> Result<String, GenerationError> {
        match tokio::time::timeout(budget, self.generator.complete(completion)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GenerationError::Timeout(budget)),
        }
    }

    fn superseded(&self, my_ticket: u64) -> bool {
        self.ticket.load(Ordering::SeqCst) != my_ticket
    }
}
