//! The answering step: grounded LLM requests over assembled context.

use std::sync::Arc;

use lectern_model::{Llm, Message, ModelError};
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::context::AssembledContext;
use crate::error::{RagError, Result};

/// The fixed response returned when retrieval produced nothing; the LLM is
/// never called in that case.
pub const NO_SOURCE_ANSWER: &str =
    "No relevant source was found in the indexed corpus for this question.";

/// Default system policy: answer only from the context, cite source labels,
/// admit insufficiency.
pub const DEFAULT_SYSTEM_POLICY: &str = "\
You are a research assistant helping with literature review.
You must answer ONLY from the provided CONTEXT.
If the context does not contain enough information, say so explicitly.

Rules:
- cite the [SOURCE n] labels explicitly whenever you rely on a passage
- do NOT reference any document outside the provided context";

/// Builds grounded-answer requests and returns the model's text.
///
/// Thin orchestration over an [`Llm`]: one system message carrying the
/// grounding policy, one user message carrying context and question.
/// Transient provider failures are retried with exponential backoff here,
/// at the orchestration boundary, never inside core retrieval.
pub struct GroundedAnswerer {
    llm: Arc<dyn Llm>,
    system_policy: String,
    retry: RetryPolicy,
}

impl GroundedAnswerer {
    /// Create an answerer with the default system policy.
    pub fn new(llm: Arc<dyn Llm>, retry: RetryPolicy) -> Self {
        Self { llm, system_policy: DEFAULT_SYSTEM_POLICY.to_string(), retry }
    }

    /// Replace the grounding policy sent as the system message.
    pub fn with_system_policy(mut self, policy: impl Into<String>) -> Self {
        self.system_policy = policy.into();
        self
    }

    /// Request a grounded answer for `question` over `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyContext`] if the context holds no chunks
    /// (callers should short-circuit before reaching this), and
    /// [`RagError::ProviderUnavailable`] once retries are exhausted. A
    /// malformed response surfaces as [`RagError::InvalidResponse`]
    /// immediately; only unreachable-backend failures are retried.
    pub async fn answer(&self, question: &str, context: &AssembledContext) -> Result<String> {
        if context.is_empty() {
            return Err(RagError::EmptyContext);
        }

        let messages = [
            Message::system(&self.system_policy),
            Message::user(format!(
                "CONTEXT:\n\n{}\n\nQUESTION:\n{question}\n\n\
                 Answer in a structured way, citing sources in brackets, \
                 e.g. \"According to [SOURCE 1] ...\".",
                context.text
            )),
        ];

        let mut attempt: u32 = 0;
        loop {
            debug!(model = self.llm.name(), attempt, "requesting grounded answer");
            match self.llm.complete(&messages).await {
                Ok(text) => return Ok(text),
                Err(ModelError::Provider { provider, message })
                    if attempt + 1 < self.retry.max_attempts =>
                {
                    let delay = self.retry.delay_ms(attempt);
                    warn!(
                        provider = %provider,
                        error = %message,
                        attempt,
                        delay_ms = delay,
                        "provider failed, retrying"
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::assemble;
    use crate::document::{Chunk, ChunkMetadata, ScoredChunk};
    use lectern_model::MockLlm;

    fn some_context() -> AssembledContext {
        assemble(&vec![ScoredChunk {
            chunk: Chunk {
                text: "Data governance improves decision quality.".into(),
                metadata: ChunkMetadata {
                    source_file: "a.pdf".into(),
                    page_number: Some(1),
                    chunk_id: 0,
                },
            },
            score: 0.9,
        }])
    }

    #[tokio::test]
    async fn empty_context_short_circuits_without_llm_call() {
        let llm = Arc::new(MockLlm::with_responses(["never used"]));
        let answerer = GroundedAnswerer::new(llm.clone(), RetryPolicy::default());

        let err = answerer
            .answer("anything", &AssembledContext { text: String::new(), citations: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::EmptyContext));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn request_carries_policy_context_and_question() {
        let llm = Arc::new(MockLlm::with_responses(["According to [SOURCE 1] ..."]));
        let answerer = GroundedAnswerer::new(llm.clone(), RetryPolicy::default());

        let answer = answerer.answer("Does governance help?", &some_context()).await.unwrap();
        assert_eq!(answer, "According to [SOURCE 1] ...");

        let request = &llm.recorded_requests()[0];
        assert_eq!(request[0].content, DEFAULT_SYSTEM_POLICY);
        assert!(request[1].content.contains("[SOURCE 1] (file=a.pdf, page=1)"));
        assert!(request[1].content.contains("QUESTION:\nDoes governance help?"));
    }

    /// An [`Llm`] that always returns a malformed-response error,
    /// counting calls.
    struct MalformedLlm {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl lectern_model::Llm for MalformedLlm {
        fn name(&self) -> &str {
            "malformed"
        }

        async fn complete(&self, _messages: &[Message]) -> lectern_model::Result<String> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(ModelError::InvalidResponse {
                provider: "malformed".into(),
                message: "response contained no choices".into(),
            })
        }
    }

    #[tokio::test]
    async fn malformed_response_is_not_retried() {
        let llm = Arc::new(MalformedLlm { calls: std::sync::atomic::AtomicUsize::new(0) });
        let answerer = GroundedAnswerer::new(llm.clone(), RetryPolicy::default());

        let err = answerer.answer("q", &some_context()).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidResponse { .. }));
        assert_eq!(llm.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_provider_unavailable() {
        tokio::time::pause();
        let llm = Arc::new(MockLlm::new());
        let retry = RetryPolicy { max_attempts: 3, initial_delay_ms: 1, max_delay_ms: 2 };
        let answerer = GroundedAnswerer::new(llm.clone(), retry);

        let ctx = some_context();
        let fut = answerer.answer("q", &ctx);
        let err = fut.await.unwrap_err();
        assert!(matches!(err, RagError::ProviderUnavailable { .. }));
        assert_eq!(llm.call_count(), 3);
    }
}
