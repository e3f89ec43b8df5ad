//! A recording mock LLM for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::llm::Llm;
use crate::message::Message;

/// A mock [`Llm`] that returns canned responses and records every request.
///
/// Responses are consumed in order; once exhausted, the last response is
/// repeated. With no responses configured, every call fails with
/// [`ModelError::Provider`], which makes the mock double as an
/// unavailable-backend stand-in.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_model::{Llm, Message, MockLlm};
///
/// let llm = MockLlm::with_responses(["grounded answer [SOURCE 1]"]);
/// let reply = llm.complete(&[Message::user("q")]).await?;
/// assert_eq!(llm.call_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLlm {
    responses: Vec<String>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Create a mock with no responses (every call errors).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that replies with the given responses in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }

    /// All message sequences received so far, in call order.
    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let mut requests = self.requests.lock().expect("mock lock poisoned");
        requests.push(messages.to_vec());
        let call_index = requests.len() - 1;
        drop(requests);

        match self.responses.get(call_index).or_else(|| self.responses.last()) {
            Some(response) => Ok(response.clone()),
            None => Err(ModelError::Provider {
                provider: "mock".into(),
                message: "no canned response configured".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_responses_in_order_then_repeats_last() {
        let llm = MockLlm::with_responses(["first", "second"]);
        assert_eq!(llm.complete(&[Message::user("a")]).await.unwrap(), "first");
        assert_eq!(llm.complete(&[Message::user("b")]).await.unwrap(), "second");
        assert_eq!(llm.complete(&[Message::user("c")]).await.unwrap(), "second");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn empty_mock_reports_provider_error() {
        let llm = MockLlm::new();
        let err = llm.complete(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, ModelError::Provider { .. }));
    }
}
