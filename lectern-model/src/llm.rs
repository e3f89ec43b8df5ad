//! The LLM completion trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A chat-completion backend.
///
/// Implementations wrap a specific provider behind a unified async
/// interface. The trait is intentionally non-streaming: the caller
/// receives the full completion text or an error.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_model::{Llm, Message};
///
/// let reply = llm
///     .complete(&[
///         Message::system("You are terse."),
///         Message::user("What is a vector index?"),
///     ])
///     .await?;
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// A human-readable name for the backing model (used in logs).
    fn name(&self) -> &str;

    /// Generate a completion for an ordered sequence of messages.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}
