//! # lectern-model
//!
//! LLM chat-completion integrations for Lectern.
//!
//! ## Overview
//!
//! This crate provides the [`Llm`] trait — an ordered sequence of chat
//! messages in, a single text completion out — together with:
//!
//! - [`OpenAIChatClient`] — OpenAI and OpenAI-compatible chat APIs
//!   (OpenRouter, Ollama, vLLM, etc.), behind the `openai` feature
//! - [`MockLlm`] — a recording mock for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lectern_model::{Llm, Message, OpenAIChatClient};
//!
//! let llm = OpenAIChatClient::from_env("gpt-4o-mini")?;
//! let reply = llm.complete(&[Message::user("Say hello.")]).await?;
//! ```
//!
//! Completion is deliberately non-streaming: callers in the retrieval
//! pipeline consume the full grounded answer at once.

mod error;
mod llm;
mod message;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use error::{ModelError, Result};
pub use llm::Llm;
pub use message::{Message, Role};
pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::OpenAIChatClient;
