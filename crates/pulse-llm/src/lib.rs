//! Chat-completion abstraction used by pulse to produce analysis narratives
//!
//! This crate provides provider-agnostic abstractions for talking to a chat
//! model. It includes:
//!
//! - Message types for a conversation
//! - Completion request/response types
//! - The [`LLMProvider`] trait
//! - An OpenAI-compatible provider (behind the `openai` feature), which is
//!   what Groq exposes

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
