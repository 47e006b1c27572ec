//! Concrete LLM provider implementations
//!
//! This module contains implementations of the LLMProvider trait.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};
