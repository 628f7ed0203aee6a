//! Completion backends for Portachat.

pub mod openai_completion;

pub use openai_completion::OpenAiCompletionService;
