pub mod client;

pub use client::{AiConfig, ChatMessage, ChatRole, CompletionClient, CompletionRequest, OpenAiClient};
