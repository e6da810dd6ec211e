//! Model endpoint access and reply JSON extraction.

pub mod gateway;
pub mod json;

#[cfg(test)]
pub use gateway::MockLlmGateway;
pub use gateway::{ChatMessage, LlmGateway, OpenAiCompatClient, Role};
