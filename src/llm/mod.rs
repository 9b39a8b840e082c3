//! External collaborator contracts and the Azure OpenAI client

pub mod azure;
pub mod extraction;
pub mod prompts;
pub mod types;

use async_trait::async_trait;

pub use azure::AzureOpenAi;
pub use extraction::ConfirmIntent;
pub use extraction::Extraction;
pub use extraction::FieldExtractor;
pub use types::ChatMessage;
pub use types::CompletionRequest;

use crate::errors::Result;

/// Maps text to a fixed-length numeric vector
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Chat-completion collaborator
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
