use async_trait::async_trait;

use crate::openai::OpenAiClientError;

/// A text-completion backend: one prompt in, the raw completion text out.
///
/// Implemented by [`crate::openai::OpenAiClient`]; services hold it as
/// `Arc<dyn CompletionClient>` so tests can swap in a canned backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OpenAiClientError>;

    /// Model identifier, used for logging only.
    fn model(&self) -> &str;
}
