use async_trait::async_trait;

use crate::llm_types::{ChatMessage, Completion, CompletionOptions};
use crate::Result;

/// A single chat-completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Identity reported alongside routed completions
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion>;
}
