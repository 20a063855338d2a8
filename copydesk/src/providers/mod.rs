//! Chat completion providers.
//!
//! [`ChatProvider`] is the seam between the pipeline runtime and a language
//! model: hand it a message list, get text back. [`GroqClient`] is the
//! shipped implementation; tests script their own.

mod groq;

pub use groq::{GROQ_API_BASE_URL, GROQ_DEFAULT_MODEL, GroqClient};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions framing the conversation.
    System,
    /// The caller's request.
    User,
}

/// One message in a chat completion request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Async interface to a chat completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A short provider name for logs and debug output.
    fn provider_name(&self) -> &str;

    /// The model this provider is configured for.
    fn model(&self) -> &str;

    /// Run one chat completion over `messages` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on auth, rate-limit, network or response-shape
    /// trouble; [`LlmError::is_retryable`] tells the caller whether another
    /// attempt is worthwhile.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// A shared, reference-counted chat provider for use across tasks.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let message = ChatMessage::system("Be brief.");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "system");
        assert_eq!(value["content"], "Be brief.");

        let user = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(user["role"], "user");
    }
}
