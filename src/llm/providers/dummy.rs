//! Dummy completion provider — echoes the last user message back prefixed
//! with `[echo]`. Records the most recent request so tests can assert on
//! the exact message list sent downstream, without a real API key.

use std::sync::{Arc, Mutex};

use crate::llm::{ChatMessage, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    last_request: Arc<Mutex<Option<Vec<ChatMessage>>>>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError> {
        *self
            .last_request
            .lock()
            .map_err(|_| ProviderError::Request("dummy provider lock poisoned".into()))? =
            Some(messages.to_vec());

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("");

        Ok(ChatMessage::new("assistant", format!("[echo] {last_user}")))
    }

    /// The message list captured by the most recent `complete` call.
    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}
