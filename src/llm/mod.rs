//! Completion client abstraction.
//!
//! `CompletionProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency;
//! the `complete` method is `async fn` on the enum itself.
//!
//! The enum layer owns prompt assembly: every request gets the fixed persona
//! system message prepended, and document text (when supplied) is spliced
//! into that system message under [`CONTEXT_HEADING`]. Backends only ever
//! see a finished message list. Full history is re-sent on every call;
//! nothing is streamed and no state is held between calls.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persona prepended to every completion request.
pub const SYSTEM_PROMPT: &str =
    "Du er en hjelpsom assistent. Du svarer på norsk og er alltid høflig og presis.";

/// Heading that introduces spliced document text in the system prompt.
pub const CONTEXT_HEADING: &str = "Dokumentkontekst:";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("missing credentials: {0}")]
    Credentials(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// One entry in a conversation, as sent to and received from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

/// Build the system message, splicing `context` in under the document
/// heading, delimited from the persona by a blank line.
pub fn system_message(context: Option<&str>) -> ChatMessage {
    let content = match context {
        Some(ctx) => format!("{SYSTEM_PROMPT}\n\n{CONTEXT_HEADING}\n{ctx}"),
        None => SYSTEM_PROMPT.to_string(),
    };
    ChatMessage::new("system", content)
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum CompletionProvider {
    Dummy(providers::dummy::DummyProvider),
    AzureOpenAi(providers::azure_openai::AzureOpenAiProvider),
}

impl CompletionProvider {
    /// Send `history` to the provider with the persona system message
    /// prepended; `context` is document text spliced into the system prompt.
    /// Returns the provider's single top-choice message.
    pub async fn complete(
        &self,
        history: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<ChatMessage, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(system_message(context));
        messages.extend_from_slice(history);

        match self {
            CompletionProvider::Dummy(p) => p.complete(&messages).await,
            CompletionProvider::AzureOpenAi(p) => p.complete(&messages).await,
        }
    }
}
