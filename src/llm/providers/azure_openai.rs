//! Azure OpenAI chat-completion provider.
//!
//! Adapter for the deployment-scoped `chat/completions` REST endpoint.
//! All wire types are private to this module — callers only ever see
//! [`ChatMessage`]. The provider is stateless: one round-trip per call,
//! history management is the caller's responsibility.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::config::AzureOpenAiConfig;
use crate::llm::{ChatMessage, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for an Azure OpenAI deployment.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally. Credentials are validated at
/// construction: a missing endpoint or API key fails here, not on the
/// first request.
#[derive(Debug, Clone)]
pub struct AzureOpenAiProvider {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl AzureOpenAiProvider {
    /// Build a provider from config values and the API key.
    ///
    /// The key is sent as an `api-key` header on every request.
    pub fn new(config: &AzureOpenAiConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        if config.endpoint.is_empty() {
            return Err(ProviderError::Credentials("AZURE_OPENAI_ENDPOINT is not set".into()));
        }
        let api_key =
            api_key.ok_or_else(|| ProviderError::Credentials("AZURE_OPENAI_KEY is not set".into()))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version,
        );

        Ok(Self {
            client,
            url,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Send the finished message list and return the top choice's message.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ProviderError> {
        let payload = ChatCompletionRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            message_count = messages.len(),
            temperature = payload.temperature,
            max_tokens = payload.max_tokens,
            "sending completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full completion request payload");
        }

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize completion response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received completion response");

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ProviderError::Request("no choices in response".into()))?;

        let content = message
            .content
            .ok_or_else(|| ProviderError::Request("missing content in response message".into()))?;

        Ok(ChatMessage { role: message.role, content })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default = "default_assistant_role")]
    role: String,
    #[serde(default)]
    content: Option<String>,
}

fn default_assistant_role() -> String {
    "assistant".to_string()
}

// Error envelope used by the Azure OpenAI API.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "completion request returned HTTP error");
    Err(ProviderError::Request(message))
}
