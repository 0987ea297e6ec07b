//! Completion provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod azure_openai;
pub mod dummy;

use crate::config::LlmConfig;
use crate::llm::{CompletionProvider, ProviderError};

/// Construct a `CompletionProvider` from config and an optional API key.
///
/// `api_key` is sourced from `AZURE_OPENAI_KEY` env (never TOML) and is
/// `None` for the keyless dummy backend.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<CompletionProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(CompletionProvider::Dummy(dummy::DummyProvider::new())),
        "azure" | "azure-openai" => {
            let p = azure_openai::AzureOpenAiProvider::new(&config.azure, api_key)?;
            Ok(CompletionProvider::AzureOpenAi(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
