//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies environment overrides. Endpoints and tuning knobs live in
//! the TOML file; secrets are only ever read from the environment.

use std::{env, fs, path::Path};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the listener to.
    pub bind: String,
}

/// Azure OpenAI provider configuration (`[llm.azure]` in the TOML).
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://myresource.openai.azure.com`.
    pub endpoint: String,
    /// Deployment name addressed in the request path.
    pub deployment: String,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Sampling temperature sent with every request.
    pub temperature: f32,
    /// Maximum output tokens per completion.
    pub max_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Completion client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which backend is active (e.g. `"dummy"`, `"azure"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other backend sections can coexist without being loaded.
    pub provider: String,
    /// Config for the Azure OpenAI backend (`[llm.azure]`).
    pub azure: AzureOpenAiConfig,
}

/// Blob storage configuration.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Which backend is active (`"memory"`, `"azure"`).
    pub backend: String,
    /// Blob service endpoint, e.g. `https://myaccount.blob.core.windows.net`.
    pub endpoint: String,
    /// Container holding the documents.
    pub container: String,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub blob: BlobConfig,
    /// API key from `AZURE_OPENAI_KEY` env — never sourced from TOML.
    pub openai_api_key: Option<String>,
    /// SAS token from `AZURE_STORAGE_SAS` env — never sourced from TOML.
    pub storage_sas: Option<String>,
    /// From `AZURE_SEARCH_ENDPOINT` env; reported by diagnostics only.
    pub search_endpoint: Option<String>,
    /// From `AZURE_SEARCH_KEY` env; reported by diagnostics only.
    pub search_key: Option<String>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    blob: RawBlob,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_app_name")]
    app_name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self { app_name: default_app_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    azure: RawAzureOpenAi,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), azure: RawAzureOpenAi::default() }
    }
}

#[derive(Deserialize)]
struct RawAzureOpenAi {
    #[serde(default)]
    endpoint: String,
    #[serde(default = "default_deployment")]
    deployment: String,
    #[serde(default = "default_api_version")]
    api_version: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawAzureOpenAi {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: default_deployment(),
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawBlob {
    #[serde(default = "default_blob_backend")]
    backend: String,
    #[serde(default)]
    endpoint: String,
    #[serde(default = "default_container")]
    container: String,
}

impl Default for RawBlob {
    fn default() -> Self {
        Self {
            backend: default_blob_backend(),
            endpoint: String::new(),
            container: default_container(),
        }
    }
}

fn default_app_name() -> String { "dokbot".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_bind() -> String { "127.0.0.1:3000".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_deployment() -> String { "gpt-4o-mini".to_string() }
fn default_api_version() -> String { "2024-02-01".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 800 }
fn default_timeout_seconds() -> u64 { 30 }
fn default_blob_backend() -> String { "memory".to_string() }
fn default_container() -> String { "documents".to_string() }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Environment values applied on top of the TOML file.
///
/// Collected once in [`load`]; tests construct their own instead of
/// mutating the process environment.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub openai_endpoint: Option<String>,
    pub openai_deployment: Option<String>,
    pub openai_api_key: Option<String>,
    pub blob_endpoint: Option<String>,
    pub storage_sas: Option<String>,
    pub search_endpoint: Option<String>,
    pub search_key: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            log_level: env::var("DOKBOT_LOG_LEVEL").ok(),
            openai_endpoint: env::var("AZURE_OPENAI_ENDPOINT").ok(),
            openai_deployment: env::var("AZURE_OPENAI_DEPLOYMENT").ok(),
            openai_api_key: env::var("AZURE_OPENAI_KEY").ok(),
            blob_endpoint: env::var("AZURE_STORAGE_ENDPOINT").ok(),
            storage_sas: env::var("AZURE_STORAGE_SAS").ok(),
            search_endpoint: env::var("AZURE_SEARCH_ENDPOINT").ok(),
            search_key: env::var("AZURE_SEARCH_KEY").ok(),
        }
    }
}

/// Load config from `path` (default `config/default.toml`), then apply
/// env-var overrides.
pub fn load(path: Option<&Path>) -> Result<Config, AppError> {
    load_from(
        path.unwrap_or_else(|| Path::new("config/default.toml")),
        EnvOverrides::from_env(),
    )
}

/// Internal loader — accepts an explicit path and explicit overrides.
pub fn load_from(path: &Path, env: EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(Config {
        app_name: parsed.service.app_name,
        log_level: env.log_level.unwrap_or(parsed.service.log_level),
        server: ServerConfig { bind: parsed.server.bind },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            azure: AzureOpenAiConfig {
                endpoint: env.openai_endpoint.unwrap_or(parsed.llm.azure.endpoint),
                deployment: env.openai_deployment.unwrap_or(parsed.llm.azure.deployment),
                api_version: parsed.llm.azure.api_version,
                temperature: parsed.llm.azure.temperature,
                max_tokens: parsed.llm.azure.max_tokens,
                timeout_seconds: parsed.llm.azure.timeout_seconds,
            },
        },
        blob: BlobConfig {
            backend: parsed.blob.backend,
            endpoint: env.blob_endpoint.unwrap_or(parsed.blob.endpoint),
            container: parsed.blob.container,
        },
        openai_api_key: env.openai_api_key,
        storage_sas: env.storage_sas,
        search_endpoint: env.search_endpoint,
        search_key: env.search_key,
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, memory blobs, no API keys,
/// no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            app_name: "test".into(),
            log_level: "info".into(),
            server: ServerConfig { bind: "127.0.0.1:0".into() },
            llm: LlmConfig {
                provider: "dummy".into(),
                azure: AzureOpenAiConfig {
                    endpoint: String::new(),
                    deployment: "test-model".into(),
                    api_version: default_api_version(),
                    temperature: 0.0,
                    max_tokens: 16,
                    timeout_seconds: 1,
                },
            },
            blob: BlobConfig {
                backend: "memory".into(),
                endpoint: String::new(),
                container: default_container(),
            },
            openai_api_key: None,
            storage_sas: None,
            search_endpoint: None,
            search_key: None,
        }
    }
}
