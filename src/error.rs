//! Application-wide error types.
//!
//! Everything that crosses a module boundary is an [`AppError`]; provider
//! failures keep their own [`ProviderError`](crate::llm::ProviderError) type
//! and fold in via `#[from]`. At the request boundary all of these collapse
//! to an HTTP 500 with the raw message in the body.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("storage verification failed: {0}")]
    StorageVerification(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("blob error: {0}")]
    Blob(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn validation_error_display() {
        let e = AppError::Validation("no file uploaded".into());
        assert!(e.to_string().contains("no file uploaded"));
    }

    #[test]
    fn provider_error_converts_transparently() {
        let e: AppError = ProviderError::Request("boom".into()).into();
        // Transparent: the provider message is the whole display.
        assert_eq!(e.to_string(), "provider request failed: boom");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
