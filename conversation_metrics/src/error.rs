//! Error types for the metrics engine.
//!
//! Only the embedding boundary and configuration loading can fail. Short
//! histories and zero denominators resolve to sentinel values instead.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by metric computations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Embedding provider '{provider}' failed: {reason}")]
    ProviderFailure { provider: String, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MetricsError {
    /// Build a provider failure for the given provider id.
    pub fn provider(provider: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        MetricsError::ProviderFailure {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

pub type MetricsResult<T> = Result<T, MetricsError>;
