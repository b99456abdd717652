//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An operator with this symbol is already registered
    #[error("Operator already registered: {0}")]
    DuplicateOperator(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    Runtime(#[from] fusebox_runtime::RuntimeError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] fusebox_core::CoreError),

    /// Configuration source error
    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
