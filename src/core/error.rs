// Copyright @yucwang 2026

use thiserror::Error;

/// Construction-time configuration problems. Always fatal; the offending
/// key is part of the message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("unknown value '{value}' for '{key}'")]
    UnknownValue { key: String, value: String },
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue { key: String, value: String, reason: String },
    #[error("'{key}' refers to missing {kind} #{index}")]
    DanglingReference { key: String, kind: &'static str, index: usize },
}

impl ConfigError {
    pub fn missing(key: &str) -> Self {
        ConfigError::MissingField(key.to_string())
    }

    pub fn unknown(key: &str, value: &str) -> Self {
        ConfigError::UnknownValue { key: key.to_string(), value: value.to_string() }
    }

    pub fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue { key: key.to_string(), value: value.to_string(), reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unimplemented transport: {0}")]
    UnimplementedStrategy(String),
    #[error("sensor #{0} does not exist")]
    MissingSensor(usize),
    #[error("integrator sample layout was built for another sensor than '{0}'")]
    SampleLayoutMismatch(String),
    #[error("render workers stopped before all blocks were returned")]
    WorkerDisconnected,
    #[error("failed to emit sensor signal: {0}")]
    Emit(String),
}
