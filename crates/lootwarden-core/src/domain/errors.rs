//! Errors - エラー型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LootError {
    /// A collaborator (item source, rule store, ...) failed.
    #[error("{port} failed: {message}")]
    Port {
        port: &'static str,
        message: String,
    },

    #[error("command dispatch failed: {0}")]
    Dispatch(String),

    #[error("duplicate event handler '{0}'")]
    DuplicateHandler(String),

    #[error("event handler '{name}' failed: {message}")]
    Handler { name: String, message: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LootError {
    pub fn port(port: &'static str, message: impl Into<String>) -> Self {
        LootError::Port {
            port,
            message: message.into(),
        }
    }

    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        LootError::Handler {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LootError>;
