//! Error types shared by the on-call sync crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Transport error talking to {service}: {message}")]
    Transport { service: String, message: String },

    #[error("{service} API returned status {status}: {body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SyncError {
    pub fn transport(service: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Transport {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        SyncError::Decode(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration(message.into())
    }
}
