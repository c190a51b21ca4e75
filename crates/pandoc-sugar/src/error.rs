//! Error types for pandoc-sugar

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SugarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON read error: {0}")]
    JsonRead(#[from] crate::readers::json::JsonReadError),

    #[error("JSON write error: {0}")]
    JsonWrite(#[from] serde_json::Error),

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

impl SugarError {
    /// Create a structural error from any message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SugarError>;
