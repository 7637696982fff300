use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumenError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Serializable classification of a [`LumenError`], carried by failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    UnsupportedInput,
    NotFound,
    Io,
    Encode,
}

impl LumenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LumenError::Decode(_) => ErrorKind::Decode,
            LumenError::UnsupportedInput(_) => ErrorKind::UnsupportedInput,
            LumenError::NotFound(_) => ErrorKind::NotFound,
            LumenError::Io(_) => ErrorKind::Io,
            LumenError::Encode(_) => ErrorKind::Encode,
        }
    }
}

impl From<image::ImageError> for LumenError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => LumenError::Io(e),
            image::ImageError::Encoding(e) => LumenError::Encode(e.to_string()),
            other => LumenError::Decode(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LumenError>;
