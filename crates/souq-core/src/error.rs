// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by the Souq crates.

use thiserror::Error;

/// The primary error type used across the bot transport and storage layers.
#[derive(Debug, Error)]
pub enum SouqError {
    /// Configuration errors surfaced outside the config crate (missing token, bad value).
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog or photo storage errors (file IO, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging backend errors (network failure, revoked token, malformed reply).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SouqError {
    /// Wraps any error as a [`SouqError::Storage`].
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SouqError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds a [`SouqError::Transport`] with a message and no source.
    pub fn transport(message: impl Into<String>) -> Self {
        SouqError::Transport {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for SouqError {
    fn from(err: std::io::Error) -> Self {
        SouqError::storage(err)
    }
}
