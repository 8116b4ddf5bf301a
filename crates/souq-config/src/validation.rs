// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express (non-empty token and paths)
//! and makes sure the photo directory exists before a snapshot is built.

use std::path::Path;

use tracing::info;

use crate::diagnostic::ConfigError;
use crate::model::SouqConfig;

/// Validate a merged configuration for semantic correctness.
///
/// The credential is checked first so a missing token is always reported as
/// [`ConfigError::MissingCredential`].
pub fn validate_config(config: &SouqConfig) -> Result<(), ConfigError> {
    if config.bot_token.trim().is_empty() {
        return Err(ConfigError::MissingCredential);
    }

    if config.photos_dir.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "photos_dir must not be empty".to_string(),
        });
    }

    if config.catalog_file.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "catalog_file must not be empty".to_string(),
        });
    }

    Ok(())
}

/// Creates `dir` (and missing parents) unless it already is a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir).map_err(|source| ConfigError::StorageUnavailable {
        path: dir.display().to_string(),
        source,
    })?;
    info!(path = %dir.display(), "created photos directory");
    Ok(())
}
