// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The product catalog file.
//!
//! The whole catalog is rewritten on every save. There is no temp-file
//! rename, so a crash mid-write can leave a truncated file behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use souq_config::ConfigStore;
use souq_core::SouqError;
use thiserror::Error;
use tracing::{debug, info};

/// One product entry. The catalog schema belongs to the admin page, so
/// records are kept as opaque JSON objects.
pub type ProductRecord = serde_json::Value;

const INDENT: &[u8] = b"    ";

/// Errors from reading or writing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No configuration snapshot is loaded yet.
    #[error("catalog path is not configured")]
    NotConfigured,

    /// Reading or writing the file failed.
    #[error("catalog file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file or the supplied body is not a JSON array of records.
    #[error("catalog is not a JSON array of records: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<CatalogError> for SouqError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotConfigured => SouqError::Config(err.to_string()),
            other => SouqError::storage(other),
        }
    }
}

/// Reads and writes the catalog at the path of the current snapshot.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    config: ConfigStore,
}

impl CatalogStore {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }

    /// Catalog path of the current snapshot, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.config
            .current()
            .map(|snapshot| snapshot.catalog_file().to_path_buf())
    }

    /// Overwrites the catalog with `records`.
    pub async fn write(&self, records: &[ProductRecord]) -> Result<(), CatalogError> {
        let path = self.path().ok_or(CatalogError::NotConfigured)?;
        write_catalog(&path, records).await
    }

    /// Parsed catalog records. A missing file reads as an empty catalog.
    pub async fn read(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        let path = self.path().ok_or(CatalogError::NotConfigured)?;
        read_catalog(&path).await
    }
}

/// Serializes `records` as a 4-space indented JSON array.
///
/// Non-ASCII text is written as-is, not as `\u` escapes.
pub fn encode(records: &[ProductRecord]) -> Result<Vec<u8>, CatalogError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes `records` to `path`, replacing any existing content.
pub async fn write_catalog(path: &Path, records: &[ProductRecord]) -> Result<(), CatalogError> {
    let bytes = encode(records)?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), records = records.len(), "catalog written");
    Ok(())
}

/// Reads the catalog at `path`.
pub async fn read_catalog(path: &Path) -> Result<Vec<ProductRecord>, CatalogError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "catalog file missing, treating as empty");
            Ok(Vec::new())
        }
        Err(source) => Err(CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
