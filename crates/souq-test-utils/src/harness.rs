// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` owns a temp directory laid out like a deployment (photos
//! directory, catalog file, override file) plus the shared config store,
//! session slot, and pending-upload table. The environment is fixed per
//! harness so tests never touch the real process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use souq_config::{ConfigLoader, ConfigStore, EnvSource};
use souq_storage::{CatalogStore, PendingUploads};
use souq_telegram::{Refresher, SessionSlot};
use tempfile::TempDir;

use crate::factory::CountingFactory;

pub struct TestHarness {
    dir: TempDir,
    env: BTreeMap<String, String>,
    pub store: ConfigStore,
    pub slot: SessionSlot,
    pub uploads: PendingUploads,
}

impl TestHarness {
    /// A harness whose environment carries `token` and points the photos
    /// directory and catalog file into the temp directory.
    pub fn new(token: &str) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let mut env = BTreeMap::new();
        env.insert("BOT_TOKEN".to_string(), token.to_string());
        env.insert(
            "PHOTOS_DIR".to_string(),
            dir.path().join("photos").display().to_string(),
        );
        env.insert(
            "JSON_FILE".to_string(),
            dir.path().join("products.json").display().to_string(),
        );
        Ok(Self {
            dir,
            env,
            store: ConfigStore::new(),
            slot: SessionSlot::new(),
            uploads: PendingUploads::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.dir.path().join("photos")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.path().join("products.json")
    }

    pub fn override_path(&self) -> PathBuf {
        self.dir.path().join("souq.toml")
    }

    /// Sets or replaces one environment variable for future loaders.
    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    /// Writes the override file.
    pub fn write_override(&self, content: &str) -> std::io::Result<()> {
        std::fs::write(self.override_path(), content)
    }

    /// A loader over the harness environment and override path.
    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::new(self.override_path()).with_env(EnvSource::Fixed(self.env.clone()))
    }

    /// A counting factory sharing the harness store and uploads.
    pub fn factory(&self) -> Arc<CountingFactory> {
        Arc::new(CountingFactory::new(self.store.clone(), self.uploads.clone()))
    }

    /// A refresher over the current environment, publishing into the harness slot.
    pub fn refresher(&self, factory: Arc<CountingFactory>, interval: Duration) -> Refresher {
        Refresher::new(
            self.loader(),
            self.store.clone(),
            self.slot.clone(),
            factory,
            interval,
        )
    }

    pub fn catalog(&self) -> CatalogStore {
        CatalogStore::new(self.store.clone())
    }
}
