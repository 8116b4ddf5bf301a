// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq check` command implementation.
//!
//! Runs one configuration load, the same one `serve` does at startup, and
//! prints what the storefront would run with.

use souq_config::{ConfigError, ConfigLoader, ConfigStore, StorefrontConfig, render_errors};
use souq_core::SouqError;

/// Runs the `souq check` command.
pub fn run_check(loader: &ConfigLoader) -> Result<(), SouqError> {
    let problems = loader.override_problems();
    if !problems.is_empty() {
        eprintln!(
            "{} is ignored, using the environment only:",
            loader.override_path().display()
        );
        render_errors(&problems);
    }

    match check(loader) {
        Ok(report) => {
            println!("{report}");
            Ok(())
        }
        Err(e) => {
            render_errors(std::slice::from_ref(&e));
            Err(e.into())
        }
    }
}

/// Loads the configuration once and returns a printable summary.
///
/// Creates the photo directory as a side effect, like any load.
fn check(loader: &ConfigLoader) -> Result<String, ConfigError> {
    let store = ConfigStore::new();
    loader.load(&store)?;
    match store.current() {
        Some(config) => Ok(summary(loader, &config)),
        None => Err(ConfigError::Other(
            "configuration loaded but no snapshot was stored".to_string(),
        )),
    }
}

fn summary(loader: &ConfigLoader, config: &StorefrontConfig) -> String {
    let override_state = if loader.override_path().is_file() {
        "present"
    } else {
        "absent"
    };
    format!(
        "configuration OK\n  \
         override file: {} ({override_state})\n  \
         bot token:     {}\n  \
         photos dir:    {}\n  \
         catalog file:  {}\n  \
         base url:      {}",
        loader.override_path().display(),
        config.masked_token(),
        config.photos_dir().display(),
        config.catalog_file().display(),
        config.base_url(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use souq_config::EnvSource;

    fn loader_in(dir: &tempfile::TempDir, vars: &[(&str, String)]) -> ConfigLoader {
        ConfigLoader::new(dir.path().join("souq.toml")).with_env(EnvSource::fixed(vars.to_vec()))
    }

    #[test]
    fn check_reports_masked_token_and_creates_photos_dir() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("media").join("photos");
        let loader = loader_in(
            &dir,
            &[
                ("BOT_TOKEN", "1234567890:ABCDEFGHIJ".to_string()),
                ("PHOTOS_DIR", photos.display().to_string()),
            ],
        );

        let report = check(&loader).unwrap();
        assert!(report.starts_with("configuration OK"));
        assert!(report.contains("1234567890..."));
        assert!(!report.contains("ABCDEFGHIJ"));
        assert!(report.contains("(absent)"));
        assert!(photos.is_dir());
    }

    #[test]
    fn check_reads_override_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("souq.toml"),
            format!(
                "bot_token = \"9999999999:override\"\nphotos_dir = \"{}\"\nbase_url = \"https://souq.example\"\n",
                dir.path().join("p").display()
            ),
        )
        .unwrap();
        let loader = loader_in(&dir, &[]);

        let report = check(&loader).unwrap();
        assert!(report.contains("(present)"));
        assert!(report.contains("9999999999..."));
        assert!(report.contains("https://souq.example"));
    }

    #[test]
    fn check_fails_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(
            &dir,
            &[("PHOTOS_DIR", dir.path().join("p").display().to_string())],
        );
        assert!(check(&loader).is_err());
    }
}
