// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors and their miette rendering.
//!
//! Validation produces the errors that fail a load: a missing token, an
//! unusable photo directory, an empty path. Problems inside `souq.toml`
//! are classified by [`override_errors`] and point at the offending line.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Below this Jaro-Winkler score no correction is offered.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// No bot token in the override file or the environment.
    #[error("bot token is missing or empty")]
    #[diagnostic(
        code(souq::config::missing_credential),
        help("set BOT_TOKEN in the environment or `bot_token = \"...\"` in souq.toml")
    )]
    MissingCredential,

    /// The photo directory could not be created.
    #[error("photos directory `{path}` is unavailable: {source}")]
    #[diagnostic(
        code(souq::config::storage_unavailable),
        help("check that the parent directory is writable and `{path}` is not a file")
    )]
    StorageUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A value is present but unusable.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(souq::config::validation))]
    Validation { message: String },

    /// `souq.toml` names a key the storefront does not know.
    #[error("unknown key `{key}` in souq.toml")]
    #[diagnostic(
        code(souq::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), known))
    )]
    UnknownKey {
        /// Dotted key, e.g. `polling.retry_backof_secs`.
        key: String,
        suggestion: Option<String>,
        known: String,
        #[label("not a souq setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A `souq.toml` value has the wrong type.
    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(
        code(souq::config::invalid_type),
        help("remove the line to fall back to the default")
    )]
    InvalidType {
        key: String,
        detail: String,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(souq::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, known: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Known keys here: {known}"),
        None => format!("known keys here: {known}"),
    }
}

/// The override file as read from disk, kept so diagnostics can quote it.
#[derive(Debug, Clone)]
pub struct OverrideFile {
    name: String,
    content: String,
}

impl OverrideFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads `path`. `None` if it cannot be read.
    pub fn read(path: &Path) -> Option<Self> {
        std::fs::read_to_string(path)
            .ok()
            .map(|content| Self::new(path.display().to_string(), content))
    }

    /// Byte offset of the line assigning `key` inside `[table]`, or among
    /// the top-level keys when `table` is `None`.
    pub fn locate(&self, table: Option<&str>, key: &str) -> Option<usize> {
        let mut current: Option<&str> = None;
        let mut offset = 0;
        for line in self.content.split_inclusive('\n') {
            let trimmed = line.trim_start();
            let indent = line.len() - trimmed.len();
            if let Some(header) = trimmed.strip_prefix('[') {
                current = header.split(']').next().map(str::trim);
            } else if current == table && assigns(trimmed, key) {
                return Some(offset + indent);
            }
            offset += line.len();
        }
        None
    }

    fn label(&self, table: Option<&str>, key: &str) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        match self.locate(table, key) {
            Some(at) => (
                Some(SourceSpan::new(at.into(), key.len())),
                Some(NamedSource::new(&self.name, self.content.clone())),
            ),
            None => (None, None),
        }
    }
}

fn assigns(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Classifies why `souq.toml` could not be merged.
///
/// One figment error can carry several failures; each becomes one
/// [`ConfigError`]. With `file` given, unknown keys and wrong types are
/// labelled in the file.
pub fn override_errors(err: figment::Error, file: Option<&OverrideFile>) -> Vec<ConfigError> {
    err.into_iter().map(|error| classify(&error, file)).collect()
}

fn classify(error: &figment::Error, file: Option<&OverrideFile>) -> ConfigError {
    use figment::error::Kind;

    let path: Vec<&str> = error.path.iter().map(String::as_str).collect();
    let label = |table: Option<&str>, key: &str| match file {
        Some(file) => file.label(table, key),
        None => (None, None),
    };

    match &error.kind {
        Kind::UnknownField(key, known) => {
            let table = path.first().copied();
            let (span, src) = label(table, key.as_str());
            ConfigError::UnknownKey {
                key: dotted(table, key),
                suggestion: closest_key(key, known),
                known: known.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) if field == "bot_token" => ConfigError::MissingCredential,
        Kind::MissingField(field) => ConfigError::Validation {
            message: format!("`{field}` is required"),
        },
        Kind::InvalidType(actual, expected) => {
            let (span, src) = match path.split_last() {
                Some((&key, tables)) => label(tables.first().copied(), key),
                None => (None, None),
            };
            ConfigError::InvalidType {
                key: path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

fn dotted(table: Option<&str>, key: &str) -> String {
    match table {
        Some(table) => format!("{table}.{key}"),
        None => key.to_string(),
    }
}

/// Closest known key to `unknown` by Jaro-Winkler similarity.
pub fn closest_key(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|&key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Figment;
    use figment::providers::{Format, Serialized, Toml};

    use crate::model::SouqConfig;

    fn merge(content: &str) -> Vec<ConfigError> {
        let err = Figment::from(Serialized::defaults(SouqConfig::default()))
            .merge(Toml::string(content))
            .extract::<SouqConfig>()
            .unwrap_err();
        override_errors(err, Some(&OverrideFile::new("souq.toml", content)))
    }

    #[test]
    fn misspelled_token_key_is_labelled_and_corrected() {
        let content = "base_url = \"https://shop.example\"\nbot_tken = \"123\"\n";
        let errors = merge(content);

        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                ..
            } => {
                assert_eq!(key, "bot_tken");
                assert_eq!(suggestion.as_deref(), Some("bot_token"));
                let span = span.unwrap();
                assert_eq!(&content[span.offset()..span.offset() + span.len()], "bot_tken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_polling_key_is_qualified() {
        let errors = merge("[polling]\nretry_backof_secs = 3\n");
        assert!(matches!(
            &errors[0],
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "polling.retry_backof_secs"
                    && suggestion.as_deref() == Some("retry_backoff_secs")
        ));
    }

    #[test]
    fn wrong_port_type_points_at_port() {
        let content = "bot_token = \"x\"\n[server]\nport = true\n";
        let errors = merge(content);
        match &errors[0] {
            ConfigError::InvalidType { key, span, .. } => {
                assert_eq!(key, "server.port");
                assert_eq!(span.unwrap().offset(), content.rfind("port").unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_token_field_maps_to_missing_credential() {
        use figment::error::Kind;

        let err = figment::Error::from(Kind::MissingField("bot_token".into()));
        assert!(matches!(
            override_errors(err, None).as_slice(),
            [ConfigError::MissingCredential]
        ));

        let err = figment::Error::from(Kind::MissingField("photos_dir".into()));
        assert!(matches!(
            override_errors(err, None).as_slice(),
            [ConfigError::Validation { .. }]
        ));
    }

    #[test]
    fn locate_respects_tables_and_key_boundaries() {
        let file = OverrideFile::new(
            "souq.toml",
            "port_hint = 1\nport = 1\n[server]\n  port = 2\n",
        );
        assert_eq!(file.locate(None, "port"), Some(14));
        assert_eq!(file.locate(Some("server"), "port"), Some(34));
        assert_eq!(file.locate(Some("polling"), "port"), None);
    }

    #[test]
    fn distant_key_gets_no_suggestion() {
        assert_eq!(closest_key("zzzzzz", &["bot_token", "base_url"]), None);
        assert_eq!(
            closest_key("catalog_fil", &["photos_dir", "catalog_file"]),
            Some("catalog_file".to_string())
        );
    }
}
