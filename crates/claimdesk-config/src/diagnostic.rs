// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment errors are turned into [`ConfigError`]s that miette can render
//! with the offending line of `claimdesk.toml` highlighted and, for misspelt
//! keys, the closest valid key suggested.

#![allow(unused_assignments)] // emitted by miette's Diagnostic derive

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A single configuration problem.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(claimdesk::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a claimdesk setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(claimdesk::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing key `{key}` in [{section}]")]
    #[diagnostic(
        code(claimdesk::config::missing_key),
        help("set `{key}` under [{section}] in claimdesk.toml")
    )]
    MissingKey { key: String, section: String },

    /// A value that parsed but makes no sense, e.g. a non-http service URL.
    #[error("{message}")]
    #[diagnostic(code(claimdesk::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(claimdesk::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? (expected one of: {valid_keys})"),
        None => format!("expected one of: {valid_keys}"),
    }
}

impl ConfigError {
    fn from_figment(error: &figment::Error, sources: &[(String, String)]) -> Self {
        use figment::error::Kind;

        let section = section_name(&error.path);
        match &error.kind {
            Kind::UnknownField(key, expected) => {
                let (span, src) = match source_for(error, sources) {
                    Some((name, content)) => match locate_key(content, &error.path, key) {
                        Some(offset) => (
                            Some(SourceSpan::new(offset.into(), key.len())),
                            Some(NamedSource::new(name, content.to_string())),
                        ),
                        None => (None, None),
                    },
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key: key.clone(),
                    section,
                    suggestion: suggest_key(key, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(key) => ConfigError::MissingKey {
                key: key.to_string(),
                section,
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

/// Converts every error carried by a figment failure.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::from_figment(&error, toml_sources))
        .collect()
}

fn section_name(path: &[String]) -> String {
    path.first().cloned().unwrap_or_else(|| "root".to_string())
}

/// The TOML source an error came from. Inline sources carry no file
/// metadata, so a single candidate is assumed to be the one.
fn source_for<'a>(
    error: &figment::Error,
    sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let found = match file {
        Some(file) => sources.iter().find(|(name, _)| *name == file),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };
    found.map(|(name, content)| (name.as_str(), content.as_str()))
}

/// Byte offset of `key` inside the `[section]` named by the first element of
/// `path`, or in the top level when `path` is empty.
pub fn locate_key(content: &str, path: &[String], key: &str) -> Option<usize> {
    let body_start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = body_start;
    for line in content[body_start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        if rest.starts_with('[') {
            break;
        }
        if let Some(after) = rest.strip_prefix(key) {
            if after.trim_start().starts_with('=') {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
}
