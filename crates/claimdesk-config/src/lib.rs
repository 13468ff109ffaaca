// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claimdesk configuration.
//!
//! TOML files and `CLAIMDESK_*` environment variables are layered with
//! figment, every section rejects unknown keys, and failures come back as
//! miette diagnostics pointing at the offending line.
//!
//! ```no_run
//! use claimdesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("monolith: {}", config.services.monolith_url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AgentConfig, ClaimsConfig, DeskConfig, RemindersConfig, ServicesConfig};

use std::path::Path;

/// Loads the standard hierarchy and validates the result.
pub fn load_and_validate() -> Result<DeskConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::config_files()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Loads one file (plus environment overrides) and validates the result.
pub fn load_and_validate_path(path: &Path) -> Result<DeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads a TOML string over the defaults and validates the result.
pub fn load_and_validate_str(toml_content: &str) -> Result<DeskConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validates a loaded config, or converts the load error into diagnostics.
///
/// `sources` is only read on failure, to resolve error spans.
fn checked<F>(
    loaded: Result<DeskConfig, figment::Error>,
    sources: F,
) -> Result<DeskConfig, Vec<ConfigError>>
where
    F: FnOnce() -> Vec<(String, String)>,
{
    match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// A file's display name and contents, if it can be read. Relative paths
/// are resolved against the working directory so they match figment's
/// metadata.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = if path.is_relative() {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };
    Some((name.display().to_string(), content))
}
