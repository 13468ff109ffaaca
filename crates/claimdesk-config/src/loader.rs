// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Files are merged lowest priority first: `/etc/claimdesk/claimdesk.toml`,
//! then the user config directory, then `./claimdesk.toml`. `CLAIMDESK_*`
//! environment variables override all of them.

#![allow(clippy::result_large_err)] // figment::Error is not ours to box

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DeskConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/claimdesk/claimdesk.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "claimdesk.toml";

/// Sections that environment keys are split on.
const SECTIONS: [&str; 4] = ["agent", "services", "claims", "reminders"];

/// Every configuration file consulted, lowest priority first. Files that do
/// not exist are skipped when merging.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    files.extend(user_config_path());
    files.push(PathBuf::from(LOCAL_CONFIG_FILE));
    files
}

/// Loads the full hierarchy plus environment overrides.
pub fn load_config() -> Result<DeskConfig, figment::Error> {
    build_figment().extract()
}

/// Loads defaults overlaid with a TOML string. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<DeskConfig, figment::Error> {
    Figment::from(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads one explicit file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskConfig, figment::Error> {
    Figment::from(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

pub fn build_figment() -> Figment {
    config_files()
        .into_iter()
        .fold(
            Figment::from(Serialized::defaults(DeskConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// `claimdesk/claimdesk.toml` under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("claimdesk").join(LOCAL_CONFIG_FILE))
}

/// `CLAIMDESK_SERVICES_MONOLITH_URL` maps to `services.monolith_url`.
///
/// Keys contain underscores, so only the first one after a known section name
/// becomes a dot.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("CLAIMDESK_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or(key)
            .into()
    })
}
