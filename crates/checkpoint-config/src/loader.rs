// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./checkpoint.toml` > `~/.config/checkpoint/checkpoint.toml`
//! > `/etc/checkpoint/checkpoint.toml` with environment variable overrides via
//! `CHECKPOINT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CheckpointConfig;

const SYSTEM_CONFIG: &str = "/etc/checkpoint/checkpoint.toml";
const LOCAL_CONFIG: &str = "checkpoint.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/checkpoint/checkpoint.toml` (system-wide)
/// 3. `~/.config/checkpoint/checkpoint.toml` (user XDG config)
/// 4. `./checkpoint.toml` (local directory)
/// 5. `CHECKPOINT_*` environment variables
pub fn load_config() -> Result<CheckpointConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CheckpointConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CheckpointConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CheckpointConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CheckpointConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CheckpointConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Paths searched by [`load_config`], most specific last.
pub fn config_search_paths() -> Vec<std::path::PathBuf> {
    let mut paths = vec![std::path::PathBuf::from(SYSTEM_CONFIG)];
    if let Some(user) = user_config_path() {
        paths.push(user);
    }
    paths.push(std::path::PathBuf::from(LOCAL_CONFIG));
    paths
}

fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("checkpoint/checkpoint.toml"))
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CHECKPOINT_DOMAINS_ENTRY_BAN_CACHE_TTL_SECS` must become
/// `domains.entry_ban.cache_ttl_secs`.
fn env_provider() -> Env {
    Env::prefixed("CHECKPOINT_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(raw: &str) -> String {
    const DOMAINS: [&str; 5] = [
        "entry_ban",
        "inn",
        "patent",
        "work_permit",
        "residence_permit",
    ];
    const SECTIONS: [&str; 4] = ["service", "server", "cache", "legislation"];

    let key = raw.to_ascii_lowercase();

    if let Some(rest) = key.strip_prefix("domains_") {
        for domain in DOMAINS {
            if let Some(field) = rest
                .strip_prefix(domain)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("domains.{domain}.{field}");
            }
        }
        return format!("domains.{rest}");
    }

    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }

    key
}
