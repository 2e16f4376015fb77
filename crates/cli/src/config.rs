// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles optfuzz.toml parsing with version validation and unknown key
//! warnings. All fields are optional; defaults preserve the stock
//! behavior (worker count from the CPU, budgets from FUZZ_MODE).

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file name searched for in the current directory.
pub const CONFIG_FILE_NAME: &str = "optfuzz.toml";

/// Config with flexible parsing that captures unknown keys.
#[derive(Deserialize)]
struct FlexibleConfig {
    version: i64,

    #[serde(flatten)]
    unknown: std::collections::BTreeMap<String, toml::Value>,
}

/// Full configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    /// Worker pool size override (default: per-mode).
    #[serde(default)]
    pub workers: Option<usize>,

    /// Budget multiplier override. Takes precedence over FUZZ_MODE.
    #[serde(default)]
    pub budget_scale: Option<f64>,

    /// Extra directory-mode block-list entries (basenames).
    #[serde(default)]
    pub block_list: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            workers: None,
            budget_scale: None,
            block_list: Vec::new(),
        }
    }
}

/// Known top-level keys for unknown-key warnings.
const KNOWN_KEYS: &[&str] = &["version", "workers", "budget_scale", "block_list"];

/// Load configuration from a file, warning on unknown keys.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("cannot read config: {}", e),
        path: Some(path.to_path_buf()),
    })?;

    let flexible: FlexibleConfig = toml::from_str(&content).map_err(|e| Error::Config {
        message: format!("invalid toml: {}", e),
        path: Some(path.to_path_buf()),
    })?;

    if flexible.version != 1 {
        return Err(Error::Config {
            message: format!("unsupported config version: {}", flexible.version),
            path: Some(path.to_path_buf()),
        });
    }

    for key in flexible.unknown.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            eprintln!("optfuzz: warning: unknown config key '{}'", key);
        }
    }

    let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
        message: format!("invalid config: {}", e),
        path: Some(path.to_path_buf()),
    })?;

    if let Some(scale) = config.budget_scale
        && (!scale.is_finite() || scale < 0.0)
    {
        return Err(Error::Config {
            message: format!("budget_scale must be a non-negative number, got {}", scale),
            path: Some(path.to_path_buf()),
        });
    }

    if config.workers == Some(0) {
        return Err(Error::Config {
            message: "workers must be at least 1".into(),
            path: Some(path.to_path_buf()),
        });
    }

    Ok(config)
}

/// Resolve the config: an explicit path must load; otherwise look for
/// optfuzz.toml in the current directory, falling back to defaults.
pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Config> {
    match explicit {
        Some(path) => load(path),
        None => {
            let candidate = cwd.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("loading config from {}", candidate.display());
                load(&candidate)
            } else {
                tracing::debug!("no config found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
