// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HostingConfig {
    /// Root directory holding one subdirectory per tenant site.
    #[serde(default = "default_sites_root")]
    pub sites_root: PathBuf,
    /// YAML file holding the persisted site records.
    #[serde(default = "default_sites_file")]
    pub sites_file: PathBuf,
    #[serde(default)]
    pub password: Argon2ParamsConfig,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            sites_root: default_sites_root(),
            sites_file: default_sites_file(),
            password: Argon2ParamsConfig::default(),
        }
    }
}

fn default_sites_root() -> PathBuf {
    PathBuf::from("sites")
}

fn default_sites_file() -> PathBuf {
    PathBuf::from("sites.yaml")
}

// Optional overrides; anything unset falls back to DEFAULT_ARGON2_PARAMS.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Argon2ParamsConfig {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
    #[serde(default)]
    pub output_len: Option<u32>,
    #[serde(default)]
    pub salt_len: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub output_len: u32,
    pub salt_len: u32,
}

pub const DEFAULT_ARGON2_PARAMS: Argon2Params = Argon2Params {
    memory_kib: 65536,
    iterations: 2,
    parallelism: 1,
    output_len: 32,
    salt_len: 16,
};

impl Argon2ParamsConfig {
    pub fn resolve(&self) -> Argon2Params {
        let defaults = DEFAULT_ARGON2_PARAMS;
        Argon2Params {
            memory_kib: self.memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            parallelism: self.parallelism.unwrap_or(defaults.parallelism),
            output_len: self.output_len.unwrap_or(defaults.output_len),
            salt_len: self.salt_len.unwrap_or(defaults.salt_len),
        }
    }
}

impl HostingConfig {
    pub fn password_params(&self) -> Argon2Params {
        self.password.resolve()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sites_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "sites_root must not be empty".to_string(),
            ));
        }
        if self.sites_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "sites_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a YAML file. A missing file yields the defaults
/// so a fresh install can start without any configuration on disk.
pub fn load_config(path: &Path) -> Result<HostingConfig, ConfigError> {
    if !path.exists() {
        warn!(
            "Configuration file {} not found; using defaults",
            path.display()
        );
        return Ok(HostingConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|err| ConfigError::LoadError(format!("Failed to read config file: {}", err)))?;
    let config: HostingConfig = serde_yaml::from_str(&content)
        .map_err(|err| ConfigError::LoadError(format!("Failed to parse config file: {}", err)))?;
    config.validate()?;
    Ok(config)
}
