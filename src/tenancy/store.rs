// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::types::{SitesData, TenancyError, YamlSitesData};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait SiteStore: Send + Sync {
    fn load(&self) -> Result<SitesData, TenancyError>;
    fn save(&self, sites: &SitesData) -> Result<(), TenancyError>;
}

pub struct FileSiteStore {
    sites_file: PathBuf,
}

impl FileSiteStore {
    pub fn new(sites_file: PathBuf) -> Result<Self, TenancyError> {
        if sites_file.as_os_str().is_empty() {
            return Err(TenancyError::ConfigurationError(
                "Sites file path is empty".to_string(),
            ));
        }

        Ok(Self { sites_file })
    }

    fn parse_sites(content: &str) -> Result<SitesData, TenancyError> {
        let yaml_sites: YamlSitesData = serde_yaml::from_str(content)
            .map_err(|e| TenancyError::ParseError(format!("Failed to parse sites file: {}", e)))?;

        let mut sites_data = SitesData::new();
        for (username, yaml_site) in yaml_sites {
            sites_data.insert(username.clone(), yaml_site.into_site(username));
        }

        Ok(sites_data)
    }

    fn serialize_sites(sites_data: &SitesData) -> Result<String, TenancyError> {
        // BTreeMap keeps the on-disk record order stable across saves.
        let yaml_sites: YamlSitesData = sites_data
            .iter()
            .map(|(username, site)| (username.clone(), site.to_record()))
            .collect();

        serde_yaml::to_string(&yaml_sites)
            .map_err(|e| TenancyError::ParseError(format!("Failed to serialize sites: {}", e)))
    }

    fn write_sites_file(&self, content: &str) -> Result<(), TenancyError> {
        let parent = self.sites_file.parent().ok_or_else(|| {
            TenancyError::FileError("Sites file path has no parent directory".to_string())
        })?;
        let file_name = self.sites_file.file_name().ok_or_else(|| {
            TenancyError::FileError("Sites file path has no file name".to_string())
        })?;
        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Ok(metadata) = std::fs::metadata(&self.sites_file) {
            #[cfg(unix)]
            {
                if let Err(err) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(TenancyError::FileError(format!(
                        "Failed to set temp sites file permissions: {}",
                        err
                    )));
                }
            }
        }

        if let Err(err) = file.write_all(content.as_bytes()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(TenancyError::FileError(format!(
                "Failed to write sites temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = std::fs::remove_file(&temp_path);
            return Err(TenancyError::FileError(format!(
                "Failed to sync sites temp file: {}",
                err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, &self.sites_file) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(TenancyError::FileError(format!(
                "Failed to replace sites file: {}",
                err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = sync_parent_dir(parent) {
                log::warn!("Sites directory sync failed: {}", err);
            }
        }

        Ok(())
    }
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), TenancyError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(TenancyError::FileError(format!(
                    "Failed to create temp sites file: {}",
                    err
                )));
            }
        }
    }
    Err(TenancyError::FileError(
        "Failed to create temp sites file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), TenancyError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        TenancyError::FileError(format!("Failed to open sites directory for sync: {}", err))
    })?;
    dir.sync_all()
        .map_err(|err| TenancyError::FileError(format!("Failed to sync sites directory: {}", err)))
}

impl SiteStore for FileSiteStore {
    fn load(&self) -> Result<SitesData, TenancyError> {
        // A missing or empty file is a platform with no sites yet.
        if !self.sites_file.exists() {
            return Ok(SitesData::new());
        }
        let content = std::fs::read_to_string(&self.sites_file)
            .map_err(|e| TenancyError::FileError(format!("Failed to read sites file: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(SitesData::new());
        }
        Self::parse_sites(&content)
    }

    fn save(&self, sites: &SitesData) -> Result<(), TenancyError> {
        let content = Self::serialize_sites(sites)?;
        self.write_sites_file(&content)
    }
}

#[cfg(test)]
pub struct MemorySiteStore {
    sites: Arc<RwLock<SitesData>>,
}

#[cfg(test)]
impl MemorySiteStore {
    pub fn new(initial: SitesData) -> Self {
        Self {
            sites: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl SiteStore for MemorySiteStore {
    fn load(&self) -> Result<SitesData, TenancyError> {
        match self.sites.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => {
                log::error!("MemorySiteStore lock poisoned on read; recovering");
                Ok(poisoned.into_inner().clone())
            }
        }
    }

    fn save(&self, sites: &SitesData) -> Result<(), TenancyError> {
        match self.sites.write() {
            Ok(mut guard) => {
                *guard = sites.clone();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("MemorySiteStore lock poisoned on write; recovering");
                let mut guard = poisoned.into_inner();
                *guard = sites.clone();
                Ok(())
            }
        }
    }
}
