// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::security::path::validate_site_dir;
use minijinja::{context, Environment};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const LANDING_FILE_NAME: &str = "index.html";

const LANDING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{{ username }}</title>
  </head>
  <body>
    <h1>Welcome to {{ username }}'s new website!</h1>
    <p>This page was just created. Sign in to start editing it.</p>
  </body>
</html>
"#;

#[derive(Debug)]
pub enum ProvisionError {
    InvalidSiteName(String),
    TemplateError(String),
    FileError(String),
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::InvalidSiteName(msg) => write!(f, "Invalid site name: {}", msg),
            ProvisionError::TemplateError(msg) => write!(f, "Landing template failed: {}", msg),
            ProvisionError::FileError(msg) => write!(f, "Site file error: {}", msg),
        }
    }
}

impl std::error::Error for ProvisionError {}

/// Creates the on-disk storage area for a tenant: one directory per site
/// under the sites root, holding the default landing document the UI layer
/// serves for a freshly created site.
pub struct SiteProvisioner {
    sites_root: PathBuf,
}

impl SiteProvisioner {
    pub fn new(sites_root: PathBuf) -> Result<Self, ProvisionError> {
        if sites_root.as_os_str().is_empty() {
            return Err(ProvisionError::FileError(
                "Sites root path is empty".to_string(),
            ));
        }
        Ok(Self { sites_root })
    }

    pub fn sites_root(&self) -> &Path {
        &self.sites_root
    }

    pub fn landing_path(&self, username: &str) -> Result<PathBuf, ProvisionError> {
        let site_dir =
            validate_site_dir(username, &self.sites_root).map_err(ProvisionError::InvalidSiteName)?;
        Ok(site_dir.join(LANDING_FILE_NAME))
    }

    /// Create the site directory and write the landing document. Safe to
    /// re-run; an existing landing document is replaced atomically.
    pub fn provision(&self, username: &str) -> Result<(), ProvisionError> {
        let site_dir =
            validate_site_dir(username, &self.sites_root).map_err(ProvisionError::InvalidSiteName)?;
        fs::create_dir_all(&site_dir).map_err(|err| {
            ProvisionError::FileError(format!(
                "Failed to create site directory {}: {}",
                site_dir.display(),
                err
            ))
        })?;

        let html = render_landing(username)?;
        write_file_atomic(&site_dir.join(LANDING_FILE_NAME), &html)?;
        log::debug!("Provisioned site files for {}", username);
        Ok(())
    }

    /// Remove the site's storage area. Used to compensate a failed signup;
    /// a missing directory is not an error.
    pub fn remove(&self, username: &str) -> Result<(), ProvisionError> {
        let site_dir =
            validate_site_dir(username, &self.sites_root).map_err(ProvisionError::InvalidSiteName)?;
        if !site_dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(&site_dir).map_err(|err| {
            ProvisionError::FileError(format!(
                "Failed to remove site directory {}: {}",
                site_dir.display(),
                err
            ))
        })
    }
}

fn render_landing(username: &str) -> Result<String, ProvisionError> {
    let mut env = Environment::new();
    env.add_template("landing", LANDING_TEMPLATE)
        .map_err(|err| ProvisionError::TemplateError(err.to_string()))?;
    let template = env
        .get_template("landing")
        .map_err(|err| ProvisionError::TemplateError(err.to_string()))?;
    template
        .render(context! { username })
        .map_err(|err| ProvisionError::TemplateError(err.to_string()))
}

fn write_file_atomic(path: &Path, content: &str) -> Result<(), ProvisionError> {
    let temp_name = match path.file_name() {
        Some(name) => format!("{}.tmp", name.to_string_lossy()),
        None => "landing.tmp".to_string(),
    };
    let mut temp_path = path.to_path_buf();
    temp_path.set_file_name(temp_name);

    if let Err(err) = fs::write(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(ProvisionError::FileError(format!(
            "Failed to write landing temp file: {}",
            err
        )));
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ProvisionError::FileError(format!(
            "Failed to replace landing file: {}",
            err
        )));
    }
    Ok(())
}
