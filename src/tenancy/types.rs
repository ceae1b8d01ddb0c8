// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Site {
    pub username: String,
    pub password_hash: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// Structure matching the sites.yaml file format; the username is the map key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YamlSite {
    pub password_hash: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl YamlSite {
    pub fn into_site(self, username: String) -> Site {
        Site {
            username,
            password_hash: self.password_hash,
            tags: self.tags,
            created_at: self.created_at,
        }
    }
}

impl Site {
    pub fn to_record(&self) -> YamlSite {
        YamlSite {
            password_hash: self.password_hash.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TenancyError {
    SiteNotFound(String),
    SiteExists(String),
    ServiceNotInitialized,
    ConfigurationError(String),
    CredentialError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for TenancyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenancyError::SiteNotFound(username) => write!(f, "Site not found: {}", username),
            TenancyError::SiteExists(username) => write!(f, "Site already exists: {}", username),
            TenancyError::ServiceNotInitialized => write!(f, "Site service not initialized"),
            TenancyError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            TenancyError::CredentialError(msg) => write!(f, "Credential error: {}", msg),
            TenancyError::FileError(msg) => write!(f, "File error: {}", msg),
            TenancyError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for TenancyError {}

// Mutation commands serialized through the background task
#[derive(Debug)]
pub enum SiteMutation {
    Create { site: Site },
    Delete { username: String },
}

#[derive(Debug)]
pub enum SiteMutationResult {
    Created,
    Deleted,
}

// The sites.yaml file structure: username -> site record
pub type YamlSitesData = BTreeMap<String, YamlSite>;
pub type SitesData = HashMap<String, Site>;
