// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::config::{Argon2Params, HostingConfig};
use crate::provision::SiteProvisioner;
use crate::tags::{normalize_tags, TagError};
use crate::tenancy::password::hash_password;
use crate::tenancy::store::FileSiteStore;
use crate::tenancy::types::{Site, TenancyError};
use crate::tenancy::validation::{
    validate_password, validate_username, PasswordError, UsernameError,
};
use crate::tenancy::SiteService;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    /// Raw comma-separated tag text as typed into the signup form.
    pub tags: String,
}

/// What the UI layer gets back on success.
#[derive(Debug, Clone)]
pub struct SiteDescriptor {
    pub username: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Which form field an error should be rendered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Username,
    Password,
    Tags,
    System,
}

#[derive(Debug)]
pub enum SignupError {
    InvalidUsername(UsernameError),
    InvalidPassword(PasswordError),
    InvalidTags(TagError),
    UsernameTaken,
    Persistence(String),
    Provisioning(String),
}

impl SignupError {
    pub fn field(&self) -> SignupField {
        match self {
            SignupError::InvalidUsername(_) | SignupError::UsernameTaken => SignupField::Username,
            SignupError::InvalidPassword(_) => SignupField::Password,
            SignupError::InvalidTags(_) => SignupField::Tags,
            SignupError::Persistence(_) | SignupError::Provisioning(_) => SignupField::System,
        }
    }
}

impl fmt::Display for SignupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignupError::InvalidUsername(err) => write!(f, "{}", err),
            SignupError::InvalidPassword(err) => write!(f, "{}", err),
            SignupError::InvalidTags(err) => write!(f, "{}", err),
            SignupError::UsernameTaken => {
                write!(f, "This username is already taken. Try another one")
            }
            // Infrastructure detail goes to the log, not the visitor.
            SignupError::Persistence(_) => {
                write!(f, "Your website could not be saved. Please try again")
            }
            SignupError::Provisioning(_) => {
                write!(f, "Your website could not be created. Please try again")
            }
        }
    }
}

impl std::error::Error for SignupError {}

/// The provisioning pipeline: validate, normalize tags, enforce username
/// uniqueness, persist the site record, then lay down the site files. A
/// provisioning failure after the record was persisted removes the record
/// again so the platform never reports a half-created site.
pub struct SignupService {
    sites: SiteService,
    provisioner: SiteProvisioner,
    hashing: Argon2Params,
}

impl SignupService {
    pub fn new(sites: SiteService, provisioner: SiteProvisioner, hashing: Argon2Params) -> Self {
        Self {
            sites,
            provisioner,
            hashing,
        }
    }

    /// Wire up the full stack from configuration: file-backed site store,
    /// site service, and file provisioner.
    pub fn from_config(config: &HostingConfig) -> Result<Self, SignupError> {
        let store = FileSiteStore::new(config.sites_file.clone())
            .map_err(|err| SignupError::Persistence(err.to_string()))?;
        let sites = SiteService::new(Arc::new(store))
            .map_err(|err| SignupError::Persistence(err.to_string()))?;
        let provisioner = SiteProvisioner::new(config.sites_root.clone())
            .map_err(|err| SignupError::Provisioning(err.to_string()))?;
        Ok(Self::new(sites, provisioner, config.password_params()))
    }

    pub fn sites(&self) -> &SiteService {
        &self.sites
    }

    pub fn provisioner(&self) -> &SiteProvisioner {
        &self.provisioner
    }

    /// Process one signup submission. Reports the first failing check only;
    /// the form renders a single targeted message per submission.
    pub async fn submit(&self, request: &SignupRequest) -> Result<SiteDescriptor, SignupError> {
        validate_username(&request.username).map_err(SignupError::InvalidUsername)?;
        validate_password(&request.password).map_err(SignupError::InvalidPassword)?;
        let tags = normalize_tags(&request.tags).map_err(SignupError::InvalidTags)?;

        let taken = self
            .sites
            .site_exists(&request.username)
            .map_err(|err| self.persistence_error(&request.username, err))?;
        if taken {
            return Err(SignupError::UsernameTaken);
        }

        let password_hash = hash_password(&request.password, &self.hashing).map_err(|err| {
            log::error!(
                "Password hashing failed during signup for {}: {}",
                request.username,
                err
            );
            SignupError::Persistence(err.to_string())
        })?;

        let created_at = Utc::now();
        let site = Site {
            username: request.username.clone(),
            password_hash,
            tags: tags.clone(),
            created_at,
        };

        match self.sites.create_site(site).await {
            Ok(()) => {}
            // The serialized create is the authoritative uniqueness check;
            // a race past the site_exists gate lands here.
            Err(TenancyError::SiteExists(_)) => return Err(SignupError::UsernameTaken),
            Err(err) => return Err(self.persistence_error(&request.username, err)),
        }

        if let Err(err) = self.provisioner.provision(&request.username) {
            log::error!(
                "File provisioning failed for {}: {}; removing site record",
                request.username,
                err
            );
            if let Err(remove_err) = self.sites.remove_site(&request.username).await {
                log::error!(
                    "Compensating removal failed for {}: {}",
                    request.username,
                    remove_err
                );
            }
            return Err(SignupError::Provisioning(err.to_string()));
        }

        log::info!("Provisioned new site: {}", request.username);
        Ok(SiteDescriptor {
            username: request.username.clone(),
            tags,
            created_at,
        })
    }

    fn persistence_error(&self, username: &str, err: TenancyError) -> SignupError {
        log::error!("Failed to persist site {}: {}", username, err);
        SignupError::Persistence(err.to_string())
    }
}
