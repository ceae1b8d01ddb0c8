// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(dead_code)]

use homestead::config::{Argon2Params, Argon2ParamsConfig};
use homestead::provision::SiteProvisioner;
use homestead::signup::{SignupRequest, SignupService};
use homestead::tenancy::{FileSiteStore, SiteService};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A fresh, isolated provisioning stack backed by a scratch directory.
/// Every test builds its own harness; nothing is shared between cases.
pub struct TestHarness {
    temp: TempDir,
    pub service: SignupService,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let store =
            FileSiteStore::new(temp.path().join("sites.yaml")).expect("site store");
        let sites = SiteService::new(Arc::new(store)).expect("site service");
        let provisioner =
            SiteProvisioner::new(temp.path().join("sites")).expect("provisioner");
        let service = SignupService::new(sites, provisioner, test_hash_params());
        Self { temp, service }
    }

    /// Harness whose sites root is occupied by a regular file, so file
    /// provisioning always fails after the record write.
    pub fn with_broken_sites_root() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let sites_root = temp.path().join("sites");
        std::fs::write(&sites_root, "not a directory").expect("blocker file");

        let store =
            FileSiteStore::new(temp.path().join("sites.yaml")).expect("site store");
        let sites = SiteService::new(Arc::new(store)).expect("site service");
        let provisioner = SiteProvisioner::new(sites_root).expect("provisioner");
        let service = SignupService::new(sites, provisioner, test_hash_params());
        Self { temp, service }
    }

    pub fn landing_path(&self, username: &str) -> PathBuf {
        self.temp.path().join("sites").join(username).join("index.html")
    }
}

pub fn test_hash_params() -> Argon2Params {
    Argon2ParamsConfig {
        memory_kib: Some(1024),
        iterations: Some(1),
        parallelism: Some(1),
        output_len: Some(32),
        salt_len: Some(16),
    }
    .resolve()
}

pub fn request(username: &str, password: &str, tags: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        password: password.to_string(),
        tags: tags.to_string(),
    }
}
