// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::password;
use super::store::SiteStore;
use super::types::{Site, SiteMutation, SiteMutationResult, SitesData, TenancyError};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, oneshot};

// Type aliases for complex channel types
type MutationRequest = (
    SiteMutation,
    oneshot::Sender<Result<SiteMutationResult, TenancyError>>,
);
type MutationSender = mpsc::UnboundedSender<MutationRequest>;
type MutationReceiver = mpsc::UnboundedReceiver<MutationRequest>;

/// Repository over tenant site records.
///
/// Reads are served from an in-memory snapshot; mutations are serialized
/// through a single background task, so the uniqueness check and the insert
/// in `create_site` happen as one step. Two concurrent creation attempts
/// for the same username resolve to exactly one success.
#[derive(Clone)]
pub struct SiteService {
    sites_data: Arc<RwLock<SitesData>>,
    mutation_sender: MutationSender,
    store: Arc<dyn SiteStore>,
}

impl SiteService {
    /// Load sites from the store and start the background mutation task.
    pub fn new(store: Arc<dyn SiteStore>) -> Result<Self, TenancyError> {
        let sites = store.load()?;
        let sites_data = Arc::new(RwLock::new(sites));

        let (mutation_sender, mut mutation_receiver): (MutationSender, MutationReceiver) =
            mpsc::unbounded_channel();

        let sites_data_clone = sites_data.clone();
        let store_clone = store.clone();

        tokio::spawn(async move {
            while let Some((mutation, response_sender)) = mutation_receiver.recv().await {
                let result = Self::handle_mutation(&mutation, &sites_data_clone, &store_clone);
                let _ = response_sender.send(result);
            }
        });

        Ok(SiteService {
            sites_data,
            mutation_sender,
            store,
        })
    }

    fn reload_sites_from_store(
        sites_data: &Arc<RwLock<SitesData>>,
        store: &Arc<dyn SiteStore>,
    ) -> Result<(), TenancyError> {
        let sites = store.load()?;
        match sites_data.write() {
            Ok(mut guard) => {
                *guard = sites;
                sites_data.clear_poison();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("Sites lock poisoned during reload; recovering");
                let mut guard = poisoned.into_inner();
                *guard = sites;
                sites_data.clear_poison();
                Ok(())
            }
        }
    }

    fn with_sites_read<T>(
        &self,
        f: impl FnOnce(&SitesData) -> Result<T, TenancyError>,
    ) -> Result<T, TenancyError> {
        match self.sites_data.read() {
            Ok(guard) => f(&guard),
            Err(_) => {
                log::error!("Sites lock poisoned on read; reloading from store");
                Self::reload_sites_from_store(&self.sites_data, &self.store)?;
                let guard = self.sites_data.read().map_err(|_| {
                    TenancyError::ConfigurationError(
                        "Sites lock poisoned after recovery attempt".to_string(),
                    )
                })?;
                f(&guard)
            }
        }
    }

    fn with_sites_write<T>(
        sites_data: &Arc<RwLock<SitesData>>,
        store: &Arc<dyn SiteStore>,
        f: impl FnOnce(&mut SitesData) -> Result<T, TenancyError>,
    ) -> Result<T, TenancyError> {
        let mut guard = match sites_data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Sites lock poisoned on write; reloading from store");
                let mut guard = poisoned.into_inner();
                let sites = store.load()?;
                *guard = sites;
                sites_data.clear_poison();
                guard
            }
        };

        f(&mut guard)
    }

    // Runs on the background task. The store save happens against a copy;
    // the in-memory map is only replaced after the save succeeds, so a
    // failed save never leaves memory and disk disagreeing.
    fn handle_mutation(
        mutation: &SiteMutation,
        sites_data: &Arc<RwLock<SitesData>>,
        store: &Arc<dyn SiteStore>,
    ) -> Result<SiteMutationResult, TenancyError> {
        match mutation {
            SiteMutation::Create { site } => Self::with_sites_write(sites_data, store, |sites| {
                if sites.contains_key(&site.username) {
                    return Err(TenancyError::SiteExists(site.username.clone()));
                }

                let mut updated = sites.clone();
                updated.insert(site.username.clone(), site.clone());

                store.save(&updated)?;
                *sites = updated;
                Ok(SiteMutationResult::Created)
            }),
            SiteMutation::Delete { username } => {
                Self::with_sites_write(sites_data, store, |sites| {
                    let mut updated = sites.clone();
                    if updated.remove(username).is_some() {
                        store.save(&updated)?;
                        *sites = updated;
                        Ok(SiteMutationResult::Deleted)
                    } else {
                        Err(TenancyError::SiteNotFound(username.clone()))
                    }
                })
            }
        }
    }

    pub fn site_exists(&self, username: &str) -> Result<bool, TenancyError> {
        self.with_sites_read(|sites| Ok(sites.contains_key(username)))
    }

    pub fn get_site(&self, username: &str) -> Result<Option<Site>, TenancyError> {
        self.with_sites_read(|sites| Ok(sites.get(username).cloned()))
    }

    pub fn list_sites(&self) -> Result<Vec<Site>, TenancyError> {
        self.with_sites_read(|sites| Ok(sites.values().cloned().collect()))
    }

    /// Check a signin attempt against the stored password hash. An unknown
    /// username verifies false rather than erroring, so callers render the
    /// same "invalid login" outcome for both cases.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<bool, TenancyError> {
        let site = match self.get_site(username)? {
            Some(site) => site,
            None => {
                log::debug!("Signin attempt for unknown site: {}", username);
                return Ok(false);
            }
        };
        password::verify_password(password, &site.password_hash)
            .map_err(|err| TenancyError::CredentialError(err.to_string()))
    }

    /// Atomically persist a new site record. Fails with `SiteExists` when
    /// the username is already taken.
    pub async fn create_site(&self, site: Site) -> Result<(), TenancyError> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.mutation_sender
            .send((SiteMutation::Create { site }, response_sender))
            .map_err(|_| TenancyError::ServiceNotInitialized)?;

        let result = response_receiver
            .await
            .map_err(|_| TenancyError::ServiceNotInitialized)?;

        match result? {
            SiteMutationResult::Created => Ok(()),
            _ => Err(TenancyError::ConfigurationError(
                "Unexpected result".to_string(),
            )),
        }
    }

    /// Remove a site record; the compensation path for failed provisioning.
    pub async fn remove_site(&self, username: &str) -> Result<(), TenancyError> {
        let (response_sender, response_receiver) = oneshot::channel();

        let mutation = SiteMutation::Delete {
            username: username.to_string(),
        };

        self.mutation_sender
            .send((mutation, response_sender))
            .map_err(|_| TenancyError::ServiceNotInitialized)?;

        let result = response_receiver
            .await
            .map_err(|_| TenancyError::ServiceNotInitialized)?;

        match result? {
            SiteMutationResult::Deleted => Ok(()),
            _ => Err(TenancyError::ConfigurationError(
                "Unexpected result".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenancy::password::{hash_password, test_params};
    use crate::tenancy::store::MemorySiteStore;
    use chrono::Utc;

    struct FailingSiteStore {
        sites: SitesData,
    }

    impl FailingSiteStore {
        fn new(sites: SitesData) -> Self {
            Self { sites }
        }
    }

    impl SiteStore for FailingSiteStore {
        fn load(&self) -> Result<SitesData, TenancyError> {
            Ok(self.sites.clone())
        }

        fn save(&self, _sites: &SitesData) -> Result<(), TenancyError> {
            Err(TenancyError::FileError(
                "Simulated sites save failure".to_string(),
            ))
        }
    }

    fn sample_site(username: &str) -> Site {
        Site {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_persists_and_is_readable() {
        let store = Arc::new(MemorySiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");

        service.create_site(sample_site("alice")).await.expect("create");

        assert!(service.site_exists("alice").expect("exists"));
        let site = service.get_site("alice").expect("get").expect("site");
        assert_eq!(site.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_create_fails_with_site_exists() {
        let store = Arc::new(MemorySiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");

        service.create_site(sample_site("alice")).await.expect("create");
        let err = service
            .create_site(sample_site("alice"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, TenancyError::SiteExists(_)));

        assert_eq!(service.list_sites().expect("list").len(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_creates_yield_one_success() {
        let store = Arc::new(MemorySiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");

        let first = service.create_site(sample_site("alice"));
        let second = service.create_site(sample_site("alice"));
        let (first, second) = tokio::join!(first, second);

        assert_ne!(first.is_ok(), second.is_ok());
        assert_eq!(service.list_sites().expect("list").len(), 1);
    }

    #[tokio::test]
    async fn create_does_not_mutate_in_memory_on_save_error() {
        let store = Arc::new(FailingSiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");

        let result = service.create_site(sample_site("alice")).await;
        assert!(result.is_err());

        assert!(service.list_sites().expect("list").is_empty());
    }

    #[tokio::test]
    async fn remove_does_not_mutate_in_memory_on_save_error() {
        let mut sites = SitesData::new();
        let site = sample_site("alice");
        sites.insert(site.username.clone(), site);
        let store = Arc::new(FailingSiteStore::new(sites));
        let service = SiteService::new(store).expect("service");

        let result = service.remove_site("alice").await;
        assert!(result.is_err());

        assert_eq!(service.list_sites().expect("list").len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_site_fails_with_not_found() {
        let store = Arc::new(MemorySiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");

        let err = service.remove_site("ghost").await.expect_err("missing");
        assert!(matches!(err, TenancyError::SiteNotFound(_)));
    }

    #[tokio::test]
    async fn verify_credentials_matches_only_the_signup_password() {
        let params = test_params();
        let mut site = sample_site("alice");
        site.password_hash = hash_password("secret1", &params).expect("hash");

        let store = Arc::new(MemorySiteStore::new(SitesData::new()));
        let service = SiteService::new(store).expect("service");
        service.create_site(site).await.expect("create");

        assert!(service.verify_credentials("alice", "secret1").expect("verify"));
        assert!(!service.verify_credentials("alice", "secret2").expect("verify"));
        assert!(!service.verify_credentials("nobody", "secret1").expect("verify"));
    }
}
