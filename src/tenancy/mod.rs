// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod password;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use service::SiteService;
pub use store::{FileSiteStore, SiteStore};
pub use types::{Site, SitesData, TenancyError};
pub use validation::{validate_password, validate_username, PasswordError, UsernameError};
