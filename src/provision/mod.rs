// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod site_files;

pub use site_files::{ProvisionError, SiteProvisioner, LANDING_FILE_NAME};
