// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

/// Resolve the storage directory for a tenant site under `sites_root`.
///
/// Usernames reaching this function have already passed hostname
/// validation, but file layout is an independent trust boundary: reject
/// anything that could escape the sites root before joining.
pub fn validate_site_dir(username: &str, sites_root: &Path) -> Result<PathBuf, String> {
    if username.is_empty() {
        return Err("Empty site name not allowed".to_string());
    }

    if username == "." || username == ".." || username.contains("..") {
        return Err("Invalid site name: path traversal detected".to_string());
    }

    if username.contains('/') || username.contains('\\') {
        return Err("Invalid site name: path separators not allowed".to_string());
    }

    if Path::new(username).is_absolute() {
        return Err("Invalid site name: absolute paths not allowed".to_string());
    }

    if username.chars().any(|ch| ch.is_control()) {
        return Err("Invalid site name: control characters not allowed".to_string());
    }

    Ok(sites_root.join(username))
}
