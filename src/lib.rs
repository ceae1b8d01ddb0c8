// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod config;
pub mod provision;
pub mod security;
pub mod signup;
pub mod tags;
pub mod tenancy;
