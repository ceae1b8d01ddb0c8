// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

pub const USERNAME_LENGTH_MAX: usize = 32;
pub const PASSWORD_LENGTH_MIN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    InvalidFormat,
    TooLong,
}

impl fmt::Display for UsernameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernameError::InvalidFormat => write!(f, "A valid user/site name is required"),
            UsernameError::TooLong => write!(
                f,
                "User/site name cannot exceed {} characters",
                USERNAME_LENGTH_MAX
            ),
        }
    }
}

impl std::error::Error for UsernameError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    TooShort,
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::TooShort => write!(
                f,
                "Password must be at least {} characters",
                PASSWORD_LENGTH_MIN
            ),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Usernames double as hostnames, so the rules are hostname rules:
/// ASCII alphanumerics and hyphens, no leading or trailing hyphen.
/// Format is checked before length so a malformed overlong name still
/// reports the format error.
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    if username.is_empty() {
        return Err(UsernameError::InvalidFormat);
    }
    if !username
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        return Err(UsernameError::InvalidFormat);
    }
    if username.starts_with('-') || username.ends_with('-') {
        return Err(UsernameError::InvalidFormat);
    }
    if username.chars().count() > USERNAME_LENGTH_MAX {
        return Err(UsernameError::TooLong);
    }
    Ok(())
}

/// An empty password is a degenerate case of too-short, not a separate
/// "required" error.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < PASSWORD_LENGTH_MIN {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}
