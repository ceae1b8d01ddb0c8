// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::config::Argon2Params;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    rand_core::RngCore,
};
use argon2::{Algorithm, Argon2, Params, Version};

#[derive(Debug)]
pub enum CredentialError {
    HashError(String),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::HashError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Hash a password with Argon2id into a PHC string. The plain password is
/// never stored; the PHC string carries the parameters and salt needed for
/// later verification.
pub fn hash_password(password: &str, params: &Argon2Params) -> Result<String, CredentialError> {
    let mut salt_bytes = vec![0u8; params.salt_len as usize];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| CredentialError::HashError(err.to_string()))?;
    let argon2 = build_argon2(params)?;
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| CredentialError::HashError(err.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| CredentialError::HashError(err.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default());
    Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
}

fn build_argon2(params: &Argon2Params) -> Result<Argon2<'static>, CredentialError> {
    let output_len = params.output_len as usize;
    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(output_len),
    )
    .map_err(|err| CredentialError::HashError(err.to_string()))?;
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        argon2_params,
    ))
}

#[cfg(test)]
pub(crate) fn test_params() -> Argon2Params {
    // Small parameters keep test runs fast; production defaults live in config.
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        output_len: 32,
        salt_len: 16,
    }
}
