//! Argon2id key derivation for password-sealed slot files.

use crate::config::argon2_params;
use crate::error::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

/// Generate a fresh random salt.
pub fn random_salt() -> [u8; argon2_params::SALT_LENGTH] {
    let mut salt = [0u8; argon2_params::SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a password and salt.
pub fn derive_key(password: &str, salt: &[u8; argon2_params::SALT_LENGTH]) -> Result<[u8; 32]> {
    let params = Params::new(
        argon2_params::MEMORY_COST,
        argon2_params::TIME_COST,
        argon2_params::PARALLELISM,
        Some(argon2_params::OUTPUT_LENGTH),
    )
    .map_err(|e| Error::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; 32];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;

    Ok(key)
}
