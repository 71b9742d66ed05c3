//! AES-256-GCM sealing of slot file contents.
//!
//! A sealed file is `SEALED_MAGIC || bincode(SealedFile)`. Each seal uses a
//! fresh salt and nonce, so the same line never produces the same bytes.

use crate::config::{argon2_params, SEALED_MAGIC};
use crate::crypto::kdf::{derive_key, random_salt};
use crate::error::{Error, Result};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
const TAG_SIZE: usize = 16;

/// AES-256-GCM cipher wrapper.
pub struct Cipher {
    cipher: Aes256Gcm,
}

impl Cipher {
    /// Create a new cipher from a derived key.
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    /// Encrypt with a random nonce.
    ///
    /// Returns: nonce (12 bytes) || ciphertext || tag (16 bytes)
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by `encrypt`.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::DataCorruption(format!(
                "sealed payload too short: {} bytes",
                data.len()
            )));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| Error::Decryption)
    }
}

/// Envelope stored in an encrypted slot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedFile {
    /// Salt for key derivation.
    pub salt: [u8; argon2_params::SALT_LENGTH],
    /// nonce || ciphertext || tag
    pub ciphertext: Vec<u8>,
}

impl SealedFile {
    /// Whether raw file bytes carry the sealed-file magic.
    pub fn is_sealed(bytes: &[u8]) -> bool {
        bytes.starts_with(&SEALED_MAGIC)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = SEALED_MAGIC.to_vec();
        bytes.extend(bincode::serialize(self)?);
        Ok(bytes)
    }

    /// Parse a sealed file. A damaged envelope is `DataCorruption`; only a
    /// failed authentication tag is reported as `Decryption`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if !Self::is_sealed(bytes) {
            return Err(Error::Decryption);
        }
        bincode::deserialize(&bytes[SEALED_MAGIC.len()..])
            .map_err(|e| Error::DataCorruption(format!("sealed envelope: {}", e)))
    }
}

/// Encrypt a slot file line with a password.
pub fn seal(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt = random_salt();
    let cipher = Cipher::new(derive_key(password, &salt)?);

    SealedFile {
        salt,
        ciphertext: cipher.encrypt(plaintext)?,
    }
    .to_bytes()
}

/// Decrypt bytes produced by `seal`.
pub fn open(bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    let sealed = SealedFile::from_bytes(bytes)?;
    let cipher = Cipher::new(derive_key(password, &sealed.salt)?);
    cipher.decrypt(&sealed.ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let line = "{\"name\":\"Alice\"}§§§".as_bytes();

        let sealed = seal(line, "hunter2").unwrap();
        assert!(SealedFile::is_sealed(&sealed));
        assert_eq!(open(&sealed, "hunter2").unwrap(), line);
    }

    #[test]
    fn test_wrong_password_fails() {
        let sealed = seal(b"{}", "correct").unwrap();
        assert!(matches!(open(&sealed, "wrong"), Err(Error::Decryption)));
    }

    #[test]
    fn test_same_line_seals_differently() {
        let a = seal(b"{}", "password").unwrap();
        let b = seal(b"{}", "password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut sealed = seal(b"{\"gold\":10}", "password").unwrap();
        if let Some(byte) = sealed.last_mut() {
            *byte ^= 0xFF;
        }
        assert!(open(&sealed, "password").is_err());
    }

    #[test]
    fn test_truncated_envelope_is_corruption() {
        let sealed = seal(b"{\"gold\":10}", "password").unwrap();

        let torn = &sealed[..sealed.len() - 10];
        assert!(matches!(open(torn, "password"), Err(Error::DataCorruption(_))));
        let header_only = &sealed[..SEALED_MAGIC.len() + 4];
        assert!(matches!(open(header_only, "password"), Err(Error::DataCorruption(_))));
    }

    #[test]
    fn test_short_payload_is_corruption() {
        let cipher = Cipher::new([7u8; 32]);
        assert!(matches!(cipher.decrypt(&[0u8; 20]), Err(Error::DataCorruption(_))));
    }

    #[test]
    fn test_plain_bytes_are_not_sealed() {
        assert!(!SealedFile::is_sealed(b"{}\xc2\xa7"));
        assert!(matches!(open(b"{}", "password"), Err(Error::Decryption)));
    }
}
