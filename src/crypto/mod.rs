//! Cryptographic operations for save slots.
//!
//! This module provides:
//! - AES-256-GCM sealing of slot files with Argon2id password derivation
//! - A keyed substitution transform for export strings (obfuscation only)

mod cipher;
mod kdf;
mod substitution;

pub use cipher::{open, seal, Cipher, SealedFile};
pub use kdf::{derive_key, random_salt};
pub use substitution::{permutation, transform, CipherMode, Direction, KeyedTransform};
