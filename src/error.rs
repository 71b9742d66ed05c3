//! Error types for the save-slot engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for save-slot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in save-slot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Slot file does not exist yet.
    #[error("Slot file not found: {0}")]
    SlotFileMissing(PathBuf),

    /// Slot index outside the configured range.
    #[error("Slot {index} out of range (slot count is {count})")]
    SlotOutOfRange { index: usize, count: usize },

    /// Operation needs a selected slot.
    #[error("No slot selected")]
    NoSlotSelected,

    /// Operation is only valid while no slot is selected.
    #[error("Slot {0} is selected; exit it first")]
    SlotSelected(usize),

    /// Two sections registered under the same category.
    #[error("Duplicate section category: {0}")]
    DuplicateCategory(String),

    /// No section registered for a category.
    #[error("Unknown section category: {0}")]
    UnknownCategory(String),

    /// Import payload decoded to an empty mapping.
    #[error("Import payload contains no categories")]
    EmptyImport,

    /// Export string is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded payload is not UTF-8.
    #[error("Decoded payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Decoded payload is not a JSON object of categories.
    #[error("Invalid JSON payload: {0}")]
    Json(String),

    /// Substitution alphabet contains repeated characters.
    #[error("Invalid cipher alphabet: {0}")]
    InvalidAlphabet(String),

    /// Slot file content could not be parsed.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption error (wrong password or corrupted data).
    #[error("Decryption failed: wrong password or corrupted data")]
    Decryption,

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
