//! Signed slot file reads and writes.
//!
//! A slot file holds one line: a JSON object followed by [`SIGNATURE`].
//! Anything after the last signature is a partial or corrupted write and is
//! discarded on read. When a password is configured the line is sealed with
//! AES-256-GCM before it reaches the disk.

use crate::config::{SaveConfig, SIGNATURE};
use crate::crypto::{open, seal, SealedFile};
use crate::encoding::parse_json_or_null;
use crate::error::{Error, Result};
use crate::slots::Section;
use crate::storage::layout::SlotLayout;
use crate::types::SectionData;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Content ended with the signature.
    Intact,
    /// Bytes after the last signature were dropped.
    TrailingGarbage { discarded: usize },
    /// No signature found; content was parsed as-is.
    Unsigned,
}

/// A successfully parsed slot file.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRead {
    pub data: SectionData,
    pub integrity: Integrity,
}

/// Append the signature to a JSON line.
pub fn sign(json: &str) -> String {
    format!("{}{}", json, SIGNATURE)
}

/// Strip newlines and everything after the last signature, then remove the
/// signature itself.
///
/// Works on raw bytes so garbage after the signature never needs to be valid
/// UTF-8.
pub fn verify(content: &[u8]) -> (Vec<u8>, Integrity) {
    let line: Vec<u8> = content
        .iter()
        .copied()
        .filter(|b| *b != b'\n' && *b != b'\r')
        .collect();
    let signature = SIGNATURE.as_bytes();

    match line.windows(signature.len()).rposition(|w| w == signature) {
        Some(pos) => {
            let end = pos + signature.len();
            let integrity = if end == line.len() {
                Integrity::Intact
            } else {
                Integrity::TrailingGarbage {
                    discarded: line.len() - end,
                }
            };
            (strip_signatures(&line[..end], signature), integrity)
        }
        None => (line, Integrity::Unsigned),
    }
}

fn strip_signatures(bytes: &[u8], signature: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(signature) {
            i += signature.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

fn parse_section(body: &str) -> Result<SectionData> {
    match parse_json_or_null(body) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(Error::DataCorruption(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        None => Err(Error::DataCorruption("content is not valid JSON".to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads and writes slot files under a [`SlotLayout`].
#[derive(Debug, Clone)]
pub struct SlotStore {
    layout: SlotLayout,
    password: Option<String>,
}

impl SlotStore {
    pub fn new(layout: SlotLayout, password: Option<String>) -> Self {
        Self { layout, password }
    }

    pub fn from_config(config: &SaveConfig) -> Self {
        Self::new(config.layout(), config.password.clone())
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    /// File path of a category, or the slot folder when `category` is `None`.
    pub fn path(&self, index: usize, category: Option<&str>) -> PathBuf {
        self.layout.path(index, category)
    }

    pub fn slot_exists(&self, index: usize) -> bool {
        self.layout.folder(index).is_dir()
    }

    /// Write a section as a signed line.
    ///
    /// A missing slot folder is created and the open retried once; a second
    /// failure is returned to the caller.
    pub fn write(&self, index: usize, category: &str, data: &SectionData) -> Result<()> {
        let line = sign(&serde_json::to_string(data)?);
        let bytes = match &self.password {
            Some(password) => seal(line.as_bytes(), password)?,
            None => line.into_bytes(),
        };

        let path = self.path(index, Some(category));
        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "creating slot folder");
                fs::create_dir_all(self.layout.folder(index))?;
                File::create(&path)?
            }
        };
        file.write_all(&bytes)?;

        debug!(slot = index, category, bytes = bytes.len(), "wrote slot file");
        Ok(())
    }

    /// Read and verify a section.
    ///
    /// Returns `Error::SlotFileMissing` when the slot has never been written.
    pub fn read(&self, index: usize, category: &str) -> Result<SlotRead> {
        let path = self.path(index, Some(category));
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::SlotFileMissing(path)),
            Err(e) => return Err(e.into()),
        };

        let plain = self.unseal(raw, &path)?;

        let (body, integrity) = verify(&plain);
        match integrity {
            Integrity::Intact => {}
            Integrity::TrailingGarbage { discarded } => warn!(
                path = %path.display(),
                discarded,
                "discarded corrupted bytes after signature"
            ),
            Integrity::Unsigned => warn!(path = %path.display(), "no signature found"),
        }

        let body = String::from_utf8(body).map_err(|e| {
            warn!(path = %path.display(), "slot file is not UTF-8");
            Error::DataCorruption(e.to_string())
        })?;
        let data = parse_section(&body).map_err(|e| {
            warn!(path = %path.display(), error = %e, "slot file failed to parse");
            e
        })?;

        Ok(SlotRead { data, integrity })
    }

    fn unseal(&self, raw: Vec<u8>, path: &Path) -> Result<Vec<u8>> {
        match (&self.password, SealedFile::is_sealed(&raw)) {
            (Some(password), true) => open(&raw, password).map_err(|e| {
                warn!(path = %path.display(), error = %e, "could not open sealed slot file");
                e
            }),
            (Some(_), false) => {
                warn!(path = %path.display(), "slot file is not encrypted, reading as plain text");
                Ok(raw)
            }
            (None, true) => {
                warn!(path = %path.display(), "slot file is encrypted but no password is configured");
                Err(Error::Decryption)
            }
            (None, false) => Ok(raw),
        }
    }

    /// Read a section, writing its current contents when the file is absent
    /// or unusable.
    ///
    /// Decryption failures are returned and the file is left untouched.
    pub fn read_or_create(&self, index: usize, section: &dyn Section) -> Result<SectionData> {
        let category = section.category();
        match self.read(index, category) {
            Ok(read) => Ok(read.data),
            Err(Error::Decryption) => Err(Error::Decryption),
            Err(e) => {
                match &e {
                    Error::SlotFileMissing(_) => debug!(slot = index, category, "creating slot file"),
                    _ => warn!(slot = index, category, error = %e, "replacing unusable slot file"),
                }
                let data = section.to_map();
                self.write(index, category, &data)?;
                Ok(data)
            }
        }
    }

    /// Remove every file of a slot and then its folder.
    ///
    /// Returns `false` when the slot folder did not exist.
    pub fn delete_slot(&self, index: usize) -> Result<bool> {
        let folder = self.layout.folder(index);
        if !folder.is_dir() {
            info!(slot = index, path = %folder.display(), "slot folder missing, nothing to delete");
            return Ok(false);
        }

        for entry in WalkDir::new(&folder).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        fs::remove_dir(&folder)?;

        info!(slot = index, "deleted slot");
        Ok(true)
    }
}
