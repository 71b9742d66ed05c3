//! Configuration constants and types for the save-slot engine.

use crate::crypto::{CipherMode, KeyedTransform};
use crate::error::Result;
use crate::storage::SlotLayout;
use crate::types::SectionData;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trailing token appended to every slot file line.
pub const SIGNATURE: &str = "§§§";

/// Default slot folder and file prefix.
pub const DEFAULT_PREFIX: &str = "save";

/// Default slot file extension.
pub const DEFAULT_EXTENSION: &str = "sav";

/// Default number of save slots.
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// Default autosave interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 60;

/// Default category holding the slot's display name.
pub const DEFAULT_METADATA_CATEGORY: &str = "meta";

/// Default key of the display name inside the metadata category.
pub const DEFAULT_NAME_KEY: &str = "name";

/// Default substitution alphabet: the standard base64 alphabet plus padding.
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";

/// Magic prefix of password-encrypted slot files.
pub const SEALED_MAGIC: [u8; 4] = *b"SLSV";

/// Argon2id parameters for slot file encryption.
///
/// Every encrypted write derives a fresh key, so these are tuned for
/// interactive save/load rather than long-term secrets.
pub mod argon2_params {
    /// Memory cost in KiB (19 MiB).
    pub const MEMORY_COST: u32 = 19456;

    /// Time cost (iterations).
    pub const TIME_COST: u32 = 2;

    /// Parallelism factor.
    pub const PARALLELISM: u32 = 1;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// Salt length in bytes.
    pub const SALT_LENGTH: usize = 32;
}

/// Export-string obfuscation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Identity or substitution.
    pub mode: CipherMode,
    /// Secret seeding the substitution permutation. Empty disables it.
    pub secret: String,
    /// Characters eligible for substitution.
    pub alphabet: String,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            mode: CipherMode::None,
            secret: String::new(),
            alphabet: DEFAULT_ALPHABET.to_string(),
        }
    }
}

impl CipherConfig {
    /// Build the keyed transform described by this configuration.
    pub fn transform(&self) -> Result<KeyedTransform> {
        KeyedTransform::new(self.mode, &self.secret, &self.alphabet)
    }
}

/// Declarative description of a key/value section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Unique category name; becomes part of the file name.
    pub category: String,
    /// Whether the section is part of metadata-only scans.
    #[serde(default)]
    pub metadata: bool,
    /// Contents of a fresh slot.
    #[serde(default)]
    pub defaults: SectionData,
}

impl SectionSpec {
    pub fn new(category: &str, metadata: bool) -> Self {
        Self {
            category: category.to_string(),
            metadata,
            defaults: SectionData::new(),
        }
    }
}

/// Save-slot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory holding every slot folder.
    pub root: PathBuf,
    /// Prefix of slot folders and files.
    pub prefix: String,
    /// Extension of slot files (without the dot).
    pub extension: String,
    /// Number of save slots.
    pub slot_count: usize,
    /// Password for at-rest encryption. `None` writes plain JSON.
    pub password: Option<String>,
    /// Whether the autosave tick writes the selected slot.
    pub autosave_enabled: bool,
    /// Seconds between autosave ticks.
    pub autosave_interval_secs: u64,
    /// Metadata category patched by `rename`.
    pub metadata_category: String,
    /// Key of the display name inside the metadata category.
    pub name_key: String,
    /// Export-string obfuscation.
    pub cipher: CipherConfig,
    /// Sections built by `SlotManager::from_config`.
    pub sections: Vec<SectionSpec>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        let mut meta = SectionSpec::new(DEFAULT_METADATA_CATEGORY, true);
        meta.defaults
            .insert(DEFAULT_NAME_KEY.to_string(), serde_json::Value::from(""));

        Self {
            root: PathBuf::from("saves"),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            slot_count: DEFAULT_SLOT_COUNT,
            password: None,
            autosave_enabled: true,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            metadata_category: DEFAULT_METADATA_CATEGORY.to_string(),
            name_key: DEFAULT_NAME_KEY.to_string(),
            cipher: CipherConfig::default(),
            sections: vec![meta, SectionSpec::new("game", false)],
        }
    }
}

impl SaveConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SaveConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Slot path layout derived from this configuration.
    pub fn layout(&self) -> SlotLayout {
        SlotLayout::new(&self.root, &self.prefix, &self.extension)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.slot_count == 0 {
            return Err("Slot count must be greater than 0".to_string());
        }
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err("Prefix must be a non-empty name without path separators".to_string());
        }
        if self.extension.is_empty() || self.extension.contains(['/', '\\', '.']) {
            return Err("Extension must be a non-empty name without dots".to_string());
        }
        if self.autosave_interval_secs == 0 {
            return Err("Autosave interval must be greater than 0".to_string());
        }
        if matches!(&self.password, Some(p) if p.is_empty()) {
            return Err("Password must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for spec in &self.sections {
            if spec.category.is_empty() || spec.category.contains(['/', '\\']) {
                return Err(format!("Invalid section category: {:?}", spec.category));
            }
            if !seen.insert(spec.category.as_str()) {
                return Err(format!("Duplicate section category: {}", spec.category));
            }
        }

        self.cipher.transform().map_err(|e| e.to_string())?;
        Ok(())
    }
}
