//! Save-slot persistence engine
//!
//! Manages a fixed number of save slots. Each slot is split into named
//! sections, and each section is stored as a signed single-line JSON file.
//!
//! # Features
//!
//! - **Signed slot files**: trailing signature detects torn writes; anything
//!   after the last signature is discarded on read
//! - **Metadata scans**: list every slot's metadata without loading game data
//! - **At-rest encryption**: optional AES-256-GCM with Argon2id key derivation
//! - **Export strings**: base64 with an optional keyed substitution, for
//!   copy-paste save transfer
//! - **Autosave**: interval timer driven through the same `save()` entry point
//!
//! # Layout
//!
//! ```text
//! <root>/<prefix>_<index>/<prefix>_<index>_<category>.<ext>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use slot_save::{SaveConfig, Section, SlotManager};
//! use serde_json::json;
//!
//! let mut slots = SlotManager::from_config(SaveConfig::with_root("./saves")).unwrap();
//! slots.init().unwrap();
//!
//! slots.select(0, true).unwrap();
//! let meta = slots.section_mut("meta").unwrap();
//! let mut data = meta.to_map();
//! data.insert("name".to_string(), json!("Alice"));
//! meta.set_from_map(data, Some(0));
//! slots.save().unwrap();
//! slots.exit().unwrap();
//!
//! let exported = slots.export(0).unwrap();
//! slots.import(1, &exported).unwrap();
//! ```

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod slots;
pub mod storage;
pub mod types;

pub use config::SaveConfig;
pub use error::{Error, Result};
pub use slots::{Section, SlotManager};
pub use types::{SectionData, SlotData};
