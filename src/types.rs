//! Data shapes shared by sections, slot files and export strings.

use std::collections::BTreeMap;

/// A section's contents: a flat key/value JSON object.
pub type SectionData = serde_json::Map<String, serde_json::Value>;

/// A slot's contents keyed by category name.
pub type SlotData = BTreeMap<String, SectionData>;
