//! Save data sections.

use crate::config::SectionSpec;
use crate::types::SectionData;
use serde_json::Value;

/// A named partition of a slot's data.
///
/// The manager owns every section for its whole lifetime and overwrites or
/// clears its contents on each slot transition.
pub trait Section {
    /// Stable, unique category name. Part of the slot file name.
    fn category(&self) -> &str;

    /// Whether the section is included in metadata-only scans.
    fn is_metadata(&self) -> bool;

    /// Current contents as a flat mapping.
    fn to_map(&self) -> SectionData;

    /// Replace contents with `data` read for slot `index`.
    fn set_from_map(&mut self, data: SectionData, index: Option<usize>);

    /// Reset contents to the fresh-slot state.
    fn clear(&mut self, index: Option<usize>);

    /// Called after the selected slot's data has been loaded.
    fn on_loaded(&mut self, _index: usize) {}

    /// Called after the section has been written for slot `index`.
    fn on_saved(&mut self, _index: usize) {}
}

/// A key/value section with fixed defaults.
#[derive(Debug, Clone)]
pub struct MapSection {
    category: String,
    metadata: bool,
    defaults: SectionData,
    values: SectionData,
    loaded: Option<usize>,
    saves: usize,
}

impl MapSection {
    pub fn new(category: &str, metadata: bool) -> Self {
        Self {
            category: category.to_string(),
            metadata,
            defaults: SectionData::new(),
            values: SectionData::new(),
            loaded: None,
            saves: 0,
        }
    }

    pub fn from_spec(spec: &SectionSpec) -> Self {
        Self {
            defaults: spec.defaults.clone(),
            values: spec.defaults.clone(),
            ..Self::new(&spec.category, spec.metadata)
        }
    }

    /// Add a default value; also applied to the current contents.
    pub fn with_default(mut self, key: &str, value: Value) -> Self {
        self.defaults.insert(key.to_string(), value.clone());
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Slot most recently loaded into this section.
    pub fn loaded_slot(&self) -> Option<usize> {
        self.loaded
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Section for MapSection {
    fn category(&self) -> &str {
        &self.category
    }

    fn is_metadata(&self) -> bool {
        self.metadata
    }

    fn to_map(&self) -> SectionData {
        self.values.clone()
    }

    fn set_from_map(&mut self, data: SectionData, _index: Option<usize>) {
        self.values = data;
    }

    fn clear(&mut self, _index: Option<usize>) {
        self.values = self.defaults.clone();
        self.loaded = None;
    }

    fn on_loaded(&mut self, index: usize) {
        self.loaded = Some(index);
    }

    fn on_saved(&mut self, _index: usize) {
        self.saves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clear_restores_defaults() {
        let mut section = MapSection::new("meta", true).with_default("name", json!(""));
        section.set("name", json!("Alice"));
        section.set("extra", json!(1));

        section.clear(Some(0));

        assert_eq!(section.get("name"), Some(&json!("")));
        assert_eq!(section.get("extra"), None);
    }

    #[test]
    fn test_from_spec() {
        let mut spec = SectionSpec::new("game", false);
        spec.defaults.insert("hp".to_string(), json!(10));

        let section = MapSection::from_spec(&spec);
        assert_eq!(section.category(), "game");
        assert!(!section.is_metadata());
        assert_eq!(section.to_map(), spec.defaults);
    }

    #[test]
    fn test_set_from_map_replaces_contents() {
        let mut section = MapSection::new("game", false).with_default("hp", json!(10));
        let mut data = SectionData::new();
        data.insert("gold".to_string(), json!(5));

        section.set_from_map(data.clone(), Some(1));
        assert_eq!(section.to_map(), data);
    }
}
