//! Slot manager - the main interface.

use crate::config::SaveConfig;
use crate::crypto::KeyedTransform;
use crate::encoding;
use crate::error::{Error, Result};
use crate::slots::autosave::{Autosave, AutosaveOutcome, AutosaveSettings};
use crate::slots::section::{MapSection, Section};
use crate::storage::SlotStore;
use crate::types::{SectionData, SlotData};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Categories written and skipped by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
}

/// Owns the sections and drives every slot transition.
///
/// Selection state machine:
///
/// ```text
/// Unselected --select--> Selected --exit--> Unselected
/// ```
///
/// `load`/`save`/`exit` need a selected slot. `rename`/`delete`/`import`/
/// `export` change slot identity and need no slot selected.
pub struct SlotManager {
    config: SaveConfig,
    store: SlotStore,
    transform: KeyedTransform,
    /// Sections keyed by category.
    sections: BTreeMap<String, Box<dyn Section>>,
    selected: Option<usize>,
    /// Metadata sections of every slot, index-aligned with slots.
    metadata: Vec<SlotData>,
    autosave: Autosave,
}

impl SlotManager {
    /// Create a manager with no sections registered.
    pub fn new(config: SaveConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;

        Ok(Self {
            store: SlotStore::from_config(&config),
            transform: config.cipher.transform()?,
            sections: BTreeMap::new(),
            selected: None,
            metadata: vec![SlotData::new(); config.slot_count],
            autosave: Autosave::new(config.autosave_interval()),
            config,
        })
    }

    /// Create a manager with a [`MapSection`] for every configured section.
    pub fn from_config(config: SaveConfig) -> Result<Self> {
        let specs = config.sections.clone();
        let mut manager = Self::new(config)?;
        for spec in &specs {
            manager.register(Box::new(MapSection::from_spec(spec)))?;
        }
        Ok(manager)
    }

    /// Register a section. Categories must be unique.
    pub fn register(&mut self, section: Box<dyn Section>) -> Result<()> {
        let category = section.category().to_string();
        if category.is_empty() || category.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!(
                "Invalid section category: {:?}",
                category
            )));
        }
        if self.sections.contains_key(&category) {
            return Err(Error::DuplicateCategory(category));
        }

        debug!(category = %category, metadata = section.is_metadata(), "registered section");
        self.sections.insert(category, section);
        Ok(())
    }

    /// Start the autosave timer and scan metadata of every slot, creating
    /// default files for slots that do not exist yet.
    ///
    /// A slot that cannot be scanned keeps default metadata in the cache and
    /// its files are left as they are.
    pub fn init(&mut self) -> Result<()> {
        self.autosave.start(Instant::now());
        for index in 0..self.config.slot_count {
            if let Err(e) = self.refresh_metadata(index) {
                warn!(slot = index, error = %e, "could not scan slot metadata, using defaults");
                self.metadata[index] = self.default_metadata();
            }
        }

        info!(
            slots = self.config.slot_count,
            sections = self.sections.len(),
            "slot manager initialized"
        );
        Ok(())
    }

    /// Save and exit the selected slot, then stop the autosave timer.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.selected.is_some() {
            self.save()?;
            self.exit()?;
        }
        self.autosave.stop();
        Ok(())
    }

    /// Make `index` the active slot, loading it when `autoload` is set.
    ///
    /// If the load fails the slot is deselected again.
    pub fn select(&mut self, index: usize, autoload: bool) -> Result<()> {
        self.check_index(index)?;
        self.require_unselected("select")?;

        self.selected = Some(index);
        info!(slot = index, "selected slot");

        if autoload {
            if let Err(e) = self.load() {
                self.selected = None;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Load every section from the selected slot.
    pub fn load(&mut self) -> Result<()> {
        let index = self.require_selected("load")?;

        for section in self.sections.values_mut() {
            let data = self.store.read_or_create(index, &**section)?;
            section.set_from_map(data, Some(index));
            section.on_loaded(index);
        }

        debug!(slot = index, "loaded slot");
        Ok(())
    }

    /// Write every section to the selected slot.
    pub fn save(&mut self) -> Result<()> {
        let index = self.require_selected("save")?;

        for (category, section) in self.sections.iter_mut() {
            self.store.write(index, category, &section.to_map())?;
            section.on_saved(index);
        }

        debug!(slot = index, "saved slot");
        Ok(())
    }

    /// Deselect, clear every section and refresh the slot's metadata entry.
    ///
    /// Returns the index that was selected.
    pub fn exit(&mut self) -> Result<usize> {
        let index = self.require_selected("exit")?;

        self.selected = None;
        for section in self.sections.values_mut() {
            section.clear(Some(index));
        }
        self.refresh_metadata(index)?;

        info!(slot = index, "exited slot");
        Ok(index)
    }

    /// Set the display name stored in the metadata category of a slot.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.require_unselected("rename")?;
        self.check_index(index)?;

        let category = self.config.metadata_category.clone();
        let mut data = self.metadata[index]
            .get(&category)
            .cloned()
            .unwrap_or_default();
        data.insert(self.config.name_key.clone(), Value::from(new_name));

        let section = match self.sections.get_mut(&category) {
            Some(section) if section.is_metadata() => section,
            _ => {
                warn!(category = %category, "no metadata section to rename through");
                return Err(Error::UnknownCategory(category));
            }
        };

        section.set_from_map(data, Some(index));
        let written = section.to_map();
        let result = self.store.write(index, &category, &written);
        section.clear(Some(index));
        result?;

        self.metadata[index].insert(category, written);
        info!(slot = index, name = new_name, "renamed slot");
        Ok(())
    }

    /// Remove a slot's folder and files. Returns `false` if it did not exist.
    pub fn delete(&mut self, index: usize) -> Result<bool> {
        self.require_unselected("delete")?;
        self.check_index(index)?;

        let removed = self.store.delete_slot(index)?;
        self.metadata[index] = self.default_metadata();
        Ok(removed)
    }

    /// Write the categories of an export string into a slot.
    ///
    /// Categories without a registered section are skipped.
    pub fn import(&mut self, index: usize, encoded: &str) -> Result<ImportReport> {
        self.require_unselected("import")?;
        self.check_index(index)?;

        let data = encoding::decode(encoded, &self.transform).map_err(|e| {
            warn!(slot = index, error = %e, "import payload could not be decoded");
            e
        })?;
        if data.is_empty() {
            warn!(slot = index, "import payload is empty");
            return Err(Error::EmptyImport);
        }

        let mut report = ImportReport::default();
        for (category, section_data) in data {
            if self.sections.contains_key(&category) {
                self.store.write(index, &category, &section_data)?;
                report.imported.push(category);
            } else {
                warn!(slot = index, category = %category, "skipping unknown category in import");
                report.skipped.push(category);
            }
        }
        self.refresh_metadata(index)?;

        info!(
            slot = index,
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "imported slot"
        );
        Ok(report)
    }

    /// Encode every category of a slot as an export string.
    ///
    /// Missing or corrupted sections are exported with their defaults.
    pub fn export(&self, index: usize) -> Result<String> {
        self.require_unselected("export")?;
        self.check_index(index)?;

        let mut data = SlotData::new();
        for (category, section) in &self.sections {
            let section_data = match self.store.read(index, category) {
                Ok(read) => read.data,
                Err(Error::SlotFileMissing(_)) => section.to_map(),
                Err(e @ (Error::Decryption | Error::Io(_))) => return Err(e),
                Err(e) => {
                    warn!(slot = index, category = %category, error = %e, "exporting defaults for unreadable section");
                    section.to_map()
                }
            };
            data.insert(category.clone(), section_data);
        }

        let encoded = encoding::encode(&data, &self.transform)?;
        info!(slot = index, export = %encoded, "exported slot");
        Ok(encoded)
    }

    /// Poll the autosave timer. On a due tick, saves the selected slot if
    /// `settings` has autosave enabled.
    pub fn poll_autosave(
        &mut self,
        now: Instant,
        settings: &dyn AutosaveSettings,
    ) -> Result<AutosaveOutcome> {
        if !self.autosave.tick(now) {
            return Ok(AutosaveOutcome::NotDue);
        }
        if !settings.autosave_enabled() {
            debug!("autosave disabled, skipping tick");
            return Ok(AutosaveOutcome::Disabled);
        }

        match self.selected {
            None => Ok(AutosaveOutcome::NoSelection),
            Some(index) => {
                self.save()?;
                info!(slot = index, "autosaved slot");
                Ok(AutosaveOutcome::Saved(index))
            }
        }
    }

    /// [`poll_autosave`](Self::poll_autosave) using the configured setting.
    pub fn tick(&mut self, now: Instant) -> Result<AutosaveOutcome> {
        let enabled = self.config.autosave_enabled;
        self.poll_autosave(now, &enabled)
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.config.autosave_enabled = enabled;
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn slot_count(&self) -> usize {
        self.config.slot_count
    }

    /// Metadata of every slot.
    pub fn metadata(&self) -> &[SlotData] {
        &self.metadata
    }

    pub fn metadata_for(&self, index: usize) -> Option<&SlotData> {
        self.metadata.get(index)
    }

    /// Display name from the cached metadata of a slot.
    pub fn slot_name(&self, index: usize) -> Option<&str> {
        self.metadata
            .get(index)?
            .get(&self.config.metadata_category)?
            .get(&self.config.name_key)?
            .as_str()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|k| k.as_str())
    }

    pub fn section(&self, category: &str) -> Option<&(dyn Section + 'static)> {
        self.sections.get(category).map(|s| &**s)
    }

    pub fn section_mut(&mut self, category: &str) -> Option<&mut (dyn Section + 'static)> {
        self.sections.get_mut(category).map(|s| &mut **s)
    }

    fn refresh_metadata(&mut self, index: usize) -> Result<()> {
        let mut entry = SlotData::new();
        for (category, section) in self.sections.iter().filter(|(_, s)| s.is_metadata()) {
            let data = self.store.read_or_create(index, &**section)?;
            entry.insert(category.clone(), data);
        }
        self.metadata[index] = entry;
        Ok(())
    }

    fn default_metadata(&self) -> SlotData {
        self.sections
            .iter()
            .filter(|(_, s)| s.is_metadata())
            .map(|(category, s)| (category.clone(), s.to_map()))
            .collect::<BTreeMap<String, SectionData>>()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.config.slot_count {
            warn!(slot = index, count = self.config.slot_count, "slot index out of range");
            return Err(Error::SlotOutOfRange {
                index,
                count: self.config.slot_count,
            });
        }
        Ok(())
    }

    fn require_selected(&self, operation: &str) -> Result<usize> {
        self.selected.ok_or_else(|| {
            warn!(operation, "no slot selected");
            Error::NoSlotSelected
        })
    }

    fn require_unselected(&self, operation: &str) -> Result<()> {
        match self.selected {
            Some(index) => {
                warn!(operation, slot = index, "not allowed while a slot is selected");
                Err(Error::SlotSelected(index))
            }
            None => Ok(()),
        }
    }
}
