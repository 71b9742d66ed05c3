//! Integration tests for end-to-end slot workflows.

use serde_json::json;
use slot_save::config::{SaveConfig, SectionSpec};
use slot_save::crypto::{CipherMode, KeyedTransform};
use slot_save::encoding::decode;
use slot_save::slots::{AutosaveOutcome, SlotManager};
use slot_save::{Error, Section, SectionData, SlotData};
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Two slots, prefix `save`, a `meta` section named "Alice" by default and an
/// empty `game` section.
fn setup_test_env(temp_dir: &TempDir) -> SaveConfig {
    let mut config = SaveConfig::with_root(temp_dir.path());
    config.slot_count = 2;

    let mut meta = SectionSpec::new("meta", true);
    meta.defaults.insert("name".to_string(), json!("Alice"));
    config.sections = vec![meta, SectionSpec::new("game", false)];
    config
}

fn start(config: SaveConfig) -> SlotManager {
    let mut slots = SlotManager::from_config(config).expect("Failed to create manager");
    slots.init().expect("Failed to init manager");
    slots
}

fn section_data(value: serde_json::Value) -> SectionData {
    serde_json::from_value(value).unwrap()
}

fn set_value(slots: &mut SlotManager, category: &str, key: &str, value: serde_json::Value) {
    let index = slots.selected().expect("slot must be selected");
    let section = slots.section_mut(category).expect("unknown category");
    let mut data = section.to_map();
    data.insert(key.to_string(), value);
    section.set_from_map(data, Some(index));
}

#[test]
fn test_rename_through_save_and_export() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup_test_env(&temp_dir);
    let mut slots = start(config.clone());

    slots.select(0, true).expect("Failed to select");
    assert_eq!(
        slots.section("meta").unwrap().to_map(),
        section_data(json!({"name": "Alice"}))
    );

    set_value(&mut slots, "meta", "name", json!("Bob"));
    slots.save().expect("Failed to save");
    slots.exit().expect("Failed to exit");

    let exported = slots.export(0).expect("Failed to export");
    let decoded = decode(&exported, &KeyedTransform::identity()).expect("Failed to decode");

    let mut expected = SlotData::new();
    expected.insert("meta".to_string(), section_data(json!({"name": "Bob"})));
    expected.insert("game".to_string(), SectionData::new());
    assert_eq!(decoded, expected);
}

#[test]
fn test_metadata_cache_after_init() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let slots = start(setup_test_env(&temp_dir));

    assert_eq!(slots.metadata().len(), 2);
    for index in 0..2 {
        assert_eq!(slots.slot_name(index), Some("Alice"));
        assert!(temp_dir
            .path()
            .join(format!("save_{}/save_{}_meta.sav", index, index))
            .exists());
    }
}

#[test]
fn test_exit_refreshes_only_that_slot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut slots = start(setup_test_env(&temp_dir));

    slots.select(1, true).unwrap();
    set_value(&mut slots, "meta", "name", json!("Carol"));
    set_value(&mut slots, "game", "level", json!(7));
    slots.save().unwrap();

    // Cache is not updated until exit.
    assert_eq!(slots.slot_name(1), Some("Alice"));
    slots.exit().unwrap();

    assert_eq!(slots.slot_name(0), Some("Alice"));
    assert_eq!(slots.slot_name(1), Some("Carol"));
    assert!(!slots.metadata_for(1).unwrap().contains_key("game"));
}

#[test]
fn test_persistence_across_managers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup_test_env(&temp_dir);

    {
        let mut slots = start(config.clone());
        slots.select(0, true).unwrap();
        set_value(&mut slots, "game", "inventory", json!(["lamp", "rope"]));
        slots.save().unwrap();
        slots.exit().unwrap();
    }

    let mut slots = start(config);
    slots.select(0, true).unwrap();
    assert_eq!(
        slots.section("game").unwrap().to_map(),
        section_data(json!({"inventory": ["lamp", "rope"]}))
    );
}

#[test]
fn test_export_import_between_slots() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = setup_test_env(&temp_dir);
    config.cipher.mode = CipherMode::Substitution;
    config.cipher.secret = "copy paste".to_string();
    let mut slots = start(config);

    slots.select(0, true).unwrap();
    set_value(&mut slots, "meta", "name", json!("Dana"));
    set_value(&mut slots, "game", "gold", json!(120));
    slots.save().unwrap();
    slots.exit().unwrap();

    let exported = slots.export(0).unwrap();
    let report = slots.import(1, &exported).unwrap();
    assert_eq!(report.imported, vec!["game".to_string(), "meta".to_string()]);
    assert!(report.skipped.is_empty());
    assert_eq!(slots.slot_name(1), Some("Dana"));

    slots.select(1, true).unwrap();
    assert_eq!(
        slots.section("game").unwrap().to_map(),
        section_data(json!({"gold": 120}))
    );
}

#[test]
fn test_import_skips_unknown_categories() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut slots = start(setup_test_env(&temp_dir));

    let mut payload = SlotData::new();
    payload.insert("meta".to_string(), section_data(json!({"name": "Eve"})));
    payload.insert("achievements".to_string(), section_data(json!({"first": true})));
    let encoded = slot_save::encoding::encode(&payload, &KeyedTransform::identity()).unwrap();

    let report = slots.import(0, &encoded).unwrap();
    assert_eq!(report.imported, vec!["meta".to_string()]);
    assert_eq!(report.skipped, vec!["achievements".to_string()]);
    assert_eq!(slots.slot_name(0), Some("Eve"));
    assert!(!temp_dir.path().join("save_0/save_0_achievements.sav").exists());
}

#[test]
fn test_import_rejects_bad_payloads() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut slots = start(setup_test_env(&temp_dir));
    let before = fs::read(temp_dir.path().join("save_0/save_0_meta.sav")).unwrap();

    assert!(matches!(slots.import(0, "%%%"), Err(Error::Base64(_))));
    let empty = slot_save::encoding::encode(&SlotData::new(), &KeyedTransform::identity()).unwrap();
    assert!(matches!(slots.import(0, &empty), Err(Error::EmptyImport)));

    let after = fs::read(temp_dir.path().join("save_0/save_0_meta.sav")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_delete_slot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut slots = start(setup_test_env(&temp_dir));
    slots.rename(1, "Doomed").unwrap();

    assert!(slots.delete(1).unwrap());
    assert!(!temp_dir.path().join("save_1").exists());
    assert_eq!(slots.slot_name(1), Some("Alice"));

    // Already gone.
    assert!(!slots.delete(1).unwrap());
}

#[test]
fn test_selection_guards_leave_files_untouched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut slots = start(setup_test_env(&temp_dir));
    slots.select(0, true).unwrap();

    let meta_path = temp_dir.path().join("save_1/save_1_meta.sav");
    let before = fs::read(&meta_path).unwrap();

    let mut payload = SlotData::new();
    payload.insert("meta".to_string(), section_data(json!({"name": "Intruder"})));
    let encoded = slot_save::encoding::encode(&payload, &KeyedTransform::identity()).unwrap();

    assert!(matches!(slots.export(1), Err(Error::SlotSelected(0))));
    assert!(matches!(slots.rename(1, "x"), Err(Error::SlotSelected(0))));
    assert!(matches!(slots.import(1, &encoded), Err(Error::SlotSelected(0))));
    assert!(matches!(slots.delete(1), Err(Error::SlotSelected(0))));

    assert_eq!(fs::read(&meta_path).unwrap(), before);
    assert!(temp_dir.path().join("save_1/save_1_game.sav").exists());
    assert_eq!(slots.slot_name(1), Some("Alice"));
}

#[test]
fn test_autosave_writes_selected_slot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = setup_test_env(&temp_dir);
    config.autosave_interval_secs = 5;
    let mut slots = start(config.clone());

    slots.select(0, true).unwrap();
    set_value(&mut slots, "game", "checkpoint", json!("cave"));

    let outcome = slots.tick(Instant::now() + Duration::from_secs(10)).unwrap();
    assert_eq!(outcome, AutosaveOutcome::Saved(0));

    let reader = start(config);
    let read = reader.store().read(0, "game").unwrap();
    assert_eq!(read.data, section_data(json!({"checkpoint": "cave"})));
}

#[test]
fn test_encrypted_slots() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = setup_test_env(&temp_dir);
    config.slot_count = 1;
    config.password = Some("correct horse".to_string());
    let mut slots = start(config.clone());

    slots.rename(0, "Secret Agent").unwrap();
    let raw = fs::read(temp_dir.path().join("save_0/save_0_meta.sav")).unwrap();
    assert!(!String::from_utf8_lossy(&raw).contains("Secret Agent"));

    let reopened = start(config.clone());
    assert_eq!(reopened.slot_name(0), Some("Secret Agent"));

    config.password = Some("wrong".to_string());
    let mut wrong = start(config);
    assert_eq!(wrong.slot_name(0), Some("Alice"));
    assert!(matches!(wrong.select(0, true), Err(Error::Decryption)));
    assert_eq!(wrong.selected(), None);

    let after = fs::read(temp_dir.path().join("save_0/save_0_meta.sav")).unwrap();
    assert_eq!(raw, after);
}

#[test]
fn test_torn_encrypted_file_does_not_block_other_slots() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = setup_test_env(&temp_dir);
    config.slot_count = 3;
    config.password = Some("correct horse".to_string());
    let mut slots = start(config.clone());
    slots.rename(0, "Hero").unwrap();
    slots.rename(2, "Third").unwrap();

    let path = temp_dir.path().join("save_0/save_0_meta.sav");
    let raw = fs::read(&path).unwrap();
    fs::write(&path, &raw[..raw.len() - 10]).unwrap();

    let mut reopened = start(config);
    assert_eq!(reopened.slot_name(0), Some("Alice"));
    assert_eq!(reopened.slot_name(1), Some("Alice"));
    assert_eq!(reopened.slot_name(2), Some("Third"));

    reopened.select(0, true).expect("Torn slot should load with defaults");
    assert_eq!(
        reopened.section("meta").unwrap().to_map(),
        section_data(json!({"name": "Alice"}))
    );
}
