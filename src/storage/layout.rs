//! Slot path derivation.

use std::path::{Path, PathBuf};

/// Maps `(slot, category)` coordinates to paths:
/// `<root>/<prefix>_<index>/<prefix>_<index>_<category>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    root: PathBuf,
    prefix: String,
    extension: String,
}

impl SlotLayout {
    pub fn new(root: &Path, prefix: &str, extension: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding every file of a slot.
    pub fn folder(&self, index: usize) -> PathBuf {
        self.root.join(format!("{}_{}", self.prefix, index))
    }

    /// File of one category within a slot.
    pub fn file(&self, index: usize, category: &str) -> PathBuf {
        self.folder(index).join(format!(
            "{}_{}_{}.{}",
            self.prefix, index, category, self.extension
        ))
    }

    /// File path for `Some(category)`, folder path for `None`.
    pub fn path(&self, index: usize, category: Option<&str>) -> PathBuf {
        match category {
            Some(category) => self.file(index, category),
            None => self.folder(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path() {
        let layout = SlotLayout::new(Path::new("/data"), "save", "sav");
        assert_eq!(
            layout.path(2, Some("meta")),
            PathBuf::from("/data/save_2/save_2_meta.sav")
        );
    }

    #[test]
    fn test_folder_path() {
        let layout = SlotLayout::new(Path::new("root"), "slot", "json");
        assert_eq!(layout.path(0, None), PathBuf::from("root/slot_0"));
        assert_eq!(layout.folder(11), PathBuf::from("root/slot_11"));
    }
}
