//! Storage layer for slot files.
//!
//! This module handles:
//! - Deriving slot folder and file paths
//! - Signed writes and signature-verified reads
//! - Optional password sealing of file contents

mod layout;
mod slot_file;

pub use layout::SlotLayout;
pub use slot_file::{sign, verify, Integrity, SlotRead, SlotStore};
