//! Save slots: sections, the slot manager and autosave.

mod autosave;
mod manager;
mod section;

pub use autosave::{Autosave, AutosaveOutcome, AutosaveSettings};
pub use manager::{ImportReport, SlotManager};
pub use section::{MapSection, Section};
