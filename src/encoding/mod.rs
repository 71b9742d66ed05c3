//! Portable export strings.
//!
//! ```text
//! SlotData → JSON → base64 → keyed substitution → export string
//! ```

mod codec;

pub use codec::{decode, encode, parse_json_or_null};
