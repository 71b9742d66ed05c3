//! Encoding of slot data into export strings and back.

use crate::crypto::KeyedTransform;
use crate::error::{Error, Result};
use crate::types::SlotData;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

/// Encode slot data as an export string.
///
/// # Example
///
/// ```
/// use slot_save::crypto::KeyedTransform;
/// use slot_save::encoding::{decode, encode};
/// use slot_save::types::{SectionData, SlotData};
///
/// let mut meta = SectionData::new();
/// meta.insert("name".to_string(), "Alice".into());
/// let mut slot = SlotData::new();
/// slot.insert("meta".to_string(), meta);
///
/// let transform = KeyedTransform::identity();
/// let exported = encode(&slot, &transform).unwrap();
/// assert_eq!(decode(&exported, &transform).unwrap(), slot);
/// ```
pub fn encode(data: &SlotData, transform: &KeyedTransform) -> Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(transform.encode(&STANDARD.encode(json.as_bytes())))
}

/// Decode an export string produced by [`encode`].
///
/// Each stage reports its own error: `Base64`, `Utf8` or `Json`.
pub fn decode(text: &str, transform: &KeyedTransform) -> Result<SlotData> {
    let base64_text = transform.decode(text.trim());
    let raw = STANDARD.decode(base64_text)?;
    let json = String::from_utf8(raw)?;
    serde_json::from_str(&json).map_err(|e| Error::Json(e.to_string()))
}

/// Parse JSON, returning `None` instead of an error on malformed input.
pub fn parse_json_or_null(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}
