//! The two-stage deserialization pipeline: normalize keys, then structure.
//!
//! Endpoint code never parses JSON itself. A typed operation is a raw
//! operation passed through [`deserialized`], with the target type as the
//! only per-endpoint declaration.

use serde_json::Value;

use crate::error::{DeckError, StructureError};
use crate::normalize::normalize;
use crate::structure::{Converter, Structure};

/// Normalize `raw` and structure it as `T`.
pub fn deserialize<T: Structure>(converter: &Converter, raw: Value) -> Result<T, StructureError> {
    converter.structure(&normalize(raw))
}

/// Run `call` to obtain raw JSON and deserialize its result as `T`.
///
/// Errors from `call` are returned as-is; structuring errors are wrapped in
/// `DeckError::Structure` without further translation.
pub fn deserialized<T, F>(converter: &Converter, call: F) -> Result<T, DeckError>
where
    T: Structure,
    F: FnOnce() -> Result<Value, DeckError>,
{
    let raw = call()?;
    Ok(deserialize(converter, raw)?)
}
