//! Item boundaries for CBOR values that carry no length prefix.
//!
//! `ciborium` reading from a `&mut &[u8]` advances the slice exactly past
//! the item it decoded, so the consumed length falls out of the remainder.

use ciborium::value::Value as CborValue;

use super::errors::ParseError;

/// Decodes the first CBOR data item in `data`.
///
/// Returns the value together with the number of bytes it occupied. Bytes
/// after the item are left for the caller.
pub(crate) fn read_item(data: &[u8]) -> Result<(CborValue, usize), ParseError> {
    let mut rest = data;
    let value: CborValue = ciborium::de::from_reader(&mut rest)
        .map_err(|e| ParseError::InvalidCbor(e.to_string()))?;
    Ok((value, data.len() - rest.len()))
}

/// Like [`read_item`], but the item must be a map.
pub(crate) fn read_map(
    data: &[u8],
) -> Result<(Vec<(CborValue, CborValue)>, usize), ParseError> {
    match read_item(data)? {
        (CborValue::Map(entries), len) => Ok((entries, len)),
        _ => Err(ParseError::InvalidCbor("expected a map".to_string())),
    }
}

/// Encodes a value back to CBOR.
pub(crate) fn to_bytes(value: &CborValue) -> Result<Vec<u8>, ParseError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out)
        .map_err(|e| ParseError::InvalidCbor(e.to_string()))?;
    Ok(out)
}
