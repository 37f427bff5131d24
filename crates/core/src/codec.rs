//! Versioned at-rest encoding of an [`AddressPayload`].
//!
//! A payload is stored in a single text column as a JSON envelope:
//!
//! ```text
//! {"version":1,"address":{"reference_field":null,"shipping_city":"Pune",...}}
//! ```
//!
//! The envelope keeps the column readable by any component that speaks JSON,
//! and the `version` tag lets the layout change without guessing at old rows.
//!
//! # Example
//!
//! ```
//! use multiship_core::{AddressPayload, decode_payload, encode_payload};
//!
//! let payload = AddressPayload {
//!     shipping_city: Some("Pune".to_string()),
//!     ..Default::default()
//! };
//!
//! let blob = encode_payload(&payload).unwrap();
//! assert_eq!(decode_payload(&blob).unwrap(), payload);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::AddressPayload;

/// Envelope version written by [`encode_payload`].
pub const CURRENT_VERSION: u32 = 1;

/// Errors that can occur when encoding or decoding a stored payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stored text is not a valid envelope.
    #[error("malformed address blob: {0}")]
    Malformed(String),
    /// The envelope was written by a newer or unknown layout.
    #[error("unsupported address blob version {0} (expected {expected})", expected = CURRENT_VERSION)]
    UnsupportedVersion(u32),
    /// The payload could not be serialized.
    #[error("failed to encode address blob: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    address: &'a AddressPayload,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    address: serde_json::Value,
}

/// Encode a payload into its stored representation.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode_payload(payload: &AddressPayload) -> Result<String, CodecError> {
    serde_json::to_string(&EnvelopeRef {
        version: CURRENT_VERSION,
        address: payload,
    })
    .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a stored representation back into a payload.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the text is not a JSON envelope or the
/// address fields have the wrong shape, and `CodecError::UnsupportedVersion`
/// if the envelope version is not [`CURRENT_VERSION`].
pub fn decode_payload(blob: &str) -> Result<AddressPayload, CodecError> {
    let envelope: Envelope =
        serde_json::from_str(blob).map_err(|e| CodecError::Malformed(e.to_string()))?;

    if envelope.version != CURRENT_VERSION {
        return Err(CodecError::UnsupportedVersion(envelope.version));
    }

    serde_json::from_value(envelope.address).map_err(|e| CodecError::Malformed(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pune() -> AddressPayload {
        AddressPayload {
            reference_field: Some("home".to_string()),
            shipping_first_name: Some("Asha".to_string()),
            shipping_city: Some("Pune".to_string()),
            shipping_country: Some("IN".to_string()),
            shipping_postcode: Some("411001".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_writes_versioned_envelope() {
        let blob = encode_payload(&pune()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["address"]["shipping_city"], "Pune");
        assert!(value["address"]["shipping_company"].is_null());
    }

    #[test]
    fn test_decode_restores_payload() {
        let blob = encode_payload(&pune()).unwrap();
        assert_eq!(decode_payload(&blob).unwrap(), pune());
    }

    #[test]
    fn test_decode_accepts_sparse_address() {
        let payload = decode_payload(r#"{"version":1,"address":{"shipping_state":"MH"}}"#).unwrap();
        assert_eq!(payload.shipping_state.as_deref(), Some("MH"));
        assert!(payload.shipping_city.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_payload("a:1:{s:13:\"shipping_city\";s:4:\"Pune\";}").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_missing_version() {
        let err = decode_payload(r#"{"address":{}}"#).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = decode_payload(r#"{"version":2,"address":{}}"#).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion(2));
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_decode_rejects_wrongly_typed_field() {
        let err = decode_payload(r#"{"version":1,"address":{"shipping_city":12}}"#).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }
}
