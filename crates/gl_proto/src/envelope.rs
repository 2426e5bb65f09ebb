//! Encrypted message envelope — what the log store sees.
//!
//! Wire JSON:
//!
//!   { "iv":   <base64 string | legacy array<int>>,
//!     "data": <base64 string | legacy array<int>> }
//!
//! Older deployments serialised both fields as raw JSON byte arrays; the
//! current format is standard base64. Both are accepted on read (the shape
//! of the value is self-describing) and normalized to raw bytes here, in a
//! single tagged decode step, before any business logic runs. The write
//! path only ever emits the current format.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Envelope field is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// One envelope field as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireBytes {
    /// Current format: standard base64.
    Base64(String),
    /// Legacy format: a JSON array of byte values.
    LegacyArray(Vec<u8>),
}

impl WireBytes {
    fn into_bytes(self) -> Result<Vec<u8>, EnvelopeError> {
        match self {
            WireBytes::Base64(s) => Ok(STANDARD.decode(s)?),
            WireBytes::LegacyArray(bytes) => Ok(bytes),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireEnvelope {
    iv: WireBytes,
    data: WireBytes,
}

/// Normalized in-memory envelope: per-message nonce + ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: Vec<u8>,
    pub data: Vec<u8>,
}

impl Envelope {
    /// Parse and normalize a wire envelope, accepting both historical
    /// field encodings.
    pub fn from_wire_json(json: &str) -> Result<Self, EnvelopeError> {
        let wire: WireEnvelope = serde_json::from_str(json)?;
        Ok(Self {
            iv: wire.iv.into_bytes()?,
            data: wire.data.into_bytes()?,
        })
    }

    /// Serialise in the current (base64) format.
    pub fn to_wire_json(&self) -> String {
        let wire = WireEnvelope {
            iv: WireBytes::Base64(STANDARD.encode(&self.iv)),
            data: WireBytes::Base64(STANDARD.encode(&self.data)),
        };
        // Struct of two strings cannot fail to serialise.
        serde_json::to_string(&wire).unwrap_or_default()
    }
}
