//! Plaintext message structure (inside the encrypted envelope).
//!
//! Current plaintexts are JSON objects carrying sender and kind metadata
//! inside the ciphertext (the outer record only ever sees a placeholder).
//! The oldest deployments encrypted a bare string instead; those are
//! normalized into the structured form on read.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Marker prefix legacy clients used for image content in bare-string
/// plaintexts.
pub const LEGACY_IMAGE_PREFIX: &str = "IMG:";

/// Content of the synthetic payload surfaced for a visible decrypt error.
pub const DECRYPT_ERROR_MARKER: &str = "UNDECRYPTABLE TRANSMISSION — KEY MISMATCH";

/// Sender name substituted when a legacy plaintext carried none.
pub const UNKNOWN_USER: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Text,
    Image,
    /// Synthetic, system-authored; never produced by a sender and never
    /// written to the wire.
    Error,
}

/// What a message looks like after decryption (and before encryption).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Sender display name (inside the ciphertext, unlike the outer record).
    pub user: String,
    /// Message text, or base64 image data for `kind = image`.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    /// Sender-side millisecond timestamp.
    pub timestamp: i64,
}

impl Payload {
    pub fn text(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            content: content.into(),
            kind: PayloadKind::Text,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn image(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            content: content.into(),
            kind: PayloadKind::Image,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// The fixed system-authored payload surfaced when a record fails
    /// authentication inside the current session window.
    pub fn decrypt_error(now_ms: i64) -> Self {
        Self {
            user: "SYSTEM".into(),
            content: DECRYPT_ERROR_MARKER.into(),
            kind: PayloadKind::Error,
            timestamp: now_ms,
        }
    }

    /// Interpret decrypted plaintext bytes.
    ///
    /// Tries the structured JSON form first; anything that fails to parse
    /// is treated as a legacy bare string — sender unknown, kind inferred
    /// from the `IMG:` content marker, no embedded timestamp.
    pub fn from_plaintext(plaintext: &[u8]) -> Self {
        if let Ok(payload) = serde_json::from_slice::<Payload>(plaintext) {
            return payload;
        }

        let text = String::from_utf8_lossy(plaintext).into_owned();
        match text.strip_prefix(LEGACY_IMAGE_PREFIX) {
            Some(image_data) => Self {
                user: UNKNOWN_USER.into(),
                content: image_data.to_string(),
                kind: PayloadKind::Image,
                timestamp: 0,
            },
            None => Self {
                user: UNKNOWN_USER.into(),
                content: text,
                kind: PayloadKind::Text,
                timestamp: 0,
            },
        }
    }

    /// Canonical plaintext bytes for encryption.
    pub fn to_plaintext(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_plaintext_roundtrips() {
        let payload = Payload::text("nyx", "hello there");
        let bytes = payload.to_plaintext().unwrap();
        assert_eq!(Payload::from_plaintext(&bytes), payload);
    }

    #[test]
    fn kind_serialises_as_lowercase_type_field() {
        let json = serde_json::to_string(&Payload::text("nyx", "hi")).unwrap();
        assert!(json.contains("\"type\":\"text\""));
    }

    #[test]
    fn legacy_bare_string_becomes_text() {
        let payload = Payload::from_plaintext(b"hello");
        assert_eq!(payload.user, UNKNOWN_USER);
        assert_eq!(payload.content, "hello");
        assert_eq!(payload.kind, PayloadKind::Text);
        assert_eq!(payload.timestamp, 0);
    }

    #[test]
    fn legacy_image_marker_is_stripped() {
        let payload = Payload::from_plaintext(b"IMG:abc");
        assert_eq!(payload.user, UNKNOWN_USER);
        assert_eq!(payload.content, "abc");
        assert_eq!(payload.kind, PayloadKind::Image);
    }

    #[test]
    fn non_object_json_is_treated_as_legacy() {
        // "123" parses as JSON but not as a structured payload.
        let payload = Payload::from_plaintext(b"123");
        assert_eq!(payload.kind, PayloadKind::Text);
        assert_eq!(payload.content, "123");
    }
}
