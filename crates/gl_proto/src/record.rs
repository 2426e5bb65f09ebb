//! Log store records and change-stream events.
//!
//! The log store only ever holds ciphertext: the `payload` field is the
//! envelope's wire JSON. The outer `sender` field carries either the real
//! display name or a constant placeholder, depending on the deployment's
//! protocol variant (metadata-hiding vs plain) — a version choice, not a
//! bug.

use serde::{Deserialize, Serialize};

/// Outer sender value in metadata-hiding mode. The real sender travels
/// inside the ciphertext.
pub const SENDER_PLACEHOLDER: &str = "ANONYMOUS";

/// Service-assigned record identifier. Opaque; used for idempotent
/// duplicate suppression and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as submitted for append (no id yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub sender: String,
    /// Envelope wire JSON (ciphertext).
    pub payload: String,
    /// Arrival timestamp, milliseconds.
    pub timestamp: i64,
}

/// A stored record as delivered by the change stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: RecordId,
    pub sender: String,
    pub payload: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One change-stream notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: LogRecord,
}
