//! gl_proto — Wire types, envelopes, and serialisation for Ghostline
//!
//! The wire protocol evolved across deployments sharing one log store, so
//! the read path tolerates two historical formats (legacy numeric-array
//! envelope fields, legacy bare-string plaintexts) while the write path
//! only ever produces the current format.
//!
//! # Modules
//! - `envelope` — Encrypted message envelope (what the log store sees)
//! - `payload`  — Plaintext message structure (inside the envelope)
//! - `record`   — Log store records and change-stream events
//! - `codec`    — seal/open: payload ⇄ envelope under a session secret

pub mod codec;
pub mod envelope;
pub mod payload;
pub mod record;

pub use codec::{open, seal, DecryptFailure};
pub use envelope::Envelope;
pub use payload::{Payload, PayloadKind};
pub use record::{ChangeEvent, ChangeKind, LogRecord, NewRecord, RecordId};
