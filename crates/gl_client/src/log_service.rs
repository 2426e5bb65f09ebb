//! The log store contract this core consumes.
//!
//! The store is a remote, append-only, ordered document store with
//! real-time change notification. It only ever holds ciphertext; its
//! internals (and any retry policy) live behind this trait.

use async_trait::async_trait;
use tokio::sync::mpsc;

use gl_crypto::handshake::PeerKey;
use gl_proto::{ChangeEvent, NewRecord, RecordId};

use crate::error::TransportError;

#[async_trait]
pub trait LogService: Send + Sync {
    /// Append a record to the message collection. A failure here surfaces
    /// to the user as a send failure.
    async fn append(&self, record: NewRecord) -> Result<RecordId, TransportError>;

    /// Subscribe to the change stream for the message collection, ordered
    /// by arrival time and bounded to the most recent `last_n` records.
    async fn subscribe_ordered(
        &self,
        last_n: usize,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, TransportError>;

    /// Delete a record. MUST be idempotent: deleting an id that is already
    /// gone (including concurrently, from another client) succeeds.
    async fn delete(&self, id: &RecordId) -> Result<(), TransportError>;

    /// Publish an identity's public key to the room-scoped key directory.
    async fn publish_key(&self, room: &str, key: PeerKey) -> Result<(), TransportError>;

    /// Subscribe to key publishes/updates in the room directory. Existing
    /// entries are replayed to a new subscriber.
    async fn subscribe_keys(
        &self,
        room: &str,
    ) -> Result<mpsc::UnboundedReceiver<PeerKey>, TransportError>;
}
