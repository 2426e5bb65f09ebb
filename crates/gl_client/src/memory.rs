//! In-memory log store.
//!
//! Used by the integration tests and local runs. Preserves arrival order,
//! assigns UUID record ids, replays the bounded tail to new subscribers,
//! and implements delete idempotently — the same observable contract the
//! remote store offers.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use gl_crypto::handshake::PeerKey;
use gl_proto::{ChangeEvent, ChangeKind, LogRecord, NewRecord, RecordId};

use crate::error::TransportError;
use crate::log_service::LogService;

#[derive(Default)]
struct Inner {
    records: Vec<LogRecord>,
    subscribers: Vec<mpsc::UnboundedSender<ChangeEvent>>,
    directory: HashMap<String, Vec<PeerKey>>,
    key_subscribers: HashMap<String, Vec<mpsc::UnboundedSender<PeerKey>>>,
}

#[derive(Default)]
pub struct MemoryLogService {
    inner: Mutex<Inner>,
}

impl MemoryLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-deleted) records. Test observability.
    pub async fn record_count(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Whether a record id is still stored. Test observability.
    pub async fn contains(&self, id: &RecordId) -> bool {
        self.inner.lock().await.records.iter().any(|r| &r.id == id)
    }
}

fn fan_out<T: Clone>(subscribers: &mut Vec<mpsc::UnboundedSender<T>>, item: &T) {
    subscribers.retain(|tx| tx.send(item.clone()).is_ok());
}

#[async_trait]
impl LogService for MemoryLogService {
    async fn append(&self, record: NewRecord) -> Result<RecordId, TransportError> {
        let mut inner = self.inner.lock().await;
        let stored = LogRecord {
            id: RecordId(Uuid::new_v4().to_string()),
            sender: record.sender,
            payload: record.payload,
            timestamp: record.timestamp,
        };
        let id = stored.id.clone();
        inner.records.push(stored.clone());
        let event = ChangeEvent {
            kind: ChangeKind::Added,
            record: stored,
        };
        fan_out(&mut inner.subscribers, &event);
        Ok(id)
    }

    async fn subscribe_ordered(
        &self,
        last_n: usize,
    ) -> Result<mpsc::UnboundedReceiver<ChangeEvent>, TransportError> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::unbounded_channel();

        // Replay the bounded tail in arrival order.
        let skip = inner.records.len().saturating_sub(last_n);
        for record in inner.records.iter().skip(skip) {
            let _ = tx.send(ChangeEvent {
                kind: ChangeKind::Added,
                record: record.clone(),
            });
        }

        inner.subscribers.push(tx);
        Ok(rx)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        let before = inner.records.len();
        inner.records.retain(|r| &r.id != id);
        if inner.records.len() < before {
            // Removal events are notified but ignored by the consumer.
            let event = ChangeEvent {
                kind: ChangeKind::Removed,
                record: LogRecord {
                    id: id.clone(),
                    sender: String::new(),
                    payload: String::new(),
                    timestamp: 0,
                },
            };
            fan_out(&mut inner.subscribers, &event);
        }
        // Deleting an absent id is a success: deletes are idempotent.
        Ok(())
    }

    async fn publish_key(&self, room: &str, key: PeerKey) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        inner
            .directory
            .entry(room.to_string())
            .or_default()
            .push(key.clone());
        if let Some(subs) = inner.key_subscribers.get_mut(room) {
            fan_out(subs, &key);
        }
        Ok(())
    }

    async fn subscribe_keys(
        &self,
        room: &str,
    ) -> Result<mpsc::UnboundedReceiver<PeerKey>, TransportError> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(existing) = inner.directory.get(room) {
            for key in existing {
                let _ = tx.send(key.clone());
            }
        }
        inner
            .key_subscribers
            .entry(room.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64) -> NewRecord {
        NewRecord {
            sender: "ANONYMOUS".into(),
            payload: "{}".into(),
            timestamp: ts,
        }
    }

    #[tokio::test]
    async fn replays_bounded_tail_in_order() {
        let log = MemoryLogService::new();
        for ts in 0..5 {
            log.append(record(ts)).await.unwrap();
        }

        let mut rx = log.subscribe_ordered(3).await.unwrap();
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event.record.timestamp);
        }
        assert_eq!(seen, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let log = MemoryLogService::new();
        let id = log.append(record(1)).await.unwrap();

        log.delete(&id).await.unwrap();
        log.delete(&id).await.unwrap();
        assert_eq!(log.record_count().await, 0);
    }

    #[tokio::test]
    async fn key_directory_replays_existing_entries() {
        let log = MemoryLogService::new();
        let key = PeerKey {
            identity: "nyx".into(),
            public_key: "AAAA".into(),
            published_at: 1,
        };
        log.publish_key("room", key.clone()).await.unwrap();

        let mut rx = log.subscribe_keys("room").await.unwrap();
        let replayed = rx.try_recv().unwrap();
        assert_eq!(replayed.identity, "nyx");

        // Live publish reaches the same subscriber.
        log.publish_key("room", PeerKey { identity: "vex".into(), ..key })
            .await
            .unwrap();
        assert_eq!(rx.try_recv().unwrap().identity, "vex");
    }
}
