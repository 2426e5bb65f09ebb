//! Session feed consumer.
//!
//! Subscribes to the log store's ordered change stream, acts only on
//! `added` events, deduplicates by record id, and runs decrypt +
//! lifecycle classification per record.
//!
//! Ordering: records are surfaced in non-decreasing arrival-time order.
//! Decrypt dispatch is serialized per stream — one record is fully
//! processed before the next is taken — so a slow decrypt for an older
//! record can never cause a later record to display first. (Purge deletes
//! are the exception: fire-and-forget background tasks whose errors are
//! logged and swallowed.)

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use gl_crypto::{CryptoError, Session};
use gl_proto::{codec, ChangeKind, Payload, RecordId};

use crate::error::ClientError;
use crate::lifecycle::{classify, Disposition, RetentionPolicy};
use crate::log_service::LogService;

/// One surfaced message, tagged with its record id for duplicate
/// suppression at the presentation boundary.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub record_id: RecordId,
    pub payload: Payload,
}

/// Shutdown hook for a running feed task, tied to session invalidation.
pub struct FeedHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Stop the consumer task and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

pub struct FeedConsumer {
    log: Arc<dyn LogService>,
    session: Session,
    policy: RetentionPolicy,
    page_size: usize,
    /// Record ids already processed. Shared with the client so a panic
    /// wipe can target everything this feed has observed.
    observed: Arc<Mutex<HashSet<RecordId>>>,
}

impl FeedConsumer {
    pub fn new(
        log: Arc<dyn LogService>,
        session: Session,
        policy: RetentionPolicy,
        page_size: usize,
        observed: Arc<Mutex<HashSet<RecordId>>>,
    ) -> Self {
        Self {
            log,
            session,
            policy,
            page_size,
            observed,
        }
    }

    /// Subscribe and spawn the consumer task. Surfaced payloads arrive on
    /// the returned receiver; the handle stops the task.
    pub async fn start(self) -> Result<(FeedHandle, mpsc::Receiver<FeedItem>), ClientError> {
        let session_started_at = self
            .session
            .started_at_ms()
            .await
            .ok_or(CryptoError::SessionInvalidated)?;

        let mut events = self.log.subscribe_ordered(self.page_size).await?;
        let (items_tx, items_rx) = mpsc::channel(64);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        if event.kind != ChangeKind::Added {
                            continue;
                        }

                        // Duplicate delivery of the same id is suppressed.
                        {
                            let mut observed = self.observed.lock().await;
                            if !observed.insert(event.record.id.clone()) {
                                continue;
                            }
                        }

                        let outcome = codec::open_wire(&self.session, &event.record.payload).await;
                        let now = Utc::now().timestamp_millis();

                        match classify(
                            event.record.timestamp,
                            outcome,
                            now,
                            session_started_at,
                            &self.policy,
                        ) {
                            Disposition::Expired => {
                                self.purge(event.record.id.clone());
                            }
                            Disposition::PreSessionNoise => {
                                tracing::debug!(
                                    target: "ghostline",
                                    event = "pre_session_noise_dropped",
                                    record_id = %event.record.id,
                                );
                            }
                            Disposition::Discard => {
                                // Session gone; nothing left to do here.
                                break;
                            }
                            Disposition::DecryptError(payload) | Disposition::Surface(payload) => {
                                let item = FeedItem {
                                    record_id: event.record.id,
                                    payload,
                                };
                                if items_tx.send(item).await.is_err() {
                                    // Presentation boundary went away.
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok((
            FeedHandle {
                stop: stop_tx,
                task,
            },
            items_rx,
        ))
    }

    /// Fire-and-forget expiry delete. Duplicate deletes from other clients
    /// observing the same record are expected and harmless.
    fn purge(&self, id: RecordId) {
        let log = Arc::clone(&self.log);
        tokio::spawn(async move {
            match log.delete(&id).await {
                Ok(()) => {
                    tracing::info!(
                        target: "ghostline",
                        event = "expired_record_purged",
                        record_id = %id,
                    );
                }
                Err(e) => {
                    // Best-effort: another client may already have purged it.
                    tracing::warn!(
                        target: "ghostline",
                        event = "purge_failed",
                        record_id = %id,
                        error = %e,
                    );
                }
            }
        });
    }
}
