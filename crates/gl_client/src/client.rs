//! Client facade: login, feed, send, logout, panic.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use gl_crypto::handshake::HandshakeKeys;
use gl_crypto::Session;
use gl_proto::RecordId;

use crate::agreement::{establish_session, Strategy};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::feed::{FeedConsumer, FeedHandle, FeedItem};
use crate::log_service::LogService;
use crate::outbox::Outbox;

/// One logical session per running client.
pub struct Client {
    log: Arc<dyn LogService>,
    config: ClientConfig,
    session: Session,
    /// Retained after a handshake login so late-joining peers can derive
    /// against our published key. Zeroized when the client is dropped.
    #[allow(dead_code)]
    handshake_keys: Option<HandshakeKeys>,
    outbox: Outbox,
    /// Every record id the feed has observed — the panic wipe target set.
    observed: Arc<Mutex<HashSet<RecordId>>>,
    feed: Mutex<Option<FeedHandle>>,
}

impl Client {
    /// Derive the session secret via `strategy` and build a chat-ready
    /// client. Key agreement failure is fatal: no retry, the caller stays
    /// un-keyed until restart.
    pub async fn login(
        log: Arc<dyn LogService>,
        config: ClientConfig,
        identity: &str,
        strategy: Strategy,
    ) -> Result<Self, ClientError> {
        let outcome = establish_session(identity, strategy, &log, &config.room).await?;
        let outbox = Outbox::new(
            Arc::clone(&log),
            outcome.session.clone(),
            config.hide_sender,
        );
        Ok(Self {
            log,
            config,
            session: outcome.session,
            handshake_keys: outcome.handshake_keys,
            outbox,
            observed: Arc::new(Mutex::new(HashSet::new())),
            feed: Mutex::new(None),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Subscribe to the message feed. Surfaced payloads arrive on the
    /// returned receiver until logout/panic or stream end.
    pub async fn start_feed(&self) -> Result<mpsc::Receiver<FeedItem>, ClientError> {
        let consumer = FeedConsumer::new(
            Arc::clone(&self.log),
            self.session.clone(),
            self.config.retention,
            self.config.feed_page_size,
            Arc::clone(&self.observed),
        );
        let (handle, items) = consumer.start().await?;
        *self.feed.lock().await = Some(handle);
        Ok(items)
    }

    pub async fn send_text(&self, content: &str) -> Result<RecordId, ClientError> {
        self.outbox.send_text(content).await
    }

    pub async fn send_image(&self, image_data: &str) -> Result<RecordId, ClientError> {
        self.outbox.send_image(image_data).await
    }

    /// Invalidate the session and stop the feed. In-flight decrypts may
    /// complete; their results are discarded, not surfaced.
    pub async fn logout(&self) {
        self.session.invalidate().await;
        if let Some(handle) = self.feed.lock().await.take() {
            handle.shutdown().await;
        }
        tracing::info!(target: "ghostline", event = "logout");
    }

    /// Panic: synchronously invalidate all key material, then best-effort
    /// delete every record this client has observed. Delete failures are
    /// logged and swallowed — another client may already have purged them.
    pub async fn panic_wipe(&self) {
        self.session.invalidate().await;
        if let Some(handle) = self.feed.lock().await.take() {
            handle.shutdown().await;
        }

        let ids: Vec<RecordId> = self.observed.lock().await.drain().collect();
        let total = ids.len();
        for id in ids {
            if let Err(e) = self.log.delete(&id).await {
                tracing::warn!(
                    target: "ghostline",
                    event = "panic_delete_failed",
                    record_id = %id,
                    error = %e,
                );
            }
        }
        tracing::info!(
            target: "ghostline",
            event = "panic_wipe_complete",
            records = total,
        );
    }
}
