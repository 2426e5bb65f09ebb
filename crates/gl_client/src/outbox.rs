//! The send path.
//!
//! One send round-trip (seal + remote append) may be in flight at a time;
//! a concurrent attempt fails fast with [`ClientError::SendInFlight`]
//! rather than queueing or interleaving. Transport failures surface
//! immediately — no retries here.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use gl_crypto::{CryptoError, Session};
use gl_proto::record::SENDER_PLACEHOLDER;
use gl_proto::{codec, NewRecord, Payload, RecordId};

use crate::error::ClientError;
use crate::log_service::LogService;

pub struct Outbox {
    log: Arc<dyn LogService>,
    session: Session,
    hide_sender: bool,
    in_flight: Mutex<()>,
}

impl Outbox {
    pub fn new(log: Arc<dyn LogService>, session: Session, hide_sender: bool) -> Self {
        Self {
            log,
            session,
            hide_sender,
            in_flight: Mutex::new(()),
        }
    }

    /// Encrypt and append a text message.
    pub async fn send_text(&self, content: &str) -> Result<RecordId, ClientError> {
        let identity = self.identity().await?;
        self.send(Payload::text(identity, content)).await
    }

    /// Encrypt and append an image (base64 body built by the caller).
    pub async fn send_image(&self, image_data: &str) -> Result<RecordId, ClientError> {
        let identity = self.identity().await?;
        self.send(Payload::image(identity, image_data)).await
    }

    async fn identity(&self) -> Result<String, ClientError> {
        Ok(self
            .session
            .identity()
            .await
            .ok_or(CryptoError::SessionInvalidated)?)
    }

    async fn send(&self, payload: Payload) -> Result<RecordId, ClientError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| ClientError::SendInFlight)?;

        let envelope = codec::seal(&self.session, &payload).await?;
        let sender = if self.hide_sender {
            SENDER_PLACEHOLDER.to_string()
        } else {
            payload.user.clone()
        };

        let record = NewRecord {
            sender,
            payload: envelope.to_wire_json(),
            timestamp: Utc::now().timestamp_millis(),
        };

        match self.log.append(record).await {
            Ok(id) => {
                tracing::info!(
                    target: "ghostline",
                    event = "send_ok",
                    record_id = %id,
                );
                Ok(id)
            }
            Err(e) => {
                tracing::error!(
                    target: "ghostline",
                    event = "send_failed",
                    error = %e,
                );
                Err(e.into())
            }
        }
    }
}
