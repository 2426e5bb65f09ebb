//! Session establishment.
//!
//! Two interchangeable strategies produce the session secret:
//!
//! - **Passphrase**: deterministic PBKDF2 derivation from a secret shared
//!   out-of-band. No network interaction; any two clients holding the same
//!   passphrase converge on the same key.
//! - **Handshake**: publish an ephemeral X25519 public key to the room
//!   directory, derive pairwise against the first foreign key observed.
//!   The keypair is retained so late-joining peers can still derive
//!   against our published key.
//!
//! Failure to generate or publish our own key is fatal to the session —
//! no retry, the client stays un-keyed until restart. A malformed peer key
//! fails only that one handshake: it is logged per-peer and other peers
//! keep being considered.

use std::sync::Arc;

use gl_crypto::handshake::HandshakeKeys;
use gl_crypto::{kdf, Session};

use crate::error::ClientError;
use crate::log_service::LogService;

/// Key-agreement strategy, selected by deployment.
pub enum Strategy {
    /// Shared room passphrase, known out-of-band by all members.
    Passphrase(String),
    /// Ephemeral pairwise X25519 handshake via the room key directory.
    Handshake,
}

/// Material kept alive after a handshake so late-joining peers can agree
/// against our published key. Dropped (zeroized) on logout/panic.
pub struct AgreementOutcome {
    pub session: Session,
    pub handshake_keys: Option<HandshakeKeys>,
}

/// Derive the session secret and establish the session.
pub async fn establish_session(
    identity: &str,
    strategy: Strategy,
    log: &Arc<dyn LogService>,
    room: &str,
) -> Result<AgreementOutcome, ClientError> {
    match strategy {
        Strategy::Passphrase(passphrase) => {
            let secret = kdf::room_key_from_passphrase(&passphrase);
            tracing::info!(
                target: "ghostline",
                event = "session_established",
                strategy = "passphrase",
                identity = %identity,
            );
            Ok(AgreementOutcome {
                session: Session::establish(identity, secret),
                handshake_keys: None,
            })
        }
        Strategy::Handshake => {
            let keys = HandshakeKeys::generate();

            // Publish failure is fatal: nobody can agree with a key that
            // never reached the directory.
            log.publish_key(room, keys.directory_entry(identity))
                .await
                .map_err(|e| ClientError::KeyAgreement(format!("key publish failed: {e}")))?;

            let mut peers = log
                .subscribe_keys(room)
                .await
                .map_err(|e| ClientError::KeyAgreement(format!("directory subscribe failed: {e}")))?;

            while let Some(peer) = peers.recv().await {
                if peer.identity == identity {
                    continue;
                }
                match keys.agree(&peer) {
                    Ok(secret) => {
                        tracing::info!(
                            target: "ghostline",
                            event = "session_established",
                            strategy = "handshake",
                            identity = %identity,
                            peer = %peer.identity,
                        );
                        return Ok(AgreementOutcome {
                            session: Session::establish(identity, secret),
                            handshake_keys: Some(keys),
                        });
                    }
                    Err(e) => {
                        // Per-peer failure; keep waiting for a usable key.
                        tracing::warn!(
                            target: "ghostline",
                            event = "peer_key_rejected",
                            peer = %peer.identity,
                            error = %e,
                        );
                    }
                }
            }

            Err(ClientError::KeyAgreement(
                "key directory stream ended before any peer key arrived".into(),
            ))
        }
    }
}
