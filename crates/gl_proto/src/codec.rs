//! Envelope codec — payload ⇄ envelope under a session secret.
//!
//! `seal`: canonical JSON → fresh random nonce → AEAD → envelope.
//! `open`: normalize envelope → AEAD → payload (with legacy bare-string
//! normalization).
//!
//! Cryptographic failures never escape as raw errors: `open` resolves to a
//! [`DecryptFailure`] that downstream lifecycle classification turns into
//! drop / visible-error / surfaced-message. Structural failures (an
//! envelope that does not parse) classify identically to authentication
//! failures.

use thiserror::Error;

use gl_crypto::{aead, CryptoError, Session};

use crate::envelope::Envelope;
use crate::payload::Payload;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("Payload serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

#[derive(Debug, Error)]
pub enum DecryptFailure {
    /// Wrong key, or tampered/corrupted ciphertext. Never partially
    /// trusted, never retried with a different key.
    #[error("AEAD authentication failed")]
    AuthenticationFailed,

    /// The envelope does not parse structurally. Classified the same as
    /// an authentication failure.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The session was invalidated while this decrypt was in flight; the
    /// caller discards the record.
    #[error("Session has been invalidated")]
    SessionInvalidated,
}

/// Encrypt a payload into a transportable envelope.
///
/// Draws a fresh random 12-byte nonce per call; nonces are never reused
/// under the session key.
pub async fn seal(session: &Session, payload: &Payload) -> Result<Envelope, SealError> {
    let plaintext = payload.to_plaintext()?;
    let (iv, data) = session
        .with_secret(|key| aead::encrypt(key, &plaintext))
        .await?;
    Ok(Envelope {
        iv: iv.to_vec(),
        data,
    })
}

/// Decrypt an envelope back into a payload.
pub async fn open(session: &Session, envelope: &Envelope) -> Result<Payload, DecryptFailure> {
    let plaintext = session
        .with_secret(|key| aead::decrypt(key, &envelope.iv, &envelope.data))
        .await
        .map_err(|e| match e {
            CryptoError::SessionInvalidated => DecryptFailure::SessionInvalidated,
            _ => DecryptFailure::AuthenticationFailed,
        })?;

    Ok(Payload::from_plaintext(&plaintext))
}

/// Decrypt a record's payload field straight from wire JSON.
pub async fn open_wire(session: &Session, wire_json: &str) -> Result<Payload, DecryptFailure> {
    let envelope = Envelope::from_wire_json(wire_json)
        .map_err(|e| DecryptFailure::MalformedEnvelope(e.to_string()))?;
    open(session, &envelope).await
}
