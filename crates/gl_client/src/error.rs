use thiserror::Error;

use gl_crypto::CryptoError;
use gl_proto::codec::SealError;

/// Failure talking to the log store. Surfaced to the user on the send
/// path; logged and swallowed on best-effort purge deletes.
#[derive(Debug, Clone, Error)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Fatal to the session — no retry. The client stays un-keyed until
    /// restart.
    #[error("Key agreement failed: {0}")]
    KeyAgreement(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Envelope seal failed: {0}")]
    Seal(#[from] SealError),

    /// A second send was attempted while one was in flight. Sends are not
    /// queued or interleaved.
    #[error("A send is already in flight")]
    SendInFlight,
}
