//! Session secret lifecycle.
//!
//! The session secret is the sole encrypt/decrypt capability for a running
//! session. It is derived once (passphrase KDF or handshake), never rotated,
//! never persisted, and destroyed on logout/panic.
//!
//! `Session` is an explicit value owned by the caller and passed into every
//! component — no ambient globals. Invalidation zeroizes the key material;
//! any later attempt to use the session fails with
//! [`CryptoError::SessionInvalidated`]. Decrypts already in flight at the
//! moment of invalidation may still complete; the presentation boundary
//! discards their results.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// 32-byte AEAD key. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SessionSecret([u8; 32]);

impl SessionSecret {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[derive(ZeroizeOnDrop)]
struct SessionInner {
    secret: SessionSecret,
    #[zeroize(skip)]
    identity: String,
    #[zeroize(skip)]
    started_at_ms: i64,
}

/// Thread-safe session handle. Clone to share across tasks.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionInner>>>,
}

impl Session {
    /// Establish a session for `identity` with a freshly derived secret.
    pub fn establish(identity: impl Into<String>, secret: SessionSecret) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(SessionInner {
                secret,
                identity: identity.into(),
                started_at_ms: Utc::now().timestamp_millis(),
            }))),
        }
    }

    /// Display name chosen at login. `None` once invalidated.
    pub async fn identity(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.identity.clone())
    }

    /// Millisecond timestamp at which this session's key became valid.
    /// Used to classify pre-session decrypt failures as expected noise.
    pub async fn started_at_ms(&self) -> Option<i64> {
        self.inner.read().await.as_ref().map(|s| s.started_at_ms)
    }

    /// Run `f` with the session secret.
    ///
    /// Fails with [`CryptoError::SessionInvalidated`] once `invalidate` has
    /// run. The secret is read-only for the lifetime of the session, so
    /// concurrent callers never race on key state.
    pub async fn with_secret<F, R>(&self, f: F) -> Result<R, CryptoError>
    where
        F: FnOnce(&[u8; 32]) -> Result<R, CryptoError>,
    {
        let guard = self.inner.read().await;
        match guard.as_ref() {
            Some(inner) => f(inner.secret.as_bytes()),
            None => Err(CryptoError::SessionInvalidated),
        }
    }

    /// Destroy the session — zeroizes the secret.
    ///
    /// After this returns, no further `with_secret` call can observe key
    /// material.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }

    pub async fn is_invalidated(&self) -> bool {
        self.inner.read().await.is_none()
    }
}
