//! Ephemeral X25519 pairwise key agreement.
//!
//! Each client generates a fresh keypair on login and publishes the public
//! half to a room-scoped key directory, keyed by display name. On observing
//! any other identity's public key it computes
//!
//!   secret = HKDF(X25519(my_secret, peer_public))
//!
//! Both sides of a pair derive the same value. The scheme is strictly
//! pairwise: with three or more peers in a room, secrets derived against
//! different peers are not mutually consistent, and cross-peer traffic
//! surfaces as undecryptable downstream. Rooms larger than two are
//! unsupported by this strategy.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::error::CryptoError;
use crate::kdf;
use crate::session::SessionSecret;

/// One identity's entry in the room key directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerKey {
    /// Display name the key was published under.
    pub identity: String,
    /// X25519 public key, base64 (url-safe, unpadded).
    pub public_key: String,
    /// Millisecond timestamp of the publish.
    pub published_at: i64,
}

/// Transient keypair for one login. The secret half never leaves memory
/// and is zeroized on drop (x25519-dalek `StaticSecret`).
pub struct HandshakeKeys {
    secret: StaticSecret,
    public: X25519Public,
}

impl HandshakeKeys {
    /// Generate a fresh ephemeral keypair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519Public::from(&secret);
        Self { secret, public }
    }

    /// The directory entry announcing this keypair under `identity`.
    pub fn directory_entry(&self, identity: &str) -> PeerKey {
        PeerKey {
            identity: identity.to_string(),
            public_key: URL_SAFE_NO_PAD.encode(self.public.as_bytes()),
            published_at: Utc::now().timestamp_millis(),
        }
    }

    /// Derive the shared session secret against one peer's published key.
    ///
    /// A malformed peer key fails this one agreement only — the caller is
    /// expected to report it per-peer and keep other handshakes alive.
    pub fn agree(&self, peer: &PeerKey) -> Result<SessionSecret, CryptoError> {
        let raw = URL_SAFE_NO_PAD.decode(&peer.public_key)?;
        let raw: [u8; 32] = raw
            .try_into()
            .map_err(|_| CryptoError::InvalidKey(format!("peer key for {} is not 32 bytes", peer.identity)))?;
        let peer_public = X25519Public::from(raw);

        let dh = self.secret.diffie_hellman(&peer_public);
        kdf::handshake_secret(dh.as_bytes())
    }
}
