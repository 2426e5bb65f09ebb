//! Key derivation functions
//!
//! `room_key_from_passphrase` — PBKDF2-HMAC-SHA256, derives the 32-byte
//!   session secret from the room passphrase shared out-of-band.
//!
//! `handshake_secret` — HKDF-SHA256, stretches an X25519 DH output into
//!   the 32-byte session secret for the handshake strategy.

use hkdf::Hkdf;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::CryptoError;
use crate::session::SessionSecret;

/// Fixed application-wide PBKDF2 salt.
///
/// Every client must derive the same key from the same passphrase without
/// any network interaction, which forces a static salt shared by all
/// deployments. Known weakness: anyone who learns the passphrase can
/// reproduce the key offline. Accepted tradeoff for zero-handshake rooms.
pub const ROOM_KEY_SALT: &[u8] = b"GHOST_CHAT_SALT";

/// PBKDF2 iteration count. Must match every deployed client.
pub const ROOM_KEY_ITERATIONS: u32 = 100_000;

/// HKDF domain-separation label for handshake-derived secrets.
const HANDSHAKE_INFO: &[u8] = b"ghostline-handshake-v1";

/// Derive the room session secret from a shared passphrase.
///
/// Deterministic: any two clients holding the same passphrase derive an
/// identical secret.
pub fn room_key_from_passphrase(passphrase: &str) -> SessionSecret {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(
        passphrase.as_bytes(),
        ROOM_KEY_SALT,
        ROOM_KEY_ITERATIONS,
        &mut key,
    );
    SessionSecret::from_bytes(key)
}

/// Stretch a raw X25519 DH output into a 32-byte session secret.
pub fn handshake_secret(dh_output: &[u8]) -> Result<SessionSecret, CryptoError> {
    let hk = Hkdf::<Sha256>::new(None, dh_output);
    let mut key = [0u8; 32];
    hk.expand(HANDSHAKE_INFO, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(SessionSecret::from_bytes(key))
}
