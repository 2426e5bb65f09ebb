//! Authenticated Encryption with Associated Data
//!
//! Uses AES-256-GCM (the wire format every deployed client speaks).
//! Key size: 32 bytes.  Nonce: 12 bytes (random, drawn per call).  Tag: 16 bytes.
//!
//! The nonce is returned alongside the ciphertext rather than prepended:
//! the envelope wire format carries `iv` as its own field.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    Aes256Gcm,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte key under a fresh random 12-byte nonce.
/// Returns (nonce, ciphertext+tag).
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>), CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = Aes256Gcm::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::AeadEncrypt)?;

    Ok((nonce.into(), ciphertext))
}

/// Decrypt ciphertext+tag under the given key and nonce.
///
/// A tag mismatch (wrong key, or tampered/corrupted ciphertext) is
/// `CryptoError::AeadDecrypt` — never partial output, never retried.
pub fn decrypt(key: &[u8; 32], nonce: &[u8], ct: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::AeadDecrypt);
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::AeadDecrypt)?;

    let nonce = aes_gcm::Nonce::from_slice(nonce);
    let plaintext = cipher
        .decrypt(nonce, ct)
        .map_err(|_| CryptoError::AeadDecrypt)?;

    Ok(Zeroizing::new(plaintext))
}
