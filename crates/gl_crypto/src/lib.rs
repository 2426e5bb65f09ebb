//! gl_crypto — Ghostline cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - The session secret is derived once per session and never rotated.
//!
//! # Module layout
//! - `aead`      — AES-256-GCM encrypt/decrypt (12-byte random nonce)
//! - `kdf`       — PBKDF2 room key derivation + HKDF for handshake output
//! - `handshake` — ephemeral X25519 pairwise key agreement
//! - `session`   — session secret lifecycle (establish / invalidate)
//! - `error`     — unified error type

pub mod aead;
pub mod error;
pub mod handshake;
pub mod kdf;
pub mod session;

pub use error::CryptoError;
pub use session::{Session, SessionSecret};
