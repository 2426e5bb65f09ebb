//! gl_client — Ghostline ephemeral encrypted group-messaging client core
//!
//! Ties the crypto and wire layers to an external log store (a remote,
//! append-only, ordered document store with change notification) and
//! decides, per arriving record, whether it is purged, suppressed, or
//! surfaced to the presentation layer.
//!
//! # Modules
//! - `log_service` — the log store contract this core consumes
//! - `memory`      — in-memory log store for tests and local runs
//! - `agreement`   — session establishment (passphrase KDF or handshake)
//! - `lifecycle`   — retention / suppression / surfacing classification
//! - `feed`        — ordered change-stream consumer
//! - `outbox`      — the send path (one in-flight send at a time)
//! - `client`      — login / send / logout / panic facade
//! - `config`      — named deployment constants
//! - `error`       — unified error types

pub mod agreement;
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod log_service;
pub mod memory;
pub mod outbox;

pub use agreement::Strategy;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use feed::{FeedHandle, FeedItem};
pub use lifecycle::{classify, Disposition, RetentionPolicy};
pub use log_service::LogService;
pub use memory::MemoryLogService;
