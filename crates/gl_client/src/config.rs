//! Named deployment constants. No command-line surface.

use crate::lifecycle::RetentionPolicy;

/// Per-deployment configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Room name — scopes the message collection and the key directory.
    pub room: String,
    /// Change-stream bound: only the most recent N records are observed.
    pub feed_page_size: usize,
    /// Metadata-hiding protocol variant: write the constant placeholder in
    /// the outer sender field instead of the real identity. The real
    /// sender always travels inside the ciphertext either way.
    pub hide_sender: bool,
    pub retention: RetentionPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            room: "messages".into(),
            feed_page_size: 50,
            hide_sender: true,
            retention: RetentionPolicy::default(),
        }
    }
}
