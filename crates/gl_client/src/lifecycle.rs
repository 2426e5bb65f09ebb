//! Message lifecycle classification.
//!
//! A pure function of (arrival timestamp, decrypt outcome, now, session
//! start). Decides whether an incoming record is purged, suppressed, or
//! surfaced — cryptographic failures never reach the presentation layer as
//! raw errors, only as one of these dispositions.

use gl_proto::codec::DecryptFailure;
use gl_proto::Payload;

/// Retention and suppression constants, applied uniformly to all records.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// Time-to-live for every record, milliseconds. No per-message
    /// override.
    pub ttl_ms: i64,
    /// Buffer absorbing client/server clock disagreement when deciding
    /// whether a failed decrypt predates this session. Not a security
    /// boundary.
    pub clock_skew_ms: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            // 17 minutes 40 seconds.
            ttl_ms: 1_060_000,
            clock_skew_ms: 5_000,
        }
    }
}

/// What to do with one incoming record.
#[derive(Debug)]
pub enum Disposition {
    /// Older than the retention window: request deletion (idempotent,
    /// fire-and-forget) and do not surface.
    Expired,
    /// Failed authentication but predates this session's key: almost
    /// certainly encrypted under a stale peer secret, not an attack.
    /// Dropped silently.
    PreSessionNoise,
    /// Failed authentication inside the session window: surface the fixed
    /// system-authored error payload so the user can tell "wrong key right
    /// now" from silence.
    DecryptError(Payload),
    /// A normal decrypted message.
    Surface(Payload),
    /// The session was invalidated while the decrypt was in flight;
    /// discard without comment.
    Discard,
}

/// Classify one record.
///
/// Expiry is checked before the decrypt outcome: an expired record is
/// purged whether or not it decrypted.
pub fn classify(
    arrival_ts_ms: i64,
    outcome: Result<Payload, DecryptFailure>,
    now_ms: i64,
    session_started_at_ms: i64,
    policy: &RetentionPolicy,
) -> Disposition {
    if now_ms - arrival_ts_ms > policy.ttl_ms {
        return Disposition::Expired;
    }

    match outcome {
        Ok(payload) => Disposition::Surface(payload),
        Err(DecryptFailure::SessionInvalidated) => Disposition::Discard,
        Err(DecryptFailure::AuthenticationFailed) | Err(DecryptFailure::MalformedEnvelope(_)) => {
            if arrival_ts_ms < session_started_at_ms - policy.clock_skew_ms {
                Disposition::PreSessionNoise
            } else {
                Disposition::DecryptError(Payload::decrypt_error(now_ms))
            }
        }
    }
}
