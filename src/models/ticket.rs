//! The displayed credential and its countdown math.
//!
//! `expires_at` is stamped by the issuing backend's clock. It is only ever
//! compared against the consumer clock reading at the moment of use, never
//! converted once into a relative countdown and cached.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the signature digest for logging.
const FINGERPRINT_LEN: usize = 12;

/// A short-lived signed access credential.
///
/// The payload is opaque to the controller: the signature is never
/// verified here and never written to logs (use [`Ticket::fingerprint`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Opaque ticket identifier
    pub id: String,
    /// Opaque signature over the ticket
    pub signature: String,
    /// Nominal validity window granted by the issuer, in seconds
    pub issued_for_seconds: u32,
    /// Absolute expiry in epoch milliseconds (issuer clock)
    pub expires_at: i64,
}

/// Compact payload encoded into the scannable code.
#[derive(Debug, Serialize)]
struct ScanPayload<'a> {
    id: &'a str,
    sig: &'a str,
}

impl Ticket {
    /// Create a new ticket.
    pub fn new(
        id: impl Into<String>,
        signature: impl Into<String>,
        issued_for_seconds: u32,
        expires_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            signature: signature.into(),
            issued_for_seconds,
            expires_at,
        }
    }

    /// Signed whole seconds until expiry, rounded up.
    ///
    /// Negative once the ticket is more than a second past expiry. Used by
    /// the drift guard, which needs to see "already expired" as well as
    /// "about to expire".
    pub fn remaining_seconds(&self, now_ms: i64) -> i64 {
        remaining_seconds(self.expires_at, now_ms)
    }

    /// Seconds shown to the user: `max(0, ceil((expires_at - now) / 1000))`.
    pub fn seconds_remaining(&self, now_ms: i64) -> u32 {
        let remaining = self.remaining_seconds(now_ms).max(0);
        u32::try_from(remaining).unwrap_or(u32::MAX)
    }

    /// Whether the ticket has expired at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Whether the ticket expires within `margin_ms` of `now_ms`.
    pub fn expires_within(&self, now_ms: i64, margin_ms: i64) -> bool {
        now_ms >= self.expires_at.saturating_sub(margin_ms)
    }

    /// Remaining validity as a fraction of the issued window, in `[0, 1]`.
    pub fn progress(&self, now_ms: i64) -> f64 {
        if self.issued_for_seconds == 0 {
            return 0.0;
        }
        let remaining_ms = self.expires_at.saturating_sub(now_ms) as f64;
        let window_ms = f64::from(self.issued_for_seconds) * 1000.0;
        (remaining_ms / window_ms).clamp(0.0, 1.0)
    }

    /// JSON payload for the code symbol: `{"id":..,"sig":..}`.
    pub fn scan_payload(&self) -> String {
        let payload = ScanPayload {
            id: &self.id,
            sig: &self.signature,
        };
        // Serializing two borrowed strings cannot fail.
        serde_json::to_string(&payload).unwrap_or_default()
    }

    /// Short digest of the signature, safe to put in logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.signature.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

/// `ceil((expires_at - now) / 1000)` in integer arithmetic.
pub fn remaining_seconds(expires_at_ms: i64, now_ms: i64) -> i64 {
    let diff = expires_at_ms.saturating_sub(now_ms);
    -(diff.saturating_neg().div_euclid(1000))
}
