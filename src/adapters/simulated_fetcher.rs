//! Simulated ticket issuer for demos and offline development.
//!
//! Behaves like a small backend: answers after a fixed latency with a
//! ticket valid for a fixed window, stamped by an issuer clock that can
//! be skewed against the device clock to exercise the drift guard.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::models::Ticket;
use crate::traits::{ClockSource, CredentialFetcher};

/// Default answer latency.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(800);

/// Default validity window in seconds.
pub const SIMULATED_VALIDITY_SECS: u32 = 60;

/// In-process ticket issuer.
pub struct SimulatedTicketFetcher {
    clock: Arc<dyn ClockSource>,
    latency: Duration,
    validity_secs: u32,
    issuer_skew_ms: i64,
}

impl SimulatedTicketFetcher {
    /// Create an issuer sharing the given clock.
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            clock,
            latency: SIMULATED_LATENCY,
            validity_secs: SIMULATED_VALIDITY_SECS,
            issuer_skew_ms: 0,
        }
    }

    /// Set the answer latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Set the validity window.
    pub fn with_validity_secs(mut self, secs: u32) -> Self {
        self.validity_secs = secs;
        self
    }

    /// Offset the issuer clock from the device clock. A negative skew makes
    /// tickets arrive already (nearly) expired.
    pub fn with_issuer_skew_ms(mut self, skew_ms: i64) -> Self {
        self.issuer_skew_ms = skew_ms;
        self
    }

    fn issue(&self) -> Ticket {
        let issued_at = self.clock.now_millis() + self.issuer_skew_ms;
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .to_uppercase()
            .chars()
            .take(9)
            .collect();
        let id = format!("TICKET_{}", suffix);
        let digest = Sha256::digest(format!("{}:{}", id, issued_at).as_bytes());
        let signature = format!("sha256_{}", hex::encode(digest));
        let expires_at = issued_at + i64::from(self.validity_secs) * 1000;

        Ticket::new(id, signature, self.validity_secs, expires_at)
    }
}

#[async_trait]
impl CredentialFetcher for SimulatedTicketFetcher {
    async fn fetch(&self, cancel: CancellationToken) -> Result<Ticket, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            _ = tokio::time::sleep(self.latency) => {
                let ticket = self.issue();
                tracing::debug!(
                    "Simulated issuer produced ticket {} ({})",
                    ticket.id,
                    ticket.fingerprint()
                );
                Ok(ticket)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockClock;

    #[tokio::test(start_paused = true)]
    async fn test_issues_sixty_second_ticket() {
        let clock = Arc::new(MockClock::new(1_000_000));
        let fetcher = SimulatedTicketFetcher::new(clock.clone());

        let ticket = fetcher.fetch(CancellationToken::new()).await.unwrap();
        assert!(ticket.id.starts_with("TICKET_"));
        assert_eq!(ticket.id.len(), "TICKET_".len() + 9);
        assert!(ticket.signature.starts_with("sha256_"));
        assert_eq!(ticket.issued_for_seconds, 60);
        assert_eq!(ticket.seconds_remaining(clock.now_millis()), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skew_produces_drifted_ticket() {
        let clock = Arc::new(MockClock::new(1_000_000));
        let fetcher = SimulatedTicketFetcher::new(clock.clone()).with_issuer_skew_ms(-59_000);

        let ticket = fetcher.fetch(CancellationToken::new()).await.unwrap();
        assert_eq!(ticket.remaining_seconds(clock.now_millis()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_promptly() {
        let clock = Arc::new(MockClock::new(0));
        let fetcher = SimulatedTicketFetcher::new(clock);
        let token = CancellationToken::new();
        token.cancel();

        let result = fetcher.fetch(token).await;
        assert_eq!(result, Err(FetchError::Cancelled));
    }
}
