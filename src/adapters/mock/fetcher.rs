//! Scripted ticket issuer for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::models::Ticket;
use crate::traits::{ClockSource, CredentialFetcher};

/// What a scripted fetch produces.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// A ticket valid for the given window from the moment it is issued
    Ticket { valid_for: Duration },
    /// A ticket whose expiry is `millis` from the issue moment, regardless
    /// of its nominal window (negative means already expired)
    ExpiringIn { millis: i64 },
    /// A failure
    Fail(FetchError),
}

/// One scripted fetch.
#[derive(Debug, Clone)]
pub struct ScriptedFetch {
    /// How long the fetch takes
    pub delay: Duration,
    /// What it produces
    pub outcome: ScriptedOutcome,
    /// Whether the fetch returns early when cancelled
    pub honor_cancel: bool,
}

impl ScriptedFetch {
    /// A ticket valid for `secs` seconds, answered after 800ms.
    pub fn ticket(secs: u64) -> Self {
        Self {
            delay: Duration::from_millis(800),
            outcome: ScriptedOutcome::Ticket {
                valid_for: Duration::from_secs(secs),
            },
            honor_cancel: true,
        }
    }

    /// A ticket expiring `millis` after issue, answered after 800ms.
    pub fn expiring_in(millis: i64) -> Self {
        Self {
            delay: Duration::from_millis(800),
            outcome: ScriptedOutcome::ExpiringIn { millis },
            honor_cancel: true,
        }
    }

    /// A failure, answered after 800ms.
    pub fn failure(error: FetchError) -> Self {
        Self {
            delay: Duration::from_millis(800),
            outcome: ScriptedOutcome::Fail(error),
            honor_cancel: true,
        }
    }

    /// Override the answer delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Keep running after cancellation and deliver the result anyway.
    pub fn ignoring_cancel(mut self) -> Self {
        self.honor_cancel = false;
        self
    }
}

/// Ticket issuer that plays back a script, then a default.
///
/// # Example
///
/// ```ignore
/// let fetcher = MockFetcher::new(clock.clone());
/// fetcher.push(ScriptedFetch::failure(FetchError::Timeout("slow".into())));
/// fetcher.push(ScriptedFetch::ticket(60));
/// ```
#[derive(Clone)]
pub struct MockFetcher {
    clock: Arc<dyn ClockSource>,
    script: Arc<Mutex<VecDeque<ScriptedFetch>>>,
    fallback: ScriptedFetch,
    calls: Arc<AtomicUsize>,
    cancellations: Arc<AtomicUsize>,
    issued: Arc<Mutex<Vec<Ticket>>>,
    started_at: Arc<Mutex<Vec<i64>>>,
}

impl MockFetcher {
    /// Create a fetcher whose default answer is a 60 second ticket.
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            clock,
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: ScriptedFetch::ticket(60),
            calls: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(AtomicUsize::new(0)),
            issued: Arc::new(Mutex::new(Vec::new())),
            started_at: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the answer used once the script runs out.
    pub fn with_fallback(mut self, fallback: ScriptedFetch) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue a scripted answer.
    pub fn push(&self, fetch: ScriptedFetch) {
        self.script.lock().unwrap().push_back(fetch);
    }

    /// Number of fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches that observed cancellation.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    /// Every ticket handed out, in order.
    pub fn issued(&self) -> Vec<Ticket> {
        self.issued.lock().unwrap().clone()
    }

    /// Clock reading at the start of each fetch, in order.
    pub fn started_at(&self) -> Vec<i64> {
        self.started_at.lock().unwrap().clone()
    }

    fn next_script(&self) -> ScriptedFetch {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn produce(&self, call: usize, outcome: ScriptedOutcome) -> Result<Ticket, FetchError> {
        let now = self.clock.now_millis();
        let ticket = match outcome {
            ScriptedOutcome::Ticket { valid_for } => {
                let secs = u32::try_from(valid_for.as_secs()).unwrap_or(u32::MAX);
                let millis = i64::try_from(valid_for.as_millis()).unwrap_or(i64::MAX);
                Ticket::new(format!("ticket-{}", call), format!("sig-{}", call), secs, now + millis)
            }
            ScriptedOutcome::ExpiringIn { millis } => Ticket::new(
                format!("ticket-{}", call),
                format!("sig-{}", call),
                60,
                now + millis,
            ),
            ScriptedOutcome::Fail(error) => return Err(error),
        };
        self.issued.lock().unwrap().push(ticket.clone());
        Ok(ticket)
    }
}

#[async_trait]
impl CredentialFetcher for MockFetcher {
    async fn fetch(&self, cancel: CancellationToken) -> Result<Ticket, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.started_at.lock().unwrap().push(self.clock.now_millis());
        let script = self.next_script();

        if script.honor_cancel {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancellations.fetch_add(1, Ordering::SeqCst);
                    return Err(FetchError::Cancelled);
                }
                _ = tokio::time::sleep(script.delay) => {}
            }
        } else {
            tokio::time::sleep(script.delay).await;
        }

        self.produce(call, script.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockClock;

    #[tokio::test(start_paused = true)]
    async fn test_script_then_fallback() {
        let clock = Arc::new(MockClock::new(0));
        let fetcher = MockFetcher::new(clock);
        fetcher.push(ScriptedFetch::failure(FetchError::Connection("down".to_string())));

        let first = fetcher.fetch(CancellationToken::new()).await;
        assert!(matches!(first, Err(FetchError::Connection(_))));

        let second = fetcher.fetch(CancellationToken::new()).await.unwrap();
        assert_eq!(second.id, "ticket-2");
        assert_eq!(second.issued_for_seconds, 60);
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(fetcher.issued().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_relative_to_issue_time() {
        let clock = Arc::new(MockClock::new(0));
        let fetcher = MockFetcher::new(clock.clone());
        fetcher.push(ScriptedFetch::expiring_in(1_000));

        let ticket = fetcher.fetch(CancellationToken::new()).await.unwrap();
        assert_eq!(ticket.expires_at, clock.now_millis() + 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_counted() {
        let clock = Arc::new(MockClock::new(0));
        let fetcher = MockFetcher::new(clock);
        let token = CancellationToken::new();
        token.cancel();

        let result = fetcher.fetch(token).await;
        assert_eq!(result, Err(FetchError::Cancelled));
        assert_eq!(fetcher.cancellations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignoring_cancel_still_delivers() {
        let clock = Arc::new(MockClock::new(0));
        let fetcher = MockFetcher::new(clock);
        fetcher.push(ScriptedFetch::ticket(60).ignoring_cancel());
        let token = CancellationToken::new();
        token.cancel();

        assert!(fetcher.fetch(token).await.is_ok());
        assert_eq!(fetcher.cancellations(), 0);
    }
}
