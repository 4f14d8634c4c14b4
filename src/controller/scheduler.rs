//! Fetch/renew cycle.
//!
//! The scheduler owns every timer and fetch task on the renewal side. It
//! never touches controller state: spawned tasks report back through the
//! controller's internal event channel, tagged with the id of the handle
//! that spawned them, and the controller asks the scheduler whether that
//! id is still current before applying anything.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::messages::InternalEvent;
use crate::config::{ControllerConfig, MAX_TICK_INTERVAL};
use crate::models::Ticket;
use crate::traits::{ClockSource, CredentialFetcher};

/// One outstanding fetch attempt.
#[derive(Debug)]
pub struct RenewalHandle {
    id: u64,
    token: CancellationToken,
}

impl RenewalHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn cancel(&self) {
        self.token.cancel();
    }
}

/// A spawned timer task and the id its messages carry.
#[derive(Debug)]
struct TimerHandle {
    id: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    fn abort(self) {
        self.task.abort();
    }
}

/// Result of installing a freshly fetched ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// Countdown started at this many seconds
    Counting(u32),
    /// The ticket was (nearly) expired on arrival; one delayed retry is
    /// scheduled instead of a countdown
    DriftBackoff { remaining: i64 },
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a stopped countdown
    Stale,
    /// Seconds left, recomputed from the absolute expiry
    Remaining(u32),
    /// The clock passed the expiry; the countdown has been stopped
    Expired,
}

/// Decides when to fetch and supersedes stale fetches.
pub struct RenewalScheduler {
    fetcher: Arc<dyn CredentialFetcher>,
    clock: Arc<dyn ClockSource>,
    events: mpsc::UnboundedSender<InternalEvent>,
    tick_interval: Duration,
    drift_threshold_secs: i64,
    drift_retry_delay: Duration,
    next_id: u64,
    current: Option<RenewalHandle>,
    countdown: Option<TimerHandle>,
    drift_retry: Option<TimerHandle>,
}

impl RenewalScheduler {
    pub(crate) fn new(
        fetcher: Arc<dyn CredentialFetcher>,
        clock: Arc<dyn ClockSource>,
        events: mpsc::UnboundedSender<InternalEvent>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            fetcher,
            clock,
            events,
            tick_interval: config.tick_interval.min(MAX_TICK_INTERVAL),
            drift_threshold_secs: config.drift_threshold_secs,
            drift_retry_delay: config.drift_retry_delay,
            next_id: 0,
            current: None,
            countdown: None,
            drift_retry: None,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Supersede any in-flight fetch (and any pending drift retry) with a
    /// new one. Returns the new renewal id.
    pub fn begin_fetch(&mut self) -> u64 {
        self.cancel_in_flight();
        self.cancel_drift_retry();

        let id = self.allocate_id();
        let token = CancellationToken::new();
        let fetcher = self.fetcher.clone();
        let events = self.events.clone();
        let cancel = token.clone();

        // Not aborted on supersession: the fetcher observes the token and
        // a late result is rejected by `complete`.
        tokio::spawn(async move {
            let result = fetcher.fetch(cancel).await;
            let _ = events.send(InternalEvent::FetchCompleted {
                renewal: id,
                result,
            });
        });

        self.current = Some(RenewalHandle { id, token });
        id
    }

    /// Claim the result of renewal `id`. True only if it is the current
    /// handle and was never cancelled; the same rule applies to successes
    /// and failures.
    pub fn complete(&mut self, id: u64) -> bool {
        match self.current {
            Some(ref handle) if handle.id == id && !handle.is_cancelled() => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&RenewalHandle> {
        self.current.as_ref()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.current.is_some()
    }

    /// Cancel the current fetch; its result will be discarded.
    pub fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.current.take() {
            debug!("Cancelling renewal {}", handle.id);
            handle.cancel();
        }
    }

    /// Start the countdown for `ticket`, or fall back to a single delayed
    /// retry when it arrives with `drift_threshold_secs` or less left.
    pub fn arm_countdown(&mut self, ticket: &Ticket) -> ArmOutcome {
        self.stop_countdown();

        let now = self.clock.now_millis();
        let remaining = ticket.remaining_seconds(now);
        if remaining <= self.drift_threshold_secs {
            self.schedule_drift_retry();
            return ArmOutcome::DriftBackoff { remaining };
        }

        let id = self.allocate_id();
        let period = self.tick_interval;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let start = Instant::now();
            let first = start.checked_add(period).unwrap_or(start);
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events
                    .send(InternalEvent::CountdownTick { countdown: id })
                    .is_err()
                {
                    break;
                }
            }
        });
        self.countdown = Some(TimerHandle { id, task });

        ArmOutcome::Counting(ticket.seconds_remaining(now))
    }

    /// Recompute the countdown for tick `id` from the absolute expiry.
    pub fn on_tick(&mut self, id: u64, ticket: &Ticket) -> TickOutcome {
        if !self.owns_countdown(id) {
            return TickOutcome::Stale;
        }
        let now = self.clock.now_millis();
        if ticket.is_expired_at(now) {
            self.stop_countdown();
            TickOutcome::Expired
        } else {
            TickOutcome::Remaining(ticket.seconds_remaining(now))
        }
    }

    /// Whether `id` belongs to the running countdown.
    pub fn owns_countdown(&self, id: u64) -> bool {
        matches!(self.countdown, Some(ref timer) if timer.id == id)
    }

    pub fn is_counting(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn stop_countdown(&mut self) {
        if let Some(timer) = self.countdown.take() {
            timer.abort();
        }
    }

    fn schedule_drift_retry(&mut self) {
        self.cancel_drift_retry();

        let id = self.allocate_id();
        let delay = self.drift_retry_delay;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(InternalEvent::DriftRetryElapsed { retry: id });
        });
        self.drift_retry = Some(TimerHandle { id, task });
    }

    /// Claim drift retry `id`. True only if it is still pending.
    pub fn accept_drift_retry(&mut self, id: u64) -> bool {
        match self.drift_retry {
            Some(ref timer) if timer.id == id => {
                self.drift_retry = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_drift_retry_pending(&self) -> bool {
        self.drift_retry.is_some()
    }

    pub fn cancel_drift_retry(&mut self) {
        if let Some(timer) = self.drift_retry.take() {
            timer.abort();
        }
    }

    /// Whether a fetch or a drift retry is outstanding.
    pub fn is_renewal_pending(&self) -> bool {
        self.is_fetch_in_flight() || self.is_drift_retry_pending()
    }

    /// Cancel the fetch, the countdown and any drift retry.
    pub fn cancel_all(&mut self) {
        self.cancel_in_flight();
        self.stop_countdown();
        self.cancel_drift_retry();
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockClock, MockFetcher, ScriptedFetch};
    use crate::error::FetchError;

    struct Harness {
        clock: Arc<MockClock>,
        fetcher: MockFetcher,
        scheduler: RenewalScheduler,
        events: mpsc::UnboundedReceiver<InternalEvent>,
    }

    fn harness() -> Harness {
        harness_with(&ControllerConfig::default())
    }

    fn harness_with(config: &ControllerConfig) -> Harness {
        let clock = Arc::new(MockClock::new(1_000_000));
        let fetcher = MockFetcher::new(clock.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = RenewalScheduler::new(
            Arc::new(fetcher.clone()),
            clock.clone(),
            tx,
            config,
        );
        Harness {
            clock,
            fetcher,
            scheduler,
            events: rx,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_rejected() {
        let mut h = harness();
        let first = h.scheduler.begin_fetch();
        let second = h.scheduler.begin_fetch();
        assert_ne!(first, second);

        let mut seen = Vec::new();
        for _ in 0..2 {
            match h.events.recv().await.unwrap() {
                InternalEvent::FetchCompleted { renewal, result } => seen.push((renewal, result)),
                other => panic!("unexpected event {:?}", other),
            }
        }

        let (cancelled_id, cancelled) = seen.iter().find(|(id, _)| *id == first).unwrap();
        assert_eq!(cancelled.as_ref().unwrap_err(), &FetchError::Cancelled);
        assert!(!h.scheduler.complete(*cancelled_id));

        assert!(h.scheduler.complete(second));
        assert!(!h.scheduler.is_fetch_in_flight());
        assert_eq!(h.fetcher.cancellations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_after_cancel_is_rejected() {
        let mut h = harness();
        h.fetcher.push(ScriptedFetch::ticket(60).ignoring_cancel());
        let id = h.scheduler.begin_fetch();
        h.scheduler.cancel_in_flight();

        match h.events.recv().await.unwrap() {
            InternalEvent::FetchCompleted { renewal, result } => {
                assert_eq!(renewal, id);
                assert!(result.is_ok());
                assert!(!h.scheduler.complete(renewal));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_tick_is_clamped() {
        // Unvalidated config: the ticker must neither panic nor outlive the ticket
        let config = ControllerConfig::default().with_tick_interval(Duration::from_millis(u64::MAX));
        let mut h = harness_with(&config);
        let ticket = Ticket::new("t", "s", 60, h.clock.now_millis() + 60_000);
        h.scheduler.arm_countdown(&ticket);

        let started = Instant::now();
        match h.events.recv().await.unwrap() {
            InternalEvent::CountdownTick { countdown } => {
                assert!(h.scheduler.owns_countdown(countdown));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(started.elapsed() <= MAX_TICK_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_countdown_ticks_from_absolute_expiry() {
        let mut h = harness();
        let ticket = Ticket::new("t", "s", 60, h.clock.now_millis() + 60_000);

        assert_eq!(h.scheduler.arm_countdown(&ticket), ArmOutcome::Counting(60));
        assert!(h.scheduler.is_counting());

        // Jumping the wall clock is reflected on the next tick
        h.clock.jump(Duration::from_secs(10));
        let id = match h.events.recv().await.unwrap() {
            InternalEvent::CountdownTick { countdown } => countdown,
            other => panic!("unexpected event {:?}", other),
        };
        assert_eq!(h.scheduler.on_tick(id, &ticket), TickOutcome::Remaining(50));

        h.clock.jump(Duration::from_secs(60));
        assert_eq!(h.scheduler.on_tick(id, &ticket), TickOutcome::Expired);
        assert!(!h.scheduler.is_counting());
        assert_eq!(h.scheduler.on_tick(id, &ticket), TickOutcome::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drift_guard_schedules_single_retry() {
        let mut h = harness();
        let ticket = Ticket::new("t", "s", 60, h.clock.now_millis() + 1_000);

        assert_eq!(
            h.scheduler.arm_countdown(&ticket),
            ArmOutcome::DriftBackoff { remaining: 1 }
        );
        assert!(!h.scheduler.is_counting());
        assert!(h.scheduler.is_drift_retry_pending());

        let start = Instant::now();
        let id = match h.events.recv().await.unwrap() {
            InternalEvent::DriftRetryElapsed { retry } => retry,
            other => panic!("unexpected event {:?}", other),
        };
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(h.scheduler.accept_drift_retry(id));
        assert!(!h.scheduler.accept_drift_retry(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_boundary() {
        let mut h = harness();
        let now = h.clock.now_millis();

        let at_threshold = Ticket::new("t", "s", 60, now + 2_000);
        assert!(matches!(
            h.scheduler.arm_countdown(&at_threshold),
            ArmOutcome::DriftBackoff { .. }
        ));

        let above = Ticket::new("t", "s", 60, now + 2_001);
        assert_eq!(h.scheduler.arm_countdown(&above), ArmOutcome::Counting(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_fetch_cancels_drift_retry() {
        let mut h = harness();
        let ticket = Ticket::new("t", "s", 60, h.clock.now_millis());
        h.scheduler.arm_countdown(&ticket);
        assert!(h.scheduler.is_drift_retry_pending());

        h.scheduler.begin_fetch();
        assert!(!h.scheduler.is_drift_retry_pending());
        assert!(h.scheduler.is_renewal_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let mut h = harness();
        let ticket = Ticket::new("t", "s", 60, h.clock.now_millis() + 60_000);
        h.scheduler.arm_countdown(&ticket);
        h.scheduler.begin_fetch();

        h.scheduler.cancel_all();
        assert!(!h.scheduler.is_counting());
        assert!(!h.scheduler.is_renewal_pending());
        assert!(h.scheduler.current().is_none());
    }
}
