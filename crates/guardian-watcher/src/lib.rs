//! Background cross-chain confirmation watcher
//!
//! Polls the status endpoint for a submitted source-chain transaction until
//! the matching destination-chain hash appears, then stops. One transfer is
//! tracked at a time; pointing the watcher at a new hash cancels the
//! previous polling task before the next one starts.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use cctx_client::{CctxLookup, CctxLookupSource};
use guardian_core::TxHash;

/// How often an active watch polls the status endpoint (seconds).
const POLL_INTERVAL_SECS: u64 = 15;

/// Ceiling for the error backoff delay (seconds).
const BACKOFF_CAP_SECS: u64 = 120;

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Polling schedule for a watch.
///
/// The default is a fixed 15 second cadence with no attempt or time bound;
/// long-running deployments install a deadline so an unresolved transfer
/// eventually reports [`WatchPhase::TimedOut`] instead of polling forever.
#[derive(Debug, Clone)]
pub struct WatchPolicy {
    /// Delay between successful poll cycles
    pub interval: Duration,
    /// Give up after this many cycles
    pub max_attempts: Option<NonZeroU32>,
    /// Give up once this much time has passed since the watch started
    pub deadline: Option<Duration>,
    /// Ceiling for the exponential backoff applied after failed cycles
    pub backoff_cap: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_attempts: None,
            deadline: None,
            backoff_cap: Duration::from_secs(BACKOFF_CAP_SECS),
        }
    }
}

impl WatchPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: NonZeroU32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before the next cycle, given how many cycles in a row have
    /// failed. Successful cycles keep the fixed interval; each failure
    /// doubles the delay up to `backoff_cap`.
    fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.interval;
        }
        let factor = 2u32.saturating_pow(consecutive_failures.min(16));
        self.interval.saturating_mul(factor).min(self.backoff_cap)
    }

    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts >= max.get() {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if elapsed >= deadline {
                return true;
            }
        }
        false
    }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Watch lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchPhase {
    /// No transfer is being tracked
    Idle,
    /// Polling for the destination-chain hash
    Polling,
    /// Destination-chain hash found
    Confirmed,
    /// Attempt or time budget ran out before a hash appeared
    TimedOut,
}

/// Snapshot of the watcher, published on every change
#[derive(Debug, Clone, Serialize)]
pub struct WatchState {
    pub phase: WatchPhase,
    /// Source-chain transaction hash being tracked
    pub target: Option<TxHash>,
    /// Destination-chain transaction hash, once found
    pub destination: Option<TxHash>,
    /// Poll cycles issued for the current target
    pub attempts: u32,
}

impl WatchState {
    fn idle() -> Self {
        Self {
            phase: WatchPhase::Idle,
            target: None,
            destination: None,
            attempts: 0,
        }
    }

    fn polling(target: TxHash, attempts: u32) -> Self {
        Self {
            phase: WatchPhase::Polling,
            target: Some(target),
            destination: None,
            attempts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase == WatchPhase::Confirmed
    }

    /// Confirmed and timed-out watches stay put until an explicit reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, WatchPhase::Confirmed | WatchPhase::TimedOut)
    }
}

// ─── Watcher ─────────────────────────────────────────────────────────────────

struct ActiveWatch {
    target: TxHash,
    handle: JoinHandle<()>,
}

/// Tracks one cross-chain transfer at a time.
///
/// [`start`](Self::start) spawns a background polling task; retargeting or
/// resetting aborts the previous task first, so at most one poll loop is
/// ever alive. Dropping the watcher aborts any active task.
///
/// Callers must be inside a Tokio runtime when starting a watch.
pub struct ConfirmationWatcher {
    source: Arc<dyn CctxLookupSource>,
    policy: WatchPolicy,
    state: Arc<watch::Sender<WatchState>>,
    // Bumped on every retarget/reset; stale poll tasks stop publishing.
    generation: Arc<AtomicU64>,
    active: Mutex<Option<ActiveWatch>>,
}

impl ConfirmationWatcher {
    pub fn new(source: Arc<dyn CctxLookupSource>, policy: WatchPolicy) -> Self {
        let (state, _) = watch::channel(WatchState::idle());
        Self {
            source,
            policy,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Begin polling for `target`.
    ///
    /// Returns `true` when a fresh polling task was spawned. Empty hashes
    /// are ignored, as is a start for the hash already being polled or
    /// already confirmed. A different hash cancels the previous watch and
    /// starts over.
    pub fn start(&self, target: TxHash) -> bool {
        if target.is_empty() {
            tracing::debug!("ignoring watch request for empty hash");
            return false;
        }

        let mut active = self.lock_active();

        let current = self.state.borrow().clone();
        if current.target.as_ref() == Some(&target)
            && matches!(current.phase, WatchPhase::Polling | WatchPhase::Confirmed)
        {
            tracing::debug!(%target, phase = ?current.phase, "watch already covers this hash");
            return false;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = active.take() {
            tracing::debug!(previous = %previous.target, next = %target, "retargeting watch");
            previous.handle.abort();
        }

        self.state
            .send_replace(WatchState::polling(target.clone(), 0));

        let handle = tokio::spawn(poll_loop(
            self.source.clone(),
            self.policy.clone(),
            self.state.clone(),
            self.generation.clone(),
            generation,
            target.clone(),
        ));
        *active = Some(ActiveWatch { target, handle });
        true
    }

    /// Cancel any pending cycle and forget the tracked transfer.
    pub fn reset(&self) {
        let mut active = self.lock_active();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = active.take() {
            tracing::debug!(target = %previous.target, "cancelling watch");
            previous.handle.abort();
        }
        self.state.send_replace(WatchState::idle());
    }

    /// Reset, then begin a fresh lifecycle for `target`.
    pub fn reset_to(&self, target: TxHash) -> bool {
        self.reset();
        self.start(target)
    }

    /// Current snapshot.
    pub fn state(&self) -> WatchState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<WatchState> {
        self.state.subscribe()
    }

    pub fn policy(&self) -> &WatchPolicy {
        &self.policy
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveWatch>> {
        // A poisoned lock only means a poll task panicked; the slot itself
        // is still sound.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ConfirmationWatcher {
    fn drop(&mut self) {
        if let Some(active) = self.lock_active().take() {
            active.handle.abort();
        }
    }
}

// ─── Poll loop ───────────────────────────────────────────────────────────────

async fn poll_loop(
    source: Arc<dyn CctxLookupSource>,
    policy: WatchPolicy,
    state: Arc<watch::Sender<WatchState>>,
    generation: Arc<AtomicU64>,
    my_generation: u64,
    target: TxHash,
) {
    let started = tokio::time::Instant::now();
    let mut attempts: u32 = 0;
    let mut consecutive_failures: u32 = 0;

    loop {
        attempts += 1;

        match source.lookup(&target).await {
            Ok(CctxLookup::Settled(destination)) => {
                tracing::info!(%target, %destination, attempts, "cross-chain transfer settled");
                publish(
                    &state,
                    &generation,
                    my_generation,
                    WatchState {
                        phase: WatchPhase::Confirmed,
                        target: Some(target.clone()),
                        destination: Some(destination),
                        attempts,
                    },
                );
                return;
            }
            Ok(CctxLookup::Pending) => {
                consecutive_failures = 0;
                tracing::debug!(%target, attempts, "destination hash not available yet");
            }
            Err(e) => {
                // A failed cycle never stops the watch; it only stretches
                // the delay before the next one.
                consecutive_failures += 1;
                tracing::warn!(%target, attempts, consecutive_failures, "poll cycle failed: {}", e);
            }
        }

        if !publish(
            &state,
            &generation,
            my_generation,
            WatchState::polling(target.clone(), attempts),
        ) {
            // Watcher was retargeted while this cycle was in flight.
            return;
        }

        if policy.exhausted(attempts, started.elapsed()) {
            tracing::warn!(%target, attempts, "giving up on cross-chain confirmation");
            publish(
                &state,
                &generation,
                my_generation,
                WatchState {
                    phase: WatchPhase::TimedOut,
                    target: Some(target.clone()),
                    destination: None,
                    attempts,
                },
            );
            return;
        }

        tokio::time::sleep(policy.next_delay(consecutive_failures)).await;
    }
}

/// Apply a state update only if this loop is still the current generation;
/// a result that raced a reset must not resurface.
fn publish(
    state: &watch::Sender<WatchState>,
    generation: &AtomicU64,
    my_generation: u64,
    next: WatchState,
) -> bool {
    state.send_if_modified(|current| {
        if generation.load(Ordering::SeqCst) == my_generation {
            *current = next;
            true
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;

    use async_trait::async_trait;
    use guardian_core::CctxError;

    /// Lookup source that replays a script, then keeps answering Pending.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<CctxLookup, CctxError>>>,
        calls: AtomicU32,
        seen: Mutex<Vec<TxHash>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<CctxLookup, CctxError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<TxHash> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CctxLookupSource for ScriptedSource {
        async fn lookup(&self, inbound: &TxHash) -> Result<CctxLookup, CctxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(inbound.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(CctxLookup::Pending))
        }
    }

    fn hash(tag: &str) -> TxHash {
        TxHash::new(format!("0x{tag}"))
    }

    async fn wait_terminal(watcher: &ConfirmationWatcher) -> WatchState {
        let mut rx = watcher.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if current.is_terminal() {
                return current;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_fires_immediately() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());

        assert!(watcher.start(hash("aaa")));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(watcher.state().phase, WatchPhase::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_fixed_interval_while_pending() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());
        watcher.start(hash("aaa"));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        // Just before the next cycle: nothing new
        tokio::time::sleep(Duration::from_millis(14_900)).await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.calls(), 2);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(watcher.state().attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_once_settled() {
        let source = ScriptedSource::new(vec![
            Ok(CctxLookup::Pending),
            Ok(CctxLookup::Settled(hash("dest"))),
        ]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());
        watcher.start(hash("aaa"));

        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::Confirmed);
        assert_eq!(state.destination, Some(hash("dest")));
        assert_eq!(state.attempts, 2);

        // No further cycles once confirmed
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn error_cycles_back_off_but_keep_going() {
        let source = ScriptedSource::new(vec![
            Err(CctxError::Status { status: 500 }),
            Ok(CctxLookup::Settled(hash("dest"))),
        ]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());
        watcher.start(hash("aaa"));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        // Failure doubles the delay: nothing at the plain interval mark
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(source.calls(), 2);

        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_for_same_hash() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());

        assert!(watcher.start(hash("aaa")));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!watcher.start(hash("aaa")));

        tokio::time::sleep(Duration::from_secs(31)).await;
        // Single loop: t=0, t=15, t=30
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retarget_cancels_previous_loop() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());

        watcher.start(hash("aaa"));
        tokio::time::sleep(Duration::from_millis(1)).await;

        watcher.start(hash("bbb"));
        tokio::time::sleep(Duration::from_secs(31)).await;

        let seen = source.seen();
        assert_eq!(seen[0], hash("aaa"));
        assert!(seen[1..].iter().all(|h| h == &hash("bbb")));
        assert_eq!(watcher.state().target, Some(hash("bbb")));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_hash_is_ignored() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());

        assert!(!watcher.start(TxHash::new("")));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 0);
        assert_eq!(watcher.state().phase, WatchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_result_and_stops_polling() {
        let source = ScriptedSource::new(vec![Ok(CctxLookup::Settled(hash("dest")))]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());
        watcher.start(hash("aaa"));

        let state = wait_terminal(&watcher).await;
        assert!(state.is_confirmed());

        watcher.reset();
        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Idle);
        assert_eq!(state.target, None);
        assert_eq!(state.destination, None);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn max_attempts_budget_times_out() {
        let policy = WatchPolicy::default().with_max_attempts(NonZeroU32::new(3).unwrap());
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), policy);
        watcher.start(hash("aaa"));

        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::TimedOut);
        assert_eq!(state.attempts, 3);
        assert_eq!(source.calls(), 3);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_budget_times_out() {
        let policy = WatchPolicy::default().with_deadline(Duration::from_secs(40));
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), policy);
        watcher.start(hash("aaa"));

        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::TimedOut);
        // Cycles at 0s, 15s, 30s, 45s; the 45s cycle crosses the deadline
        assert_eq!(state.attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_hash_can_be_restarted() {
        let policy = WatchPolicy::default().with_max_attempts(NonZeroU32::new(1).unwrap());
        let source = ScriptedSource::new(vec![
            Ok(CctxLookup::Pending),
            Ok(CctxLookup::Settled(hash("dest"))),
        ]);
        let watcher = ConfirmationWatcher::new(source.clone(), policy);

        watcher.start(hash("aaa"));
        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::TimedOut);

        // Same hash, fresh lifecycle
        assert!(watcher.start(hash("aaa")));
        let state = wait_terminal(&watcher).await;
        assert_eq!(state.phase, WatchPhase::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_active_watch() {
        let source = ScriptedSource::new(vec![]);
        let watcher = ConfirmationWatcher::new(source.clone(), WatchPolicy::default());
        watcher.start(hash("aaa"));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        drop(watcher);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn backoff_schedule_is_capped() {
        let policy = WatchPolicy::default();
        assert_eq!(policy.next_delay(0), Duration::from_secs(15));
        assert_eq!(policy.next_delay(1), Duration::from_secs(30));
        assert_eq!(policy.next_delay(2), Duration::from_secs(60));
        assert_eq!(policy.next_delay(3), Duration::from_secs(120));
        assert_eq!(policy.next_delay(10), Duration::from_secs(120));
        assert_eq!(policy.next_delay(u32::MAX), Duration::from_secs(120));
    }
}
