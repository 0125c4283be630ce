//! Market data client: the refresh lifecycle behind the dashboard.
//!
//! A refresh cycle fetches the quote batch with a timeout, retries failed
//! attempts with a fixed delay, and merges the result into the tracked
//! instruments. At most one cycle runs at a time; a refresh requested while
//! one is running is dropped.
//!
//! While active, a recurring timer starts a cycle immediately and then once
//! per refresh interval. Starting and stopping bump a generation counter.
//! The timer exits as soon as its generation is stale. A cycle notices a
//! stale generation after its retry delay: if the client was stopped it gives
//! up instead of making another request, and if it was re-armed in the
//! meantime it keeps its remaining attempts, since the new timer's first tick
//! was skipped while it held the guard.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use dashboard_market_data::StockDataResponse;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::RefreshConfig;
use crate::errors::FetchError;
use crate::source::QuoteSource;
use crate::state::ClientState;

/// How a refresh cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A batch was merged into the state.
    Updated,
    /// Every attempt failed; the state carries the error message.
    Failed,
    /// Another cycle was already running.
    Skipped,
    /// The client was stopped during the retry delay; the cycle ended
    /// without a further request.
    Discarded,
}

/// Handle to the market data client. Cheap to clone.
#[derive(Clone)]
pub struct MarketDataClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    source: Arc<dyn QuoteSource>,
    config: RefreshConfig,
    state: watch::Sender<ClientState>,
    in_flight: AtomicBool,
    generation: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Attempt bookkeeping of the running cycle.
struct RefreshCycle {
    attempt: u32,
    started_at: Instant,
}

impl MarketDataClient {
    pub fn new(source: Arc<dyn QuoteSource>, config: RefreshConfig, initial: ClientState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(ClientInner {
                source,
                config,
                state,
                in_flight: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Arm (`true`) or disarm (`false`) automatic refresh.
    ///
    /// Arming starts a cycle right away. Arming an armed client does nothing.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, active: bool) {
        if !active {
            self.stop();
            return;
        }

        let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.is_some() {
            debug!("Auto refresh already armed");
            return;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Arming auto refresh every {:?} (generation {})",
            self.inner.config.refresh_interval, generation
        );
        *timer = Some(tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            generation,
        )));
    }

    /// Disarm automatic refresh. A cycle already in flight runs to completion
    /// but makes no request after its current one.
    pub fn stop(&self) {
        let handle = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(handle) = handle {
            handle.abort();
            info!("Auto refresh disarmed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Run a refresh cycle now, unless one is already running.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.run_cycle().await
    }

    /// Current snapshot.
    pub fn state(&self) -> ClientState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified with every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.inner.state.subscribe()
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.inner.config
    }
}

async fn run_timer(inner: Weak<ClientInner>, generation: u64) {
    let period = match inner.upgrade() {
        Some(inner) => inner.config.refresh_interval,
        None => return,
    };

    // The first tick completes immediately and doubles as the initial refresh.
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.generation.load(Ordering::SeqCst) != generation {
            break;
        }

        // Aborting the timer must not cancel a cycle, so each runs on its own task.
        tokio::spawn(async move {
            inner.run_cycle().await;
        });
    }

    debug!("Auto refresh timer (generation {}) exited", generation);
}

impl ClientInner {
    async fn run_cycle(&self) -> RefreshOutcome {
        let Some(guard) = CycleGuard::acquire(self) else {
            debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let mut generation = self.generation.load(Ordering::SeqCst);
        self.state.send_modify(ClientState::begin_cycle);

        let mut cycle = RefreshCycle {
            attempt: 0,
            started_at: Instant::now(),
        };

        loop {
            match self.attempt().await {
                Ok(response) => {
                    let quotes = response.quotes().unwrap_or_default();
                    info!(
                        "Refresh merged {} quotes after {} attempt(s) in {:?}",
                        quotes.len(),
                        cycle.attempt + 1,
                        cycle.started_at.elapsed()
                    );
                    self.state.send_modify(|state| {
                        state.apply_quotes(quotes, response.source.as_deref(), Utc::now())
                    });
                    guard.finish();
                    return RefreshOutcome::Updated;
                }
                Err(e) if cycle.attempt < self.config.max_retry_count => {
                    warn!(
                        "Refresh attempt {} failed, retrying in {:?}: {}",
                        cycle.attempt + 1,
                        self.config.retry_delay,
                        e
                    );
                    time::sleep(self.config.retry_delay).await;

                    let current = self.generation.load(Ordering::SeqCst);
                    if current != generation {
                        if !self.is_armed() {
                            info!("Client stopped during retry delay, ending cycle");
                            return RefreshOutcome::Discarded;
                        }
                        info!("Client re-armed during retry delay, continuing cycle");
                        generation = current;
                    }
                    cycle.attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Refresh failed after {} attempt(s) in {:?}: {}",
                        cycle.attempt + 1,
                        cycle.started_at.elapsed(),
                        e
                    );
                    self.state
                        .send_modify(|state| state.apply_failure(e.user_message()));
                    guard.finish();
                    return RefreshOutcome::Failed;
                }
            }
        }
    }

    fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// One timeout-bounded request, validated.
    async fn attempt(&self) -> Result<StockDataResponse, FetchError> {
        let response = time::timeout(self.config.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| FetchError::Timeout(self.config.fetch_timeout))??;

        if response.quotes().is_none() {
            return Err(FetchError::InvalidPayload(
                response
                    .error
                    .unwrap_or_else(|| "success flag or data missing".to_string()),
            ));
        }
        Ok(response)
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }
}

/// Re-entrancy guard held for a whole cycle, retries included.
///
/// Dropping it releases the guard. If the cycle did not finish normally
/// (discarded, or its future was dropped) the loading flags are cleared too.
struct CycleGuard<'a> {
    inner: &'a ClientInner,
    finished: bool,
}

impl<'a> CycleGuard<'a> {
    fn acquire(inner: &'a ClientInner) -> Option<Self> {
        inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            inner,
            finished: false,
        })
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.state.send_modify(ClientState::clear_loading);
        }
        self.inner.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TrackedInstrument;
    use async_trait::async_trait;
    use dashboard_market_data::Quote;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    type Respond = Box<dyn Fn(usize) -> Result<StockDataResponse, FetchError> + Send + Sync>;

    /// Source answering after `latency` with whatever `respond` returns for
    /// the zero-based call number.
    struct FakeSource {
        latency: Duration,
        respond: Respond,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl FakeSource {
        fn new(
            latency: Duration,
            respond: impl Fn(usize) -> Result<StockDataResponse, FetchError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                latency,
                respond: Box::new(respond),
                calls: AtomicUsize::new(0),
                call_times: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch(&self) -> Result<StockDataResponse, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            time::sleep(self.latency).await;
            (self.respond)(call)
        }
    }

    fn kospi_only(_: usize) -> Result<StockDataResponse, FetchError> {
        Ok(StockDataResponse::ok(
            vec![Quote::new("^KS11", 2500.5, 12.3, 0.49)],
            "X",
        ))
    }

    fn always_502(_: usize) -> Result<StockDataResponse, FetchError> {
        Err(FetchError::Status(502))
    }

    fn client_for(source: Arc<FakeSource>) -> MarketDataClient {
        MarketDataClient::new(
            source,
            RefreshConfig::default(),
            ClientState::with_default_instruments(),
        )
    }

    /// Let spawned tasks run without moving the paused clock far.
    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_merges_partial_batch() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        assert_eq!(client.refresh_now().await, RefreshOutcome::Updated);

        let state = client.state();
        let kospi = state.instrument("^KS11").unwrap();
        assert_eq!(kospi.price, 2500.5);
        assert_eq!(kospi.change, 12.3);
        assert_eq!(kospi.change_percent, 0.49);
        assert!(!kospi.is_loading);

        for symbol in ["102110.KS", "^VIX", "KRW=X"] {
            let instrument = state.instrument(symbol).unwrap();
            assert_eq!(instrument.price, 0.0, "{symbol}");
            assert!(!instrument.is_loading, "{symbol}");
        }

        assert!(state.last_update.is_some());
        assert_eq!(state.data_source.as_deref(), Some("X"));
        assert!(state.error_message.is_none());
        assert!(!state.is_loading);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_make_one_request() {
        let source = FakeSource::new(Duration::from_secs(1), kospi_only);
        let client = client_for(source.clone());

        let (first, second, third) =
            tokio::join!(client.refresh_now(), client.refresh_now(), client.refresh_now());

        assert_eq!(first, RefreshOutcome::Updated);
        assert_eq!(second, RefreshOutcome::Skipped);
        assert_eq!(third, RefreshOutcome::Skipped);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_released_after_cycle() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.refresh_now().await;
        client.refresh_now().await;

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_source_gets_three_attempts() {
        let source = FakeSource::new(Duration::ZERO, always_502);
        let client = client_for(source.clone());
        let mut updates = client.subscribe();

        let refresh = tokio::spawn({
            let client = client.clone();
            async move { client.refresh_now().await }
        });

        // Loading stays on between retries and the error only shows at the end.
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_loading);
        time::sleep(Duration::from_millis(3500)).await;
        assert!(client.state().is_loading);
        assert!(client.state().error_message.is_none());

        assert_eq!(refresh.await.unwrap(), RefreshOutcome::Failed);
        assert_eq!(source.calls(), 3);

        let times = source.call_times.lock().unwrap().clone();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(3000));
        }

        let state = client.state();
        assert_eq!(
            state.error_message.as_deref(),
            Some(FetchError::Status(502).user_message())
        );
        assert!(!state.is_loading);
        assert!(state.instruments.iter().all(|i| !i.is_loading));
        assert!(state.last_update.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let source = FakeSource::new(Duration::ZERO, |call| {
            if call == 0 {
                Err(FetchError::InvalidPayload("success is false".to_string()))
            } else {
                kospi_only(call)
            }
        });
        let client = client_for(source.clone());

        assert_eq!(client.refresh_now().await, RefreshOutcome::Updated);
        assert_eq!(source.calls(), 2);
        assert!(client.state().error_message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failed_attempt() {
        let source = FakeSource::new(Duration::from_secs(20), kospi_only);
        let config = RefreshConfig {
            max_retry_count: 0,
            ..RefreshConfig::default()
        };
        let client = MarketDataClient::new(
            source.clone(),
            config,
            ClientState::with_default_instruments(),
        );

        let started = Instant::now();
        assert_eq!(client.refresh_now().await, RefreshOutcome::Failed);

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(20));
        assert_eq!(source.calls(), 1);
        assert_eq!(
            client.state().error_message.as_deref(),
            Some(FetchError::Timeout(config.fetch_timeout).user_message())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_shares_retry_budget() {
        let source = FakeSource::new(Duration::ZERO, |call| {
            if call == 0 {
                Err(FetchError::Status(500))
            } else {
                Err(FetchError::Timeout(Duration::from_secs(15)))
            }
        });
        let client = client_for(source.clone());

        assert_eq!(client.refresh_now().await, RefreshOutcome::Failed);
        assert_eq!(source.calls(), 3);
        // The last failure decides the message.
        assert_eq!(
            client.state().error_message.as_deref(),
            Some(FetchError::Timeout(Duration::ZERO).user_message())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsuccessful_payload_is_a_failure() {
        let source = FakeSource::new(Duration::ZERO, |_| {
            Ok(StockDataResponse::failure("Internal server error"))
        });
        let client = client_for(source.clone());

        assert_eq!(client.refresh_now().await, RefreshOutcome::Failed);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_is_valid() {
        let source = FakeSource::new(Duration::ZERO, |_| Ok(StockDataResponse::ok(vec![], "X")));
        let client = MarketDataClient::new(
            source,
            RefreshConfig::default(),
            ClientState::new(vec![TrackedInstrument {
                price: 7.0,
                ..TrackedInstrument::new("A", "A")
            }]),
        );

        assert_eq!(client.refresh_now().await, RefreshOutcome::Updated);

        let a = client.state().instrument("A").cloned().unwrap();
        assert_eq!(a.price, 7.0);
        assert!(!a.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_refreshes_immediately_then_per_interval() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        assert_eq!(source.calls(), 1);

        time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(source.calls(), 2);

        time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(source.calls(), 3);

        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_arms_one_timer() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        client.start(true);
        settle().await;
        assert_eq!(source.calls(), 1);

        time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(source.calls(), 2);
        assert!(client.is_active());

        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.stop();
        client.start(true);
        settle().await;
        client.stop();
        client.stop();
        assert!(!client.is_active());

        time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_request_finish() {
        let source = FakeSource::new(Duration::from_secs(1), kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        client.start(false);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(client.state().data_source.as_deref(), Some("X"));
        assert!(!client.state().is_loading);

        time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_retry_delay_prevents_further_requests() {
        let source = FakeSource::new(Duration::ZERO, always_502);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        assert_eq!(source.calls(), 1);

        client.start(false);
        time::sleep(Duration::from_secs(60 * 60)).await;

        assert_eq!(source.calls(), 1);
        let state = client.state();
        assert!(!state.is_loading);
        assert!(state.instruments.iter().all(|i| !i.is_loading));
        assert!(state.error_message.is_none());

        // The guard was released, so a manual refresh still works.
        assert_eq!(client.refresh_now().await, RefreshOutcome::Failed);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_during_retry_delay_keeps_retrying() {
        let source = FakeSource::new(Duration::ZERO, |call| {
            if call == 0 {
                Err(FetchError::Status(502))
            } else {
                kospi_only(call)
            }
        });
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        assert_eq!(source.calls(), 1);

        // Sign out and back in while the cycle waits to retry.
        client.start(false);
        client.start(true);
        time::sleep(Duration::from_secs(10)).await;

        assert!(client.is_active());
        assert_eq!(source.calls(), 2);
        let state = client.state();
        assert_eq!(state.instrument("^KS11").unwrap().price, 2500.5);
        assert!(state.instruments.iter().all(|i| !i.is_loading));
        assert!(!state.is_loading);

        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_during_scheduled_cycle_is_dropped() {
        let source = FakeSource::new(Duration::from_secs(1), kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;

        assert_eq!(client.refresh_now().await, RefreshOutcome::Skipped);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 1);

        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_arms_again() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        client.start(false);
        client.start(true);
        settle().await;

        assert_eq!(source.calls(), 2);
        time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(source.calls(), 3);

        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_client_stops_timer() {
        let source = FakeSource::new(Duration::ZERO, kospi_only);
        let client = client_for(source.clone());

        client.start(true);
        settle().await;
        drop(client);

        time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(source.calls(), 1);
    }
}
