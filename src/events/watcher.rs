use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::events::feed::{JobFeed, SessionStream};
use crate::events::fire_state::FireState;
use crate::types::AnalysisSessionState;
use crate::utils::logs_fmt::abbrev;

#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchTarget {
    job_id: String,
    generation: u64,
}

type TargetSlot = Arc<Mutex<Option<WatchTarget>>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Watches at most one analysis job at a time and calls back on completion.
///
/// Starting a new watch tears down the previous one; updates that arrive for
/// a job the watcher has moved away from are dropped.
pub struct AnalysisSessionWatcher {
    feed: Arc<dyn JobFeed>,
    reconnect_delay: Duration,
    generation: AtomicU64,
    current: TargetSlot,
    running: Mutex<Option<WatchHandle>>,
}

impl AnalysisSessionWatcher {
    pub fn new(feed: Arc<dyn JobFeed>, reconnect_delay: Duration) -> Self {
        Self {
            feed,
            reconnect_delay,
            generation: AtomicU64::new(0),
            current: Arc::new(Mutex::new(None)),
            running: Mutex::new(None),
        }
    }

    /// Subscribes to `job_id` and returns once the first subscription attempt
    /// has finished. A failed attempt is retried in the background.
    pub async fn watch<F>(&self, job_id: &str, on_complete: F) -> WatchHandle
    where
        F: FnMut() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let target = WatchTarget {
            job_id: job_id.to_string(),
            generation,
        };

        if let Some(previous) = lock(&self.running).take() {
            previous.unsubscribe();
        }
        *lock(&self.current) = Some(target.clone());

        let initial = match self.feed.subscribe(job_id).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(job_id = %abbrev(job_id), error = %e, "Initial session subscription failed");
                None
            }
        };

        let (latest_tx, latest_rx) = watch::channel(None);
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = WatchTask {
            feed: self.feed.clone(),
            target: target.clone(),
            slot: self.current.clone(),
            cancelled: cancelled.clone(),
            latest: latest_tx,
            reconnect_delay: self.reconnect_delay,
            on_complete: Box::new(on_complete),
        };
        let join = tokio::spawn(task.run(initial));

        let handle = WatchHandle {
            target,
            slot: self.current.clone(),
            cancelled,
            abort: join.abort_handle(),
            latest: latest_rx,
        };

        let mut running = lock(&self.running);
        if handle.is_current() {
            *running = Some(handle.clone());
        } else {
            // A concurrent watch() took over while this one was subscribing.
            handle.unsubscribe();
        }
        info!(job_id = %abbrev(job_id), generation, "Watching analysis session");
        handle
    }

    pub fn current_job(&self) -> Option<String> {
        lock(&self.current).as_ref().map(|t| t.job_id.clone())
    }

    /// Stops the active watch, if any.
    pub fn stop(&self) {
        if let Some(handle) = lock(&self.running).take() {
            handle.unsubscribe();
        }
    }
}

impl Drop for AnalysisSessionWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cancellation handle for one watch.
#[derive(Clone)]
pub struct WatchHandle {
    target: WatchTarget,
    slot: TargetSlot,
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
    latest: watch::Receiver<Option<AnalysisSessionState>>,
}

impl WatchHandle {
    /// Safe to call more than once.
    pub fn unsubscribe(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.abort.abort();
        let mut slot = lock(&self.slot);
        if slot.as_ref() == Some(&self.target) {
            *slot = None;
        }
        debug!(job_id = %abbrev(&self.target.job_id), "Session watch cancelled");
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }

    pub fn job_id(&self) -> &str {
        &self.target.job_id
    }

    /// Last record observed for this job.
    pub fn latest(&self) -> Option<AnalysisSessionState> {
        self.latest.borrow().clone()
    }

    fn is_current(&self) -> bool {
        self.is_active() && lock(&self.slot).as_ref() == Some(&self.target)
    }
}

struct WatchTask {
    feed: Arc<dyn JobFeed>,
    target: WatchTarget,
    slot: TargetSlot,
    cancelled: Arc<AtomicBool>,
    latest: watch::Sender<Option<AnalysisSessionState>>,
    reconnect_delay: Duration,
    on_complete: Box<dyn FnMut() + Send>,
}

impl WatchTask {
    fn is_current(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
            && lock(&self.slot).as_ref() == Some(&self.target)
    }

    async fn run(mut self, mut stream: Option<SessionStream>) {
        let mut fire = FireState::default();
        let job_id = abbrev(&self.target.job_id);

        while self.is_current() {
            let mut updates = match stream.take() {
                Some(s) => s,
                None => match self.feed.subscribe(&self.target.job_id).await {
                    Ok(s) => {
                        info!(%job_id, "Session subscription re-established");
                        s
                    }
                    Err(e) => {
                        warn!(%job_id, error = %e, "Session subscription failed");
                        tokio::time::sleep(self.reconnect_delay).await;
                        continue;
                    }
                },
            };

            while let Some(item) = updates.next().await {
                match item {
                    Ok(record) => {
                        if !self.deliver(record, &mut fire) {
                            return;
                        }
                    }
                    Err(e) if !e.ends_stream() => {
                        warn!(%job_id, error = %e, "Skipping session update");
                    }
                    Err(e) => {
                        warn!(%job_id, error = %e, "Session stream error");
                        break;
                    }
                }
            }

            if !self.is_current() {
                break;
            }
            warn!(%job_id, delay_ms = self.reconnect_delay.as_millis() as u64, "Session stream closed, reconnecting");
            tokio::time::sleep(self.reconnect_delay).await;
        }
        debug!(%job_id, "Session watch task finished");
    }

    /// Returns false once this watch is no longer the watcher's target.
    fn deliver(&mut self, record: AnalysisSessionState, fire: &mut FireState) -> bool {
        if !self.is_current() {
            debug!(job_id = %abbrev(&self.target.job_id), "Dropping update for stale watch");
            return false;
        }
        let status = record.status;
        self.latest.send_replace(Some(record));

        if fire.observe(status) {
            info!(job_id = %abbrev(&self.target.job_id), "Analysis session completed");
            if catch_unwind(AssertUnwindSafe(|| (self.on_complete)())).is_err() {
                warn!(job_id = %abbrev(&self.target.job_id), "Completion callback panicked");
            }
        }
        true
    }
}
