use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::{info, warn};

use crate::adapters::cache::DismissalCache;
use crate::entitlement::clock::Clock;
use crate::pubsub::classify::classify_error;
use crate::types::{ApiErrorResponse, LimitHitEvent};

pub type LimitHitListener = Arc<dyn Fn(&LimitHitEvent) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    active: Arc<AtomicBool>,
    callback: LimitHitListener,
}

struct BusInner {
    listeners: Mutex<Vec<Arc<ListenerEntry>>>,
    next_id: AtomicU64,
    dismissals: Arc<DismissalCache>,
    clock: Arc<dyn Clock>,
}

/// In-process fan-out of quota-exceeded events.
///
/// Listeners live only as long as the session; nothing is replayed to late
/// subscribers.
#[derive(Clone)]
pub struct LimitHitBus {
    inner: Arc<BusInner>,
}

impl LimitHitBus {
    pub fn new(dismissals: Arc<DismissalCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                dismissals,
                clock,
            }),
        }
    }

    pub fn add_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&LimitHitEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(ListenerEntry {
                id,
                active: active.clone(),
                callback: Arc::new(callback),
            }));
        ListenerHandle {
            id,
            active,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Classifies an API error; on a limit hit, clears the overridable
    /// dismissals and then notifies every listener.
    pub fn classify(&self, resp: &ApiErrorResponse) -> Option<LimitHitEvent> {
        let event = classify_error(resp, self.inner.clock.now())?;
        info!(
            kind = %event.kind,
            current_usage = ?event.current_usage,
            limit = ?event.limit,
            "Limit hit classified"
        );
        if let Err(e) = self.inner.dismissals.reset_for_limit_hit() {
            warn!(error = %e, "Failed to reset dismissals after limit hit");
        }
        self.publish(&event);
        Some(event)
    }

    /// Delivers to listeners in registration order. A panicking listener is
    /// logged and skipped.
    fn publish(&self, event: &LimitHitEvent) {
        let snapshot: Vec<Arc<ListenerEntry>> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for entry in snapshot {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            let callback = entry.callback.clone();
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(listener = entry.id, kind = %event.kind, "Limit hit listener panicked");
            }
        }
    }
}

/// Returned by `add_listener`; `unsubscribe` detaches the callback.
pub struct ListenerHandle {
    id: u64,
    active: Arc<AtomicBool>,
    bus: Weak<BusInner>,
}

impl ListenerHandle {
    /// Idempotent. No delivery starts after this returns.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|entry| entry.id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
