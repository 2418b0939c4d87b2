use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::pubsub::bus::{LimitHitBus, ListenerHandle};
use crate::types::LimitHitEvent;

/// Keeps limit hits heard on the bus until they age out of the relevance window.
pub struct RecentLimitHits {
    events: Arc<Mutex<Vec<LimitHitEvent>>>,
    window: Duration,
    handle: ListenerHandle,
}

impl RecentLimitHits {
    pub fn attach(bus: &LimitHitBus, window: Duration) -> Self {
        let events = Arc::new(Mutex::new(Vec::<LimitHitEvent>::new()));
        let sink = events.clone();
        let handle = bus.add_listener(move |event: &LimitHitEvent| {
            let mut events = sink.lock().unwrap_or_else(|e| e.into_inner());
            events.retain(|held| event.occurred_at - held.occurred_at <= window);
            events.push(event.clone());
        });
        Self {
            events,
            window,
            handle,
        }
    }

    /// Events no older than the window, oldest first. Stale ones are dropped.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<LimitHitEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.retain(|event| now - event.occurred_at <= self.window);
        events.clone()
    }
}

impl Drop for RecentLimitHits {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}
