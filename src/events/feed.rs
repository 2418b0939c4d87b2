use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::types::AnalysisSessionState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Feed transport error: {0}")]
    Transport(String),
    #[error("Feed permission denied: {0}")]
    Permission(String),
    #[error("Undecodable session record: {0}")]
    Decode(String),
}

impl FeedError {
    /// A decode error spoils one update; anything else spoils the stream.
    pub fn ends_stream(&self) -> bool {
        !matches!(self, FeedError::Decode(_))
    }
}

pub type SessionStream = BoxStream<'static, Result<AnalysisSessionState, FeedError>>;

/// Push subscription to the remote record of one analysis job.
///
/// The stream starts with the record's current value when one exists.
#[async_trait]
pub trait JobFeed: Send + Sync {
    async fn subscribe(&self, job_id: &str) -> Result<SessionStream, FeedError>;
}

type Sender = mpsc::UnboundedSender<Result<AnalysisSessionState, FeedError>>;

#[derive(Default)]
struct MemoryFeedState {
    records: HashMap<String, AnalysisSessionState>,
    subscribers: HashMap<String, Vec<Sender>>,
    refuse: Option<FeedError>,
}

/// In-process record store with push delivery.
#[derive(Default)]
pub struct MemoryJobFeed {
    state: Mutex<MemoryFeedState>,
}

impl MemoryJobFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryFeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the record and pushes it to every live subscriber.
    pub fn publish(&self, job_id: &str, record: AnalysisSessionState) {
        let mut state = self.state();
        state.records.insert(job_id.to_string(), record.clone());
        if let Some(subs) = state.subscribers.get_mut(job_id) {
            subs.retain(|tx| tx.send(Ok(record.clone())).is_ok());
        }
    }

    /// Pushes an error to every live subscriber and drops them.
    pub fn fail(&self, job_id: &str, err: FeedError) {
        if let Some(subs) = self.state().subscribers.remove(job_id) {
            for tx in subs {
                let _ = tx.send(Err(err.clone()));
            }
        }
    }

    /// Makes subsequent `subscribe` calls fail until cleared with `None`.
    pub fn refuse_subscriptions(&self, err: Option<FeedError>) {
        self.state().refuse = err;
    }

    pub fn subscriber_count(&self, job_id: &str) -> usize {
        self.state()
            .subscribers
            .get(job_id)
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl JobFeed for MemoryJobFeed {
    async fn subscribe(&self, job_id: &str) -> Result<SessionStream, FeedError> {
        let mut state = self.state();
        if let Some(err) = state.refuse.clone() {
            return Err(err);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(current) = state.records.get(job_id) {
            let _ = tx.send(Ok(current.clone()));
        }
        state
            .subscribers
            .entry(job_id.to_string())
            .or_default()
            .push(tx);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}
