use async_trait::async_trait;
use futures::StreamExt;
use redis::Client as RedisClient;
use tracing::info;

use crate::events::feed::{FeedError, JobFeed, SessionStream};
use crate::types::AnalysisSessionState;
use crate::utils::{error::PlangateError, logs_fmt::abbrev, session_key};

/// Session records kept as JSON at `analysis_session:{job_id}`, with every
/// write also published on a channel of the same name.
pub struct RedisJobFeed {
    client: RedisClient,
}

impl RedisJobFeed {
    pub fn open(redis_url: &str) -> Result<Self, PlangateError> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self { client })
    }

    pub async fn publish_state(
        &self,
        job_id: &str,
        record: &AnalysisSessionState,
    ) -> Result<(), PlangateError> {
        let key = session_key(job_id);
        let json = serde_json::to_string(record)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::pipe()
            .set(&key, &json)
            .ignore()
            .cmd("PUBLISH")
            .arg(&key)
            .arg(&json)
            .ignore()
            .query_async(&mut conn)
            .await?;

        info!(
            event = "session.published",
            job_id = %abbrev(job_id),
            status = ?record.status,
        );
        Ok(())
    }
}

fn transport(err: redis::RedisError) -> FeedError {
    FeedError::Transport(err.to_string())
}

fn decode(raw: &str) -> Result<AnalysisSessionState, FeedError> {
    serde_json::from_str(raw).map_err(|e| FeedError::Decode(e.to_string()))
}

#[async_trait]
impl JobFeed for RedisJobFeed {
    async fn subscribe(&self, job_id: &str) -> Result<SessionStream, FeedError> {
        let key = session_key(job_id);

        let mut pubsub = self.client.get_async_pubsub().await.map_err(transport)?;
        pubsub.subscribe(&key).await.map_err(transport)?;

        // Read after subscribing so a write in between is not lost.
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(transport)?;
        let current: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(transport)?;

        info!(%key, "Subscribed to analysis session channel");

        let initial = futures::stream::iter(current.map(|raw| decode(&raw)));
        let updates = pubsub.into_on_message().map(|msg| {
            msg.get_payload::<String>()
                .map_err(transport)
                .and_then(|raw| decode(&raw))
        });
        Ok(initial.chain(updates).boxed())
    }
}
