use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::plan::PlanTier;

/// Account record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub tier: PlanTier,
    #[serde(default)]
    pub trial_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cancellation_scheduled: bool,
    #[serde(default)]
    pub cancellation_effective_at: Option<DateTime<Utc>>,
}

/// Per-account project aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAggregates {
    pub count: u64,
    #[serde(default)]
    pub analyzed_count: u64,
    #[serde(default)]
    pub opinions_per_project: Vec<u64>,
}

impl ProjectAggregates {
    pub fn max_opinions(&self) -> u64 {
        self.opinions_per_project.iter().copied().max().unwrap_or(0)
    }
}
