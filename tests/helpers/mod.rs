#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use plangate::{
    PlanEngine,
    adapters::{KvStore, MemoryStore},
    entitlement::ManualClock,
    types::{AccountRecord, ApiErrorResponse, PlanTier, ProjectAggregates},
    utils::config::EngineConfig,
};

pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-10T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub struct TestEngine {
    pub engine: PlanEngine,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
}

pub fn setup_engine() -> TestEngine {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = Arc::new(MemoryStore::new());
    let engine = PlanEngine::new(
        EngineConfig::default(),
        store.clone() as Arc<dyn KvStore>,
        clock.clone(),
    )
    .expect("default config is valid");
    TestEngine {
        engine,
        clock,
        store,
    }
}

pub fn account(tier: PlanTier, registered_days_ago: i64) -> AccountRecord {
    AccountRecord {
        tier,
        trial_started_at: None,
        trial_ends_at: None,
        created_at: t0() - Duration::days(registered_days_ago),
        cancellation_scheduled: false,
        cancellation_effective_at: None,
    }
}

pub fn trial_account(ends_in: Duration) -> AccountRecord {
    AccountRecord {
        trial_started_at: Some(t0() - Duration::days(3)),
        trial_ends_at: Some(t0() + ends_in),
        ..account(PlanTier::Trial, 10)
    }
}

pub fn projects(count: u64) -> ProjectAggregates {
    ProjectAggregates {
        count,
        ..ProjectAggregates::default()
    }
}

pub fn project_limit_error() -> ApiErrorResponse {
    ApiErrorResponse::new(
        403,
        r#"{"code":"PROJECT_LIMIT_EXCEEDED","message":"Project limit reached","details":{"currentUsage":2,"limit":2}}"#,
    )
}
