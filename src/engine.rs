use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::adapters::{DismissalCache, FileStore, KvStore};
use crate::banner::{
    BannerContext, BannerRules, EngagementMetrics, applicable_banners, decide_banner,
    visible_banner,
};
use crate::entitlement::{Clock, SystemClock, compute_entitlement};
use crate::events::{AnalysisSessionWatcher, JobFeed};
use crate::pubsub::{LimitHitBus, RecentLimitHits};
use crate::types::{
    AccountRecord, ApiErrorResponse, BannerDecision, BannerKind, EntitlementSnapshot,
    LimitHitEvent, ProjectAggregates,
};
use crate::utils::{config::EngineConfig, error::PlangateError};

/// Wires the cache, bus and banner rules for one user session.
pub struct PlanEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    dismissals: Arc<DismissalCache>,
    bus: LimitHitBus,
    recent_hits: RecentLimitHits,
    rules: BannerRules,
}

impl PlanEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PlangateError> {
        config.validate()?;

        let dismissals = Arc::new(DismissalCache::new(
            store,
            clock.clone(),
            Duration::seconds(config.dismissal_ttl_secs as i64),
        ));
        let bus = LimitHitBus::new(dismissals.clone(), clock.clone());
        let rules = BannerRules::from_config(&config);
        let recent_hits = RecentLimitHits::attach(&bus, rules.limit_hit_window);

        Ok(Self {
            config,
            clock,
            dismissals,
            bus,
            recent_hits,
            rules,
        })
    }

    /// File-backed cache under `state_dir` and the wall clock.
    pub fn open(config: EngineConfig) -> Result<Self, PlangateError> {
        let store = FileStore::open(&config.state_dir)?;
        info!(state_dir = %config.state_dir, "Opened local state");
        Self::new(config, Arc::new(store), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &BannerRules {
        &self.rules
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn bus(&self) -> &LimitHitBus {
        &self.bus
    }

    pub fn dismissals(&self) -> &DismissalCache {
        &self.dismissals
    }

    pub fn compute_entitlement(
        &self,
        account: &AccountRecord,
        projects: &ProjectAggregates,
    ) -> EntitlementSnapshot {
        compute_entitlement(account, projects, self.clock.now())
    }

    /// The banner to render right now, dismissals applied.
    pub fn decide_banner(
        &self,
        snapshot: &EntitlementSnapshot,
        engagement: &EngagementMetrics,
    ) -> Option<BannerDecision> {
        let now = self.clock.now();
        let hits = self.recent_hits.recent(now);
        let decision = decide_banner(&BannerContext {
            snapshot,
            recent_hits: &hits,
            engagement,
            rules: &self.rules,
            now,
        });
        visible_banner(decision, &self.dismissals)
    }

    /// Every matching rule in waterfall order, dismissals ignored.
    pub fn explain_banners(
        &self,
        snapshot: &EntitlementSnapshot,
        engagement: &EngagementMetrics,
    ) -> Vec<BannerDecision> {
        let now = self.clock.now();
        let hits = self.recent_hits.recent(now);
        applicable_banners(&BannerContext {
            snapshot,
            recent_hits: &hits,
            engagement,
            rules: &self.rules,
            now,
        })
    }

    pub fn classify(&self, resp: &ApiErrorResponse) -> Option<LimitHitEvent> {
        self.bus.classify(resp)
    }

    pub fn recent_limit_hits(&self) -> Vec<LimitHitEvent> {
        self.recent_hits.recent(self.clock.now())
    }

    pub fn dismiss(&self, kind: BannerKind) -> Result<(), PlangateError> {
        Ok(self.dismissals.dismiss(kind)?)
    }

    pub fn is_dismissed(&self, kind: BannerKind) -> bool {
        self.dismissals.is_dismissed(kind)
    }

    pub fn reset_for_limit_hit(&self) -> Result<(), PlangateError> {
        Ok(self.dismissals.reset_for_limit_hit()?)
    }

    pub fn session_watcher(&self, feed: Arc<dyn JobFeed>) -> AnalysisSessionWatcher {
        AnalysisSessionWatcher::new(
            feed,
            StdDuration::from_millis(self.config.reconnect_delay_ms),
        )
    }
}
