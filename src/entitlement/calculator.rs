use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entitlement::tier_config::TierQuotas;
use crate::types::{
    AccountRecord, EntitlementSnapshot, PlanTier, ProjectAggregates, TrialWindow, UsageKind,
    UsageMetric,
};

/// Tier whose quotas apply. A trial whose end date has passed is treated
/// as Free without touching the recorded tier.
pub fn effective_tier(account: &AccountRecord, now: DateTime<Utc>) -> PlanTier {
    match (account.tier, account.trial_ends_at) {
        (PlanTier::Trial, Some(ends_at)) if ends_at <= now => PlanTier::Free,
        (tier, _) => tier,
    }
}

/// Builds a fresh snapshot from the account record and project aggregates.
pub fn compute_entitlement(
    account: &AccountRecord,
    projects: &ProjectAggregates,
    now: DateTime<Utc>,
) -> EntitlementSnapshot {
    let effective = effective_tier(account, now);
    let quotas = TierQuotas::for_tier(effective);

    let mut usage = BTreeMap::new();
    for (kind, used) in [
        (UsageKind::Projects, projects.count),
        (UsageKind::Analyses, projects.analyzed_count),
        (UsageKind::OpinionsPerProject, projects.max_opinions()),
    ] {
        usage.insert(kind, UsageMetric::new(kind, used, quotas.limit(kind)));
    }

    debug!(
        tier = %account.tier,
        effective_tier = %effective,
        projects = projects.count,
        analyses = projects.analyzed_count,
        "Entitlement computed"
    );

    EntitlementSnapshot {
        tier: account.tier,
        effective_tier: effective,
        usage,
        trial: TrialWindow {
            started_at: account.trial_started_at,
            ends_at: account.trial_ends_at,
        },
        has_used_trial_before: account.trial_started_at.is_some(),
        cancellation_scheduled: account.cancellation_scheduled,
        cancellation_effective_at: account.cancellation_effective_at,
        registered_at: account.created_at,
        computed_at: now,
    }
}
