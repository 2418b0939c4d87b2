use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::adapters::cache::DismissalCache;
use crate::banner::engagement::{EngagementMetrics, EngagementThresholds};
use crate::banner::messages;
use crate::entitlement::clock::TrialClock;
use crate::types::{
    BannerDecision, BannerKind, BannerPriority, EntitlementSnapshot, LimitHitEvent, PlanTier,
    UpgradeIntent, UsageKind,
};
use crate::utils::config::EngineConfig;

/// Windows and thresholds the waterfall evaluates against.
#[derive(Debug, Clone, Copy)]
pub struct BannerRules {
    pub limit_hit_window: Duration,
    pub trial_ending_days: i64,
    pub trial_progress_days: i64,
    pub welcome_days: i64,
    pub engagement: EngagementThresholds,
}

impl BannerRules {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            limit_hit_window: Duration::seconds(cfg.limit_hit_window_secs as i64),
            trial_ending_days: cfg.trial_ending_days,
            trial_progress_days: cfg.trial_progress_days,
            welcome_days: cfg.welcome_days,
            engagement: cfg.engagement_thresholds(),
        }
    }
}

impl Default for BannerRules {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Everything one evaluation looks at.
pub struct BannerContext<'a> {
    pub snapshot: &'a EntitlementSnapshot,
    pub recent_hits: &'a [LimitHitEvent],
    pub engagement: &'a EngagementMetrics,
    pub rules: &'a BannerRules,
    pub now: DateTime<Utc>,
}

type Rule = fn(&BannerContext<'_>) -> Option<BannerDecision>;

/// Evaluated top to bottom; the first rule that yields a decision wins.
const WATERFALL: [(&str, Rule); 6] = [
    ("recent_limit_hit", recent_limit_hit),
    ("trial_ending", trial_ending),
    ("value_demonstrated", value_demonstrated),
    ("free_single_project", free_single_project),
    ("free_general", free_general),
    ("trial_general", trial_general),
];

/// Picks the single banner to show, ignoring dismissals. Pro never sees one.
pub fn decide_banner(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    if ctx.snapshot.tier == PlanTier::Pro {
        return None;
    }
    WATERFALL.iter().find_map(|(name, rule)| {
        let decision = rule(ctx)?;
        debug!(rule = *name, banner = %decision.kind, "Banner rule matched");
        Some(decision)
    })
}

/// Every rule that would match, in waterfall order. For diagnostics only.
pub fn applicable_banners(ctx: &BannerContext<'_>) -> Vec<BannerDecision> {
    if ctx.snapshot.tier == PlanTier::Pro {
        return Vec::new();
    }
    WATERFALL.iter().filter_map(|(_, rule)| rule(ctx)).collect()
}

/// Applies dismissal suppression after the waterfall has chosen.
pub fn visible_banner(
    decision: Option<BannerDecision>,
    dismissals: &DismissalCache,
) -> Option<BannerDecision> {
    let decision = decision?;
    if decision.dismissible && dismissals.is_dismissed(decision.kind) {
        debug!(banner = %decision.kind, "Banner suppressed by dismissal");
        return None;
    }
    Some(decision)
}

fn intent(snapshot: &EntitlementSnapshot) -> UpgradeIntent {
    if snapshot.tier == PlanTier::Free && !snapshot.has_used_trial_before {
        UpgradeIntent::StartTrial
    } else {
        UpgradeIntent::UpgradeToPro
    }
}

fn build(
    ctx: &BannerContext<'_>,
    kind: BannerKind,
    priority: BannerPriority,
    message: String,
    dismissible: bool,
    urgent: bool,
) -> BannerDecision {
    let cta = intent(ctx.snapshot);
    BannerDecision {
        kind,
        priority,
        message,
        cta_label: messages::cta_label(cta).to_string(),
        cta,
        dismissible,
        urgent,
    }
}

fn recent_limit_hit(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    let latest = ctx
        .recent_hits
        .iter()
        .filter(|hit| ctx.now - hit.occurred_at <= ctx.rules.limit_hit_window)
        .max_by_key(|hit| hit.occurred_at)?;
    Some(build(
        ctx,
        BannerKind::LimitReached,
        BannerPriority::High,
        messages::limit_reached(latest.kind, &latest.message),
        false,
        false,
    ))
}

fn trial_days(ctx: &BannerContext<'_>) -> Option<Option<i64>> {
    if ctx.snapshot.tier != PlanTier::Trial {
        return None;
    }
    Some(ctx.snapshot.trial.days_remaining(ctx.now))
}

fn trial_ending(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    let days = trial_days(ctx)??;
    if days > 0 && days <= ctx.rules.trial_ending_days {
        return Some(trial_critical(ctx, days));
    }
    None
}

fn trial_critical(ctx: &BannerContext<'_>, days: i64) -> BannerDecision {
    build(
        ctx,
        BannerKind::TrialEndingCritical,
        BannerPriority::High,
        messages::trial_ending(days),
        false,
        true,
    )
}

fn value_demonstrated(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    let t = &ctx.rules.engagement;
    if !(ctx.engagement.is_engaged(t) && ctx.engagement.has_experienced_value(t)) {
        return None;
    }
    Some(build(
        ctx,
        BannerKind::ValueDemonstration,
        BannerPriority::Medium,
        messages::value_demonstration(),
        true,
        false,
    ))
}

fn free_single_project(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    if ctx.snapshot.tier != PlanTier::Free {
        return None;
    }
    let projects = ctx.snapshot.metric(UsageKind::Projects)?;
    if projects.used != 1 {
        return None;
    }
    Some(build(
        ctx,
        BannerKind::ProjectLimitApproaching,
        BannerPriority::Medium,
        messages::project_limit_approaching(projects.limit),
        true,
        false,
    ))
}

fn free_general(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    if ctx.snapshot.tier != PlanTier::Free {
        return None;
    }
    let days = TrialClock::days_since(ctx.snapshot.registered_at, ctx.now);
    let decision = if days <= ctx.rules.welcome_days {
        build(
            ctx,
            BannerKind::WelcomeFree,
            BannerPriority::Low,
            messages::welcome_free(),
            true,
            false,
        )
    } else {
        build(
            ctx,
            BannerKind::FreeValueProposition,
            BannerPriority::Medium,
            messages::free_value_proposition(),
            true,
            false,
        )
    };
    Some(decision)
}

fn trial_general(ctx: &BannerContext<'_>) -> Option<BannerDecision> {
    let Some(days) = trial_days(ctx)? else {
        return Some(build(
            ctx,
            BannerKind::TrialProgress,
            BannerPriority::Low,
            messages::trial_progress_open_ended(),
            true,
            false,
        ));
    };
    let rules = ctx.rules;
    if days > rules.trial_progress_days {
        Some(build(
            ctx,
            BannerKind::TrialProgress,
            BannerPriority::Low,
            messages::trial_progress(days),
            true,
            false,
        ))
    } else if days > rules.trial_ending_days {
        Some(build(
            ctx,
            BannerKind::TrialValueDemonstration,
            BannerPriority::Medium,
            messages::trial_value(days),
            false,
            false,
        ))
    } else if days > 0 {
        Some(trial_critical(ctx, days))
    } else {
        None
    }
}
