use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entitlement::clock::TrialClock;

/// Sentinel limit for metrics without a quota.
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Trial,
    Pro,
    Expired,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "Free"),
            PlanTier::Trial => write!(f, "Trial"),
            PlanTier::Pro => write!(f, "Pro"),
            PlanTier::Expired => write!(f, "Expired"),
            PlanTier::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "trial" => Ok(PlanTier::Trial),
            "pro" => Ok(PlanTier::Pro),
            "expired" => Ok(PlanTier::Expired),
            "cancelled" | "canceled" => Ok(PlanTier::Cancelled),
            other => Err(format!("unknown plan tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Projects,
    Analyses,
    OpinionsPerProject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageMetric {
    pub kind: UsageKind,
    pub used: u64,
    /// `UNLIMITED` (-1) when the tier has no quota for this metric.
    pub limit: i64,
    /// 0..=100, fixed at 0 when unlimited.
    pub percentage: f64,
}

impl UsageMetric {
    pub fn new(kind: UsageKind, used: u64, limit: i64) -> Self {
        let percentage = if limit > 0 {
            (used as f64 / limit as f64).min(1.0) * 100.0
        } else {
            0.0
        };
        Self {
            kind,
            used,
            limit,
            percentage,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit < 0
    }

    /// Units left before the quota is hit; `None` when unlimited.
    pub fn remaining(&self) -> Option<u64> {
        if self.is_unlimited() {
            return None;
        }
        Some((self.limit as u64).saturating_sub(self.used))
    }

    pub fn is_at_limit(&self) -> bool {
        self.remaining() == Some(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialWindow {
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl TrialWindow {
    /// Whole days left, rounded up and floored at zero. `None` without an end date.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.ends_at.map(|end| TrialClock::days_remaining(end, now))
    }
}

/// Derived view of what an account may do right now. Never stored.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementSnapshot {
    /// Tier as recorded on the account.
    pub tier: PlanTier,
    /// Tier whose quotas apply; an expired trial falls back to Free.
    pub effective_tier: PlanTier,
    pub usage: BTreeMap<UsageKind, UsageMetric>,
    pub trial: TrialWindow,
    pub has_used_trial_before: bool,
    pub cancellation_scheduled: bool,
    pub cancellation_effective_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    pub computed_at: DateTime<Utc>,
}

impl EntitlementSnapshot {
    pub fn metric(&self, kind: UsageKind) -> Option<&UsageMetric> {
        self.usage.get(&kind)
    }

    pub fn trial_days_remaining(&self) -> Option<i64> {
        self.trial.days_remaining(self.computed_at)
    }

    pub fn days_since_registration(&self) -> i64 {
        TrialClock::days_since(self.registered_at, self.computed_at)
    }

    pub fn is_trial_expired(&self) -> bool {
        self.tier == PlanTier::Trial && self.trial_days_remaining() == Some(0)
    }

    pub fn can_create_project(&self) -> bool {
        !self.is_exhausted(UsageKind::Projects)
    }

    pub fn can_run_analysis(&self) -> bool {
        !self.is_exhausted(UsageKind::Analyses)
    }

    /// Whether one more opinion fits in a project already holding `project_opinions`.
    pub fn can_add_opinion(&self, project_opinions: u64) -> bool {
        match self.metric(UsageKind::OpinionsPerProject) {
            Some(m) if !m.is_unlimited() => project_opinions < m.limit as u64,
            _ => true,
        }
    }

    fn is_exhausted(&self, kind: UsageKind) -> bool {
        self.metric(kind).is_some_and(UsageMetric::is_at_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_capped_at_100() {
        let m = UsageMetric::new(UsageKind::Projects, 5, 2);
        assert_eq!(m.percentage, 100.0);
        assert_eq!(m.remaining(), Some(0));
    }

    #[test]
    fn percentage_is_zero_when_unlimited() {
        let m = UsageMetric::new(UsageKind::Analyses, 40, UNLIMITED);
        assert_eq!(m.percentage, 0.0);
        assert!(m.is_unlimited());
        assert_eq!(m.remaining(), None);
        assert!(!m.is_at_limit());
    }

    #[test]
    fn partial_usage_percentage() {
        let m = UsageMetric::new(UsageKind::Analyses, 1, 4);
        assert_eq!(m.percentage, 25.0);
    }

    #[test]
    fn tier_parses_both_cancel_spellings() {
        assert_eq!("canceled".parse::<PlanTier>(), Ok(PlanTier::Cancelled));
        assert_eq!("Cancelled".parse::<PlanTier>(), Ok(PlanTier::Cancelled));
        assert!("gold".parse::<PlanTier>().is_err());
    }
}
