use serde::{Deserialize, Serialize};

use crate::types::{PlanTier, UNLIMITED, UsageKind};

/// Quota limits attached to a tier. `UNLIMITED` means no cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierQuotas {
    pub projects: i64,
    pub analyses: i64,
    pub opinions_per_project: i64,
}

pub const FREE_QUOTAS: TierQuotas = TierQuotas {
    projects: 2,
    analyses: 3,
    opinions_per_project: 100,
};

pub const TRIAL_QUOTAS: TierQuotas = TierQuotas {
    projects: 10,
    analyses: 30,
    opinions_per_project: 1000,
};

pub const PRO_QUOTAS: TierQuotas = TierQuotas {
    projects: UNLIMITED,
    analyses: UNLIMITED,
    opinions_per_project: UNLIMITED,
};

impl TierQuotas {
    /// | Tier | Projects | Analyses | Opinions/project |
    /// |------|----------|----------|------------------|
    /// | Free, Expired, Cancelled | 2 | 3 | 100 |
    /// | Trial | 10 | 30 | 1000 |
    /// | Pro | unlimited | unlimited | unlimited |
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Pro => PRO_QUOTAS,
            PlanTier::Trial => TRIAL_QUOTAS,
            PlanTier::Free | PlanTier::Expired | PlanTier::Cancelled => FREE_QUOTAS,
        }
    }

    pub fn limit(&self, kind: UsageKind) -> i64 {
        match kind {
            UsageKind::Projects => self.projects,
            UsageKind::Analyses => self.analyses,
            UsageKind::OpinionsPerProject => self.opinions_per_project,
        }
    }
}
