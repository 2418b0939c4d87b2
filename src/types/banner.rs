use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    LimitReached,
    TrialEnding,
    ValueDemonstration,
    ProjectLimitApproaching,
    WelcomeFree,
    FreeValueProposition,
    TrialProgress,
    TrialValueDemonstration,
    TrialEndingCritical,
}

impl BannerKind {
    pub const ALL: [BannerKind; 9] = [
        BannerKind::LimitReached,
        BannerKind::TrialEnding,
        BannerKind::ValueDemonstration,
        BannerKind::ProjectLimitApproaching,
        BannerKind::WelcomeFree,
        BannerKind::FreeValueProposition,
        BannerKind::TrialProgress,
        BannerKind::TrialValueDemonstration,
        BannerKind::TrialEndingCritical,
    ];

    /// Key used for dismissal records.
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerKind::LimitReached => "limit_reached",
            BannerKind::TrialEnding => "trial_ending",
            BannerKind::ValueDemonstration => "value_demonstration",
            BannerKind::ProjectLimitApproaching => "project_limit_approaching",
            BannerKind::WelcomeFree => "welcome_free",
            BannerKind::FreeValueProposition => "free_value_proposition",
            BannerKind::TrialProgress => "trial_progress",
            BannerKind::TrialValueDemonstration => "trial_value_demonstration",
            BannerKind::TrialEndingCritical => "trial_ending_critical",
        }
    }
}

impl fmt::Display for BannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BannerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BannerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown banner kind: {}", s))
    }
}

/// Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerPriority {
    Low,
    Medium,
    High,
}

/// What the CTA leads to; checkout itself happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeIntent {
    StartTrial,
    UpgradeToPro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerDecision {
    pub kind: BannerKind,
    pub priority: BannerPriority,
    pub message: String,
    pub cta_label: String,
    pub cta: UpgradeIntent,
    pub dismissible: bool,
    pub urgent: bool,
}
