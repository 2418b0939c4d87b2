pub mod account;
pub mod banner;
pub mod limit_hit;
pub mod plan;
pub mod session;

pub use account::{AccountRecord, ProjectAggregates};
pub use banner::{BannerDecision, BannerKind, BannerPriority, UpgradeIntent};
pub use limit_hit::{ApiErrorResponse, LimitHitEvent, LimitKind};
pub use plan::{EntitlementSnapshot, PlanTier, TrialWindow, UNLIMITED, UsageKind, UsageMetric};
pub use session::{AnalysisSessionState, SessionStatus};
