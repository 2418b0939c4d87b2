//! Upgrade and limit banner selection.

pub mod engagement;
pub mod engine;
pub mod messages;

pub use engagement::{EngagementMetrics, EngagementThresholds};
pub use engine::{BannerContext, BannerRules, applicable_banners, decide_banner, visible_banner};
