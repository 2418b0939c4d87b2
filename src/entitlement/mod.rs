//! Usage against plan quotas and trial timing.

pub mod calculator;
pub mod clock;
pub mod tier_config;

pub use calculator::{compute_entitlement, effective_tier};
pub use clock::{Clock, ManualClock, SystemClock, TrialClock};
