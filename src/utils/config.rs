use serde::Deserialize;

use crate::banner::engagement::EngagementThresholds;
use crate::utils::error::PlangateError;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How long a dismissed banner stays hidden (seconds)
    #[serde(default = "default_dismissal_ttl_secs")]
    pub dismissal_ttl_secs: u64,

    /// A limit hit older than this no longer drives the LimitReached banner (seconds)
    #[serde(default = "default_limit_hit_window_secs")]
    pub limit_hit_window_secs: u64,

    /// Remaining trial days at or below which the trial banner turns critical
    #[serde(default = "default_trial_ending_days")]
    pub trial_ending_days: i64,

    /// Remaining trial days above which only the low-priority progress banner shows
    #[serde(default = "default_trial_progress_days")]
    pub trial_progress_days: i64,

    /// Days after registration during which free users get the welcome banner
    #[serde(default = "default_welcome_days")]
    pub welcome_days: i64,

    #[serde(default = "default_engaged_min_projects")]
    pub engaged_min_projects: u32,

    #[serde(default = "default_engaged_min_analyses")]
    pub engaged_min_analyses: u32,

    #[serde(default = "default_engaged_min_completed")]
    pub engaged_min_completed: u32,

    #[serde(default = "default_value_min_analyses")]
    pub value_min_analyses: u32,

    #[serde(default = "default_value_min_completed")]
    pub value_min_completed: u32,

    /// Remote store for analysis session records; `job` commands need it
    pub redis_url: Option<String>,

    /// Directory backing the persistent local cache
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Delay before re-subscribing after a feed failure (milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl EngineConfig {
    pub fn load() -> Result<Self, PlangateError> {
        dotenvy::dotenv().ok();

        let cfg: EngineConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("PLANGATE"))
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PlangateError> {
        if self.dismissal_ttl_secs == 0 {
            return Err(PlangateError::ConfigError(
                "dismissal_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.limit_hit_window_secs == 0 {
            return Err(PlangateError::ConfigError(
                "limit_hit_window_secs must be greater than zero".to_string(),
            ));
        }
        if self.trial_ending_days <= 0 || self.trial_ending_days >= self.trial_progress_days {
            return Err(PlangateError::ConfigError(format!(
                "trial_ending_days ({}) must be positive and below trial_progress_days ({})",
                self.trial_ending_days, self.trial_progress_days
            )));
        }
        Ok(())
    }

    pub fn engagement_thresholds(&self) -> EngagementThresholds {
        EngagementThresholds {
            engaged_min_projects: self.engaged_min_projects,
            engaged_min_analyses: self.engaged_min_analyses,
            engaged_min_completed: self.engaged_min_completed,
            value_min_analyses: self.value_min_analyses,
            value_min_completed: self.value_min_completed,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dismissal_ttl_secs: default_dismissal_ttl_secs(),
            limit_hit_window_secs: default_limit_hit_window_secs(),
            trial_ending_days: default_trial_ending_days(),
            trial_progress_days: default_trial_progress_days(),
            welcome_days: default_welcome_days(),
            engaged_min_projects: default_engaged_min_projects(),
            engaged_min_analyses: default_engaged_min_analyses(),
            engaged_min_completed: default_engaged_min_completed(),
            value_min_analyses: default_value_min_analyses(),
            value_min_completed: default_value_min_completed(),
            redis_url: None,
            state_dir: default_state_dir(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_dismissal_ttl_secs() -> u64 {
    24 * 60 * 60
}
fn default_limit_hit_window_secs() -> u64 {
    5 * 60
}
fn default_trial_ending_days() -> i64 {
    3
}
fn default_trial_progress_days() -> i64 {
    7
}
fn default_welcome_days() -> i64 {
    2
}
fn default_engaged_min_projects() -> u32 {
    2
}
fn default_engaged_min_analyses() -> u32 {
    3
}
fn default_engaged_min_completed() -> u32 {
    1
}
fn default_value_min_analyses() -> u32 {
    2
}
fn default_value_min_completed() -> u32 {
    1
}
fn default_state_dir() -> String {
    ".plangate".to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_trial_thresholds() {
        let cfg = EngineConfig {
            trial_ending_days: 7,
            trial_progress_days: 3,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PlangateError::ConfigError(_))));
    }

    #[test]
    fn rejects_zero_dismissal_ttl() {
        let cfg = EngineConfig {
            dismissal_ttl_secs: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
