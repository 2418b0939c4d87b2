pub mod config;
pub mod constants;
pub mod error;
pub mod logs_fmt;

use crate::utils::constants::SESSION_KEY_PREFIX;

/// Stable key (and channel) of an analysis session record in the remote store.
pub fn session_key(job_id: &str) -> String {
    format!("{}:{}", SESSION_KEY_PREFIX, job_id)
}
