/// Single blob in the local cache holding every banner dismissal.
pub const DISMISSALS_STORE_KEY: &str = "plangate.banner_dismissals";

/// Key and pub/sub channel prefix for analysis session records.
pub const SESSION_KEY_PREFIX: &str = "analysis_session";

/// Quota-exceeded error codes the backend attaches to 403 responses.
pub const PROJECT_LIMIT_CODE: &str = "PROJECT_LIMIT_EXCEEDED";
pub const ANALYSIS_LIMIT_CODE: &str = "ANALYSIS_LIMIT_EXCEEDED";
pub const OPINION_LIMIT_CODE: &str = "OPINION_LIMIT_EXCEEDED";

pub const QUOTA_EXCEEDED_STATUS: u16 = 403;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
