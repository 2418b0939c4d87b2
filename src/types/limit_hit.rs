use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    ProjectLimit,
    AnalysisLimit,
    OpinionLimit,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::ProjectLimit => write!(f, "project_limit"),
            LimitKind::AnalysisLimit => write!(f, "analysis_limit"),
            LimitKind::OpinionLimit => write!(f, "opinion_limit"),
        }
    }
}

/// A rejected write that the backend classified as quota-exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitHitEvent {
    pub kind: LimitKind,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_usage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub message: String,
}

/// HTTP error as handed over by the API client: status plus raw body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: u16,
    pub body: String,
}

impl ApiErrorResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
