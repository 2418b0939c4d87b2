use serde::{Deserialize, Serialize};

/// Activity counters feeding the value-demonstration rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    #[serde(default)]
    pub project_count: u32,
    #[serde(default)]
    pub analysis_count: u32,
    #[serde(default)]
    pub completed_project_count: u32,
}

/// Tunable product heuristics; defaults are 2/3/1 for engaged, 2/1 for value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementThresholds {
    pub engaged_min_projects: u32,
    pub engaged_min_analyses: u32,
    pub engaged_min_completed: u32,
    pub value_min_analyses: u32,
    pub value_min_completed: u32,
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self {
            engaged_min_projects: 2,
            engaged_min_analyses: 3,
            engaged_min_completed: 1,
            value_min_analyses: 2,
            value_min_completed: 1,
        }
    }
}

impl EngagementMetrics {
    pub fn is_engaged(&self, t: &EngagementThresholds) -> bool {
        self.project_count >= t.engaged_min_projects
            || self.analysis_count >= t.engaged_min_analyses
            || self.completed_project_count >= t.engaged_min_completed
    }

    pub fn has_experienced_value(&self, t: &EngagementThresholds) -> bool {
        self.analysis_count >= t.value_min_analyses
            && self.completed_project_count >= t.value_min_completed
    }
}
