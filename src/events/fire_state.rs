use crate::types::SessionStatus;

/// Edge detector for one job: fires on each transition into Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FireState {
    #[default]
    NotFired,
    Fired,
}

impl FireState {
    /// Feeds one observed status; returns true when completion should fire.
    pub fn observe(&mut self, status: SessionStatus) -> bool {
        match (status, *self) {
            (SessionStatus::Completed, FireState::NotFired) => {
                *self = FireState::Fired;
                true
            }
            (SessionStatus::Completed, FireState::Fired) => false,
            _ => {
                *self = FireState::NotFired;
                false
            }
        }
    }
}
