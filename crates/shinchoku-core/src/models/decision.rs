use std::fmt;

use serde::{Deserialize, Serialize};
use shinchoku_api::ListStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionAction {
    Write,
    Skip,
    Error,
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    AddedToList,
    NotOnList,
    RewatchStarted,
    RewatchTrackingDisabled,
    NotNewer { episode: u32, progress: u32 },
    Completed,
    ProgressUpdated,
    /// Planned entries only start when adding entries is enabled.
    PlanningNotStarted,
    StatusNotTracked(ListStatus),
    EpisodeOutOfRange { episode: u32, last: u32 },
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddedToList => f.write_str("added to list"),
            Self::NotOnList => f.write_str("not on list"),
            Self::RewatchStarted => f.write_str("rewatch started"),
            Self::RewatchTrackingDisabled => f.write_str("rewatch progress tracking is disabled"),
            Self::NotNewer { episode, progress } => {
                write!(f, "episode {episode} is not newer than progress {progress}")
            }
            Self::Completed => f.write_str("last episode watched"),
            Self::ProgressUpdated => f.write_str("progress updated"),
            Self::PlanningNotStarted => f.write_str("entry is planned and adding entries is disabled"),
            Self::StatusNotTracked(status) => write!(f, "entry status is {status}"),
            Self::EpisodeOutOfRange { episode, last } => {
                write!(f, "episode {episode} is past the last episode ({last})")
            }
        }
    }
}

/// Outcome of the update rules for one played episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDecision {
    pub action: DecisionAction,
    /// Status to send with the write. `None` leaves it unchanged.
    pub new_status: Option<ListStatus>,
    pub new_progress: Option<u32>,
    pub reason: DecisionReason,
}

impl UpdateDecision {
    pub fn write(status: Option<ListStatus>, progress: u32, reason: DecisionReason) -> Self {
        Self {
            action: DecisionAction::Write,
            new_status: status,
            new_progress: Some(progress),
            reason,
        }
    }

    pub fn skip(reason: DecisionReason) -> Self {
        Self {
            action: DecisionAction::Skip,
            new_status: None,
            new_progress: None,
            reason,
        }
    }

    pub fn error(reason: DecisionReason) -> Self {
        Self {
            action: DecisionAction::Error,
            new_status: None,
            new_progress: None,
            reason,
        }
    }
}
