//! Notifications the session queues for the presentation layer.
use serde::{Deserialize, Serialize};

use crate::city::{LineId, StationId, TrainId};
use crate::economy::RewardKind;
use crate::result::FinalStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    StationSpawned { station: StationId, label: String },
    LineBuilt { line: LineId, color: String },
    StationsConnected {
        line: LineId,
        from: StationId,
        to: StationId,
    },
    TrainBuilt { train: TrainId, line: LineId },
    CarriageAdded { train: TrainId, capacity: u32 },
    /// A station crossed the crowding warning level.
    CrowdingWarning { station: StationId, waiting: u32 },
    WeeklyRewardDue { week: u64, options: Vec<RewardKind> },
    RewardApplied { reward: RewardKind },
    Paused,
    Resumed,
    /// A command was refused; `message` is the player-facing text.
    Rejected { message: String },
    GameOver { stats: FinalStats },
}

impl SessionEvent {
    /// Short notification text for toasts and logs.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::StationSpawned { label, .. } => format!("New station {label} opened"),
            Self::LineBuilt { .. } => "New line created!".to_string(),
            Self::StationsConnected { from, to, .. } => {
                format!("Connected station {from} to station {to}")
            }
            Self::TrainBuilt { .. } => "New train added!".to_string(),
            Self::CarriageAdded { .. } => "Carriage added to train!".to_string(),
            Self::CrowdingWarning { waiting, .. } => {
                format!("A station is getting crowded ({waiting} waiting)")
            }
            Self::WeeklyRewardDue { week, .. } => format!("Week {week} complete! Choose a reward"),
            Self::RewardApplied { reward } => format!("Received: {reward}"),
            Self::Paused => "Game paused".to_string(),
            Self::Resumed => "Game resumed".to_string(),
            Self::Rejected { message } => message.clone(),
            Self::GameOver { stats } => format!("Game over: {stats}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let event = SessionEvent::RewardApplied {
            reward: RewardKind::Carriages,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "reward_applied");
        assert_eq!(json["reward"], "carriages");
        assert_eq!(event.message(), "Received: 3 New Carriages");
    }
}
