//! Recoverable command rejections.
//!
//! Each variant's `Display` text is the notification the presentation layer
//! shows the player. A rejected command never mutates the session.
use thiserror::Error;

use crate::city::{LineId, StationId, TrainId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No available locomotives! Wait for weekly rewards.")]
    NoLocomotives,
    #[error("No available carriages! Wait for weekly rewards.")]
    NoCarriages,
    #[error("No available lines! Wait for weekly rewards.")]
    NoLinesAvailable,
    #[error("Every line colour is already in use.")]
    LineLimitReached,
    #[error("No lines available!")]
    NoLines,
    #[error("This line needs at least 2 connected stations!")]
    LineTooShort { line: LineId },
    #[error("Stations can only be added at either end of a line.")]
    NotAnEndpoint { line: LineId },
    #[error("A station cannot be connected to itself.")]
    SameStation { station: StationId },
    #[error("Station {0} does not exist.")]
    UnknownStation(StationId),
    #[error("Line {0} does not exist.")]
    UnknownLine(LineId),
    #[error("Train {0} does not exist.")]
    UnknownTrain(TrainId),
    #[error("The game is over. Restart or return to the menu.")]
    GameOver,
    #[error("Choose a weekly reward to continue.")]
    RewardPending,
    #[error("No weekly reward is waiting to be claimed.")]
    NoRewardPending,
}

impl CommandError {
    /// True for rejections caused by an empty resource pool.
    #[must_use]
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::NoLocomotives | Self::NoCarriages | Self::NoLinesAvailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_player_facing() {
        assert_eq!(
            CommandError::LineTooShort { line: LineId(0) }.to_string(),
            "This line needs at least 2 connected stations!"
        );
        assert_eq!(
            CommandError::UnknownTrain(TrainId(4)).to_string(),
            "Train 4 does not exist."
        );
    }

    #[test]
    fn only_stock_shortages_count_as_exhaustion() {
        assert!(CommandError::NoCarriages.is_resource_exhaustion());
        assert!(!CommandError::NotAnEndpoint { line: LineId(1) }.is_resource_exhaustion());
        assert!(!CommandError::GameOver.is_resource_exhaustion());
    }
}
