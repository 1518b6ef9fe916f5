//! Discrete player commands for queue-driven input adapters.
use serde::{Deserialize, Serialize};

use crate::city::{LineId, StationId, TrainId};
use crate::economy::{Resources, RewardKind};
use crate::error::CommandError;
use crate::events::SessionEvent;
use crate::network::ConnectOutcome;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Connect {
        from: StationId,
        to: StationId,
        line: LineId,
    },
    AddLine,
    AddTrain { line: Option<LineId> },
    AddCarriage { train: TrainId },
    SelectReward { reward: RewardKind },
    Pause,
    Resume,
    TogglePause,
    Restart,
}

/// Successful result of [`Session::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Connected(ConnectOutcome),
    LineAdded(LineId),
    TrainAdded(TrainId),
    /// New total capacity of the train.
    CarriageAdded(u32),
    RewardApplied(Resources),
    /// Whether the pause state actually changed.
    PauseChanged(bool),
    Restarted,
}

impl Session {
    /// Run one command. Rejections are returned and also queued as
    /// [`SessionEvent::Rejected`] so a fire-and-forget adapter can surface them.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] raised by the underlying operation.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        let result = match command {
            Command::Connect { from, to, line } => {
                self.connect(from, to, line).map(CommandOutcome::Connected)
            }
            Command::AddLine => self.add_line().map(CommandOutcome::LineAdded),
            Command::AddTrain { line } => self.add_train(line).map(CommandOutcome::TrainAdded),
            Command::AddCarriage { train } => {
                self.add_carriage(train).map(CommandOutcome::CarriageAdded)
            }
            Command::SelectReward { reward } => self
                .select_weekly_reward(reward)
                .map(CommandOutcome::RewardApplied),
            Command::Pause => Ok(CommandOutcome::PauseChanged(self.pause())),
            Command::Resume => Ok(CommandOutcome::PauseChanged(self.resume())),
            Command::TogglePause => Ok(CommandOutcome::PauseChanged(self.toggle_pause())),
            Command::Restart => {
                self.restart();
                Ok(CommandOutcome::Restarted)
            }
        };
        if let Err(err) = &result {
            self.events.push(SessionEvent::Rejected {
                message: err.to_string(),
            });
        }
        result
    }

    /// Run commands in order, collecting each result.
    pub fn apply_all(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Vec<Result<CommandOutcome, CommandError>> {
        commands.into_iter().map(|command| self.apply(command)).collect()
    }
}
