//! Resource pool, construction costs, weekly rewards and the simulated clock.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TimingConfig;
use crate::constants::{HOURS_PER_DAY, MINUTES_PER_HOUR};
use crate::error::CommandError;
use crate::numbers::u64_to_f64;

/// Construction stock available to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub locomotives: u32,
    pub carriages: u32,
    pub lines: u32,
}

/// Stock consumed by a single construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cost {
    pub locomotives: u32,
    pub carriages: u32,
    pub lines: u32,
}

impl Cost {
    #[must_use]
    pub const fn train(carriages: u32) -> Self {
        Self {
            locomotives: 1,
            carriages,
            lines: 0,
        }
    }

    #[must_use]
    pub const fn carriage() -> Self {
        Self {
            locomotives: 0,
            carriages: 1,
            lines: 0,
        }
    }

    #[must_use]
    pub const fn line() -> Self {
        Self {
            locomotives: 0,
            carriages: 0,
            lines: 1,
        }
    }

    /// Zero-cost construction used when costs are waived.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            locomotives: 0,
            carriages: 0,
            lines: 0,
        }
    }
}

impl Resources {
    /// Check that the pool covers `cost`, naming the first missing resource.
    ///
    /// # Errors
    ///
    /// Returns the resource-exhaustion rejection for the first short resource.
    pub fn check(&self, cost: Cost) -> Result<(), CommandError> {
        if self.locomotives < cost.locomotives {
            return Err(CommandError::NoLocomotives);
        }
        if self.carriages < cost.carriages {
            return Err(CommandError::NoCarriages);
        }
        if self.lines < cost.lines {
            return Err(CommandError::NoLinesAvailable);
        }
        Ok(())
    }

    /// Deduct `cost`, leaving the pool untouched when it cannot be covered.
    ///
    /// # Errors
    ///
    /// Same as [`Resources::check`].
    pub fn spend(&mut self, cost: Cost) -> Result<(), CommandError> {
        self.check(cost)?;
        self.locomotives -= cost.locomotives;
        self.carriages -= cost.carriages;
        self.lines -= cost.lines;
        Ok(())
    }

    /// Add a weekly reward to the pool.
    pub fn grant(&mut self, reward: RewardKind) {
        let bundle = reward.bundle();
        self.locomotives = self.locomotives.saturating_add(bundle.locomotives);
        self.carriages = self.carriages.saturating_add(bundle.carriages);
        self.lines = self.lines.saturating_add(bundle.lines);
    }
}

/// Weekly reward options offered while the session is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// One locomotive shipped with two carriages.
    Locomotive,
    /// Three loose carriages.
    Carriages,
    /// One additional line slot.
    Line,
}

impl RewardKind {
    pub const ALL: [Self; 3] = [Self::Locomotive, Self::Carriages, Self::Line];

    /// Resources granted by this reward.
    #[must_use]
    pub const fn bundle(self) -> Resources {
        match self {
            Self::Locomotive => Resources {
                locomotives: 1,
                carriages: 2,
                lines: 0,
            },
            Self::Carriages => Resources {
                locomotives: 0,
                carriages: 3,
                lines: 0,
            },
            Self::Line => Resources {
                locomotives: 0,
                carriages: 0,
                lines: 1,
            },
        }
    }

    /// Notification text shown after the reward lands.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locomotive => "New Locomotive (+2 Carriages)",
            Self::Carriages => "3 New Carriages",
            Self::Line => "New Line",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Simulated clock counted in whole ticks so week boundaries never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameClock {
    ticks: u64,
    last_reward_tick: u64,
}

impl GameClock {
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick. Returns true when a week has elapsed since the last reward.
    pub fn advance(&mut self, timing: &TimingConfig) -> bool {
        self.ticks += 1;
        let week = timing.ticks_per_week();
        if week > 0 && self.ticks - self.last_reward_tick >= week {
            self.last_reward_tick = self.ticks;
            return true;
        }
        false
    }

    /// Elapsed simulated seconds.
    #[must_use]
    pub fn elapsed_secs(&self, timing: &TimingConfig) -> f64 {
        u64_to_f64(self.ticks) / f64::from(timing.ticks_per_second.max(1))
    }

    /// Whole simulated days since the session began.
    #[must_use]
    pub fn days_elapsed(&self, timing: &TimingConfig) -> u64 {
        self.ticks / timing.ticks_per_day().max(1)
    }

    /// Calendar breakdown for display.
    #[must_use]
    pub fn calendar(&self, timing: &TimingConfig) -> Calendar {
        let ticks_per_day = timing.ticks_per_day().max(1);
        let days = self.ticks / ticks_per_day;
        let days_per_week = u64::from(timing.days_per_week.max(1));
        let into_day = self.ticks % ticks_per_day;
        let minutes_per_day = u64::from(HOURS_PER_DAY * MINUTES_PER_HOUR);
        let minute_of_day = u64::try_from(
            u128::from(into_day) * u128::from(minutes_per_day) / u128::from(ticks_per_day),
        )
        .unwrap_or(0);
        let minutes_per_hour = u64::from(MINUTES_PER_HOUR);
        Calendar {
            week: days / days_per_week + 1,
            day: days % days_per_week + 1,
            hour: u32::try_from(minute_of_day / minutes_per_hour).unwrap_or(0),
            minute: u32::try_from(minute_of_day % minutes_per_hour).unwrap_or(0),
        }
    }
}

/// One-based week/day plus wall-style time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub week: u64,
    pub day: u64,
    pub hour: u32,
    pub minute: u32,
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Week {}, Day {} - {:02}:{:02}",
            self.week, self.day, self.hour, self.minute
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_is_all_or_nothing() {
        let mut pool = Resources {
            locomotives: 1,
            carriages: 1,
            lines: 0,
        };
        assert_eq!(pool.spend(Cost::train(2)), Err(CommandError::NoCarriages));
        assert_eq!(pool.locomotives, 1);
        assert_eq!(pool.carriages, 1);
        assert_eq!(pool.spend(Cost::line()), Err(CommandError::NoLinesAvailable));
        assert_eq!(pool.spend(Cost::carriage()), Ok(()));
        assert_eq!(pool.carriages, 0);
        assert_eq!(pool.spend(Cost::free()), Ok(()));
    }

    #[test]
    fn rewards_grant_expected_bundles() {
        let mut pool = Resources::default();
        pool.grant(RewardKind::Locomotive);
        pool.grant(RewardKind::Carriages);
        pool.grant(RewardKind::Line);
        assert_eq!(
            pool,
            Resources {
                locomotives: 1,
                carriages: 5,
                lines: 1
            }
        );
    }

    #[test]
    fn clock_fires_once_per_week() {
        let timing = TimingConfig::default();
        let mut clock = GameClock::default();
        let mut fired = 0;
        for _ in 0..timing.ticks_per_week() {
            if clock.advance(&timing) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(clock.days_elapsed(&timing), 7);
        for _ in 0..timing.ticks_per_week() - 1 {
            assert!(!clock.advance(&timing));
        }
        assert!(clock.advance(&timing));
    }

    #[test]
    fn calendar_formats_like_the_hud() {
        let timing = TimingConfig::default();
        let mut clock = GameClock::default();
        assert_eq!(clock.calendar(&timing).to_string(), "Week 1, Day 1 - 00:00");
        // 1.5 simulated seconds = 01:30 on the first day.
        for _ in 0..90 {
            clock.advance(&timing);
        }
        assert_eq!(clock.calendar(&timing).to_string(), "Week 1, Day 1 - 01:30");
        for _ in 0..(timing.ticks_per_day() * 8 - 90) {
            clock.advance(&timing);
        }
        assert_eq!(clock.calendar(&timing).to_string(), "Week 2, Day 2 - 00:00");
        assert!((clock.elapsed_secs(&timing) - 192.0).abs() < 1e-9);
    }
}
