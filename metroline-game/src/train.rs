//! Train motion and passenger exchange.
//!
//! A train shuttles along its line's station path. While moving it
//! interpolates between two path indices; on arrival it parks for a fixed
//! number of ticks, exchanges passengers exactly once at the midpoint of the
//! stop, then departs toward the next index, reversing at either end.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::carriage::{Carriage, distribute_load, follow_leader};
use crate::city::{LineId, TrainId};
use crate::config::TrainConfig;
use crate::constants::LOG_TARGET_TRAINS;
use crate::geometry::{Point, angle_between};
use crate::history::{Pose, PoseHistory};
use crate::numbers::half_rounded_up;

/// Travel direction along a line's station path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// `+1` or `-1`, matching the path index delta.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// Neighbouring index in this direction, if it exists on a path of `len`.
    #[must_use]
    pub fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Self::Forward => index.checked_add(1).filter(|next| *next < len),
            Self::Backward => index.checked_sub(1),
        }
    }
}

/// Which end of the current segment a stopped train is parked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopEndpoint {
    /// Freshly placed at its starting station; nothing to advance past.
    Current,
    /// Arrived at the far end of the segment.
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainPhase {
    Moving,
    Stopped {
        at: StopEndpoint,
        remaining_ticks: u64,
        exchanged: bool,
    },
}

impl TrainPhase {
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped { .. })
    }
}

/// Passenger movement produced by one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExchangeOutcome {
    pub picked_up: u32,
    pub dropped_off: u32,
}

#[derive(Debug, Clone)]
pub struct Train {
    pub id: TrainId,
    pub line: LineId,
    /// Path index the current segment starts from.
    pub current: usize,
    /// Path index the current segment heads toward.
    pub next: usize,
    /// Segment progress in `[0, 1]`.
    pub progress: f64,
    pub direction: Direction,
    pub phase: TrainPhase,
    pub passengers: u32,
    pub locomotive_capacity: u32,
    pub position: Point,
    pub angle: f64,
    pub history: PoseHistory,
    pub carriages: Vec<Carriage>,
}

impl Train {
    /// Place a train parked at path index 0, about to run toward index 1.
    #[must_use]
    pub fn new(id: TrainId, line: LineId, start: Point, cfg: &TrainConfig, stop_ticks: u64) -> Self {
        let mut train = Self {
            id,
            line,
            current: 0,
            next: 1,
            progress: 0.0,
            direction: Direction::Forward,
            phase: TrainPhase::Stopped {
                at: StopEndpoint::Current,
                remaining_ticks: stop_ticks,
                exchanged: false,
            },
            passengers: 0,
            locomotive_capacity: cfg.locomotive_capacity,
            position: start,
            angle: 0.0,
            history: PoseHistory::with_capacity(cfg.history_capacity),
            carriages: Vec::new(),
        };
        train.history.push(train.pose());
        for _ in 0..cfg.carriages_per_train {
            train.attach_carriage(cfg);
        }
        train
    }

    /// Total seats across the locomotive and every carriage.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.carriages
            .iter()
            .fold(self.locomotive_capacity, |total, c| total.saturating_add(c.capacity))
    }

    #[must_use]
    pub fn free_seats(&self) -> u32 {
        self.capacity().saturating_sub(self.passengers)
    }

    #[must_use]
    pub const fn pose(&self) -> Pose {
        Pose::new(self.position, self.angle)
    }

    /// Couple one more carriage to the back of the consist.
    pub fn attach_carriage(&mut self, cfg: &TrainConfig) {
        let order = self.carriages.len();
        let carriage = Carriage::new(order, cfg.follow_step, cfg.carriage_capacity, self.pose());
        self.carriages.push(carriage);
        distribute_load(&mut self.carriages, self.locomotive_capacity, self.passengers);
    }

    /// Keep the train on the same physical stations after a station is
    /// inserted at the head of its line.
    pub const fn shift_for_prepend(&mut self) {
        self.current += 1;
        self.next += 1;
    }

    /// Path index of the station the train is parked at, if stopped.
    #[must_use]
    pub const fn stop_index(&self) -> Option<usize> {
        match self.phase {
            TrainPhase::Moving => None,
            TrainPhase::Stopped {
                at: StopEndpoint::Current,
                ..
            } => Some(self.current),
            TrainPhase::Stopped {
                at: StopEndpoint::Next,
                ..
            } => Some(self.next),
        }
    }

    /// Advance one tick along `path` (the station positions of the line).
    ///
    /// Returns the path index at which a passenger exchange is due this tick.
    /// Paths shorter than two stations leave the train untouched.
    pub fn advance(&mut self, path: &[Point], cfg: &TrainConfig, stop_ticks: u64) -> Option<usize> {
        if path.len() < 2 || self.current >= path.len() || self.next >= path.len() {
            return None;
        }

        let exchange_at = match self.phase {
            TrainPhase::Moving => {
                self.progress = (self.progress + cfg.speed).min(1.0);
                let from = path[self.current];
                let to = path[self.next];
                self.position = from.lerp(to, self.progress);
                self.angle = angle_between(from, to);
                if self.progress >= 1.0 {
                    self.phase = TrainPhase::Stopped {
                        at: StopEndpoint::Next,
                        remaining_ticks: stop_ticks,
                        exchanged: false,
                    };
                }
                None
            }
            TrainPhase::Stopped {
                at,
                remaining_ticks,
                exchanged,
            } => {
                let stop_index = if at == StopEndpoint::Next {
                    self.next
                } else {
                    self.current
                };
                let remaining = remaining_ticks.saturating_sub(1);
                let due = !exchanged && (remaining.saturating_mul(2) <= stop_ticks || remaining == 0);
                self.position = path[stop_index];
                if remaining == 0 {
                    self.depart(at, path.len());
                } else {
                    self.phase = TrainPhase::Stopped {
                        at,
                        remaining_ticks: remaining,
                        exchanged: exchanged || due,
                    };
                }
                due.then_some(stop_index)
            }
        };

        self.history.push(self.pose());
        follow_leader(
            &mut self.carriages,
            self.position,
            &self.history,
            cfg.speed,
            cfg.max_carriage_gap,
        );
        exchange_at
    }

    fn depart(&mut self, at: StopEndpoint, len: usize) {
        if at == StopEndpoint::Next {
            self.current = self.next;
            self.next = match self.direction.step(self.current, len) {
                Some(next) => next,
                None => {
                    self.direction = self.direction.reversed();
                    debug!(
                        target: LOG_TARGET_TRAINS,
                        "train {} reversed at path index {}", self.id, self.current
                    );
                    self.direction.step(self.current, len).unwrap_or(self.current)
                }
            };
        }
        self.progress = 0.0;
        self.phase = TrainPhase::Moving;
    }

    /// Board from a platform, then let a random share of riders off.
    ///
    /// Boarding is capped by free seats and `max_pickup`. Alighting removes
    /// between one and half the load (rounded up) whenever anyone is aboard.
    pub fn exchange<R: Rng + ?Sized>(
        &mut self,
        waiting: &mut u32,
        max_pickup: u32,
        rng: &mut R,
    ) -> ExchangeOutcome {
        let picked_up = (*waiting).min(self.free_seats()).min(max_pickup);
        *waiting -= picked_up;
        self.passengers += picked_up;

        let dropped_off = if self.passengers > 0 {
            rng.gen_range(1..=half_rounded_up(self.passengers))
        } else {
            0
        };
        self.passengers -= dropped_off;
        distribute_load(&mut self.carriages, self.locomotive_capacity, self.passengers);

        debug!(
            target: LOG_TARGET_TRAINS,
            "train {} exchange: +{picked_up} -{dropped_off} (load {}/{})",
            self.id,
            self.passengers,
            self.capacity()
        );
        ExchangeOutcome {
            picked_up,
            dropped_off,
        }
    }

    /// Riders seated on the locomotive itself.
    #[must_use]
    pub fn locomotive_load(&self) -> u32 {
        let in_carriages: u32 = self.carriages.iter().map(|c| c.passengers).sum();
        self.passengers.saturating_sub(in_carriages)
    }
}
