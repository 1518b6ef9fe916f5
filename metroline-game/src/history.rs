//! Fixed-capacity trail of a train's recent poses, newest first.
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Position plus heading at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub angle: f64,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Point, angle: f64) -> Self {
        Self { position, angle }
    }
}

/// Ring buffer of poses. Index 0 is always the most recent sample; once full,
/// each push overwrites the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseHistory {
    slots: Vec<Pose>,
    capacity: usize,
    /// Slot holding the newest sample.
    head: usize,
    len: usize,
}

impl PoseHistory {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
            len: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record a new newest sample.
    pub fn push(&mut self, pose: Pose) {
        if self.slots.len() < self.capacity {
            self.slots.push(pose);
            self.head = self.slots.len() - 1;
        } else {
            self.head = (self.head + 1) % self.capacity;
            self.slots[self.head] = pose;
        }
        self.len = self.slots.len();
    }

    /// Sample `lookback` ticks ago; 0 is the newest.
    #[must_use]
    pub fn get(&self, lookback: usize) -> Option<Pose> {
        if lookback >= self.len {
            return None;
        }
        let slot = (self.head + self.capacity - lookback) % self.capacity;
        self.slots.get(slot).copied()
    }

    /// Sample at `lookback`, clamped to the oldest available sample.
    #[must_use]
    pub fn get_clamped(&self, lookback: usize) -> Option<Pose> {
        if self.len == 0 {
            return None;
        }
        self.get(lookback.min(self.len - 1))
    }

    #[must_use]
    pub fn latest(&self) -> Option<Pose> {
        self.get(0)
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Pose> + '_ {
        (0..self.len).filter_map(|lookback| self.get(lookback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f64) -> Pose {
        Pose::new(Point::new(x, 0.0), 0.0)
    }

    #[test]
    fn newest_first_before_and_after_wrap() {
        let mut history = PoseHistory::with_capacity(3);
        assert!(history.latest().is_none());
        history.push(pose(1.0));
        history.push(pose(2.0));
        assert_eq!(history.latest(), Some(pose(2.0)));
        assert_eq!(history.get(1), Some(pose(1.0)));
        assert_eq!(history.get(2), None);

        history.push(pose(3.0));
        history.push(pose(4.0));
        history.push(pose(5.0));
        assert_eq!(history.len(), 3);
        let xs: Vec<f64> = history.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn clamped_lookup_returns_oldest() {
        let mut history = PoseHistory::with_capacity(100);
        for x in 0..5 {
            history.push(pose(f64::from(x)));
        }
        assert_eq!(history.get_clamped(40), Some(pose(0.0)));
        assert_eq!(history.get_clamped(1), Some(pose(3.0)));
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut history = PoseHistory::with_capacity(10);
        for x in 0..1_000 {
            history.push(pose(f64::from(x)));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.latest(), Some(pose(999.0)));
        assert_eq!(history.get(9), Some(pose(990.0)));
    }
}
