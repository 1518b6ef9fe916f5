//! Carriages trail their locomotive by replaying its pose history.
//!
//! A carriage never simulates motion of its own. Each tick it reads the
//! locomotive's trail at a lookback derived from its follow distance, then
//! is pulled in so it never sits farther than the maximum gap from the
//! vehicle ahead of it.
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::history::{Pose, PoseHistory};
use crate::numbers::{floor_ratio_to_usize, usize_to_f64};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carriage {
    /// Trail distance behind the locomotive, in segment-progress units.
    pub follow_distance: f64,
    pub capacity: u32,
    pub passengers: u32,
    /// Draw pose computed by the last follow pass.
    pub pose: Pose,
}

impl Carriage {
    /// Carriage at position `order` (0-based) in the consist.
    #[must_use]
    pub fn new(order: usize, follow_step: f64, capacity: u32, start: Pose) -> Self {
        Self {
            follow_distance: (usize_to_f64(order) + 1.0) * follow_step,
            capacity,
            passengers: 0,
            pose: start,
        }
    }
}

/// History lookback for a follow distance at the given train speed.
#[must_use]
pub fn lookback_for(follow_distance: f64, speed: f64) -> usize {
    floor_ratio_to_usize(follow_distance, speed)
}

/// Re-seat every carriage behind `leader` from the train's history.
pub fn follow_leader(
    carriages: &mut [Carriage],
    leader: Point,
    history: &PoseHistory,
    speed: f64,
    max_gap: f64,
) {
    let mut previous = leader;
    for carriage in carriages.iter_mut() {
        let lookback = lookback_for(carriage.follow_distance, speed);
        if let Some(sample) = history.get_clamped(lookback) {
            carriage.pose = sample;
        }
        if carriage.pose.position.distance(previous) > max_gap {
            // Hold the carriage at exactly the max gap, on the line toward its leader.
            carriage.pose.position = previous.step_toward(carriage.pose.position, max_gap);
        }
        previous = carriage.pose.position;
    }
}

/// Spread a train's load locomotive-first across its carriages.
///
/// Returns the passengers that fit on the locomotive itself.
pub fn distribute_load(carriages: &mut [Carriage], locomotive_capacity: u32, load: u32) -> u32 {
    let on_locomotive = load.min(locomotive_capacity);
    let mut remaining = load - on_locomotive;
    for carriage in carriages.iter_mut() {
        let seated = remaining.min(carriage.capacity);
        carriage.passengers = seated;
        remaining -= seated;
    }
    on_locomotive
}
