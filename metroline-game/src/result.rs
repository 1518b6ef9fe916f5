//! End-of-run statistics.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Figures reported when satisfaction collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalStats {
    /// Riders dropped off over the whole run.
    pub passengers_transported: u64,
    /// Riders generated but never dropped off (waiting or aboard).
    pub outstanding_passengers: u64,
    pub days_operated: u64,
    pub trains_built: u32,
}

impl fmt::Display for FinalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passengers transported over {} days with {} trains",
            self.passengers_transported, self.days_operated, self.trains_built
        )
    }
}
