//! Pointer adapter translating press/drag/release into connect commands.
use crate::city::{LineId, StationId};
use crate::error::CommandError;
use crate::events::SessionEvent;
use crate::geometry::Point;
use crate::network::{ConnectOutcome, line_at, station_at};
use crate::session::Session;

/// In-progress drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging out of `from`; `cursor` is the last pointer position.
    Dragging { from: StationId, cursor: Point },
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Station(StationId),
    Line(LineId),
    Nothing,
}

impl Session {
    /// Press: start dragging from a station, or select the line under the
    /// pointer. Pressing empty space clears the selection.
    pub fn pointer_down(&mut self, point: Point) -> PointerTarget {
        if self.status.is_game_over() {
            return PointerTarget::Nothing;
        }
        let input = &self.config.input;
        if let Some(station) = station_at(&self.city.stations, point, input.station_hit_radius) {
            self.drag = DragState::Dragging {
                from: station,
                cursor: point,
            };
            return PointerTarget::Station(station);
        }
        self.selected_line = line_at(&self.city, point, input.line_hit_radius);
        self.selected_line
            .map_or(PointerTarget::Nothing, PointerTarget::Line)
    }

    /// Move: update the drag preview end point.
    pub const fn pointer_move(&mut self, point: Point) {
        if let DragState::Dragging { from, .. } = self.drag {
            self.drag = DragState::Dragging {
                from,
                cursor: point,
            };
        }
    }

    /// Release: connect the dragged-from station to the station under the
    /// pointer. The first empty line is used when one exists, otherwise the
    /// selected line, otherwise line 0.
    ///
    /// Returns `None` when the gesture did not end on another station.
    /// Rejections are also queued as [`SessionEvent::Rejected`].
    pub fn pointer_up(&mut self, point: Point) -> Option<Result<ConnectOutcome, CommandError>> {
        let DragState::Dragging { from, .. } = std::mem::take(&mut self.drag) else {
            return None;
        };
        let target = self
            .city
            .stations
            .iter()
            .filter(|s| s.id != from)
            .find(|s| s.position.distance(point) < self.config.input.station_hit_radius)
            .map(|s| s.id)?;
        let line = self.drop_target_line();
        let result = self.connect(from, target, line);
        if let Err(err) = &result {
            self.events.push(SessionEvent::Rejected {
                message: err.to_string(),
            });
        }
        Some(result)
    }

    fn drop_target_line(&self) -> LineId {
        self.city
            .lines
            .iter()
            .find(|line| line.is_empty())
            .map(|line| line.id)
            .or(self.selected_line)
            .unwrap_or(LineId(0))
    }

    /// Current drag gesture, if any.
    #[must_use]
    pub const fn drag(&self) -> DragState {
        self.drag
    }
}
