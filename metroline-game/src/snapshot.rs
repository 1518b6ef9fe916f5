//! Read-only frame snapshot for the presentation layer.
use serde::Serialize;

use crate::city::{LineId, StationId, StationShape, TrainId};
use crate::constants::DRAG_PREVIEW_FALLBACK_COLOR;
use crate::economy::Resources;
use crate::geometry::Point;
use crate::input::DragState;
use crate::satisfaction::SatisfactionBand;
use crate::session::{Session, SessionMode, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub id: StationId,
    pub label: String,
    pub position: Point,
    pub shape: StationShape,
    pub waiting: u32,
    /// Above the crowding warning level.
    pub crowded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    pub id: LineId,
    pub color: String,
    /// Station positions in path order.
    pub path: Vec<Point>,
    pub train_count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarriageView {
    pub position: Point,
    pub angle: f64,
    pub passengers: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainView {
    pub id: TrainId,
    pub line: LineId,
    pub color: String,
    pub position: Point,
    pub angle: f64,
    /// Riders on the locomotive itself.
    pub passengers: u32,
    pub total_passengers: u32,
    pub capacity: u32,
    pub stopped: bool,
    pub carriages: Vec<CarriageView>,
}

/// Dashed line drawn while dragging between stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragPreview {
    pub from: Point,
    pub to: Point,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub city: String,
    pub city_color: String,
    pub clock: String,
    pub resources: Resources,
    pub satisfaction: f64,
    pub satisfaction_band: SatisfactionBand,
    pub total_passengers: u64,
    pub passengers_delivered: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub stations: Vec<StationView>,
    pub lines: Vec<LineView>,
    pub trains: Vec<TrainView>,
    pub drag: Option<DragPreview>,
    pub hud: Hud,
}

impl Session {
    /// Everything needed to draw the current frame.
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        let city = &self.city;
        let warning = self.config.satisfaction.warning_threshold;
        let stations = city
            .stations
            .iter()
            .map(|station| StationView {
                id: station.id,
                label: city.station_label(station.id),
                position: station.position,
                shape: station.shape,
                waiting: station.waiting,
                crowded: station.waiting > warning,
            })
            .collect();

        let lines = city
            .lines
            .iter()
            .map(|line| LineView {
                id: line.id,
                color: line.color.clone(),
                path: line
                    .stations
                    .iter()
                    .filter_map(|id| city.station(*id).map(|s| s.position))
                    .collect(),
                train_count: line.trains.len(),
                selected: self.selected_line == Some(line.id),
            })
            .collect();

        let trains = city
            .trains
            .iter()
            .map(|train| TrainView {
                id: train.id,
                line: train.line,
                color: city
                    .line(train.line)
                    .map(|line| line.color.clone())
                    .unwrap_or_default(),
                position: train.position,
                angle: train.angle,
                passengers: train.locomotive_load(),
                total_passengers: train.passengers,
                capacity: train.capacity(),
                stopped: train.phase.is_stopped(),
                carriages: train
                    .carriages
                    .iter()
                    .map(|carriage| CarriageView {
                        position: carriage.pose.position,
                        angle: carriage.pose.angle,
                        passengers: carriage.passengers,
                        capacity: carriage.capacity,
                    })
                    .collect(),
            })
            .collect();

        RenderState {
            mode: self.mode,
            status: self.status,
            stations,
            lines,
            trains,
            drag: self.drag_preview(),
            hud: self.hud(),
        }
    }

    fn drag_preview(&self) -> Option<DragPreview> {
        let DragState::Dragging { from, cursor } = self.drag else {
            return None;
        };
        let origin = self.city.station(from)?;
        let color = self
            .selected_line
            .and_then(|id| self.city.line(id))
            .or_else(|| self.city.lines.first())
            .map_or_else(
                || DRAG_PREVIEW_FALLBACK_COLOR.to_string(),
                |line| line.color.clone(),
            );
        Some(DragPreview {
            from: origin.position,
            to: cursor,
            color,
        })
    }

    fn hud(&self) -> Hud {
        Hud {
            city: self.city.name.clone(),
            city_color: self.city.color.clone(),
            clock: self.clock.calendar(&self.config.timing).to_string(),
            resources: self.resources,
            satisfaction: self.satisfaction.value(),
            satisfaction_band: self.satisfaction.band(),
            total_passengers: self.total_passengers,
            passengers_delivered: self.delivered,
        }
    }
}
