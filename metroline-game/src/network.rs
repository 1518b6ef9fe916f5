//! Line topology edits and pointer hit-testing.
use crate::city::{City, LineId, Station, StationId};
use crate::error::CommandError;
use crate::geometry::{Point, distance_to_segment};

/// How a successful connect changed the line path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The line was empty and now holds exactly the two stations.
    Created,
    /// A station was inserted before the head; existing indices shift by one.
    Prepended(StationId),
    /// A station was appended after the tail.
    Appended(StationId),
    /// Both stations were already on the line; nothing changed.
    AlreadyConnected,
}

impl ConnectOutcome {
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::AlreadyConnected)
    }
}

/// Extend `line` so it joins `a` and `b`.
///
/// An empty line becomes `[a, b]`. Otherwise one of the pair must be an end
/// of the path and the other is attached beyond it, keeping the line a
/// simple path. Station adjacency is updated only when the path changes.
///
/// # Errors
///
/// Rejects unknown ids, a station paired with itself, and attachments that
/// would branch off the middle of the path or float free of it.
pub fn connect_stations(
    city: &mut City,
    a: StationId,
    b: StationId,
    line: LineId,
) -> Result<ConnectOutcome, CommandError> {
    if city.station(a).is_none() {
        return Err(CommandError::UnknownStation(a));
    }
    if city.station(b).is_none() {
        return Err(CommandError::UnknownStation(b));
    }
    if a == b {
        return Err(CommandError::SameStation { station: a });
    }
    let path = city
        .lines
        .get_mut(line.index())
        .ok_or(CommandError::UnknownLine(line))?;

    let outcome = if path.contains(a) && path.contains(b) {
        ConnectOutcome::AlreadyConnected
    } else if path.is_empty() {
        path.stations.extend([a, b]);
        ConnectOutcome::Created
    } else {
        let head = path.head();
        let tail = path.tail();
        let (anchor, added) = if path.contains(a) { (a, b) } else { (b, a) };
        if !path.contains(anchor) {
            return Err(CommandError::NotAnEndpoint { line });
        }
        if head == Some(anchor) {
            path.stations.insert(0, added);
            ConnectOutcome::Prepended(added)
        } else if tail == Some(anchor) {
            path.stations.push(added);
            ConnectOutcome::Appended(added)
        } else {
            return Err(CommandError::NotAnEndpoint { line });
        }
    };

    if outcome.changed() {
        if let Some(station) = city.station_mut(a) {
            station.link(b);
        }
        if let Some(station) = city.station_mut(b) {
            station.link(a);
        }
    }
    Ok(outcome)
}

/// Nearest station within `radius` of `point`.
#[must_use]
pub fn station_at(stations: &[Station], point: Point, radius: f64) -> Option<StationId> {
    stations
        .iter()
        .map(|station| (station.id, station.position.distance(point)))
        .filter(|(_, distance)| *distance < radius)
        .min_by(|left, right| left.1.total_cmp(&right.1))
        .map(|(id, _)| id)
}

/// Line whose drawn path passes nearest to `point`, within `radius`.
#[must_use]
pub fn line_at(city: &City, point: Point, radius: f64) -> Option<LineId> {
    city.lines
        .iter()
        .filter_map(|line| {
            let positions: Vec<Point> = line
                .stations
                .iter()
                .filter_map(|id| city.station(*id).map(|s| s.position))
                .collect();
            positions
                .windows(2)
                .map(|seg| distance_to_segment(point, seg[0], seg[1]))
                .min_by(f64::total_cmp)
                .filter(|distance| *distance < radius)
                .map(|distance| (line.id, distance))
        })
        .min_by(|left, right| left.1.total_cmp(&right.1))
        .map(|(id, _)| id)
}
