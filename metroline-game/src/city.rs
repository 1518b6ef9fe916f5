//! Stations, lines and the city that owns them.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::TUTORIAL_CITY_COLOR;
use crate::geometry::Point;
use crate::train::Train;

macro_rules! index_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_id!(StationId);
index_id!(LineId);
index_id!(TrainId);

/// Station glyphs. Purely visual; passengers are not shape-routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationShape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Pentagon,
}

impl StationShape {
    pub const ALL: [Self; 5] = [
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Diamond,
        Self::Pentagon,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Diamond => "diamond",
            Self::Pentagon => "pentagon",
        }
    }
}

impl fmt::Display for StationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbouring stations; most stations touch only a handful of others.
pub type ConnectionSet = SmallVec<[StationId; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub position: Point,
    pub shape: StationShape,
    /// Passengers waiting on the platform.
    pub waiting: u32,
    /// Undirected adjacency derived from line paths.
    #[serde(default)]
    pub connections: ConnectionSet,
}

impl Station {
    #[must_use]
    pub fn new(id: StationId, position: Point, shape: StationShape) -> Self {
        Self {
            id,
            position,
            shape,
            waiting: 0,
            connections: ConnectionSet::new(),
        }
    }

    /// Record an undirected neighbour once.
    pub fn link(&mut self, other: StationId) {
        if other != self.id && !self.connections.contains(&other) {
            self.connections.push(other);
        }
    }

    #[must_use]
    pub fn is_connected_to(&self, other: StationId) -> bool {
        self.connections.contains(&other)
    }
}

/// An ordered simple path of stations that trains shuttle along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub color: String,
    pub stations: Vec<StationId>,
    pub trains: Vec<TrainId>,
}

impl Line {
    #[must_use]
    pub fn new(id: LineId, color: impl Into<String>) -> Self {
        Self {
            id,
            color: color.into(),
            stations: Vec::new(),
            trains: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Lines shorter than two stations cannot run trains.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        self.stations.len() >= 2
    }

    #[must_use]
    pub fn contains(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }

    #[must_use]
    pub fn head(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    #[must_use]
    pub fn tail(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    /// Station at a path index.
    #[must_use]
    pub fn station_at(&self, index: usize) -> Option<StationId> {
        self.stations.get(index).copied()
    }
}

/// Static description of a playable city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CityProfile {
    pub name: &'static str,
    pub color: &'static str,
    pub station_prefix: &'static str,
    pub description: &'static str,
}

const CATALOG: [CityProfile; 10] = [
    CityProfile {
        name: "Vancouver",
        color: "#0046AD",
        station_prefix: "Van-",
        description: "An automated network carrying Pacific Northwest commuters.",
    },
    CityProfile {
        name: "Toronto",
        color: "#EE3224",
        station_prefix: "TOR-",
        description: "Canada's largest city and its heaviest subway volumes.",
    },
    CityProfile {
        name: "Montreal",
        color: "#0072CE",
        station_prefix: "MTL-",
        description: "Distinctive station architecture across diverse neighbourhoods.",
    },
    CityProfile {
        name: "Alberta",
        color: "#B72E04",
        station_prefix: "ALB-",
        description: "Street-level and dedicated routes for a growing western province.",
    },
    CityProfile {
        name: "Seoul",
        color: "#00A84D",
        station_prefix: "SEO-",
        description: "One of the busiest and most efficient systems anywhere.",
    },
    CityProfile {
        name: "Pusan",
        color: "#F06A00",
        station_prefix: "PUS-",
        description: "A coastal port city with awkward geography to connect.",
    },
    CityProfile {
        name: "Hong Kong",
        color: "#E60012",
        station_prefix: "HKG-",
        description: "A compact financial hub with towering ridership.",
    },
    CityProfile {
        name: "Beijing",
        color: "#C23A30",
        station_prefix: "BEI-",
        description: "A sprawling capital with the busiest metro by annual trips.",
    },
    CityProfile {
        name: "Shanghai",
        color: "#E40034",
        station_prefix: "SHA-",
        description: "A fast-growing system joining old districts to the new.",
    },
    CityProfile {
        name: "Shenzhen",
        color: "#009943",
        station_prefix: "SHZ-",
        description: "A young technology hub expanding at the Hong Kong border.",
    },
];

const TUTORIAL: CityProfile = CityProfile {
    name: "Tutorial City",
    color: TUTORIAL_CITY_COLOR,
    station_prefix: "TUT-",
    description: "Three stations and one empty line to learn the controls.",
};

impl CityProfile {
    /// Every selectable city.
    #[must_use]
    pub const fn catalog() -> &'static [Self] {
        &CATALOG
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn find(name: &str) -> Option<Self> {
        CATALOG
            .iter()
            .find(|profile| profile.name.eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    #[must_use]
    pub const fn tutorial() -> Self {
        TUTORIAL
    }
}

/// The active city: its stations, lines and trains.
#[derive(Debug, Clone)]
pub struct City {
    pub name: String,
    pub color: String,
    pub station_prefix: String,
    pub stations: Vec<Station>,
    pub lines: Vec<Line>,
    pub trains: Vec<Train>,
    /// Passengers generated here and not yet dropped off.
    pub passengers: u64,
}

impl City {
    #[must_use]
    pub fn new(profile: &CityProfile) -> Self {
        Self {
            name: profile.name.to_string(),
            color: profile.color.to_string(),
            station_prefix: profile.station_prefix.to_string(),
            stations: Vec::new(),
            lines: Vec::new(),
            trains: Vec::new(),
            passengers: 0,
        }
    }

    pub fn add_station(&mut self, position: Point, shape: StationShape) -> StationId {
        let id = StationId(self.stations.len());
        self.stations.push(Station::new(id, position, shape));
        id
    }

    pub fn add_line(&mut self, color: impl Into<String>) -> LineId {
        let id = LineId(self.lines.len());
        self.lines.push(Line::new(id, color));
        id
    }

    #[must_use]
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(id.index())
    }

    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.index())
    }

    #[must_use]
    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(id.index())
    }

    pub fn train_mut(&mut self, id: TrainId) -> Option<&mut Train> {
        self.trains.get_mut(id.index())
    }

    /// Label shown next to a station, e.g. `TOR-3`.
    #[must_use]
    pub fn station_label(&self, id: StationId) -> String {
        format!("{}{}", self.station_prefix, id.index() + 1)
    }

    /// Total passengers waiting across all platforms.
    #[must_use]
    pub fn waiting_passengers(&self) -> u64 {
        self.stations.iter().map(|s| u64::from(s.waiting)).sum()
    }

    /// Total passengers riding any train.
    #[must_use]
    pub fn riding_passengers(&self) -> u64 {
        self.trains.iter().map(|t| u64::from(t.passengers)).sum()
    }

    /// Stations whose waiting count is strictly above `threshold`.
    #[must_use]
    pub fn crowded_stations(&self, threshold: u32) -> usize {
        self.stations.iter().filter(|s| s.waiting > threshold).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_is_case_insensitive() {
        assert_eq!(CityProfile::catalog().len(), 10);
        let alberta = CityProfile::find(" alberta ").unwrap();
        assert_eq!(alberta.station_prefix, "ALB-");
        assert!(CityProfile::find("Atlantis").is_none());
    }

    #[test]
    fn station_links_are_deduplicated() {
        let mut station = Station::new(StationId(0), Point::default(), StationShape::Circle);
        station.link(StationId(1));
        station.link(StationId(1));
        station.link(StationId(0));
        assert_eq!(station.connections.as_slice(), &[StationId(1)]);
        assert!(station.is_connected_to(StationId(1)));
    }

    #[test]
    fn city_assigns_sequential_ids() {
        let mut city = City::new(&CityProfile::catalog()[1]);
        let a = city.add_station(Point::new(1.0, 1.0), StationShape::Square);
        let b = city.add_station(Point::new(2.0, 2.0), StationShape::Diamond);
        let line = city.add_line("#FF0000");
        assert_eq!((a, b, line), (StationId(0), StationId(1), LineId(0)));
        assert_eq!(city.station_label(b), "TOR-2");
        assert!(!city.line(line).unwrap().is_runnable());
    }

    #[test]
    fn crowding_counts_strictly_above_threshold() {
        let mut city = City::new(&CityProfile::tutorial());
        for waiting in [100, 101, 250] {
            let id = city.add_station(Point::default(), StationShape::Circle);
            city.station_mut(id).unwrap().waiting = waiting;
        }
        assert_eq!(city.crowded_stations(100), 2);
        assert_eq!(city.waiting_passengers(), 451);
    }
}
