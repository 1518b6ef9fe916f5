//! Station placement and passenger generation.
use log::{debug, warn};
use rand::Rng;

use crate::city::{City, StationId, StationShape};
use crate::config::SpawnConfig;
use crate::constants::{LOG_TARGET_SPAWN, TUTORIAL_STATION_DROP, TUTORIAL_STATION_OFFSET};
use crate::geometry::{Point, Viewport};

/// Wall-clock accumulator for the station spawn cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnTimer {
    elapsed_ms: u64,
}

impl SpawnTimer {
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Add real elapsed time; true when a spawn is due.
    pub const fn advance(&mut self, elapsed_ms: u64, interval_ms: u64) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms > interval_ms {
            self.elapsed_ms = 0;
            return true;
        }
        false
    }
}

/// Place one station at a random spot inside the margins, clear of the
/// minimum spacing from every existing station.
///
/// Returns `None` when the city is at its cap or no clear spot was found
/// within the attempt budget.
pub fn spawn_station<R: Rng + ?Sized>(
    city: &mut City,
    viewport: Viewport,
    cfg: &SpawnConfig,
    rng: &mut R,
) -> Option<StationId> {
    if city.stations.len() >= cfg.max_stations {
        return None;
    }
    for _ in 0..cfg.placement_attempts {
        let candidate = Point::new(
            sample_axis(rng, viewport.width, cfg.margin),
            sample_axis(rng, viewport.height, cfg.margin),
        );
        let clear = city
            .stations
            .iter()
            .all(|station| station.position.distance(candidate) >= cfg.min_spacing);
        if clear {
            let shape = StationShape::ALL[rng.gen_range(0..StationShape::ALL.len())];
            let id = city.add_station(candidate, shape);
            debug!(
                target: LOG_TARGET_SPAWN,
                "spawned {} ({shape}) at ({:.0}, {:.0})",
                city.station_label(id),
                candidate.x,
                candidate.y
            );
            return Some(id);
        }
    }
    warn!(
        target: LOG_TARGET_SPAWN,
        "no clear spot for station {} after {} attempts",
        city.stations.len() + 1,
        cfg.placement_attempts
    );
    None
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, extent: f64, margin: f64) -> f64 {
    let span = extent - 2.0 * margin;
    if span <= 0.0 {
        return (extent / 2.0).max(0.0);
    }
    rng.gen_range(margin..margin + span)
}

/// Scatter the opening stations of a fresh city.
pub fn seed_initial_stations<R: Rng + ?Sized>(
    city: &mut City,
    viewport: Viewport,
    cfg: &SpawnConfig,
    rng: &mut R,
) {
    for _ in 0..cfg.initial_stations {
        spawn_station(city, viewport, cfg, rng);
    }
}

/// Fixed triangle of stations around the canvas centre.
pub fn seed_tutorial_stations(city: &mut City, viewport: Viewport) {
    let center = viewport.center();
    let layout = [
        (
            Point::new(center.x, center.y - TUTORIAL_STATION_OFFSET),
            StationShape::Circle,
        ),
        (
            Point::new(
                center.x - TUTORIAL_STATION_OFFSET,
                center.y + TUTORIAL_STATION_DROP,
            ),
            StationShape::Square,
        ),
        (
            Point::new(
                center.x + TUTORIAL_STATION_OFFSET,
                center.y + TUTORIAL_STATION_DROP,
            ),
            StationShape::Triangle,
        ),
    ];
    for (position, shape) in layout {
        city.add_station(position, shape);
    }
}

/// Roll for new riders; each one appears at a random station.
///
/// Cities with fewer than two stations generate nobody. Returns how many
/// riders were added.
pub fn generate_passengers<R: Rng + ?Sized>(
    city: &mut City,
    cfg: &SpawnConfig,
    rng: &mut R,
) -> u32 {
    let count = city.stations.len();
    if count < 2 || !rng.gen_bool(cfg.passenger_chance) {
        return 0;
    }
    let burst = rng.gen_range(cfg.passenger_burst_min..=cfg.passenger_burst_max);
    for _ in 0..burst {
        let station = &mut city.stations[rng.gen_range(0..count)];
        station.waiting = station.waiting.saturating_add(1);
    }
    city.passengers = city.passengers.saturating_add(u64::from(burst));
    burst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::CityProfile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn city() -> City {
        City::new(&CityProfile::catalog()[0])
    }

    #[test]
    fn timer_fires_after_interval() {
        let mut timer = SpawnTimer::default();
        assert!(!timer.advance(10_000, 15_000));
        assert!(!timer.advance(5_000, 15_000));
        assert!(timer.advance(16, 15_000));
        assert_eq!(timer.elapsed_ms(), 0);
    }

    #[test]
    fn stations_respect_margin_spacing_and_cap() {
        let cfg = SpawnConfig::default();
        let viewport = Viewport::new(1_600.0, 1_000.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut city = city();
        for _ in 0..40 {
            spawn_station(&mut city, viewport, &cfg, &mut rng);
        }
        assert_eq!(city.stations.len(), cfg.max_stations);
        for station in &city.stations {
            assert!(station.position.x >= 50.0 && station.position.x < 1_550.0);
            assert!(station.position.y >= 50.0 && station.position.y < 950.0);
            for other in &city.stations {
                if other.id != station.id {
                    assert!(station.position.distance(other.position) >= 100.0);
                }
            }
        }
    }

    #[test]
    fn crowded_canvas_gives_up_without_looping() {
        let cfg = SpawnConfig {
            placement_attempts: 16,
            ..SpawnConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut city = city();
        let tiny = Viewport::new(120.0, 120.0);
        assert!(spawn_station(&mut city, tiny, &cfg, &mut rng).is_some());
        assert!(spawn_station(&mut city, tiny, &cfg, &mut rng).is_none());
        assert_eq!(city.stations.len(), 1);
    }

    #[test]
    fn tutorial_triangle_is_centred() {
        let mut city = City::new(&CityProfile::tutorial());
        seed_tutorial_stations(&mut city, Viewport::new(800.0, 600.0));
        let positions: Vec<Point> = city.stations.iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![
                Point::new(400.0, 200.0),
                Point::new(300.0, 350.0),
                Point::new(500.0, 350.0)
            ]
        );
    }

    #[test]
    fn passengers_need_two_stations() {
        let cfg = SpawnConfig {
            passenger_chance: 1.0,
            ..SpawnConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut city = city();
        city.add_station(Point::new(0.0, 0.0), StationShape::Circle);
        assert_eq!(generate_passengers(&mut city, &cfg, &mut rng), 0);

        city.add_station(Point::new(200.0, 0.0), StationShape::Square);
        let added = generate_passengers(&mut city, &cfg, &mut rng);
        assert!((1..=3).contains(&added));
        assert_eq!(city.waiting_passengers(), u64::from(added));
        assert_eq!(city.passengers, u64::from(added));
    }
}
