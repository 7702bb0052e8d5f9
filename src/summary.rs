//! Trip statistics computed from a classified track
use crate::gps::{path_length, Location};
use crate::track::{classify_track, valid_points, MarkerCategory, TrackPoint};
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

static TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

/// Summary of a single vehicle trip
#[derive(Clone, Debug, PartialEq)]
pub struct TripSummary {
    points: usize,
    skipped: usize,
    categories: BTreeMap<MarkerCategory, usize>,
    distance_km: f64,
    duration: Option<Duration>,
    fuel_liters: f64,
}

impl TripSummary {
    /// Summarize a track, `efficiency` is the vehicle's fuel economy in km per liter
    pub fn from_track(track: &[TrackPoint], efficiency: f64) -> Self {
        let points = valid_points(track);
        let mut categories = BTreeMap::new();
        for category in classify_track(&points) {
            *categories.entry(category).or_insert(0) += 1;
        }
        let path: Vec<Location> = points.iter().map(|p| p.location()).collect();

        TripSummary {
            points: points.len(),
            skipped: track.len() - points.len(),
            categories,
            distance_km: path_length(&path),
            duration: duration(&points),
            fuel_liters: fuel_used(&points, efficiency),
        }
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of markers in the category
    pub fn count(&self, category: MarkerCategory) -> usize {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Time between the first and last readable timestamps
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn fuel_liters(&self) -> f64 {
        self.fuel_liters
    }
}

impl fmt::Display for TripSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Points: {} ({} skipped)", self.points, self.skipped)?;
        for category in MarkerCategory::ALL.iter() {
            writeln!(f, "  {}: {}", category, self.count(*category))?;
        }
        writeln!(f, "Distance: {:.2} km", self.distance_km)?;
        match self.duration {
            Some(d) => writeln!(
                f,
                "Duration: {}h {:02}m {:02}s",
                d.num_hours(),
                d.num_minutes() % 60,
                d.num_seconds() % 60
            )?,
            None => writeln!(f, "Duration: unknown")?,
        }
        write!(f, "Fuel used: {:.2} l", self.fuel_liters)
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
}

fn duration(points: &[&TrackPoint]) -> Option<Duration> {
    let first = points.iter().find_map(|p| parse_timestamp(p.timestamp()))?;
    let last = points.iter().rev().find_map(|p| parse_timestamp(p.timestamp()))?;
    // out of order timestamps give no usable span
    if last < first {
        return None;
    }
    Some(last - first)
}

/// Fuel burned between consecutive odometer readings taken with the engine running
fn fuel_used(points: &[&TrackPoint], efficiency: f64) -> f64 {
    if efficiency <= 0.0 {
        return 0.0;
    }
    let mut previous = None;
    let mut meters = 0.0;
    for point in points {
        if let (Some(prev), Some(current)) = (previous, point.odometer()) {
            if point.engine_on() {
                meters += f64::max(0.0, current - prev);
            }
        }
        previous = point.odometer();
    }
    (meters / 1000.0 / efficiency * 100.0).round() / 100.0
}
