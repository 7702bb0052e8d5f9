//! Vehicle track samples and their classification into display categories
use crate::gps::Location;
use crate::Error;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::io::Read;

/// A single GPS sample reported by a vehicle tracker
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrackPoint {
    #[serde(rename = "Lat", deserialize_with = "deserialize_coordinate", default = "missing")]
    latitude: f64,
    #[serde(rename = "Lon", deserialize_with = "deserialize_coordinate", default = "missing")]
    longitude: f64,
    #[serde(rename = "DatetimeUTC", default)]
    timestamp: String,
    #[serde(
        rename = "speed",
        alias = "Speed",
        deserialize_with = "deserialize_reading",
        default = "missing"
    )]
    speed: f64,
    #[serde(
        rename = "engine",
        alias = "Engine",
        deserialize_with = "deserialize_reading",
        default = "missing"
    )]
    engine: f64,
    #[serde(
        rename = "Odometer",
        alias = "odometer",
        deserialize_with = "deserialize_optional_reading",
        default
    )]
    odometer: Option<f64>,
    #[serde(rename = "VehicleNumber", default)]
    vehicle: Option<String>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: &str, speed: f64, engine: f64) -> Self {
        TrackPoint {
            latitude,
            longitude,
            timestamp: timestamp.to_string(),
            speed,
            engine,
            odometer: None,
            vehicle: None,
        }
    }

    /// Attach an odometer reading in meters
    pub fn with_odometer(mut self, odometer: f64) -> Self {
        self.odometer = Some(odometer);
        self
    }

    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    /// Timestamp label exactly as reported by the tracker
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn engine(&self) -> f64 {
        self.engine
    }

    pub fn odometer(&self) -> Option<f64> {
        self.odometer
    }

    pub fn vehicle(&self) -> Option<&str> {
        self.vehicle.as_deref()
    }

    pub fn is_stationary(&self) -> bool {
        self.speed == 0.0
    }

    pub fn engine_off(&self) -> bool {
        self.engine == 0.0
    }

    /// True only for an actual nonzero engine reading, a missing reading is not "on"
    pub fn engine_on(&self) -> bool {
        self.engine.is_finite() && self.engine != 0.0
    }
}

/// Readings arrive as numbers, numeric strings, booleans or ON/OFF flags depending on
/// which tracker firmware pushed them
#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl RawReading {
    fn into_value(self) -> Result<f64, String> {
        match self {
            RawReading::Number(val) => Ok(val),
            RawReading::Flag(val) => Ok(if val { 1.0 } else { 0.0 }),
            RawReading::Text(text) => match text.trim().to_ascii_uppercase().as_str() {
                "ON" | "TRUE" => Ok(1.0),
                "OFF" | "FALSE" => Ok(0.0),
                other => other
                    .parse::<f64>()
                    .map_err(|_| format!("invalid numeric reading: {:?}", text)),
            },
        }
    }
}

fn missing() -> f64 {
    f64::NAN
}

/// Coordinates that can't be read become NaN so the point is dropped by `valid_points`
/// instead of failing the whole track
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<RawReading>::deserialize(deserializer)? {
        Some(RawReading::Number(val)) => val,
        Some(RawReading::Text(text)) => text.trim().parse::<f64>().unwrap_or_else(|_| missing()),
        Some(RawReading::Flag(_)) | None => missing(),
    };
    Ok(value)
}

fn deserialize_reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_reading(deserializer)?.unwrap_or_else(missing))
}

fn deserialize_optional_reading<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawReading>::deserialize(deserializer)? {
        Some(raw) => raw.into_value().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Read a JSON array of track points
pub fn load_track<T: Read>(source: &mut T) -> Result<Vec<TrackPoint>, Error> {
    Ok(serde_json::from_reader(source)?)
}

/// Return the points with usable coordinates, logging the ones that get dropped
pub fn valid_points(points: &[TrackPoint]) -> Vec<&TrackPoint> {
    points
        .iter()
        .enumerate()
        .filter_map(|(idx, point)| {
            if point.location().is_valid() {
                Some(point)
            } else {
                warn!(
                    "skipping track point {} ({}) with invalid coordinates: {}, {}",
                    idx,
                    point.timestamp(),
                    point.latitude,
                    point.longitude
                );
                None
            }
        })
        .collect()
}

/// Display category assigned to every rendered point
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    Start,
    Finish,
    Parked,
    Stopped,
    Moving,
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 5] = [
        MarkerCategory::Start,
        MarkerCategory::Finish,
        MarkerCategory::Parked,
        MarkerCategory::Stopped,
        MarkerCategory::Moving,
    ];

    /// Label shown in the marker popup
    pub fn label(&self) -> &'static str {
        match self {
            MarkerCategory::Start => "START",
            MarkerCategory::Finish => "FINISH",
            MarkerCategory::Parked => "PARKED",
            MarkerCategory::Stopped => "STOPPED",
            MarkerCategory::Moving => "POSITION",
        }
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a point sits in the track
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    First,
    Interior,
    Last,
}

impl Position {
    /// A single point track is only ever `First`, so it renders as START
    pub fn of(index: usize, len: usize) -> Self {
        if index == 0 {
            Position::First
        } else if index + 1 == len {
            Position::Last
        } else {
            Position::Interior
        }
    }
}

/// Classify a point from its own readings and its position in the track
pub fn classify(position: Position, point: &TrackPoint) -> MarkerCategory {
    match position {
        Position::First => MarkerCategory::Start,
        Position::Last => MarkerCategory::Finish,
        Position::Interior => {
            if point.engine_off() && point.is_stationary() {
                MarkerCategory::Parked
            } else if point.is_stationary() {
                MarkerCategory::Stopped
            } else {
                MarkerCategory::Moving
            }
        }
    }
}

/// Classify every point of an ordered track
pub fn classify_track<P: Borrow<TrackPoint>>(points: &[P]) -> Vec<MarkerCategory> {
    points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            classify(
                Position::of(idx, points.len()),
                <P as Borrow<TrackPoint>>::borrow(point),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::MarkerCategory::*;

    fn point(lat: f64, speed: f64, engine: f64) -> TrackPoint {
        TrackPoint::new(lat, lat, "T", speed, engine)
    }

    #[test]
    fn endpoints_override_sensor_readings() {
        let track = vec![
            TrackPoint::new(0.0, 0.0, "T0", 0.0, 0.0),
            TrackPoint::new(1.0, 1.0, "T1", 5.0, 1.0),
            TrackPoint::new(2.0, 2.0, "T2", 0.0, 1.0),
            TrackPoint::new(3.0, 3.0, "T3", 0.0, 0.0),
        ];
        assert_eq!(classify_track(&track), vec![Start, Moving, Stopped, Finish]);
    }

    #[test]
    fn interior_points_follow_sensor_rules() {
        let track = vec![
            point(0.0, 10.0, 1.0),
            point(1.0, 0.0, 0.0),
            point(2.0, 0.0, 1.0),
            point(3.0, 12.0, 0.0),
            point(4.0, 7.0, 1.0),
            point(5.0, 10.0, 1.0),
        ];
        assert_eq!(
            classify_track(&track),
            vec![Start, Parked, Stopped, Moving, Moving, Finish]
        );
    }

    #[test]
    fn classification_ignores_neighbours() {
        let parked = point(1.0, 0.0, 0.0);
        let before = vec![point(0.0, 0.0, 0.0), parked.clone(), point(2.0, 0.0, 0.0)];
        let after = vec![point(0.0, 50.0, 1.0), parked, point(2.0, 50.0, 1.0)];
        assert_eq!(classify_track(&before)[1], Parked);
        assert_eq!(classify_track(&after)[1], Parked);
    }

    #[test]
    fn single_point_is_start() {
        assert_eq!(classify_track(&[point(0.0, 0.0, 0.0)]), vec![Start]);
        assert!(classify_track::<TrackPoint>(&[]).is_empty());
    }

    #[test]
    fn missing_readings_count_as_nonzero() {
        let json = r#"[{"Lat": 1, "Lon": 2}, {"Lat": 1, "Lon": 2, "speed": 0}, {"Lat": 1, "Lon": 2}]"#;
        let track = load_track(&mut json.as_bytes()).unwrap();
        assert_eq!(classify_track(&track), vec![Start, Stopped, Finish]);
    }

    #[test]
    fn loads_tracker_payloads() {
        let json = r#"[
            {"Lat": "-6.2", "Lon": 106.8, "DatetimeUTC": "2024-06-01 12:00:00",
             "Speed": "0", "Engine": "OFF", "Odometer": 1200, "VehicleNumber": "B 1234 XY"},
            {"Lat": -6.3, "Lon": 106.9, "speed": 0, "engine": true, "Odometer": null},
            {"Lat": null, "Lon": 106.9, "speed": 3, "engine": 1}
        ]"#;
        let track = load_track(&mut json.as_bytes()).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track[0].location(), Location::new(-6.2, 106.8));
        assert!(track[0].engine_off() && track[0].is_stationary());
        assert_eq!(track[0].odometer(), Some(1200.0));
        assert_eq!(track[0].vehicle(), Some("B 1234 XY"));
        assert_eq!(track[1].engine(), 1.0);
        assert_eq!(track[1].odometer(), None);
        assert!(track[2].latitude.is_nan());
        assert_eq!(valid_points(&track).len(), 2);
    }

    #[test]
    fn unreadable_coordinates_do_not_fail_the_track() {
        let json = r#"[{"Lat": 1, "Lon": 2}, {"Lat": "", "Lon": 2}, {"Lat": "n/a", "Lon": true}, {"Lat": 3, "Lon": 4}]"#;
        let track = load_track(&mut json.as_bytes()).unwrap();
        assert_eq!(track.len(), 4);
        assert!(track[1].latitude.is_nan());
        assert!(track[2].latitude.is_nan() && track[2].longitude.is_nan());
        assert_eq!(valid_points(&track).len(), 2);
    }

    #[test]
    fn engine_on_needs_a_reading() {
        assert!(point(0.0, 0.0, 1.0).engine_on());
        assert!(!point(0.0, 0.0, 0.0).engine_on());
        assert!(!point(0.0, 0.0, f64::NAN).engine_on());
        assert!(!point(0.0, 0.0, f64::NAN).engine_off());
    }

    #[test]
    fn rejects_garbage_readings() {
        let json = r#"[{"Lat": 1, "Lon": 2, "speed": "fast"}]"#;
        assert!(load_track(&mut json.as_bytes()).is_err());
    }
}
