//! Module with GPS specific structures
use serde::Serialize;
use std::char;

/// Mean earth radius in kilometers
static EARTH_RADIUS_KM: f64 = 6371.0;

/// Stores a single geospatial point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Location {
    /// latitude coordinate in degrees
    latitude: f64,
    /// longitude coordinate in degrees
    longitude: f64,
}

impl Location {
    /// Create a location from coordinates provided in degrees
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
        }
    }

    /// Return latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Return longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// True if both coordinates are finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Great circle distance to another location in kilometers
    pub fn distance_to(&self, other: &Location) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Smallest latitude/longitude box containing a set of locations
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    south_west: Location,
    north_east: Location,
}

impl Bounds {
    /// Compute the bounding box of a path, returns None for an empty path
    pub fn from_path(path: &[Location]) -> Option<Self> {
        let (first, rest) = path.split_first()?;
        let mut bounds = Bounds {
            south_west: *first,
            north_east: *first,
        };
        for location in rest {
            bounds.extend(location);
        }
        Some(bounds)
    }

    /// Grow the box so it contains the location
    pub fn extend(&mut self, location: &Location) {
        self.south_west.latitude = self.south_west.latitude.min(location.latitude);
        self.south_west.longitude = self.south_west.longitude.min(location.longitude);
        self.north_east.latitude = self.north_east.latitude.max(location.latitude);
        self.north_east.longitude = self.north_east.longitude.max(location.longitude);
    }

    pub fn south_west(&self) -> Location {
        self.south_west
    }

    pub fn north_east(&self) -> Location {
        self.north_east
    }

    pub fn contains(&self, location: &Location) -> bool {
        location.latitude >= self.south_west.latitude
            && location.latitude <= self.north_east.latitude
            && location.longitude >= self.south_west.longitude
            && location.longitude <= self.north_east.longitude
    }
}

/// Total length of a path in kilometers
pub fn path_length(path: &[Location]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Encodes a slice of coordinates into Google Encoded Polyline format.
///
/// This code was extracted and simplified for our use case from:
/// https://github.com/georust/polyline
/// https://developers.google.com/maps/documentation/utilities/polylinealgorithm
pub fn encode_coordinates(coordinates: &[Location]) -> Result<String, String> {
    let mut output = String::new();
    let mut b = (0, 0);

    for a in coordinates {
        let a = (scale(a.latitude), scale(a.longitude));
        output += &encode(a.0, b.0)?;
        output += &encode(a.1, b.1)?;
        b = a;
    }

    Ok(output)
}

/// Scale a floating point value into an integer at the given precision
#[inline]
fn scale(n: f64) -> i64 {
    static FACTOR: f64 = 100_000.0; // use 5 digits of precision
    (FACTOR * n).round() as i64
}

/// Encode a single latitude or longitude value into the polyline format
fn encode(current: i64, previous: i64) -> Result<String, String> {
    let mut coordinate = (current - previous) << 1;
    if (current - previous) < 0 {
        coordinate = !coordinate;
    }
    let mut output = String::new();
    while coordinate >= 0x20 {
        let from_char = char::from_u32(((0x20 | (coordinate & 0x1f)) + 63) as u32)
            .ok_or("Couldn't convert character")?;
        output.push(from_char);
        coordinate >>= 5;
    }
    let from_char = char::from_u32((coordinate + 63) as u32).ok_or("Couldn't convert character")?;
    output.push(from_char);
    Ok(output)
}
