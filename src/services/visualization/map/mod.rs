//! Map surfaces that a classified track can be drawn onto
use super::IconConfig;
use crate::config::ServiceConfig;
use crate::gps::{Bounds, Location};
use crate::track::MarkerCategory;
use crate::Error;
use serde::{Deserialize, Serialize};

mod geojson;
mod leaflet;
mod mapbox;
pub use geojson::GeoJson;
pub use leaflet::Leaflet;
pub use mapbox::MapBox;

/// Stroke options for the track polyline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
    color: String,
    weight: u32,
    opacity: f32,
}

impl PathStyle {
    pub fn new(color: &str, weight: u32, opacity: f32) -> Self {
        PathStyle {
            color: color.to_string(),
            weight,
            opacity,
        }
    }

    /// CSS color of the line
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Width of the line in pixels
    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        PathStyle::new("#007bff", 4, 0.8)
    }
}

/// A classified point ready to be drawn
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    location: Location,
    category: MarkerCategory,
    timestamp: String,
    icon: IconConfig,
}

impl Marker {
    pub fn new(location: Location, category: MarkerCategory, timestamp: &str, icon: IconConfig) -> Self {
        Marker {
            location,
            category,
            timestamp: timestamp.to_string(),
            icon,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude()
    }

    pub fn category(&self) -> MarkerCategory {
        self.category
    }

    /// Popup heading for the marker
    pub fn label(&self) -> &'static str {
        self.category.label()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn icon(&self) -> &IconConfig {
        &self.icon
    }
}

/// Group of markers that the surface may aggregate at low zoom levels
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkerCluster {
    markers: Vec<Marker>,
}

impl MarkerCluster {
    pub fn new(markers: Vec<Marker>) -> Self {
        MarkerCluster { markers }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// trait that defines the drawing operations a track render pass needs from a map
pub trait MapSurface {
    /// Draw a connected line through the locations in order
    fn add_polyline(&mut self, path: &[Location], style: &PathStyle);

    /// Set the visible viewport to exactly contain the bounds
    fn fit_bounds(&mut self, bounds: Bounds);

    /// Attach a marker cluster to the map
    fn add_marker_cluster(&mut self, cluster: MarkerCluster);

    /// Produce the rendered map (HTML, GeoJSON, image data, ...)
    fn output(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}

pub fn new_route_visualization_handler(config: &ServiceConfig) -> Result<Box<dyn MapSurface>, Error> {
    match config.handler() {
        "leaflet" => Ok(Box::new(Leaflet::from_config(config)?)),
        "geojson" => Ok(Box::new(GeoJson::from_config(config)?)),
        "mapbox" => Ok(Box::new(MapBox::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no route visualization handler exists for: {}",
            config.handler()
        ))),
    }
}
