//! Export the track as a GeoJSON feature collection
use super::{MapSurface, MarkerCluster, PathStyle};
use crate::config::ServiceConfig;
use crate::gps::{Bounds, Location};
use crate::set_bool_param_from_config;
use crate::Error;
use log::warn;
use serde_json::{json, Value};

/// Collects map layers as GeoJSON features, coordinates are written [longitude, latitude]
#[derive(Debug)]
pub struct GeoJson {
    pretty: bool,
    features: Vec<Value>,
    bbox: Option<Bounds>,
}

impl GeoJson {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut base = Self::default();
        for key in config.parameters() {
            match key.as_ref() {
                "pretty" => set_bool_param_from_config!(base, pretty, config),
                _ => warn!(
                    "unknown configuration parameter for GeoJson: {}={:?}",
                    key,
                    config.get_parameter(key)
                ),
            }
        }
        Ok(base)
    }

    fn feature_collection(&self) -> Value {
        let mut collection = json!({
            "type": "FeatureCollection",
            "features": self.features,
        });
        if let Some(b) = self.bbox {
            collection["bbox"] = json!([
                b.south_west().longitude(),
                b.south_west().latitude(),
                b.north_east().longitude(),
                b.north_east().latitude()
            ]);
        }
        collection
    }
}

impl Default for GeoJson {
    fn default() -> Self {
        GeoJson {
            pretty: true,
            features: Vec::new(),
            bbox: None,
        }
    }
}

impl MapSurface for GeoJson {
    fn add_polyline(&mut self, path: &[Location], style: &PathStyle) {
        let coordinates: Vec<[f64; 2]> = path.iter().map(|l| [l.longitude(), l.latitude()]).collect();
        self.features.push(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": coordinates},
            "properties": {
                "stroke": style.color(),
                "stroke-width": style.weight(),
                "stroke-opacity": style.opacity(),
            },
        }));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.bbox = Some(bounds);
    }

    fn add_marker_cluster(&mut self, cluster: MarkerCluster) {
        for marker in cluster.markers() {
            self.features.push(json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [marker.longitude(), marker.latitude()],
                },
                "properties": {
                    "category": marker.category(),
                    "label": marker.label(),
                    "timestamp": marker.timestamp(),
                    "icon": marker.icon(),
                },
            }));
        }
    }

    fn output(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let collection = self.feature_collection();
        let data = if self.pretty {
            serde_json::to_vec_pretty(&collection)?
        } else {
            serde_json::to_vec(&collection)?
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::visualization::map::Marker;
    use crate::services::visualization::IconTable;
    use crate::track::MarkerCategory;

    #[test]
    fn writes_longitude_first() {
        let mut doc = GeoJson::default();
        let path = [Location::new(-6.2, 106.8), Location::new(-6.3, 106.9)];
        doc.add_polyline(&path, &PathStyle::default());
        doc.fit_bounds(Bounds::from_path(&path).unwrap());
        doc.add_marker_cluster(MarkerCluster::new(vec![Marker::new(
            path[1],
            MarkerCategory::Stopped,
            "2024-06-01 12:05:00",
            IconTable::default().icon(MarkerCategory::Stopped),
        )]));

        let parsed: Value = serde_json::from_slice(&doc.output().unwrap()).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["bbox"], json!([106.8, -6.3, 106.9, -6.2]));
        assert_eq!(parsed["features"][0]["geometry"]["coordinates"][0], json!([106.8, -6.2]));
        let point = &parsed["features"][1];
        assert_eq!(point["geometry"]["type"], "Point");
        assert_eq!(point["properties"]["category"], "stopped");
        assert_eq!(point["properties"]["label"], "STOPPED");
    }

    #[test]
    fn compact_output() {
        let mut config = ServiceConfig::new("geojson");
        config.set_parameter("pretty", false.into());
        let doc = GeoJson::from_config(&config).unwrap();
        let text = String::from_utf8(doc.output().unwrap()).unwrap();
        assert_eq!(text, r#"{"features":[],"type":"FeatureCollection"}"#);
    }
}
