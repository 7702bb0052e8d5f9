//! Render the track as a standalone HTML page using Leaflet and Leaflet.markercluster
use super::{MapSurface, MarkerCluster, PathStyle};
use crate::config::ServiceConfig;
use crate::gps::{Bounds, Location};
use crate::{set_float_param_from_config, set_int_param_from_config, set_string_param_from_config};
use crate::Error;
use log::{debug, warn};
use serde_json::{json, Value};

/// Defines the page and map options used to build the Leaflet document
#[derive(Debug)]
pub struct Leaflet {
    title: String,
    center_latitude: f64,
    center_longitude: f64,
    zoom: u32,
    tile_url: String,
    max_zoom: u32,
    attribution: String,
    leaflet_url: String,
    markercluster_url: String,
    polylines: Vec<Value>,
    bounds: Option<Bounds>,
    clusters: Vec<Value>,
}

impl Leaflet {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut base = Self::default();
        for key in config.parameters() {
            match key.as_ref() {
                "title" => set_string_param_from_config!(base, title, config),
                "center_latitude" => set_float_param_from_config!(base, center_latitude, config, f64),
                "center_longitude" => {
                    set_float_param_from_config!(base, center_longitude, config, f64)
                }
                "zoom" => set_int_param_from_config!(base, zoom, config, u32),
                "tile_url" => set_string_param_from_config!(base, tile_url, config),
                "max_zoom" => set_int_param_from_config!(base, max_zoom, config, u32),
                "attribution" => set_string_param_from_config!(base, attribution, config),
                "leaflet_url" => set_string_param_from_config!(base, leaflet_url, config),
                "markercluster_url" => {
                    set_string_param_from_config!(base, markercluster_url, config)
                }
                _ => warn!(
                    "unknown configuration parameter for Leaflet: {}={:?}",
                    key,
                    config.get_parameter(key)
                ),
            }
        }
        Ok(base)
    }

    /// Map layers as the JSON document embedded into the page script
    fn layers(&self) -> Value {
        let bounds = self.bounds.map(|b| {
            json!([
                [b.south_west().latitude(), b.south_west().longitude()],
                [b.north_east().latitude(), b.north_east().longitude()]
            ])
        });
        json!({
            "view": {
                "center": [self.center_latitude, self.center_longitude],
                "zoom": self.zoom,
            },
            "tiles": {
                "url": self.tile_url,
                "options": {"maxZoom": self.max_zoom, "attribution": self.attribution},
            },
            "polylines": self.polylines,
            "bounds": bounds,
            "clusters": self.clusters,
        })
    }

    fn render_page(&self) -> Result<String, serde_json::Error> {
        // "</" inside the inline script would close the tag early
        let layers = serde_json::to_string(&self.layers())?.replace("</", "<\\/");
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{leaflet}/dist/leaflet.css">
<link rel="stylesheet" href="{cluster}/dist/MarkerCluster.css">
<link rel="stylesheet" href="{cluster}/dist/MarkerCluster.Default.css">
<script src="{leaflet}/dist/leaflet.js"></script>
<script src="{cluster}/dist/leaflet.markercluster.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const layers = {layers};
const map = L.map('map').setView(layers.view.center, layers.view.zoom);
L.tileLayer(layers.tiles.url, layers.tiles.options).addTo(map);
layers.polylines.forEach(function (line) {{
  L.polyline(line.path, line.style).addTo(map);
}});
if (layers.bounds) {{
  map.fitBounds(layers.bounds);
}}
layers.clusters.forEach(function (markers) {{
  const group = L.markerClusterGroup();
  markers.forEach(function (m) {{
    group.addLayer(L.marker(m.latlng, {{ icon: L.icon(m.icon) }}).bindPopup(m.popup));
  }});
  map.addLayer(group);
}});
</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            leaflet = self.leaflet_url,
            cluster = self.markercluster_url,
            layers = layers,
        ))
    }
}

impl Default for Leaflet {
    fn default() -> Self {
        Leaflet {
            title: "Vehicle Track".to_string(),
            // centered on Indonesia
            center_latitude: -1.5,
            center_longitude: 120.5,
            zoom: 6,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 18,
            attribution: "© OpenStreetMap contributors".to_string(),
            leaflet_url: "https://unpkg.com/leaflet@1.9.4".to_string(),
            markercluster_url: "https://unpkg.com/leaflet.markercluster@1.5.3".to_string(),
            polylines: Vec::new(),
            bounds: None,
            clusters: Vec::new(),
        }
    }
}

impl MapSurface for Leaflet {
    fn add_polyline(&mut self, path: &[Location], style: &PathStyle) {
        let latlngs: Vec<[f64; 2]> = path.iter().map(|l| [l.latitude(), l.longitude()]).collect();
        self.polylines.push(json!({
            "path": latlngs,
            "style": {
                "color": style.color(),
                "weight": style.weight(),
                "opacity": style.opacity(),
            },
        }));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    fn add_marker_cluster(&mut self, cluster: MarkerCluster) {
        debug!("adding cluster of {} markers to Leaflet page", cluster.len());
        let markers: Vec<Value> = cluster
            .markers()
            .iter()
            .map(|m| {
                json!({
                    "latlng": [m.latitude(), m.longitude()],
                    "icon": m.icon(),
                    "popup": format!("<b>{}</b><br>{}", m.label(), escape_html(m.timestamp())),
                })
            })
            .collect();
        self.clusters.push(Value::Array(markers));
    }

    fn output(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.render_page()?.into_bytes())
    }
}

/// Escape text for use inside HTML element content or attribute values
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::visualization::map::Marker;
    use crate::services::visualization::IconTable;
    use crate::track::MarkerCategory;

    fn marker(category: MarkerCategory, timestamp: &str) -> Marker {
        Marker::new(
            Location::new(-6.2, 106.8),
            category,
            timestamp,
            IconTable::default().icon(category),
        )
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn embeds_layers_in_page() {
        let mut page = Leaflet::default();
        let path = [Location::new(-6.2, 106.8), Location::new(-6.3, 106.9)];
        page.add_polyline(&path, &PathStyle::default());
        page.fit_bounds(Bounds::from_path(&path).unwrap());
        page.add_marker_cluster(MarkerCluster::new(vec![
            marker(MarkerCategory::Start, "2024-06-01 12:00:00"),
            marker(MarkerCategory::Finish, "<script>"),
        ]));

        let layers = page.layers();
        assert_eq!(layers["polylines"][0]["style"]["color"], "#007bff");
        assert_eq!(layers["bounds"][0][0], -6.3);
        assert_eq!(layers["clusters"].as_array().unwrap().len(), 1);
        assert_eq!(
            layers["clusters"][0][0]["popup"],
            "<b>START</b><br>2024-06-01 12:00:00"
        );
        assert_eq!(
            layers["clusters"][0][1]["icon"]["iconUrl"],
            "/static/img/finish-icon.png"
        );

        let html = String::from_utf8(page.output().unwrap()).unwrap();
        assert!(html.contains("L.markerClusterGroup()"));
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_page_has_no_layers() {
        let layers = Leaflet::default().layers();
        assert!(layers["bounds"].is_null());
        assert!(layers["polylines"].as_array().unwrap().is_empty());
        assert!(layers["clusters"].as_array().unwrap().is_empty());
        assert_eq!(layers["view"]["zoom"], 6);
    }

    #[test]
    fn reads_page_options_from_config() {
        let mut config = ServiceConfig::new("leaflet");
        config.set_parameter("title", "B 1234 XY".into());
        config.set_parameter("zoom", 9.into());
        config.set_parameter("center_latitude", 1.25.into());
        let page = Leaflet::from_config(&config).unwrap();
        assert_eq!(page.title, "B 1234 XY");
        assert_eq!(page.zoom, 9);
        assert_eq!(page.center_latitude, 1.25);

        config.set_parameter("zoom", "close".into());
        assert!(Leaflet::from_config(&config).is_err());
    }
}
