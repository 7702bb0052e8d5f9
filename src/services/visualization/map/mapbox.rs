//! Use the MapBox static images API to draw the track as a PNG
use super::{MapSurface, Marker, MarkerCluster, PathStyle};
use crate::config::ServiceConfig;
use crate::gps::{encode_coordinates, Bounds, Location};
use crate::track::MarkerCategory;
use crate::{set_int_param_from_config, set_string_param_from_config};
use crate::Error;
use log::warn;
use reqwest::blocking::Client;

/// Pin size, optional label and color for each marker category
fn pin_style(category: MarkerCategory) -> (&'static str, Option<&'static str>, &'static str) {
    match category {
        MarkerCategory::Start => ("l", Some("s"), "2ecc71"),
        MarkerCategory::Finish => ("l", Some("f"), "e74c3c"),
        MarkerCategory::Parked => ("s", Some("p"), "3498db"),
        MarkerCategory::Stopped => ("s", Some("x"), "f39c12"),
        MarkerCategory::Moving => ("s", None, "7f8c8d"),
    }
}

/// Defines parameters to interact with the MapBox API
#[derive(Debug)]
pub struct MapBox {
    base_url: String,
    api_version: String,
    username: String,
    style: String,
    image_width: u32,
    image_height: u32,
    access_token: String,
    paths: Vec<(Vec<Location>, PathStyle)>,
    markers: Vec<Marker>,
    bounds: Option<Bounds>,
}

impl MapBox {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut base = Self::default();
        for key in config.parameters() {
            match key.as_ref() {
                "base_url" => set_string_param_from_config!(base, base_url, config),
                "api_version" => set_string_param_from_config!(base, api_version, config),
                "username" => set_string_param_from_config!(base, username, config),
                "style" => set_string_param_from_config!(base, style, config),
                "image_width" => set_int_param_from_config!(base, image_width, config, u32),
                "image_height" => set_int_param_from_config!(base, image_height, config, u32),
                "access_token" => set_string_param_from_config!(base, access_token, config),
                _ => warn!(
                    "unknown configuration parameter for MapBox: {}={:?}",
                    key,
                    config.get_parameter(key)
                ),
            }
        }
        Ok(base)
    }

    fn request_url(&self) -> Result<String, Error> {
        let mut overlays = Vec::new();
        for (path, style) in &self.paths {
            let encoded = encode_coordinates(path).map_err(Error::Other)?;
            // hacky way to encode the path, we need to drop the leading '=' sign
            // from the call to form_urlencoded which is meant for key=value pairs
            let encoded = form_urlencoded::Serializer::new(String::new())
                .append_pair("", &encoded)
                .finish();
            overlays.push(format!(
                "path-{}+{}-{}({})",
                style.weight(),
                style.color().trim_start_matches('#'),
                style.opacity(),
                &encoded[1..]
            ));
        }
        for marker in &self.markers {
            let (size, label, color) = pin_style(marker.category());
            let label = label.map(|l| format!("-{}", l)).unwrap_or_default();
            overlays.push(format!(
                "pin-{}{}+{}({:.5},{:.5})",
                size,
                label,
                color,
                marker.longitude(),
                marker.latitude()
            ));
        }

        let viewport = match self.bounds {
            // a single point has a zero area box, let mapbox pick the zoom
            Some(b) if b.south_west() == b.north_east() => "auto".to_string(),
            Some(b) => format!(
                "[{:.5},{:.5},{:.5},{:.5}]",
                b.south_west().longitude(),
                b.south_west().latitude(),
                b.north_east().longitude(),
                b.north_east().latitude()
            ),
            None => "auto".to_string(),
        };
        let url = format!(
            "{}/styles/{}/{}/{}/static/{}/{}/{}x{}",
            self.base_url,
            self.api_version,
            self.username,
            self.style,
            overlays.join(","),
            viewport,
            self.image_width,
            self.image_height,
        );

        // mapbox has a URL limit of 8192 bytes, the access_token=[..] part in the query takes up
        // around 100 bytes by itself
        if url.len() > 8192 {
            warn!(
                "URL length exceeds 8KB due to a long track, request may fail (size={:.2}KB).",
                url.len() as f32 / 1024.0
            );
        }

        Ok(url)
    }
}

impl Default for MapBox {
    fn default() -> Self {
        MapBox {
            base_url: "https://api.mapbox.com".to_string(),
            api_version: "v1".to_string(),
            username: "mapbox".to_string(),
            style: "streets-v11".to_string(),
            image_width: 1280,
            image_height: 1280,
            access_token: String::new(),
            paths: Vec::new(),
            markers: Vec::new(),
            bounds: None,
        }
    }
}

impl MapSurface for MapBox {
    fn add_polyline(&mut self, path: &[Location], style: &PathStyle) {
        self.paths.push((path.to_vec(), style.clone()));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    fn add_marker_cluster(&mut self, cluster: MarkerCluster) {
        // static images have no clustering, every marker becomes a pin
        self.markers.extend_from_slice(cluster.markers());
    }

    fn output(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        // request image data
        let client = Client::new();
        let request_url = self.request_url()?;
        let resp = client
            .get(&request_url)
            .query(&[("access_token", &self.access_token)])
            .send()?;
        if resp.status().is_success() {
            // return image data
            match resp.bytes() {
                Ok(data) => Ok(data.into_iter().collect()),
                Err(e) => Err(Box::new(e)),
            }
        } else {
            let code = resp.status();
            Err(Box::new(Error::RequestError(
                code,
                "MapBox drawing failed".to_string(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::visualization::IconTable;

    fn marker(location: Location, category: MarkerCategory) -> Marker {
        Marker::new(location, category, "", IconTable::default().icon(category))
    }

    #[test]
    fn builds_overlays_and_viewport() {
        let mut image = MapBox::default();
        let path = [Location::new(38.5, -120.2), Location::new(40.7, -120.95)];
        image.add_polyline(&path, &PathStyle::default());
        image.fit_bounds(Bounds::from_path(&path).unwrap());
        image.add_marker_cluster(MarkerCluster::new(vec![
            marker(path[0], MarkerCategory::Start),
            marker(path[1], MarkerCategory::Moving),
        ]));

        let url = image.request_url().unwrap();
        assert!(url.starts_with("https://api.mapbox.com/styles/v1/mapbox/streets-v11/static/"));
        assert!(url.contains("path-4+007bff-0.8("));
        assert!(url.contains("pin-l-s+2ecc71(-120.20000,38.50000)"));
        assert!(url.contains("pin-s+7f8c8d(-120.95000,40.70000)"));
        assert!(url.ends_with("/[-120.95000,38.50000,-120.20000,40.70000]/1280x1280"));
    }

    #[test]
    fn auto_viewport_for_single_point() {
        let mut image = MapBox::default();
        let path = [Location::new(-6.2, 106.8)];
        image.add_polyline(&path, &PathStyle::default());
        image.fit_bounds(Bounds::from_path(&path).unwrap());
        image.add_marker_cluster(MarkerCluster::new(vec![marker(path[0], MarkerCategory::Start)]));

        let url = image.request_url().unwrap();
        assert!(url.contains("pin-l-s+2ecc71(106.80000,-6.20000)"));
        assert!(url.ends_with("/auto/1280x1280"));
    }

    #[test]
    fn auto_viewport_without_bounds() {
        let url = MapBox::default().request_url().unwrap();
        assert!(url.ends_with("/static//auto/1280x1280"));
    }
}
