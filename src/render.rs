//! Draw a vehicle track onto a map surface
use crate::gps::{Bounds, Location};
use crate::services::visualization::map::{MapSurface, Marker, MarkerCluster, PathStyle};
use crate::services::visualization::IconTable;
use crate::track::{classify_track, valid_points, TrackPoint};
use log::{debug, info};

/// Outcome of a single render pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderReport {
    markers: usize,
    skipped: usize,
    bounds: Option<Bounds>,
}

impl RenderReport {
    /// Number of markers placed on the map
    pub fn markers(&self) -> usize {
        self.markers
    }

    /// Number of points dropped because their coordinates were unusable
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Viewport the map was fitted to, None if nothing was drawn
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// Renders an ordered track as a path plus one classified marker per point
#[derive(Clone, Debug, Default)]
pub struct TrackRenderer {
    icons: IconTable,
    path_style: PathStyle,
}

impl TrackRenderer {
    pub fn new(icons: IconTable, path_style: PathStyle) -> Self {
        TrackRenderer { icons, path_style }
    }

    /// Draw the track onto the surface.
    ///
    /// Points with unusable coordinates are left out before anything else happens, so START
    /// and FINISH always land on the first and last drawable points. An empty track (or one
    /// with nothing drawable) leaves the surface untouched.
    pub fn render(&self, points: &[TrackPoint], surface: &mut dyn MapSurface) -> RenderReport {
        let total = points.len();
        let points = valid_points(points);
        let mut report = RenderReport {
            skipped: total - points.len(),
            ..Default::default()
        };

        let path: Vec<Location> = points.iter().map(|p| p.location()).collect();
        let bounds = match Bounds::from_path(&path) {
            Some(bounds) => bounds,
            None => {
                debug!("no drawable track points, nothing to render");
                return report;
            }
        };
        surface.add_polyline(&path, &self.path_style);
        surface.fit_bounds(bounds);

        let markers: Vec<Marker> = classify_track(&points)
            .into_iter()
            .zip(points.iter())
            .map(|(category, point)| {
                Marker::new(
                    point.location(),
                    category,
                    point.timestamp(),
                    self.icons.icon(category),
                )
            })
            .collect();

        report.markers = markers.len();
        report.bounds = Some(bounds);
        surface.add_marker_cluster(MarkerCluster::new(markers));
        info!("rendered track with {} markers", report.markers);
        report
    }
}
