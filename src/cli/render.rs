//! Define render subcommand
use super::{read_track, write_output};
use crate::config::Config;
use crate::render::TrackRenderer;
use log::{info, warn};
use std::path::PathBuf;
use structopt::StructOpt;

/// Draw the track with classified markers using the configured map handler
#[derive(Debug, StructOpt)]
pub struct RenderOpts {
    /// JSON file holding the ordered track points, "-" reads from stdin
    #[structopt(name = "TRACK_FILE", parse(from_os_str))]
    track: PathBuf,
    /// name of file to output map data to, if not provided or "-" is used data is written to stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Map handler to use instead of the configured one (leaflet, geojson or mapbox)
    #[structopt(long)]
    handler: Option<String>,
}

pub fn render_command(config: Config, opts: RenderOpts) -> Result<(), Box<dyn std::error::Error>> {
    let mut surface = config.get_route_visualization_handler(opts.handler.as_deref())?;
    let track = read_track(&opts.track)?;

    let renderer = TrackRenderer::new(config.icon_table(), config.path_style().clone());
    let report = renderer.render(&track, surface.as_mut());
    if report.skipped() > 0 {
        warn!(
            "{} of {} track points had invalid coordinates and were not drawn",
            report.skipped(),
            track.len()
        );
    }
    if report.markers() == 0 {
        warn!("track {:?} has no drawable points, the map will be empty", opts.track);
    }

    let data = surface.output()?;
    write_output(opts.output.as_deref(), &data)?;
    info!("wrote {} bytes of map data", data.len());
    Ok(())
}
