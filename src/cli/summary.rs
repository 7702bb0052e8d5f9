//! Define the summary subcommand
use super::read_track;
use crate::config::Config;
use crate::summary::TripSummary;
use std::path::PathBuf;
use structopt::StructOpt;

/// Show marker counts, distance, duration and estimated fuel use for a track
#[derive(Debug, StructOpt)]
pub struct SummaryOpts {
    /// JSON file holding the ordered track points, "-" reads from stdin
    #[structopt(name = "TRACK_FILE", parse(from_os_str))]
    track: PathBuf,
    /// Fuel economy in km per liter, overrides the configured value
    #[structopt(long)]
    efficiency: Option<f64>,
}

pub fn summary_command(config: Config, opts: SummaryOpts) -> Result<(), Box<dyn std::error::Error>> {
    let track = read_track(&opts.track)?;
    let efficiency = opts.efficiency.unwrap_or_else(|| config.fuel_efficiency());
    let summary = TripSummary::from_track(&track, efficiency);

    if let Some(vehicle) = track.iter().find_map(|p| p.vehicle()) {
        println!("Vehicle: {}", vehicle);
    }
    println!("{}", summary);
    Ok(())
}
