//! Define the classify subcommand
use super::read_track;
use crate::track::{classify_track, valid_points};
use std::path::PathBuf;
use structopt::StructOpt;

/// List every drawable track point with the category it would be rendered as
#[derive(Debug, StructOpt)]
pub struct ClassifyOpts {
    /// JSON file holding the ordered track points, "-" reads from stdin
    #[structopt(name = "TRACK_FILE", parse(from_os_str))]
    track: PathBuf,
}

pub fn classify_command(opts: ClassifyOpts) -> Result<(), Box<dyn std::error::Error>> {
    let track = read_track(&opts.track)?;
    let points = valid_points(&track);

    println!("Category, Timestamp, Latitude, Longitude");
    for (category, point) in classify_track(&points).into_iter().zip(points.iter()) {
        let location = point.location();
        println!(
            "{}, {}, {:.6}, {:.6}",
            category,
            point.timestamp(),
            location.latitude(),
            location.longitude()
        );
    }

    Ok(())
}
