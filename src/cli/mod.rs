//! Define the application's command line interface
use crate::config::Config;
use crate::track::{load_track, TrackPoint};
use crate::Error;
use log::debug;
use simplelog::LevelFilter;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

mod classify;
use classify::{classify_command, ClassifyOpts};
mod render;
use render::{render_command, RenderOpts};
mod summary;
use summary::{summary_command, SummaryOpts};

/// Classify vehicle GPS tracks and draw them onto maps
#[derive(Debug, StructOpt)]
#[structopt(name = "gps-track-mapper")]
pub struct Cli {
    /// Set logging level to debug, use a second time (e.g. -vv) to set logging to trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,
    /// Suppress info logging messages use a second time (e.g. -qq) to hide warnings
    #[structopt(short, long, parse(from_occurrences))]
    quiet: i32,
    /// Configuration file to use instead of the one in the user's config directory
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Cli {
    /// Return the verbose flag counts as a log level filter
    pub fn verbosity(&self, default: LevelFilter) -> LevelFilter {
        if self.quiet == 1 {
            LevelFilter::Warn
        } else if self.quiet > 1 {
            LevelFilter::Error
        } else if self.verbose == 1 {
            LevelFilter::Debug
        } else if self.verbose > 1 {
            LevelFilter::Trace
        } else {
            default
        }
    }

    /// Read the configuration file, an absent default config file means built in defaults
    pub fn load_config(&self) -> Result<Config, Error> {
        match &self.config {
            Some(path) => Ok(Config::load(&mut File::open(path)?)?),
            None => {
                let path = Config::default_path();
                if path.exists() {
                    Ok(Config::load(&mut File::open(&path)?)?)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Consume options struct and return the result of subcommand execution
    pub fn execute_subcommand(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd.execute(config)
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Draw a track onto a map
    #[structopt(name = "render")]
    Render(RenderOpts),
    /// Print the display category of every track point
    #[structopt(name = "classify")]
    Classify(ClassifyOpts),
    /// Print trip statistics for a track
    #[structopt(name = "summary")]
    Summary(SummaryOpts),
}

impl Command {
    /// Consume enum variant and return the result of the command's execution
    fn execute(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Command::Render(opts) => render_command(config, opts),
            Command::Classify(opts) => classify_command(opts),
            Command::Summary(opts) => summary_command(config, opts),
        }
    }
}

/// Read track points from a JSON file, "-" reads from stdin
fn read_track(path: &Path) -> Result<Vec<TrackPoint>, Error> {
    let track = if path.to_string_lossy() == "-" {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        load_track(&mut handle)?
    } else {
        load_track(&mut File::open(path)?)?
    };
    debug!("read {} track points from {:?}", track.len(), path);
    Ok(track)
}

/// Write data to the file, stdout is used when no file or "-" is given
fn write_output(output: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match output {
        Some(path) if path.to_string_lossy() != "-" => {
            let mut fp = File::create(path)?;
            fp.write_all(data)
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)
        }
    }
}
