use gps_track_mapper::cli::Cli;
use log::trace;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};
use structopt::StructOpt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Cli::from_args();
    let config = opt.load_config()?;
    let level_filter = opt.verbosity(config.log_level());
    TermLogger::init(
        level_filter,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    trace!("loaded configuration: {:?}", config);

    // execute any subcommands
    opt.execute_subcommand(config)
}
