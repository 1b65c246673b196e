use std::fs::File;

use anyhow::Result;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

/// Default log file, written next to wherever the client runs. The terminal
/// owns stdout, so logs go to a file.
const LOG_FILE: &str = "reelfeed_debug.log";

pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), File::create(LOG_FILE)?)?;
    Ok(())
}
