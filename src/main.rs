//! # scopetrace
//!
//! Command-line front end for decoding oscilloscope captures.
//!
//! ## Usage
//!
//! ```bash
//! # Decode all channels of a Tektronix capture and add 50 Hz RMS traces
//! scopetrace convert tek0000CH1.isf --rms
//!
//! # Agilent capture with a config file, block-averaged by 10
//! scopetrace convert scope_0.alb out.csv --config scopetrace.toml -d 10
//!
//! # Inspect headers and statistics
//! scopetrace info scope_0.alb
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
