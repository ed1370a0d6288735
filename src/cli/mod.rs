use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod info;
mod input;

use config::Overrides;

/// scopetrace - Oscilloscope Capture Decoder
#[derive(Parser)]
#[command(name = "scopetrace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a capture, derive filtered traces and write CSV
    Convert {
        /// Input capture (.isf channel file or .alb file)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV path (defaults to <capture>.csv next to the input)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load pipeline settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Only transform these traces (names after renaming)
        #[arg(long, value_name = "NAME", value_delimiter = ',')]
        channels: Vec<String>,

        /// Add exponentially smoothed traces (<name>_alpha)
        #[arg(long)]
        alpha: bool,

        /// Add windowed RMS traces (<name>_rms)
        #[arg(long)]
        rms: bool,

        /// Add windowed mean traces (<name>_avg)
        #[arg(long)]
        avg: bool,

        /// Add windowed volt-second traces (<name>_vs)
        #[arg(long)]
        voltsec: bool,

        /// Window frequency in Hz for RMS, mean and volt-second
        #[arg(short = 'f', long)]
        frequency: Option<f64>,

        /// Block-average the output by this ratio
        #[arg(short = 'd', long, value_name = "R")]
        decimate: Option<usize>,

        /// Scale ALB amplitudes by the probe ratio from the setup file
        #[arg(long)]
        probe: bool,

        /// Also write a JSON summary next to the CSV
        #[arg(long)]
        json: bool,
    },

    /// Display header fields and trace statistics of a capture
    Info {
        /// Input capture (.isf channel file or .alb file)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            channels,
            alpha,
            rms,
            avg,
            voltsec,
            frequency,
            decimate,
            probe,
            json,
        } => convert::run(
            input,
            output,
            config,
            Overrides {
                alpha,
                rms,
                avg,
                voltsec,
                frequency,
                channels,
                decimate,
                probe_attenuation: probe,
            },
            json,
        ),
        Commands::Info { file } => info::run(file),
    }
}
