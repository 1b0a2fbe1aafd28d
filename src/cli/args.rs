use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lidar-archiver")]
#[command(about = "Instrument CSV to netCDF conversion pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every catalogued source day that lacks a netCDF output
    Run,

    /// List catalogued source days awaiting conversion, without converting
    Pending {
        #[arg(long, help = "Emit pending records as JSON")]
        json: bool,
    },

    /// Convert a single lidar CSV triplet
    ConvertLidar {
        #[arg(short, long, help = "Per-gate measurement CSV (whole or radial wind product)")]
        radial: PathBuf,

        #[arg(short, long, help = "Scan-pattern CSV paired with the radial file")]
        scan: PathBuf,

        #[arg(short, long, help = "Summarized wind profile CSV")]
        wind: Option<PathBuf>,

        #[arg(long)]
        site: String,

        #[arg(long, help = "Measurement date (YYYY-MM-DD)")]
        date: NaiveDate,

        #[arg(
            short,
            long,
            help = "Output netCDF path [default: derived from the configured data root]"
        )]
        output: Option<PathBuf>,
    },

    /// Convert a single microwave-radiometer level-2 export
    ConvertMwr {
        #[arg(long, help = "Level-2 radiometer CSV")]
        lv2: PathBuf,

        #[arg(long)]
        site: String,

        #[arg(
            short,
            long,
            help = "Output netCDF path [default: <data_root>/<site>_mwr.nc]"
        )]
        output: Option<PathBuf>,
    },
}
