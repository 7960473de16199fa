//! Defines command-line interface options using `clap` for mpas-post.

use crate::geo::Bounds;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Post-processing helpers for MPAS unstructured-mesh output
#[derive(Parser, Debug)]
#[command(
    version,
    name = "mpas-post",
    about = "Trim, convert and inspect MPAS model output"
)]
pub struct Args {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trim a grid file and data files to a longitude/latitude box
    Trim {
        /// MPAS grid (static/init) file with lonCell/latCell in radians
        #[arg(long)]
        grid: PathBuf,

        /// Data files, concatenated along Time in the order given
        #[arg(long, num_args = 1.., required = true)]
        data: Vec<PathBuf>,

        /// Longitude bounds in degrees, formatted as <west>:<east>
        #[arg(long, allow_hyphen_values = true)]
        lon: Bounds,

        /// Latitude bounds in degrees, formatted as <south>:<north>
        #[arg(long, allow_hyphen_values = true)]
        lat: Bounds,

        /// Where to write the trimmed grid
        #[arg(long)]
        grid_out: Option<PathBuf>,

        /// Where to write the trimmed data
        #[arg(long)]
        data_out: Option<PathBuf>,
    },

    /// Print valid times, forecast hours and ensemble member of an output file
    Times {
        /// Path to the MPAS output file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to parse the ensemble member from. Defaults to --file.
        #[arg(long)]
        member_path: Option<PathBuf>,

        /// Write the file with valid_time/forecast_hour/member added
        #[arg(long)]
        output_netcdf: Option<PathBuf>,
    },

    /// Print map decoration settings as JSON
    Axes {
        /// Map extent as <west>,<east>,<south>,<north>
        #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values = true)]
        extent: Vec<f64>,
    },

    /// Convert linear reflectivity to dBZ
    Dbz {
        /// Path to the MPAS output file
        #[arg(short, long)]
        file: PathBuf,

        /// Linear reflectivity variable
        #[arg(long)]
        var: String,

        /// Grid file to attach to the result
        #[arg(long)]
        grid: Option<PathBuf>,

        /// Path to save the result as NetCDF. If not set, prints a summary.
        #[arg(long)]
        output_netcdf: Option<PathBuf>,
    },

    /// List dimensions, variables and attributes of a file
    Info {
        /// Path to the NetCDF file
        #[arg(short, long)]
        file: PathBuf,
    },
}
