//! Entry point for the mpas-post application.
//! Handles CLI parsing, logging setup, and dispatches the trim/times/axes/dbz/info operations.

use clap::Parser;
use mpas_post::cli::{Args, Command};
use mpas_post::prelude::*;
use mpas_post::{metadata, reflectivity, times};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    ParallelConfig::from_arg(args.threads).setup_global_pool()?;

    match args.command {
        Command::Trim {
            grid,
            data,
            lon,
            lat,
            grid_out,
            data_out,
        } => {
            let (trimmed_grid, trimmed_data) = trim_ll(&grid, data.as_slice(), lon.into(), lat.into())?;
            if let Some(path) = grid_out {
                DatasetWriter::new(&path).write(&trimmed_grid)?;
                println!("✅ Saved trimmed grid to {}", path.display());
            }
            match data_out {
                Some(path) => {
                    DatasetWriter::new(&path).write(&trimmed_data)?;
                    println!("✅ Saved trimmed data to {}", path.display());
                }
                None => metadata::print_dataset_summary(&trimmed_data),
            }
        }

        Command::Times {
            file,
            member_path,
            output_netcdf,
        } => {
            let ds = Dataset::open(&file)?;
            let member_source = member_path.as_deref().unwrap_or(file.as_path());
            let meta = TimeMetadata::from_dataset(&ds, Some(member_source))?;
            metadata::describe_time_metadata(&meta);

            if let Some(path) = output_netcdf {
                let annotated = times::assign_time_metadata(&ds, &meta)?;
                DatasetWriter::new(&path).write(&annotated)?;
                println!("✅ Saved result to {}", path.display());
            }
        }

        Command::Axes { extent } => {
            let extent: [f64; 4] = extent
                .try_into()
                .map_err(|_| MpasPostError::Generic("extent needs exactly 4 values".to_string()))?;
            let decoration = MapDecoration::new(extent)?;
            println!("{}", decoration.to_json()?);
        }

        Command::Dbz {
            file,
            var,
            grid,
            output_netcdf,
        } => {
            let ds = Dataset::open(&file)?;
            let dbz_name = format!("{}_dbz", var);

            let (dims, dbz) = match grid {
                Some(grid_path) => {
                    let uxgrid = Arc::new(UxGrid::from_dataset(&Dataset::open(&grid_path)?)?);
                    let z = UxDataArray::from_dataset(&ds, &var, uxgrid)?;
                    let converted = reflectivity::to_dbz(&z);
                    info!(cells = converted.uxgrid.n_cells(), "reflectivity kept on grid");
                    (converted.dims, converted.data)
                }
                None => {
                    let z = ds.numeric(&var)?;
                    (ds.variable(&var)?.dims.clone(), reflectivity::to_dbz(z))
                }
            };

            print_dbz_summary(&dbz_name, &dbz);

            if let Some(path) = output_netcdf {
                write_dbz(&ds, &var, &dbz_name, dims, dbz, &path)?;
                println!("✅ Saved result to {}", path.display());
            }
        }

        Command::Info { file } => {
            let ds = Dataset::open(&file)?;
            println!("Successfully opened NetCDF file: {}", file.display());
            metadata::print_dataset_summary(&ds);
        }
    }

    Ok(())
}

fn print_dbz_summary(name: &str, dbz: &ndarray::ArrayD<f64>) {
    let finite: Vec<f64> = dbz.iter().copied().filter(|v| v.is_finite()).collect();
    println!("\n Summary for Variable: {}", name);
    println!("================================");
    if finite.is_empty() {
        println!("   ⚠ No finite values (all reflectivity <= 0)");
        return;
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!("   Min: {:.2} dBZ", min);
    println!("   Max: {:.2} dBZ", max);
    if let Some(mean) = reflectivity::mean_dbz(dbz) {
        println!("   Mean (linear Z): {:.2} dBZ", mean);
    }
    println!("   Finite elements: {} / {}", finite.len(), dbz.len());
}

fn write_dbz(
    ds: &Dataset,
    var: &str,
    dbz_name: &str,
    dims: Vec<String>,
    dbz: ndarray::ArrayD<f64>,
    path: &Path,
) -> mpas_post::Result<()> {
    let mut out = ds.select(&[var])?;
    let dim_refs: Vec<&str> = dims.iter().map(String::as_str).collect();
    let variable = DataVariable::numeric(&dim_refs, dbz)?
        .with_attribute("units", AttrValue::Str("dBZ".to_string()));
    out.insert_variable(dbz_name, variable)?;
    DatasetWriter::new(path).write(&out)
}
