//! Trim a grid file and its model output to a longitude/latitude box
//!
//! This is a plain boolean-mask filter over cell centers. It loads every
//! variable into memory, so it is meant for regional subsets of moderately
//! sized meshes rather than global high-resolution output.

use crate::coords::{promote_iso_levels, LAT_CELL, LON_CELL, N_CELLS, TIME};
use crate::dataset::{DataVariable, Dataset};
use crate::errors::{MpasPostError, Result};
use crate::geo::{radians_to_degrees, wrap_longitude, BoundingBox};
use ndarray::Ix1;
use std::path::Path;
use tracing::{debug, info};

/// Open a grid file with cell coordinates converted to degrees
///
/// `lonCell` is wrapped into `[-180, 180)`.
pub fn open_grid<P: AsRef<Path>>(grid_path: P) -> Result<Dataset> {
    let mut grid = Dataset::open(grid_path)?;
    for name in [LON_CELL, LAT_CELL] {
        let var = grid.variable(name)?;
        let mut degrees = radians_to_degrees(grid.numeric(name)?);
        if name == LON_CELL {
            degrees.mapv_inplace(wrap_longitude);
        }
        let mut converted = DataVariable::numeric(
            &var.dims.iter().map(String::as_str).collect::<Vec<_>>(),
            degrees,
        )?;
        converted.attributes = var.attributes.clone();
        converted
            .attributes
            .insert("units".to_string(), crate::dataset::AttrValue::Str("degrees".into()));
        grid.insert_variable(name, converted)?;
    }
    Ok(grid)
}

/// Open several output files, normalize their coordinates and stack them along `Time`
pub fn open_mfdataset<P: AsRef<Path>>(data_paths: &[P]) -> Result<Dataset> {
    if data_paths.is_empty() {
        return Err(MpasPostError::Generic("no data files given".to_string()));
    }
    let datasets = data_paths
        .iter()
        .map(|p| Dataset::open(p).and_then(promote_iso_levels))
        .collect::<Result<Vec<_>>>()?;
    debug!(files = datasets.len(), "concatenating along {}", TIME);
    Dataset::concat(&datasets, TIME)
}

/// Filter an already opened grid (degrees) and data set by `bbox`
///
/// The grid keeps only `latCell` and `lonCell`; the data keeps every variable,
/// with those along `nCells` reduced to the cells inside the box.
pub fn trim_datasets(grid: &Dataset, data: &Dataset, bbox: &BoundingBox) -> Result<(Dataset, Dataset)> {
    let lon = grid
        .numeric(LON_CELL)?
        .view()
        .into_dimensionality::<Ix1>()?;
    let lat = grid
        .numeric(LAT_CELL)?
        .view()
        .into_dimensionality::<Ix1>()?;

    let mask = bbox.mask(lon, lat)?.to_vec();
    let kept = mask.iter().filter(|&&m| m).count();
    info!(kept, total = mask.len(), "cells inside bounding box");

    let trimmed_grid = grid.select(&[LAT_CELL, LON_CELL])?.where_mask(N_CELLS, &mask)?;
    let trimmed_data = data.where_mask(N_CELLS, &mask)?;
    Ok((trimmed_grid, trimmed_data))
}

/// Trim grid file and data files to the given bounds
///
/// Bounds are in degrees, lower inclusive and upper exclusive, with longitudes
/// in `[-180, 180)`.
pub fn trim_ll<G, D>(
    grid_path: G,
    data_paths: &[D],
    lon_bounds: (f64, f64),
    lat_bounds: (f64, f64),
) -> Result<(Dataset, Dataset)>
where
    G: AsRef<Path>,
    D: AsRef<Path>,
{
    let bbox = BoundingBox::new(lon_bounds, lat_bounds)?;
    let grid = open_grid(grid_path)?;
    let data = open_mfdataset(data_paths)?;
    trim_datasets(&grid, &data, &bbox)
}
