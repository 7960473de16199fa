//! Unstructured grid definitions and grid-attached data arrays

use crate::coords::{LAT_CELL, LON_CELL, N_CELLS};
use crate::dataset::Dataset;
use crate::errors::{MpasPostError, Result};
use crate::geo::{radians_to_degrees, wrap_longitude};
use ndarray::{Array1, ArrayD, Ix1};
use std::sync::Arc;

/// Cell-center coordinates of an MPAS mesh, in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct UxGrid {
    pub lon_cell: Array1<f64>,
    pub lat_cell: Array1<f64>,
}

impl UxGrid {
    pub fn new(lon_cell: Array1<f64>, lat_cell: Array1<f64>) -> Result<Self> {
        if lon_cell.len() != lat_cell.len() {
            return Err(MpasPostError::ShapeMismatch {
                message: format!(
                    "grid has {} cell longitudes but {} cell latitudes",
                    lon_cell.len(),
                    lat_cell.len()
                ),
            });
        }
        Ok(Self { lon_cell, lat_cell })
    }

    /// Build from a grid dataset whose `lonCell`/`latCell` are in radians
    pub fn from_dataset(ds: &Dataset) -> Result<Self> {
        let lon = cell_coordinate(ds, LON_CELL)?.mapv(wrap_longitude);
        let lat = cell_coordinate(ds, LAT_CELL)?;
        Self::new(lon, lat)
    }

    pub fn n_cells(&self) -> usize {
        self.lon_cell.len()
    }
}

fn cell_coordinate(ds: &Dataset, name: &str) -> Result<Array1<f64>> {
    let degrees = radians_to_degrees(ds.numeric(name)?);
    degrees
        .into_dimensionality::<Ix1>()
        .map_err(MpasPostError::from)
}

/// A data array carrying the grid it lives on
#[derive(Debug, Clone)]
pub struct UxDataArray {
    pub name: String,
    pub dims: Vec<String>,
    pub data: ArrayD<f64>,
    pub uxgrid: Arc<UxGrid>,
}

impl UxDataArray {
    pub fn new(name: &str, dims: Vec<String>, data: ArrayD<f64>, uxgrid: Arc<UxGrid>) -> Result<Self> {
        if dims.len() != data.ndim() {
            return Err(MpasPostError::ShapeMismatch {
                message: format!("{} dims for an array of rank {}", dims.len(), data.ndim()),
            });
        }
        if let Some(axis) = dims.iter().position(|d| d == N_CELLS) {
            if data.shape()[axis] != uxgrid.n_cells() {
                return Err(MpasPostError::ShapeMismatch {
                    message: format!(
                        "'{}' has {} cells but the grid has {}",
                        name,
                        data.shape()[axis],
                        uxgrid.n_cells()
                    ),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            dims,
            data,
            uxgrid,
        })
    }

    /// Take a numeric variable out of a dataset and attach a grid to it
    pub fn from_dataset(ds: &Dataset, name: &str, uxgrid: Arc<UxGrid>) -> Result<Self> {
        let var = ds.variable(name)?;
        let data = ds.numeric(name)?.clone();
        Self::new(name, var.dims.clone(), data, uxgrid)
    }

    /// Same grid and labels, new values
    pub fn with_data(&self, data: ArrayD<f64>) -> Self {
        Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            data,
            uxgrid: Arc::clone(&self.uxgrid),
        }
    }
}
