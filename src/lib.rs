//! mpas_post: post-processing helpers for MPAS unstructured-mesh output
//!
//! Small utilities for working with MPAS atmospheric model output once it has
//! been written to NetCDF. None of them does numerical modeling; they reshape,
//! relabel and filter fields that the model already produced.
//!
//! ## Key Features
//!
//! - **Coordinate normalization**: promote iso-level index dimensions to labelled coordinates
//! - **Reflectivity conversion**: linear Z <-> dBZ, keeping grid metadata attached
//! - **Bounding-box trimming**: cut a grid file and multi-file output down to a region
//! - **Map decoration**: gridline ticks and labels for regional plots
//! - **Time metadata**: decode `xtime`, derive forecast hours and ensemble members
//!
//! ## Module Organization
//!
//! - [`dataset`]: in-memory labeled datasets loaded from NetCDF
//! - [`coords`]: MPAS coordinate names and iso-level promotion
//! - [`geo`]: longitude wrapping and bounding boxes
//! - [`grid`]: unstructured grids and grid-attached arrays
//! - [`reflectivity`]: Z/dBZ conversion
//! - [`trim`]: bounding-box subsetting of grid and data files
//! - [`times`]: valid time, forecast hour and member extraction
//! - [`axes`]: map axis decoration
//! - [`netcdf_io`]: writing datasets back to NetCDF
//! - [`metadata`]: terminal summaries
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mpas_post::prelude::*;
//!
//! let (grid, data) = trim_ll(
//!     "x1.40962.static.nc",
//!     &["diag.2024-05-07_00.00.00.nc", "diag.2024-05-07_01.00.00.nc"],
//!     (-105.0, -90.0),
//!     (30.0, 40.0),
//! )
//! .unwrap();
//!
//! let refl = data.numeric("refl10cm").unwrap();
//! let dbz_mean = mpas_post::reflectivity::mean_dbz(refl);
//! ```

// Core modules
pub mod axes;
pub mod cli;
pub mod coords;
pub mod dataset;
pub mod errors;
pub mod geo;
pub mod grid;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod reflectivity;
pub mod times;
pub mod trim;

pub use errors::{MpasPostError, Result};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::axes::MapDecoration;
    pub use crate::coords::promote_iso_levels;
    pub use crate::dataset::{AttrValue, DataVariable, Dataset, VariableData};
    pub use crate::errors::{MpasPostError, Result};
    pub use crate::geo::{wrap_longitude, BoundingBox};
    pub use crate::grid::{UxDataArray, UxGrid};
    pub use crate::netcdf_io::DatasetWriter;
    pub use crate::parallel::ParallelConfig;
    pub use crate::reflectivity::{dbz_func, to_dbz, to_linear, Reflectivity};
    pub use crate::times::{assign_time_metadata, TimeMetadata};
    pub use crate::trim::{trim_datasets, trim_ll};
}
