//! MPAS coordinate names and coordinate normalization
//!
//! MPAS diagnostic output stores isobaric-level values in the variables
//! `t_iso_levels` and `z_iso_levels` but indexes them with the anonymous
//! dimensions `nIsoLevelsT` and `nIsoLevelsZ`. Promoting those variables to
//! dimension coordinates makes the level values usable as labels.

use crate::dataset::Dataset;
use crate::errors::Result;
use std::collections::HashMap;
use tracing::debug;

pub const N_CELLS: &str = "nCells";
pub const TIME: &str = "Time";
pub const STR_LEN: &str = "StrLen";
pub const LON_CELL: &str = "lonCell";
pub const LAT_CELL: &str = "latCell";
pub const XTIME: &str = "xtime";

pub const T_ISO_LEVELS: &str = "t_iso_levels";
pub const Z_ISO_LEVELS: &str = "z_iso_levels";
pub const N_ISO_LEVELS_T: &str = "nIsoLevelsT";
pub const N_ISO_LEVELS_Z: &str = "nIsoLevelsZ";

/// Swap the iso-level index dimensions for their coordinate variables
///
/// Datasets without `t_iso_levels` are returned unchanged.
pub fn promote_iso_levels(ds: Dataset) -> Result<Dataset> {
    if !ds.contains(T_ISO_LEVELS) {
        return Ok(ds);
    }

    let swaps = HashMap::from([
        (N_ISO_LEVELS_T, T_ISO_LEVELS),
        (N_ISO_LEVELS_Z, Z_ISO_LEVELS),
    ]);
    debug!("promoting iso level coordinates");
    ds.swap_dims(&swaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataVariable;
    use crate::errors::MpasPostError;
    use ndarray::{arr1, arr2};

    fn diag(with_z: bool) -> Dataset {
        let mut ds = Dataset::new();
        ds.insert_variable(
            T_ISO_LEVELS,
            DataVariable::numeric(&[N_ISO_LEVELS_T], arr1(&[85000.0, 50000.0]).into_dyn()).unwrap(),
        )
        .unwrap();
        if with_z {
            ds.insert_variable(
                Z_ISO_LEVELS,
                DataVariable::numeric(&[N_ISO_LEVELS_Z], arr1(&[50000.0]).into_dyn()).unwrap(),
            )
            .unwrap();
        }
        ds.insert_variable(
            "temperature_isobaric",
            DataVariable::numeric(
                &[N_CELLS, N_ISO_LEVELS_T],
                arr2(&[[280.0, 250.0], [281.0, 251.0]]).into_dyn(),
            )
            .unwrap(),
        )
        .unwrap();
        ds
    }

    #[test]
    fn renames_iso_level_dims() {
        let ds = promote_iso_levels(diag(true)).unwrap();
        let temp = ds.variable("temperature_isobaric").unwrap();
        assert_eq!(temp.dims, vec![N_CELLS, T_ISO_LEVELS]);
        assert_eq!(ds.variable(T_ISO_LEVELS).unwrap().dims, vec![T_ISO_LEVELS]);
        assert_eq!(ds.dim_len(T_ISO_LEVELS), Some(2));
        assert!(ds.dim_len(N_ISO_LEVELS_T).is_none());
    }

    #[test]
    fn leaves_other_datasets_alone() {
        let mut ds = Dataset::new();
        ds.insert_variable(
            "rainnc",
            DataVariable::numeric(&[N_CELLS], arr1(&[0.0, 1.5]).into_dyn()).unwrap(),
        )
        .unwrap();
        let out = promote_iso_levels(ds.clone()).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn missing_z_levels_is_an_error() {
        let result = promote_iso_levels(diag(false));
        assert!(matches!(
            result,
            Err(MpasPostError::DimensionNotFound { .. }) | Err(MpasPostError::VariableNotFound { .. })
        ));
    }
}
