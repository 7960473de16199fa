//! Radar reflectivity unit conversion
//!
//! Reflectivity is stored either as linear Z (mm^6 m^-3) or logarithmic dBZ.
//! Averaging and other arithmetic should happen on linear Z, so [`dbz_func`]
//! linearizes, applies the operation and converts back.
//!
//! Conversions preserve the container type: plain arrays stay plain arrays and
//! a [`UxDataArray`] keeps its grid.

use crate::grid::UxDataArray;
use ndarray::{ArrayBase, ArrayD, Data, Dimension};

/// dBZ from linear Z
#[inline]
pub fn z_to_dbz(z: f64) -> f64 {
    10.0 * z.log10()
}

/// Linear Z from dBZ
#[inline]
pub fn dbz_to_z(dbz: f64) -> f64 {
    10f64.powf(dbz / 10.0)
}

/// Containers of reflectivity values that can be mapped element-wise
pub trait Reflectivity: Sized {
    fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64;
}

impl Reflectivity for ArrayD<f64> {
    fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        self.mapv(f)
    }
}

impl Reflectivity for UxDataArray {
    fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        self.with_data(self.data.mapv(f))
    }
}

/// Logarithmic dBZ from linear Z; non-positive Z gives `-inf` or NaN
pub fn to_dbz<T: Reflectivity>(z: &T) -> T {
    z.map_values(z_to_dbz)
}

/// Linear Z from logarithmic dBZ
pub fn to_linear<T: Reflectivity>(dbz: &T) -> T {
    dbz.map_values(dbz_to_z)
}

/// Apply `func` to linearized Z and return the result in dBZ
pub fn dbz_func<T, F>(dbz: &T, func: F) -> T
where
    T: Reflectivity,
    F: FnOnce(T) -> T,
{
    let z = to_linear(dbz);
    to_dbz(&func(z))
}

/// Mean over all elements taken in linear Z, reported in dBZ
pub fn mean_dbz<S, D>(dbz: &ArrayBase<S, D>) -> Option<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let finite: Vec<f64> = dbz.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let mean_z = finite.iter().map(|&v| dbz_to_z(v)).sum::<f64>() / finite.len() as f64;
    Some(z_to_dbz(mean_z))
}
