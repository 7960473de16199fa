//! Longitude/latitude helpers and bounding boxes

use crate::errors::{MpasPostError, Result};
use ndarray::{Array1, ArrayBase, ArrayD, ArrayView1, Data, Dimension, Zip};
use std::str::FromStr;

/// Wrap a longitude in degrees into `[-180, 180)`
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Convert an array of radians to degrees
pub fn radians_to_degrees<S, D>(values: &ArrayBase<S, D>) -> ArrayD<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    values.mapv(f64::to_degrees).into_dyn()
}

/// Axis-aligned longitude/latitude box, lower bounds inclusive, upper exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon: (f64, f64),
    pub lat: (f64, f64),
}

impl BoundingBox {
    pub fn new(lon: (f64, f64), lat: (f64, f64)) -> Result<Self> {
        check_range("longitude", lon)?;
        check_range("latitude", lat)?;
        Ok(Self { lon, lat })
    }

    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon.0 && lon < self.lon.1 && lat >= self.lat.0 && lat < self.lat.1
    }

    /// Per-cell inclusion mask
    pub fn mask(&self, lon: ArrayView1<'_, f64>, lat: ArrayView1<'_, f64>) -> Result<Array1<bool>> {
        if lon.len() != lat.len() {
            return Err(MpasPostError::ShapeMismatch {
                message: format!(
                    "{} longitudes but {} latitudes",
                    lon.len(),
                    lat.len()
                ),
            });
        }
        Ok(Zip::from(&lon)
            .and(&lat)
            .par_map_collect(|&x, &y| self.contains(x, y)))
    }
}

fn check_range(what: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(MpasPostError::InvalidBounds {
            message: format!("{} bounds must be finite, got ({}, {})", what, lo, hi),
        });
    }
    if lo > hi {
        return Err(MpasPostError::InvalidBounds {
            message: format!("{} lower bound {} exceeds upper bound {}", what, lo, hi),
        });
    }
    Ok(())
}

/// A `lo:hi` pair as given on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds(pub f64, pub f64);

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [lo, hi] => {
                let lo = lo
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid lower bound '{}'", lo))?;
                let hi = hi
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid upper bound '{}'", hi))?;
                Ok(Bounds(lo, hi))
            }
            _ => Err("Invalid format: Expected '<lower>:<upper>'.".to_string()),
        }
    }
}

impl From<Bounds> for (f64, f64) {
    fn from(b: Bounds) -> Self {
        (b.0, b.1)
    }
}
