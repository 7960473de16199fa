//! In-memory labeled datasets
//!
//! A [`Dataset`] holds named dimensions, variables and global attributes loaded
//! from a NetCDF file. It supports the handful of structural operations the
//! post-processing helpers need: dimension swaps, nested concatenation along a
//! record dimension and boolean-mask selection along one dimension.

use crate::errors::{MpasPostError, Result};
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis, IxDyn};
use netcdf::types::NcVariableType;
use netcdf::{AttributeValue, File};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Attribute values carried through processing
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Ints(Vec<i64>),
    Double(f64),
    Doubles(Vec<f64>),
}

impl AttrValue {
    /// Borrow the value as a string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn from_netcdf(value: AttributeValue) -> Option<Self> {
        let converted = match value {
            AttributeValue::Str(s) => AttrValue::Str(s),
            AttributeValue::Strs(ss) => AttrValue::Str(ss.join(",")),
            AttributeValue::Double(v) => AttrValue::Double(v),
            AttributeValue::Float(v) => AttrValue::Double(v as f64),
            AttributeValue::Doubles(vs) => AttrValue::Doubles(vs),
            AttributeValue::Floats(vs) => AttrValue::Doubles(vs.into_iter().map(f64::from).collect()),
            AttributeValue::Int(v) => AttrValue::Int(v as i64),
            AttributeValue::Short(v) => AttrValue::Int(v as i64),
            AttributeValue::Uchar(v) => AttrValue::Int(v as i64),
            AttributeValue::Schar(v) => AttrValue::Int(v as i64),
            AttributeValue::Ushort(v) => AttrValue::Int(v as i64),
            AttributeValue::Uint(v) => AttrValue::Int(v as i64),
            AttributeValue::Longlong(v) => AttrValue::Int(v),
            AttributeValue::Ints(vs) => AttrValue::Ints(vs.into_iter().map(i64::from).collect()),
            AttributeValue::Shorts(vs) => AttrValue::Ints(vs.into_iter().map(i64::from).collect()),
            _ => return None,
        };
        Some(converted)
    }
}

/// Values stored in a variable
#[derive(Debug, Clone, PartialEq)]
pub enum VariableData {
    /// Any numeric NetCDF type, widened to f64
    Numeric(ArrayD<f64>),
    /// Raw bytes of a character variable
    Char(ArrayD<u8>),
}

impl VariableData {
    pub fn shape(&self) -> &[usize] {
        match self {
            VariableData::Numeric(a) => a.shape(),
            VariableData::Char(a) => a.shape(),
        }
    }

    fn select(&self, axis: Axis, indices: &[usize]) -> Self {
        match self {
            VariableData::Numeric(a) => VariableData::Numeric(a.select(axis, indices)),
            VariableData::Char(a) => VariableData::Char(a.select(axis, indices)),
        }
    }
}

/// A named, dimensioned variable with attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DataVariable {
    pub dims: Vec<String>,
    pub data: VariableData,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl DataVariable {
    /// Numeric variable without attributes
    pub fn numeric(dims: &[&str], data: ArrayD<f64>) -> Result<Self> {
        Self::checked(dims, VariableData::Numeric(data))
    }

    /// Character variable without attributes
    pub fn chars(dims: &[&str], data: ArrayD<u8>) -> Result<Self> {
        Self::checked(dims, VariableData::Char(data))
    }

    fn checked(dims: &[&str], data: VariableData) -> Result<Self> {
        if dims.len() != data.shape().len() {
            return Err(MpasPostError::ShapeMismatch {
                message: format!(
                    "{} dimension names given for an array of rank {}",
                    dims.len(),
                    data.shape().len()
                ),
            });
        }
        Ok(Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data,
            attributes: BTreeMap::new(),
        })
    }

    /// Attach an attribute, builder style
    pub fn with_attribute(mut self, name: &str, value: AttrValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Position of a dimension in this variable
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Numeric values, if this is a numeric variable
    pub fn as_numeric(&self) -> Option<&ArrayD<f64>> {
        match &self.data {
            VariableData::Numeric(a) => Some(a),
            VariableData::Char(_) => None,
        }
    }
}

/// A collection of variables sharing a dimension table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    dims: Vec<(String, usize)>,
    variables: BTreeMap<String, DataVariable>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every variable and global attribute of a NetCDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;
        let ds = Self::from_file(&file)?;
        debug!(
            path = %path.display(),
            variables = ds.variables.len(),
            dims = ds.dims.len(),
            "loaded dataset"
        );
        Ok(ds)
    }

    /// Load every variable and global attribute of an already opened file
    pub fn from_file(file: &File) -> Result<Self> {
        let mut ds = Dataset::new();

        for dim in file.dimensions() {
            ds.dims.push((dim.name().to_string(), dim.len()));
        }

        for attr in file.attributes() {
            if let Some(value) = AttrValue::from_netcdf(attr.value()?) {
                ds.attributes.insert(attr.name().to_string(), value);
            }
        }

        for var in file.variables() {
            let name = var.name().to_string();
            let dims: Vec<String> = var
                .dimensions()
                .iter()
                .map(|d| d.name().to_string())
                .collect();
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

            let data = match var.vartype() {
                NcVariableType::Char => {
                    let raw = var.get_raw_values(..)?;
                    VariableData::Char(ArrayD::from_shape_vec(IxDyn(&shape), raw)?)
                }
                NcVariableType::Int(_) | NcVariableType::Float(_) => {
                    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
                    VariableData::Numeric(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
                }
                other => {
                    debug!(variable = %name, data_type = ?other, "skipping unsupported variable type");
                    continue;
                }
            };

            let mut attributes = BTreeMap::new();
            for attr in var.attributes() {
                match attr.value() {
                    Ok(value) => {
                        if let Some(value) = AttrValue::from_netcdf(value) {
                            attributes.insert(attr.name().to_string(), value);
                        }
                    }
                    Err(e) => debug!(variable = %name, attribute = %attr.name(), error = %e, "skipping attribute"),
                }
            }

            ds.variables.insert(
                name,
                DataVariable {
                    dims,
                    data,
                    attributes,
                },
            );
        }

        Ok(ds)
    }

    /// True when a variable of that name exists (xarray `name in ds`)
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Result<&DataVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| MpasPostError::VariableNotFound {
                var: name.to_string(),
            })
    }

    /// Numeric values of a variable
    pub fn numeric(&self, name: &str) -> Result<&ArrayD<f64>> {
        self.variable(name)?
            .as_numeric()
            .ok_or_else(|| MpasPostError::TypeMismatch {
                var: name.to_string(),
                expected: "numeric",
            })
    }

    /// Raw bytes of a variable; numeric byte variables are narrowed back to u8
    pub fn bytes(&self, name: &str) -> Result<ArrayD<u8>> {
        match &self.variable(name)?.data {
            VariableData::Char(a) => Ok(a.clone()),
            VariableData::Numeric(a) => Ok(a.mapv(|v| v as u8)),
        }
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|k| k.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &DataVariable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Dimensions in definition order
    pub fn dims(&self) -> &[(String, usize)] {
        &self.dims
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims.iter().find(|(d, _)| d == name).map(|(_, len)| *len)
    }

    /// Insert or replace a variable, registering any new dimensions
    pub fn insert_variable(&mut self, name: &str, var: DataVariable) -> Result<()> {
        for (dim, &len) in var.dims.iter().zip(var.shape()) {
            match self.dim_len(dim) {
                Some(existing) if existing != len => {
                    return Err(MpasPostError::ShapeMismatch {
                        message: format!(
                            "variable '{}' has length {} along '{}' but the dataset has {}",
                            name, len, dim, existing
                        ),
                    });
                }
                Some(_) => {}
                None => self.dims.push((dim.clone(), len)),
            }
        }
        self.variables.insert(name.to_string(), var);
        Ok(())
    }

    /// Keep only the named variables; unused dimensions are dropped
    pub fn select(&self, names: &[&str]) -> Result<Dataset> {
        let mut out = Dataset {
            dims: Vec::new(),
            variables: BTreeMap::new(),
            attributes: self.attributes.clone(),
        };
        for name in names {
            out.variables
                .insert(name.to_string(), self.variable(name)?.clone());
        }
        out.dims = self
            .dims
            .iter()
            .filter(|(d, _)| out.variables.values().any(|v| v.dims.contains(d)))
            .cloned()
            .collect();
        Ok(out)
    }

    /// Rename dimensions to the coordinate variables that label them
    ///
    /// Each `new` name must be a 1-D variable along its `old` dimension.
    pub fn swap_dims(&self, swaps: &HashMap<&str, &str>) -> Result<Dataset> {
        for (&old, &new) in swaps {
            if self.dim_len(old).is_none() {
                return Err(MpasPostError::DimensionNotFound {
                    dim: old.to_string(),
                });
            }
            let coord = self.variable(new)?;
            if coord.dims.len() != 1 || coord.dims[0] != old {
                return Err(MpasPostError::InvalidCoordinate {
                    message: format!(
                        "replacement dimension '{}' is not a 1D variable along '{}'",
                        new, old
                    ),
                });
            }
        }

        let rename = |d: &String| -> String {
            swaps
                .get(d.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| d.clone())
        };

        let mut out = self.clone();
        for (dim, _) in out.dims.iter_mut() {
            *dim = rename(dim);
        }
        for var in out.variables.values_mut() {
            var.dims = var.dims.iter().map(rename).collect();
        }
        Ok(out)
    }

    /// Nested concatenation along `dim`, in input order
    ///
    /// Variables carrying `dim` are stacked; all others come from the first
    /// dataset and must have the same shape everywhere.
    pub fn concat(datasets: &[Dataset], dim: &str) -> Result<Dataset> {
        let first = datasets
            .first()
            .ok_or_else(|| MpasPostError::Generic("no datasets to concatenate".to_string()))?;

        for (i, ds) in datasets.iter().enumerate().skip(1) {
            let same_vars = ds.variables.len() == first.variables.len()
                && first.variables.keys().all(|k| ds.variables.contains_key(k));
            if !same_vars {
                return Err(MpasPostError::ShapeMismatch {
                    message: format!("dataset {} does not have the same variables as dataset 0", i),
                });
            }
        }

        // dimension order follows the first file, with the record length summed
        let total: usize = datasets.iter().filter_map(|ds| ds.dim_len(dim)).sum();
        let mut dims: Vec<(String, usize)> = first
            .dims
            .iter()
            .map(|(d, len)| if d == dim { (d.clone(), total) } else { (d.clone(), *len) })
            .collect();
        if first.dim_len(dim).is_none() {
            dims.push((dim.to_string(), total));
        }

        let mut out = Dataset {
            dims,
            variables: BTreeMap::new(),
            attributes: first.attributes.clone(),
        };

        for (name, var) in &first.variables {
            let parts: Vec<&DataVariable> = datasets.iter().map(|ds| &ds.variables[name]).collect();
            let combined = match var.axis_of(dim) {
                Some(axis) => concat_variable(name, &parts, Axis(axis))?,
                None => {
                    if parts.iter().any(|p| p.shape() != var.shape()) {
                        return Err(MpasPostError::ShapeMismatch {
                            message: format!(
                                "variable '{}' lacks '{}' and differs in shape between files",
                                name, dim
                            ),
                        });
                    }
                    var.clone()
                }
            };
            out.insert_variable(name, combined)?;
        }

        Ok(out)
    }

    /// Keep only the indices along `dim` where `mask` is true
    ///
    /// Every variable carrying `dim` is filtered; the rest pass through.
    pub fn where_mask(&self, dim: &str, mask: &[bool]) -> Result<Dataset> {
        let len = self
            .dim_len(dim)
            .ok_or_else(|| MpasPostError::DimensionNotFound {
                dim: dim.to_string(),
            })?;
        if mask.len() != len {
            return Err(MpasPostError::ShapeMismatch {
                message: format!(
                    "mask has {} entries but dimension '{}' has length {}",
                    mask.len(),
                    dim,
                    len
                ),
            });
        }

        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect();

        let variables: BTreeMap<String, DataVariable> = self
            .variables
            .par_iter()
            .map(|(name, var)| {
                let filtered = match var.axis_of(dim) {
                    Some(axis) => DataVariable {
                        dims: var.dims.clone(),
                        data: var.data.select(Axis(axis), &keep),
                        attributes: var.attributes.clone(),
                    },
                    None => var.clone(),
                };
                (name.clone(), filtered)
            })
            .collect();

        let dims = self
            .dims
            .iter()
            .map(|(d, l)| {
                if d == dim {
                    (d.clone(), keep.len())
                } else {
                    (d.clone(), *l)
                }
            })
            .collect();

        Ok(Dataset {
            dims,
            variables,
            attributes: self.attributes.clone(),
        })
    }
}

fn concat_variable(name: &str, parts: &[&DataVariable], axis: Axis) -> Result<DataVariable> {
    let first = parts[0];
    if parts.iter().any(|p| p.dims != first.dims) {
        return Err(MpasPostError::ShapeMismatch {
            message: format!("variable '{}' has different dimensions between files", name),
        });
    }

    let data = match &first.data {
        VariableData::Numeric(_) => {
            let views = parts
                .iter()
                .map(|p| match &p.data {
                    VariableData::Numeric(a) => Ok(a.view()),
                    VariableData::Char(_) => Err(type_change(name)),
                })
                .collect::<Result<Vec<ArrayViewD<'_, f64>>>>()?;
            VariableData::Numeric(concatenate(axis, &views)?)
        }
        VariableData::Char(_) => {
            let views = parts
                .iter()
                .map(|p| match &p.data {
                    VariableData::Char(a) => Ok(a.view()),
                    VariableData::Numeric(_) => Err(type_change(name)),
                })
                .collect::<Result<Vec<ArrayViewD<'_, u8>>>>()?;
            VariableData::Char(concatenate(axis, &views)?)
        }
    };

    Ok(DataVariable {
        dims: first.dims.clone(),
        data,
        attributes: first.attributes.clone(),
    })
}

fn type_change(name: &str) -> MpasPostError {
    MpasPostError::ShapeMismatch {
        message: format!("variable '{}' changes type between files", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn sample(time_offset: f64) -> Dataset {
        let mut ds = Dataset::new();
        ds.insert_variable(
            "theta",
            DataVariable::numeric(
                &["Time", "nCells"],
                arr2(&[[time_offset, time_offset + 1.0, time_offset + 2.0]]).into_dyn(),
            )
            .unwrap(),
        )
        .unwrap();
        ds.insert_variable(
            "areaCell",
            DataVariable::numeric(&["nCells"], arr1(&[1.0, 2.0, 3.0]).into_dyn()).unwrap(),
        )
        .unwrap();
        ds
    }

    #[test]
    fn insert_rejects_inconsistent_length() {
        let mut ds = sample(0.0);
        let bad = DataVariable::numeric(&["nCells"], arr1(&[1.0, 2.0]).into_dyn()).unwrap();
        assert!(matches!(
            ds.insert_variable("bad", bad),
            Err(MpasPostError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn concat_stacks_record_variables_only() {
        let ds = Dataset::concat(&[sample(0.0), sample(10.0)], "Time").unwrap();
        assert_eq!(ds.dim_len("Time"), Some(2));
        let theta = ds.numeric("theta").unwrap();
        assert_eq!(theta.shape(), &[2, 3]);
        assert_eq!(theta[[1, 0]], 10.0);
        assert_eq!(ds.numeric("areaCell").unwrap().shape(), &[3]);
    }

    #[test]
    fn concat_keeps_first_file_dim_order() {
        let mut ds = Dataset::new();
        ds.insert_variable(
            "zgrid",
            DataVariable::numeric(&["nVertLevels"], arr1(&[0.0, 500.0]).into_dyn()).unwrap(),
        )
        .unwrap();
        ds.insert_variable(
            "w",
            DataVariable::numeric(&["Time", "nVertLevels"], arr2(&[[0.1, 0.2]]).into_dyn()).unwrap(),
        )
        .unwrap();
        let out = Dataset::concat(&[ds.clone(), ds], "Time").unwrap();
        let names: Vec<&str> = out.dims().iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(names, vec!["nVertLevels", "Time"]);
        assert_eq!(out.dim_len("Time"), Some(2));
    }

    #[test]
    fn concat_rejects_different_variable_sets() {
        let mut other = sample(1.0);
        other
            .insert_variable(
                "rainc",
                DataVariable::numeric(&["Time", "nCells"], arr2(&[[0.0, 0.0, 0.0]]).into_dyn()).unwrap(),
            )
            .unwrap();
        assert!(matches!(
            Dataset::concat(&[sample(0.0), other], "Time"),
            Err(MpasPostError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn swap_dims_needs_1d_coordinate_along_old_dim() {
        let ds = sample(0.0);
        let swaps = HashMap::from([("nCells", "theta")]);
        assert!(matches!(
            ds.swap_dims(&swaps),
            Err(MpasPostError::InvalidCoordinate { .. })
        ));

        let swaps = HashMap::from([("Time", "areaCell")]);
        assert!(matches!(
            ds.swap_dims(&swaps),
            Err(MpasPostError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn concat_of_nothing_is_an_error() {
        assert!(Dataset::concat(&[], "Time").is_err());
    }

    #[test]
    fn where_mask_drops_cells_everywhere() {
        let ds = sample(0.0).where_mask("nCells", &[true, false, true]).unwrap();
        assert_eq!(ds.dim_len("nCells"), Some(2));
        let theta = ds.numeric("theta").unwrap();
        assert_eq!(theta.iter().copied().collect::<Vec<_>>(), vec![0.0, 2.0]);
        let area = ds.numeric("areaCell").unwrap();
        assert_eq!(area.iter().copied().collect::<Vec<_>>(), vec![1.0, 3.0]);
    }

    #[test]
    fn where_mask_checks_length() {
        assert!(sample(0.0).where_mask("nCells", &[true]).is_err());
        assert!(sample(0.0).where_mask("nVertices", &[true]).is_err());
    }

    #[test]
    fn select_drops_unused_dims() {
        let ds = sample(0.0).select(&["areaCell"]).unwrap();
        assert!(ds.dim_len("Time").is_none());
        assert_eq!(ds.dim_len("nCells"), Some(3));
        assert!(!ds.contains("theta"));
    }
}
