//! NetCDF output of processed datasets
//!
//! Trimmed grids and data are written back to NetCDF with their dimensions,
//! variables and attributes, plus a `history` attribute recording when the
//! file was produced.

use crate::dataset::{AttrValue, Dataset, VariableData};
use crate::errors::Result;
use chrono::Utc;
use netcdf::types::{NcTypeDescriptor, NcVariableType};
use netcdf::{create, AttributeValue};
use std::{fs, path::Path};
use tracing::{debug, info};

/// One NC_CHAR element
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NcChar(pub u8);

// SAFETY: a transparent wrapper around one byte, the size of NC_CHAR
unsafe impl NcTypeDescriptor for NcChar {
    fn type_descriptor() -> NcVariableType {
        NcVariableType::Char
    }
}

/// Writes a [`Dataset`] to a new NetCDF file
///
/// Dimensions of length zero, as left by trimming to an empty box, are
/// created as unlimited dimensions since NetCDF reserves length 0 for those.
pub struct DatasetWriter<'a> {
    output_path: &'a Path,
}

impl<'a> DatasetWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write the dataset, replacing any existing file
    pub fn write(&self, ds: &Dataset) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;

        for (dim_name, dim_len) in ds.dims() {
            file.add_dimension(dim_name, *dim_len)?;
        }

        for (name, var) in ds.variables() {
            let dim_refs: Vec<&str> = var.dims.iter().map(|s| s.as_str()).collect();

            match &var.data {
                VariableData::Numeric(values) => {
                    let mut new_var = file.add_variable::<f64>(name, &dim_refs)?;
                    for (attr_name, value) in &var.attributes {
                        new_var.put_attribute(attr_name, to_netcdf(value))?;
                    }
                    if values.is_empty() {
                        debug!(variable = %name, "no values to write");
                    } else {
                        new_var.put(values.view(), ..)?;
                    }
                }
                VariableData::Char(bytes) => {
                    let mut new_var =
                        file.add_variable_with_type(name, &dim_refs, &NcVariableType::Char)?;
                    for (attr_name, value) in &var.attributes {
                        new_var.put_attribute(attr_name, to_netcdf(value))?;
                    }
                    if bytes.is_empty() {
                        debug!(variable = %name, "no values to write");
                    } else {
                        let chars: Vec<NcChar> = bytes.iter().copied().map(NcChar).collect();
                        new_var.put_values(&chars, ..)?;
                    }
                }
            }
        }

        for (attr_name, value) in &ds.attributes {
            if attr_name != "history" {
                file.add_attribute(attr_name, to_netcdf(value))?;
            }
        }

        // Add history attribute
        let mut history = format!("Created by mpas-post on {}", Utc::now().to_rfc3339());
        if let Some(previous) = ds.attributes.get("history").and_then(AttrValue::as_str) {
            history = format!("{}\n{}", history, previous);
        }
        file.add_attribute("history", history)?;

        info!(path = %self.output_path.display(), "wrote dataset");
        Ok(())
    }
}

fn to_netcdf(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Str(s) => AttributeValue::Str(s.clone()),
        AttrValue::Int(v) => match i32::try_from(*v) {
            Ok(small) => AttributeValue::Int(small),
            Err(_) => AttributeValue::Longlong(*v),
        },
        AttrValue::Ints(vs) => {
            if vs.iter().all(|v| i32::try_from(*v).is_ok()) {
                AttributeValue::Ints(vs.iter().map(|&v| v as i32).collect())
            } else {
                AttributeValue::Longlongs(vs.clone())
            }
        }
        AttrValue::Double(v) => AttributeValue::Double(*v),
        AttrValue::Doubles(vs) => AttributeValue::Doubles(vs.clone()),
    }
}

/// Writes a trimmed grid and its data to two files
pub fn write_trimmed(grid: &Dataset, data: &Dataset, grid_out: &Path, data_out: &Path) -> Result<()> {
    DatasetWriter::new(grid_out).write(grid)?;
    DatasetWriter::new(data_out).write(data)
}
