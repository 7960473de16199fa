//! Terminal summaries of datasets and time metadata

use crate::dataset::{AttrValue, Dataset, VariableData};
use crate::times::TimeMetadata;

fn format_attr(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(s) => format!("\"{}\"", s),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Ints(is) => format!("{:?}", is),
        AttrValue::Double(d) => d.to_string(),
        AttrValue::Doubles(ds) => format!("{:?}", ds),
    }
}

/// Lists dimensions, variables and global attributes of a dataset.
pub fn print_dataset_summary(ds: &Dataset) {
    println!("\n Dimensions");
    println!("==============");

    let mut dims: Vec<_> = ds.dims().to_vec();
    dims.sort_by(|a, b| a.0.cmp(&b.0));

    if dims.is_empty() {
        println!("   (No dimensions found)");
    } else {
        for (name, len) in dims {
            println!("    {} = {}", name, len);
        }
    }

    println!("\n Variables");
    println!("=============");

    let mut any = false;
    for (name, var) in ds.variables() {
        any = true;
        let data_type = match var.data {
            VariableData::Numeric(_) => "numeric",
            VariableData::Char(_) => "char",
        };
        if var.dims.is_empty() {
            println!("    {} ({}): scalar", name, data_type);
        } else {
            let shape: Vec<String> = var.shape().iter().map(|s| s.to_string()).collect();
            println!(
                "    {} ({}): [{}] = ({})",
                name,
                data_type,
                var.dims.join(", "),
                shape.join(" × ")
            );
        }
        if let Some(units) = var.attributes.get("units").and_then(AttrValue::as_str) {
            println!("      └─ units: {}", units);
        }
    }
    if !any {
        println!("   (No variables found)");
    }

    if !ds.attributes.is_empty() {
        println!("\n===== Global Attributes =====");
        for (name, value) in &ds.attributes {
            println!("- {}: {}", name, format_attr(value));
        }
    }
}

/// Prints the valid time table of a model output file.
pub fn describe_time_metadata(meta: &TimeMetadata) {
    println!("\n Time Metadata");
    println!("=================");
    println!("    Initialized: {}", meta.init_time);
    match meta.member {
        Some(m) => println!("    Ensemble member: {}", m),
        None => println!("    Ensemble member: (not found in path)"),
    }
    println!("\n    {:<22} {:>10}", "valid time", "fcst hour");
    for (t, h) in meta.valid_times.iter().zip(&meta.forecast_hours) {
        println!("    {:<22} {:>10.2}", t.to_string(), h);
    }
}
