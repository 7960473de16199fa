use ndarray::{Array1, Array2, Array3};
use netcdf::create;
use netcdf::types::NcVariableType;
use mpas_post::{
    coords::{LAT_CELL, LON_CELL, N_CELLS, T_ISO_LEVELS, TIME},
    errors::Result,
    geo::BoundingBox,
    netcdf_io::{DatasetWriter, NcChar},
    times::{assign_time_metadata, TimeMetadata},
    trim::{open_grid, open_mfdataset, trim_datasets, trim_ll},
    dataset::{Dataset, VariableData},
};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// cell centers in degrees; cell 3 uses the 0..360 convention MPAS grids store
const LON_DEG: [f64; 5] = [-100.0, -95.0, -85.0, 265.0, 10.0];
const LAT_DEG: [f64; 5] = [35.0, 45.0, 35.0, 31.0, 35.0];

fn write_grid(path: &Path) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("nCells", 5)?;
    file.add_dimension("nVertices", 2)?;

    let lon = Array1::from_iter(LON_DEG.iter().map(|d| d.to_radians()));
    let lat = Array1::from_iter(LAT_DEG.iter().map(|d| d.to_radians()));

    let mut var = file.add_variable::<f64>("lonCell", &["nCells"])?;
    var.put_attribute("units", "radians")?;
    var.put(lon.view(), ..)?;
    let mut var = file.add_variable::<f64>("latCell", &["nCells"])?;
    var.put_attribute("units", "radians")?;
    var.put(lat.view(), ..)?;

    let mut var = file.add_variable::<f64>("areaCell", &["nCells"])?;
    var.put(Array1::from_elem(5, 1.0e8).view(), ..)?;
    let mut var = file.add_variable::<f64>("xVertex", &["nVertices"])?;
    var.put(Array1::from(vec![0.0, 1.0]).view(), ..)?;
    Ok(())
}

fn write_diag(path: &Path, xtime: &str, scale: f64) -> Result<()> {
    let mut file = create(path)?;
    file.add_dimension("Time", 1)?;
    file.add_dimension("StrLen", 64)?;
    file.add_dimension("nCells", 5)?;
    file.add_dimension("nIsoLevelsT", 2)?;
    file.add_dimension("nIsoLevelsZ", 1)?;
    file.add_attribute("config_start_time", "2024-05-07_00:00:00")?;

    // MPAS stores xtime as NC_CHAR padded with NULs
    let mut chars = vec![NcChar(0); 64];
    for (j, b) in xtime.bytes().enumerate() {
        chars[j] = NcChar(b);
    }
    let mut var = file.add_variable_with_type("xtime", &["Time", "StrLen"], &NcVariableType::Char)?;
    var.put_values(&chars, ..)?;

    let refl = Array2::from_shape_vec(
        (1, 5),
        vec![1.0, 10.0, 100.0, 1000.0, 10000.0]
            .into_iter()
            .map(|v| v * scale)
            .collect(),
    )?;
    let mut var = file.add_variable::<f64>("refl10cm", &["Time", "nCells"])?;
    var.put_attribute("units", "mm^6 m^-3")?;
    var.put(refl.view(), ..)?;

    let mut var = file.add_variable::<f64>("t_iso_levels", &["nIsoLevelsT"])?;
    var.put(Array1::from(vec![85000.0, 50000.0]).view(), ..)?;
    let mut var = file.add_variable::<f64>("z_iso_levels", &["nIsoLevelsZ"])?;
    var.put(Array1::from(vec![50000.0]).view(), ..)?;

    let temps = Array3::from_shape_fn((1, 5, 2), |(_, c, k)| 280.0 - 30.0 * k as f64 + c as f64);
    let mut var = file.add_variable::<f64>("temperature_isobaric", &["Time", "nCells", "nIsoLevelsT"])?;
    var.put(temps.view(), ..)?;
    Ok(())
}

fn fixture(root: &Path) -> Result<(PathBuf, Vec<PathBuf>)> {
    let member_dir = root.join("mem_03");
    std::fs::create_dir_all(&member_dir)?;
    let grid = root.join("x1.5.static.nc");
    write_grid(&grid)?;
    let d0 = member_dir.join("diag.2024-05-07_01.00.00.nc");
    let d1 = member_dir.join("diag.2024-05-07_02.00.00.nc");
    write_diag(&d0, "2024-05-07_01:00:00", 1.0)?;
    write_diag(&d1, "2024-05-07_02:00:00", 2.0)?;
    Ok((grid, vec![d0, d1]))
}

#[test]
fn test_trim_ll_end_to_end() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let (grid_path, data_paths) = fixture(temp_dir.path())?;

    let (grid, data) = trim_ll(&grid_path, &data_paths, (-101.0, -90.0), (30.0, 40.0))?;

    // Grid keeps only cell coordinates, in wrapped degrees
    let names: Vec<&str> = grid.variable_names().collect();
    assert_eq!(names, vec![LAT_CELL, LON_CELL]);
    assert_eq!(grid.dim_len(N_CELLS), Some(2));
    let lon = grid.numeric(LON_CELL)?;
    assert!((lon[[0]] + 100.0).abs() < 1e-9);
    assert!((lon[[1]] + 95.0).abs() < 1e-9);

    // Data stacked along Time, trimmed to the same two cells
    assert_eq!(data.dim_len(TIME), Some(2));
    assert_eq!(data.dim_len(N_CELLS), Some(2));
    let refl = data.numeric("refl10cm")?;
    assert_eq!(refl.shape(), &[2, 2]);
    assert_eq!(refl[[0, 0]], 1.0);
    assert_eq!(refl[[0, 1]], 1000.0);
    assert_eq!(refl[[1, 0]], 2.0);
    assert_eq!(refl[[1, 1]], 2000.0);

    // Iso levels were promoted before concatenation
    let temp = data.variable("temperature_isobaric")?;
    assert_eq!(temp.dims, vec![TIME, N_CELLS, T_ISO_LEVELS]);
    assert_eq!(temp.shape(), &[2, 2, 2]);
    assert_eq!(data.numeric(T_ISO_LEVELS)?.shape(), &[2]);

    Ok(())
}

#[test]
fn test_grid_and_data_share_mask() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let (grid_path, data_paths) = fixture(temp_dir.path())?;

    let grid = open_grid(&grid_path)?;
    let data = open_mfdataset(&data_paths)?;
    let bbox = BoundingBox::new((-180.0, 180.0), (30.0, 40.0))?;
    let (trimmed_grid, trimmed_data) = trim_datasets(&grid, &data, &bbox)?;

    let lat = trimmed_grid.numeric(LAT_CELL)?;
    let expected: Vec<f64> = LAT_DEG.iter().copied().filter(|l| (30.0..40.0).contains(l)).collect();
    assert_eq!(lat.len(), expected.len());
    for (got, want) in lat.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-9);
    }
    assert_eq!(trimmed_data.dim_len(N_CELLS), Some(expected.len()));

    // variables without nCells are untouched
    assert_eq!(trimmed_data.dim_len("StrLen"), Some(64));
    Ok(())
}

#[test]
fn test_time_metadata_from_member_directory() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let (_, data_paths) = fixture(temp_dir.path())?;

    let data = open_mfdataset(&data_paths)?;
    let xtime = data.variable("xtime")?;
    assert_eq!(xtime.shape(), &[2, 64]);
    assert!(matches!(xtime.data, VariableData::Char(_)));

    let meta = TimeMetadata::from_dataset(&data, Some(data_paths[0].as_path()))?;
    assert_eq!(meta.forecast_hours, vec![1.0, 2.0]);
    assert_eq!(meta.member, Some(3));
    assert_eq!(meta.init_time.to_string(), "2024-05-07 00:00:00");

    let annotated = assign_time_metadata(&data, &meta)?;
    let out_path = temp_dir.path().join("annotated.nc");
    DatasetWriter::new(&out_path).write(&annotated)?;

    let reopened = Dataset::open(&out_path)?;
    assert_eq!(reopened.numeric("forecast_hour")?.iter().copied().collect::<Vec<f64>>(), vec![1.0, 2.0]);
    assert_eq!(reopened.numeric("member")?.iter().copied().collect::<Vec<f64>>(), vec![3.0]);
    let valid = reopened.numeric("valid_time")?;
    assert_eq!(valid[[1]] - valid[[0]], 3600.0);

    // xtime is written back as NC_CHAR and still decodes
    let file = netcdf::open(&out_path)?;
    let var = file.variable("xtime").expect("xtime should exist");
    assert_eq!(var.vartype(), NcVariableType::Char);
    assert_eq!(reopened.variable("xtime")?, data.variable("xtime")?);
    let again = TimeMetadata::from_dataset(&reopened, None)?;
    assert_eq!(again.valid_times, meta.valid_times);
    assert_eq!(again.member, None);
    Ok(())
}

#[test]
fn test_empty_box_writes_unlimited_cells() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let (grid_path, data_paths) = fixture(temp_dir.path())?;

    let (grid, data) = trim_ll(&grid_path, &data_paths, (-101.0, -90.0), (80.0, 85.0))?;
    assert_eq!(grid.dim_len(N_CELLS), Some(0));

    let grid_out = temp_dir.path().join("grid_empty.nc");
    let data_out = temp_dir.path().join("data_empty.nc");
    DatasetWriter::new(&grid_out).write(&grid)?;
    DatasetWriter::new(&data_out).write(&data)?;

    let file = netcdf::open(&grid_out)?;
    let dim = file.dimension(N_CELLS).expect("nCells should exist");
    assert!(dim.is_unlimited());
    assert_eq!(dim.len(), 0);

    let reopened = Dataset::open(&data_out)?;
    assert_eq!(reopened.dim_len(N_CELLS), Some(0));
    assert_eq!(reopened.numeric("refl10cm")?.shape(), &[2, 0]);
    Ok(())
}

#[test]
fn test_trim_rejects_bad_input() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let (grid_path, data_paths) = fixture(temp_dir.path()).expect("fixture");

    let no_data: Vec<PathBuf> = Vec::new();
    assert!(trim_ll(&grid_path, &no_data, (-101.0, -90.0), (30.0, 40.0)).is_err());
    assert!(trim_ll(&grid_path, &data_paths, (-90.0, -101.0), (30.0, 40.0)).is_err());
    assert!(trim_ll(temp_dir.path().join("missing.nc"), &data_paths, (-101.0, -90.0), (30.0, 40.0)).is_err());
}
