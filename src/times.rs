//! Valid time, forecast hour and ensemble member extraction
//!
//! MPAS writes valid times as fixed-width character rows in `xtime`
//! (`Time x StrLen`, e.g. `2024-05-07_18:00:00` padded with NULs or spaces)
//! and records the initialization time in the `config_start_time` global
//! attribute. Ensemble members are identified only by their directory name.

use crate::coords::{TIME, XTIME};
use crate::dataset::{AttrValue, DataVariable, Dataset};
use crate::errors::{MpasPostError, Result};
use chrono::NaiveDateTime;
use ndarray::{Array1, ArrayView2};
use std::path::Path;
use tracing::{debug, warn};

/// Global attribute holding the model initialization time
pub const START_TIME_ATTR: &str = "config_start_time";

const MPAS_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d_%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse one MPAS timestamp string
pub fn parse_mpas_time(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    MPAS_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| MpasPostError::TimeDecode {
            value: trimmed.to_string(),
            message: "expected YYYY-MM-DD_hh:mm:ss".to_string(),
        })
}

/// Decode byte rows (one timestamp per row) into times
pub fn decode_xtime(bytes: ArrayView2<'_, u8>) -> Result<Vec<NaiveDateTime>> {
    bytes
        .rows()
        .into_iter()
        .map(|row| {
            let raw: Vec<u8> = row.iter().copied().take_while(|&b| b != 0).collect();
            let text = String::from_utf8(raw).map_err(|e| MpasPostError::TimeDecode {
                value: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                message: "not valid UTF-8".to_string(),
            })?;
            parse_mpas_time(&text)
        })
        .collect()
}

/// Hours elapsed since `init` for each valid time
pub fn forecast_hours(valid: &[NaiveDateTime], init: NaiveDateTime) -> Vec<f64> {
    valid
        .iter()
        .map(|t| (*t - init).num_seconds() as f64 / 3600.0)
        .collect()
}

/// Ensemble member number from a path component such as `mem_07` or `member3`
pub fn ensemble_member<P: AsRef<Path>>(path: P) -> Option<u32> {
    path.as_ref().components().find_map(|component| {
        let name = component.as_os_str().to_str()?.to_ascii_lowercase();
        let rest = name
            .strip_prefix("member")
            .or_else(|| name.strip_prefix("mem"))?;
        let digits = rest
            .strip_prefix('_')
            .or_else(|| rest.strip_prefix('-'))
            .unwrap_or(rest);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    })
}

/// Time metadata of one model output dataset
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMetadata {
    pub init_time: NaiveDateTime,
    pub valid_times: Vec<NaiveDateTime>,
    pub forecast_hours: Vec<f64>,
    pub member: Option<u32>,
}

impl TimeMetadata {
    /// Decode `xtime`, find the initialization time and parse the member from `path`
    pub fn from_dataset(ds: &Dataset, path: Option<&Path>) -> Result<Self> {
        let raw = ds.bytes(XTIME)?;
        let rows = match raw.ndim() {
            1 => raw.insert_axis(ndarray::Axis(0)),
            _ => raw,
        };
        let rows = rows
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(MpasPostError::from)?;
        let valid_times = decode_xtime(rows.view())?;

        let init_time = initialization_time(ds, &valid_times)?;
        let forecast_hours = forecast_hours(&valid_times, init_time);
        let member = path.and_then(ensemble_member);

        debug!(
            init = %init_time,
            times = valid_times.len(),
            member = ?member,
            "decoded time metadata"
        );

        Ok(Self {
            init_time,
            valid_times,
            forecast_hours,
            member,
        })
    }
}

/// `config_start_time` when present and decodable, else the first valid time
pub fn initialization_time(ds: &Dataset, valid: &[NaiveDateTime]) -> Result<NaiveDateTime> {
    if let Some(start) = ds.attributes.get(START_TIME_ATTR).and_then(AttrValue::as_str) {
        match parse_mpas_time(start) {
            Ok(t) => return Ok(t),
            Err(e) => warn!(error = %e, "ignoring undecodable {}", START_TIME_ATTR),
        }
    }
    valid.first().copied().ok_or_else(|| MpasPostError::TimeDecode {
        value: String::new(),
        message: format!("no {} attribute and no valid times", START_TIME_ATTR),
    })
}

/// Add `valid_time`, `forecast_hour` and `member` coordinates to a dataset
pub fn assign_time_metadata(ds: &Dataset, meta: &TimeMetadata) -> Result<Dataset> {
    let mut out = ds.clone();

    let seconds: Array1<f64> = meta
        .valid_times
        .iter()
        .map(|t| t.and_utc().timestamp() as f64)
        .collect();
    out.insert_variable(
        "valid_time",
        DataVariable::numeric(&[TIME], seconds.into_dyn())?
            .with_attribute("units", AttrValue::Str("seconds since 1970-01-01 00:00:00".into()))
            .with_attribute("long_name", AttrValue::Str("valid time".into())),
    )?;

    let hours = Array1::from(meta.forecast_hours.clone());
    out.insert_variable(
        "forecast_hour",
        DataVariable::numeric(&[TIME], hours.into_dyn())?
            .with_attribute("units", AttrValue::Str("hours".into()))
            .with_attribute("long_name", AttrValue::Str("forecast hour".into())),
    )?;

    if let Some(member) = meta.member {
        out.insert_variable(
            "member",
            DataVariable::numeric(&["member"], Array1::from(vec![member as f64]).into_dyn())?
                .with_attribute("long_name", AttrValue::Str("ensemble member".into())),
        )?;
    }

    out.attributes.insert(
        "init_time".to_string(),
        AttrValue::Str(meta.init_time.format(MPAS_TIME_FORMATS[0]).to_string()),
    );

    Ok(out)
}
