//! Map axis decoration for regional plots
//!
//! Plots of trimmed MPAS fields share one look: state borders, a fixed extent
//! and labelled longitude/latitude gridlines on the bottom and left edges only.
//! [`MapDecoration`] captures that as data; a plotting front end reads it (or
//! its JSON form) and draws accordingly.

use crate::errors::{MpasPostError, Result};
use serde::Serialize;

/// Upper limit on gridlines per axis
pub const MAX_TICKS: usize = 8;

const NICE_STEPS: [f64; 4] = [1.0, 2.0, 2.5, 5.0];

/// Edges of the map frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// One gridline and its label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Gridline settings for both axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gridlines {
    pub draw_labels: bool,
    pub x_inline: bool,
    pub label_sides: Vec<Side>,
    pub longitudes: Vec<Tick>,
    pub latitudes: Vec<Tick>,
}

/// Everything needed to decorate a map axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDecoration {
    /// `[lon0, lon1, lat0, lat1]` in degrees
    pub extent: [f64; 4],
    pub features: Vec<String>,
    pub gridlines: Gridlines,
}

impl MapDecoration {
    pub fn new(extent: [f64; 4]) -> Result<Self> {
        let [lon0, lon1, lat0, lat1] = extent;
        check_span("longitude", lon0, lon1)?;
        check_span("latitude", lat0, lat1)?;

        let longitudes = nice_ticks(lon0, lon1)
            .into_iter()
            .map(|v| Tick {
                value: v,
                label: format_longitude(v),
            })
            .collect();
        let latitudes = nice_ticks(lat0, lat1)
            .into_iter()
            .map(|v| Tick {
                value: v,
                label: format_latitude(v),
            })
            .collect();

        Ok(Self {
            extent,
            features: vec!["states".to_string()],
            gridlines: Gridlines {
                draw_labels: true,
                x_inline: false,
                label_sides: vec![Side::Bottom, Side::Left],
                longitudes,
                latitudes,
            },
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MpasPostError::Generic(format!("Failed to serialize decoration: {}", e)))
    }
}

fn check_span(what: &str, lo: f64, hi: f64) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(MpasPostError::InvalidBounds {
            message: format!("{} extent must satisfy lower < upper, got {} .. {}", what, lo, hi),
        });
    }
    Ok(())
}

/// Smallest step from {1, 2, 2.5, 5} x 10^k giving at most [`MAX_TICKS`] ticks
pub fn nice_step(lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    let raw = span / (MAX_TICKS - 1) as f64;
    let mut magnitude = 10f64.powf(raw.log10().floor());
    loop {
        for &base in &NICE_STEPS {
            let step = base * magnitude;
            if tick_count(lo, hi, step) <= MAX_TICKS {
                return step;
            }
        }
        magnitude *= 10.0;
    }
}

fn tick_count(lo: f64, hi: f64, step: f64) -> usize {
    let first = (lo / step).ceil();
    let last = (hi / step).floor();
    if last < first {
        0
    } else {
        (last - first) as usize + 1
    }
}

/// Gridline positions inside `[lo, hi]`
pub fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let step = nice_step(lo, hi);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|i| {
            let v = i as f64 * step;
            // avoid labels such as -0°
            if v == 0.0 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

fn format_degrees(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

/// Longitude label: `100°W`, `30°E`, `0°`, `180°`
pub fn format_longitude(lon: f64) -> String {
    let wrapped = crate::geo::wrap_longitude(lon);
    let abs = wrapped.abs();
    if abs == 0.0 || abs == 180.0 {
        format!("{}°", format_degrees(abs))
    } else if wrapped < 0.0 {
        format!("{}°W", format_degrees(abs))
    } else {
        format!("{}°E", format_degrees(abs))
    }
}

/// Latitude label: `30°N`, `15°S`, `0°`
pub fn format_latitude(lat: f64) -> String {
    let abs = lat.abs();
    if abs == 0.0 {
        "0°".to_string()
    } else if lat < 0.0 {
        format!("{}°S", format_degrees(abs))
    } else {
        format!("{}°N", format_degrees(abs))
    }
}
