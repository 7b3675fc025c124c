//! # Tide Chart Core Library
//!
//! This library fetches NOAA CO-OPS tide predictions for a single station and turns
//! them into the geometry of a bar chart: one equal-width bar per hourly prediction,
//! with bar height proportional to the predicted water level.
//!
//! ## Data Flow
//! 1. **Station**: fetch station metadata, refuse non-tidal stations
//! 2. **Predictions**: fetch 24 hourly MLLW predictions (metric, GMT) starting at the next full hour
//! 3. **Series**: decode fixed-width timestamps, parse values leniently
//! 4. **Statistics**: min, max and range over the present values
//! 5. **Layout**: map each sample onto a rectangle inside the area template
//! 6. **Render**: hand caption, summary and bars to a [`chart::RenderSink`]
//!
//! Every step returns a [`Result`] and the first failure ends the run; no partial
//! chart is ever emitted.
//!
//! ## Core Types
//! - [`PredictionSample`]: one timestamped water level, possibly absent
//! - [`PredictionSeries`]: non-empty, server-ordered samples
//! - [`StationInfo`]: station metadata
//! - [`TideStatistics`]: min/max/range over present values
//! - [`Rectangle`] and [`BarDescriptor`]: layout output

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod chart;
pub mod config;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod series;
pub mod station_client;
pub mod statistics;
pub mod time_format;
pub mod transport;


pub use error::{Result, TideChartError};

/// Conversion factor from metres to international feet.
pub const FEET_PER_METER: f64 = 3.28084;

/// Station used when neither the CLI nor the config file names one
/// (South Port Everglades, FL).
pub const DEFAULT_STATION_ID: &str = "8722956";

/// Metadata for a NOAA station, as returned by the metadata API.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationInfo {
    pub id: String,
    pub name: String,
    /// Whether the station publishes tide predictions
    pub is_tidal: bool,
}

/// A single predicted water level.
///
/// `water_level_m` is `None` when the service sent a value that is not a number.
/// Such samples stay in the series so positions and counts remain faithful to the
/// server response.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_chart_lib::PredictionSample;
///
/// let sample = PredictionSample {
///     timestamp: Utc.with_ymd_and_hms(2024, 6, 16, 15, 0, 0).unwrap(),
///     water_level_m: Some(0.42),
/// };
/// assert!(sample.is_present());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PredictionSample {
    pub timestamp: DateTime<Utc>,
    pub water_level_m: Option<f64>,
}

impl PredictionSample {
    pub fn is_present(&self) -> bool {
        self.water_level_m.is_some()
    }
}

/// Ordered prediction samples, guaranteed non-empty.
///
/// Order is exactly the order the server returned; nothing is sorted or
/// deduplicated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionSeries {
    samples: Vec<PredictionSample>,
}

impl PredictionSeries {
    /// Wrap samples, rejecting an empty list with [`TideChartError::NoPredictions`].
    pub fn new(samples: Vec<PredictionSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(TideChartError::NoPredictions(None));
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[PredictionSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &PredictionSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &PredictionSample {
        &self.samples[self.samples.len() - 1]
    }

    /// Values that parsed, in series order.
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().filter_map(|s| s.water_level_m)
    }
}

/// Summary of the present values in a series, in metres.
///
/// Only constructed by [`statistics::compute`], which guarantees `range > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TideStatistics {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl TideStatistics {
    pub fn min_ft(&self) -> f64 {
        self.min * FEET_PER_METER
    }

    pub fn max_ft(&self) -> f64 {
        self.max * FEET_PER_METER
    }

    pub fn range_ft(&self) -> f64 {
        self.range * FEET_PER_METER
    }
}

/// Axis-aligned rectangle in host coordinates; y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rectangle {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rectangle {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// One chart bar, ready for a rendering sink.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarDescriptor {
    pub rectangle: Rectangle,
    /// Time, feet and metres on separate lines
    pub label: String,
    /// Stable element name, `TideChart-<series index>`
    pub name: String,
}
