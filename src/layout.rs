//! # Bar Chart Layout
//!
//! Maps a prediction series onto equal-width bars inside an area template.
//!
//! ```text
//!  top ┌──────────────────────────┐
//!      │ top padding (1 bar width)│
//!      │        ┌┐                │  ┐
//!      │      ┌┐││┌┐              │  │ available height, scaled by
//!      │    ┌┐││││││┌┐            │  ┘ (value - min) / range
//!      │  ┌┐││││││││││┌┐    ┌┐    │  ┐ minimum bar height
//!      │  ││││││││││││││┌┐┌┐││    │  ┘ (2 bar widths)
//! bottom └──────────────────────────┘
//! ```
//!
//! Bars share the area's bottom edge, sit left to right in series order with no
//! gaps, and never rise into the top padding.

use crate::{
    BarDescriptor, PredictionSample, PredictionSeries, Rectangle, Result, TideChartError,
    TideStatistics, FEET_PER_METER,
};
use chrono::{TimeZone, Timelike};

/// Prefix of every bar element name; sinks use it to find bars from an earlier run.
pub const BAR_NAME_PREFIX: &str = "TideChart-";

/// Per-bar dimensions derived from the area and the sample count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub bar_width: f64,
    /// Headroom kept free above the tallest bar
    pub top_padding: f64,
    /// Height of a bar at the series minimum
    pub min_bar_height: f64,
    /// Extra height spread over the value range
    pub available_height: f64,
}

/// Bars for one series plus the indices that produced no bar.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub geometry: BarGeometry,
    pub bars: Vec<BarDescriptor>,
    /// Series indices whose value was absent; their slots stay empty
    pub skipped: Vec<usize>,
}

/// Derive bar geometry for `sample_count` bars across `area`.
pub fn compute_bar_geometry(area: &Rectangle, sample_count: usize) -> Result<BarGeometry> {
    if sample_count == 0 {
        return Err(TideChartError::DegenerateArea("no samples to lay out".into()));
    }

    let width = area.width();
    let height = area.height();
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(TideChartError::DegenerateArea(format!(
            "area is {width} wide and {height} high"
        )));
    }

    let bar_width = width / sample_count as f64;
    let min_bar_height = 2.0 * bar_width;
    let top_padding = bar_width;
    let available_height = height - min_bar_height - top_padding;

    if available_height < 0.0 {
        return Err(TideChartError::DegenerateArea(format!(
            "area height {height} cannot fit {sample_count} bars of width {bar_width}"
        )));
    }

    Ok(BarGeometry {
        bar_width,
        top_padding,
        min_bar_height,
        available_height,
    })
}

/// Rectangle of the bar at series position `index`.
///
/// The sample must carry a value; an absent one is [`TideChartError::InvalidInput`].
pub fn compute_bar_rectangle(
    index: usize,
    sample: &PredictionSample,
    stats: &TideStatistics,
    geometry: &BarGeometry,
    area: &Rectangle,
) -> Result<Rectangle> {
    let level = sample.water_level_m.ok_or_else(|| {
        TideChartError::InvalidInput(format!("sample {index} has no water level"))
    })?;

    let left = area.left + index as f64 * geometry.bar_width;
    let right = left + geometry.bar_width;
    let bottom = area.bottom;
    let top = bottom
        - geometry.min_bar_height
        - (geometry.available_height / stats.range) * (level - stats.min);

    Ok(Rectangle {
        top,
        left,
        bottom,
        right,
    })
}

/// Bar text: `HH:MM`, then feet and metres to one decimal, one per line.
pub fn bar_label(hour: u32, minute: u32, level_m: f64) -> String {
    format!(
        "{:02}:{:02}\n{:.1}ft\n{:.1}m",
        hour,
        minute,
        level_m * FEET_PER_METER,
        level_m
    )
}

/// Lay out every present sample of `series`, labelling times in `tz`.
///
/// Positions come from the series index, so an absent sample leaves a gap
/// rather than shifting later bars left.
pub fn layout_bars<Tz: TimeZone>(
    series: &PredictionSeries,
    stats: &TideStatistics,
    area: &Rectangle,
    tz: &Tz,
) -> Result<ChartLayout> {
    let geometry = compute_bar_geometry(area, series.len())?;
    let mut bars = Vec::with_capacity(series.len());
    let mut skipped = Vec::new();

    for (index, sample) in series.samples().iter().enumerate() {
        let Some(level) = sample.water_level_m else {
            log::warn!("No bar for prediction {} at {}", index, sample.timestamp);
            skipped.push(index);
            continue;
        };

        let rectangle = compute_bar_rectangle(index, sample, stats, &geometry, area)?;
        let local = sample.timestamp.with_timezone(tz);

        bars.push(BarDescriptor {
            rectangle,
            label: bar_label(local.hour(), local.minute(), level),
            name: format!("{BAR_NAME_PREFIX}{index}"),
        });
    }

    Ok(ChartLayout {
        geometry,
        bars,
        skipped,
    })
}
