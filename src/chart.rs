//! # Chart Controller
//!
//! Runs one chart generation from station lookup to rendering:
//!
//! ```text
//! Init → StationValidated → DataFetched → SeriesBuilt → StatsComputed → LayoutComputed → Rendered
//!   └──────────────┴──────────────┴─────────────┴──────────────┴───────────────┴────→ Failed
//! ```
//!
//! Each arrow is one component call. The first failure stops the run and is
//! reported together with the last stage reached; the sink is not touched
//! unless layout succeeded, so a failed run never leaves a partial chart.

use crate::config::ChartConfig;
use crate::layout::{self, ChartLayout, BAR_NAME_PREFIX};
use crate::station_client::StationClient;
use crate::time_format::prediction_window;
use crate::transport::HttpTransport;
use crate::{
    series, statistics, BarDescriptor, PredictionSeries, Rectangle, Result, StationInfo,
    TideChartError, TideStatistics,
};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// Caption text preceding the station name.
pub const CAPTION_PREFIX: &str = "Tide Chart for ";

/// The host that materializes a chart.
///
/// Implementations own whatever graphical elements they create; the controller
/// only refers to bars by name.
pub trait RenderSink {
    /// Bounding rectangle the bars must fit in.
    fn area_template(&self) -> Result<Rectangle>;

    /// Names of all elements currently present.
    fn bar_names(&self) -> Vec<String>;

    fn remove_element(&mut self, name: &str) -> Result<()>;

    fn set_caption(&mut self, text: &str) -> Result<()>;

    fn set_summary(&mut self, text: &str) -> Result<()>;

    /// Materialize bars in the given order.
    fn place_bars(&mut self, bars: &[BarDescriptor]) -> Result<()>;
}

/// Progress of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartStage {
    Init,
    StationValidated,
    DataFetched,
    SeriesBuilt,
    StatsComputed,
    LayoutComputed,
    Rendered,
    Failed,
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartReport {
    /// Always [`ChartStage::Rendered`]
    pub stage: ChartStage,
    pub station: StationInfo,
    pub series: PredictionSeries,
    pub statistics: TideStatistics,
    pub layout: ChartLayout,
    pub caption: String,
    pub summary: String,
}

/// Why a run stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartFailure {
    /// Last stage completed before the failure
    pub reached: ChartStage,
    pub error: TideChartError,
    /// User-facing messages, most general first
    pub messages: Vec<String>,
}

impl fmt::Display for ChartFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join("\n"))
    }
}

impl std::error::Error for ChartFailure {}

/// Sequences station lookup, fetching, statistics, layout and rendering.
pub struct ChartController<'a, T: HttpTransport> {
    client: StationClient<T>,
    chart: &'a ChartConfig,
}

impl<'a, T: HttpTransport> ChartController<'a, T> {
    pub fn new(client: StationClient<T>, chart: &'a ChartConfig) -> Self {
        Self { client, chart }
    }

    /// Generate a chart for `station_id` as of `now`, labelling times in `tz`.
    pub fn run<S: RenderSink, Tz: TimeZone>(
        &self,
        station_id: &str,
        now: DateTime<Utc>,
        tz: &Tz,
        sink: &mut S,
    ) -> std::result::Result<ChartReport, ChartFailure> {
        let mut stage = ChartStage::Init;

        let station = self
            .client
            .fetch_station_info(station_id)
            .and_then(|info| {
                if info.is_tidal {
                    Ok(info)
                } else {
                    Err(TideChartError::StationNotTidal(info.id))
                }
            })
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage, ChartStage::StationValidated);

        let raw = prediction_window(&now, self.chart.window_hours)
            .and_then(|(begin, end)| self.client.fetch_predictions(station_id, &begin, &end))
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage, ChartStage::DataFetched);

        let built = series::build(&raw).map_err(|e| fail(stage, e))?;
        if built.had_errors() {
            log::warn!(
                "{} of {} predictions had no usable value",
                built.absent_values,
                built.series.len()
            );
        }
        stage = advance(stage, ChartStage::SeriesBuilt);

        let stats = statistics::compute(&built.series).map_err(|e| fail(stage, e))?;
        stage = advance(stage, ChartStage::StatsComputed);

        let layout = sink
            .area_template()
            .and_then(|area| layout::layout_bars(&built.series, &stats, &area, tz))
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage, ChartStage::LayoutComputed);

        let caption = format!("{CAPTION_PREFIX}{}", station.name);
        let summary = summary_text(&built.series, &stats, tz);

        emit(sink, &caption, &summary, &layout.bars).map_err(|e| fail(stage, e))?;
        let stage = advance(stage, ChartStage::Rendered);

        Ok(ChartReport {
            stage,
            station,
            series: built.series,
            statistics: stats,
            layout,
            caption,
            summary,
        })
    }
}

fn advance(from: ChartStage, to: ChartStage) -> ChartStage {
    log::info!("Chart stage {:?} -> {:?}", from, to);
    to
}

/// Replace earlier bars, then write caption, summary and the new bars.
fn emit<S: RenderSink>(
    sink: &mut S,
    caption: &str,
    summary: &str,
    bars: &[BarDescriptor],
) -> Result<()> {
    for name in sink.bar_names() {
        if name.starts_with(BAR_NAME_PREFIX) {
            sink.remove_element(&name)?;
        }
    }
    sink.set_caption(caption)?;
    sink.set_summary(summary)?;
    sink.place_bars(bars)
}

/// Date range and extremes in both units, tab-separated, one item per line.
pub fn summary_text<Tz: TimeZone>(
    series: &PredictionSeries,
    stats: &TideStatistics,
    tz: &Tz,
) -> String {
    let local = |t: &DateTime<Utc>| {
        t.with_timezone(tz)
            .naive_local()
            .format("%Y-%m-%d %H:%M")
            .to_string()
    };

    format!(
        "From:\t{}\nTo:\t{}\nMin:\t{:.2} ft ({:.2} m)\nMax:\t{:.2} ft ({:.2} m)\nDifference:\t{:.2} ft ({:.2} m)",
        local(&series.first().timestamp),
        local(&series.last().timestamp),
        stats.min_ft(),
        stats.min,
        stats.max_ft(),
        stats.max,
        stats.range_ft(),
        stats.range
    )
}

fn fail(reached: ChartStage, error: TideChartError) -> ChartFailure {
    let headline = match (&reached, &error) {
        (_, TideChartError::InvalidInput(_)) => "The station code or time window is invalid",
        (ChartStage::Init, TideChartError::StationNotTidal(_)) => "Selected station is not tidal",
        (ChartStage::Init, _) => "A valid NOAA station code is needed",
        (ChartStage::StationValidated, _) => "Failed to retrieve the tide data",
        (ChartStage::DataFetched, _) => "The tide data could not be read",
        (ChartStage::SeriesBuilt, _) => "Insufficient data received from the API",
        _ => "Failed to generate the tide chart",
    };
    log::error!("{} ({:?}): {}", headline, reached, error);

    ChartFailure {
        reached,
        messages: vec![headline.to_string(), error.to_string()],
        error,
    }
}
