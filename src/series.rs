//! Turns raw prediction records into a [`PredictionSeries`].
//!
//! Timestamps are strict: one undecodable timestamp fails the whole batch.
//! Values are lenient: anything that is not a finite number becomes an absent
//! sample and the batch carries on.

use crate::station_client::RawPrediction;
use crate::time_format::parse_service_timestamp;
use crate::{PredictionSample, PredictionSeries, Result, TideChartError};
use serde_json::Value;

/// A built series plus a count of values that could not be parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltSeries {
    pub series: PredictionSeries,
    pub absent_values: usize,
}

impl BuiltSeries {
    /// True when at least one record had an unusable value.
    pub fn had_errors(&self) -> bool {
        self.absent_values > 0
    }
}

/// Build a series from records in server order.
///
/// On a malformed timestamp the samples decoded so far are dropped; the error
/// reports how many there were.
pub fn build(raw: &[RawPrediction]) -> Result<BuiltSeries> {
    if raw.is_empty() {
        return Err(TideChartError::NoPredictions(None));
    }

    let mut samples = Vec::with_capacity(raw.len());
    let mut absent_values = 0;

    for (index, record) in raw.iter().enumerate() {
        let timestamp = parse_service_timestamp(&record.t).map_err(|_| {
            log::error!("Prediction {} has malformed timestamp {:?}", index, record.t);
            TideChartError::MalformedTimestamp {
                index,
                text: record.t.clone(),
                accumulated: samples.len(),
            }
        })?;

        let water_level_m = parse_level(&record.v);
        if water_level_m.is_none() {
            log::warn!(
                "Prediction {} at {} has unusable value {}",
                index,
                record.t,
                record.v
            );
            absent_values += 1;
        }

        samples.push(PredictionSample {
            timestamp,
            water_level_m,
        });
    }

    Ok(BuiltSeries {
        series: PredictionSeries::new(samples)?,
        absent_values,
    })
}

fn parse_level(value: &Value) -> Option<f64> {
    let level = match value {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    level.is_finite().then_some(level)
}
