//! Min/max/range over the present values of a series.

use crate::{PredictionSeries, Result, TideChartError, TideStatistics};

/// Scan present values once for min and max.
///
/// Fails with [`TideChartError::InsufficientData`] when no value is present or
/// all present values are equal; the layout divides by the range.
pub fn compute(series: &PredictionSeries) -> Result<TideStatistics> {
    let (min, max) = series
        .present_values()
        .fold(None, |bounds: Option<(f64, f64)>, level| match bounds {
            None => Some((level, level)),
            Some((min, max)) => Some((min.min(level), max.max(level))),
        })
        .ok_or(TideChartError::InsufficientData)?;

    let range = max - min;
    if range <= 0.0 {
        log::warn!("All present predictions equal {:.3} m; nothing to chart", min);
        return Err(TideChartError::InsufficientData);
    }

    Ok(TideStatistics { min, max, range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PredictionSample;
    use chrono::{Duration, TimeZone, Utc};

    fn series(levels: &[Option<f64>]) -> PredictionSeries {
        let start = Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap();
        PredictionSeries::new(
            levels
                .iter()
                .enumerate()
                .map(|(i, &water_level_m)| PredictionSample {
                    timestamp: start + Duration::hours(i as i64),
                    water_level_m,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn finds_min_max_and_range() {
        let stats = compute(&series(&[Some(0.5), Some(-0.2), Some(1.1), Some(0.3)])).unwrap();
        assert_eq!(stats.min, -0.2);
        assert_eq!(stats.max, 1.1);
        assert!((stats.range - 1.3).abs() < 1e-12);
    }

    #[test]
    fn ignores_absent_values() {
        let stats = compute(&series(&[None, Some(0.4), None, Some(0.9)])).unwrap();
        assert_eq!(stats.min, 0.4);
        assert_eq!(stats.max, 0.9);
    }

    #[test]
    fn all_absent_is_insufficient() {
        assert_eq!(
            compute(&series(&[None, None, None])),
            Err(TideChartError::InsufficientData)
        );
    }

    #[test]
    fn flat_series_is_insufficient() {
        assert_eq!(
            compute(&series(&[Some(0.7), None, Some(0.7), Some(0.7)])),
            Err(TideChartError::InsufficientData)
        );
        assert_eq!(
            compute(&series(&[Some(0.7)])),
            Err(TideChartError::InsufficientData)
        );
    }

    #[test]
    fn feet_accessors_use_conversion_factor() {
        let stats = compute(&series(&[Some(0.10), Some(1.30)])).unwrap();
        assert_eq!(format!("{:.2}", stats.min_ft()), "0.33");
        assert_eq!(format!("{:.2}", stats.max_ft()), "4.27");
    }
}
