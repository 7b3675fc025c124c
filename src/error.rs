//! Error taxonomy shared by every stage of the chart pipeline.

use thiserror::Error;

/// Failures that can end a chart run.
///
/// Each component converts its internal failures into one of these variants
/// before returning, so nothing escapes a component boundary untyped. The
/// controller reports the variant of the first failing stage and stops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TideChartError {
    /// Transport produced no usable body (network, HTTP status, empty body)
    #[error("no response from API: {0}")]
    NoResponse(String),

    /// Body was not JSON of the expected shape
    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    /// Metadata service listed no station for the identifier
    #[error("no station found for id {0}")]
    StationNotFound(String),

    /// Station exists but publishes no tide predictions
    #[error("station {0} is not tidal")]
    StationNotTidal(String),

    /// Prediction list empty or missing
    #[error("no predictions listed in response{}", detail_suffix(.0))]
    NoPredictions(Option<String>),

    /// A prediction record carried a timestamp that is not a real calendar instant.
    /// `accumulated` counts the samples decoded before the offending record.
    #[error("malformed timestamp {text:?} in record {index} ({accumulated} samples decoded before it)")]
    MalformedTimestamp {
        index: usize,
        text: String,
        accumulated: usize,
    },

    /// Caller-supplied argument rejected before any work was done
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few present values, or a flat series with zero range
    #[error("insufficient data received from the API")]
    InsufficientData,

    /// Bounding area cannot hold the requested bars
    #[error("degenerate chart area: {0}")]
    DegenerateArea(String),

    /// Rendering sink refused an operation
    #[error("render failed: {0}")]
    Render(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, TideChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_predictions_message_includes_service_detail() {
        let bare = TideChartError::NoPredictions(None);
        assert_eq!(bare.to_string(), "no predictions listed in response");

        let detailed = TideChartError::NoPredictions(Some("No data was found".into()));
        assert_eq!(
            detailed.to_string(),
            "no predictions listed in response: No data was found"
        );
    }

    #[test]
    fn malformed_timestamp_names_the_record() {
        let err = TideChartError::MalformedTimestamp {
            index: 3,
            text: "2024-02-30 10:00".into(),
            accumulated: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-02-30 10:00"));
        assert!(msg.contains("record 3"));
    }
}
