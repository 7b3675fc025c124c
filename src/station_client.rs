//! # NOAA Station and Prediction Client
//!
//! Talks to two NOAA CO-OPS endpoints through an [`HttpTransport`]:
//!
//! ### Metadata API
//! - **URL**: `<metadata_base>/stations/<id>.json`
//! - **Shape**: `{ "stations": [ { "id": "8722956", "name": "...", "tidal": true, ... } ] }`
//!
//! ### Data API
//! - **URL**: `<data_base>/datagetter?begin_date=...&end_date=...&station=...`
//! - **Fixed parameters**: predictions, MLLW datum, hourly, metric, GMT, JSON
//! - **Shape**: `{ "predictions": [ { "t": "2024-06-16 15:00", "v": "0.412" }, ... ] }`
//!
//! Responses are deserialized into typed records; any other shape is
//! [`TideChartError::InvalidJson`]. There is no retry: one failed request ends
//! the call.

use crate::config::ApiConfig;
use crate::time_format::format_query_timestamp;
use crate::transport::HttpTransport;
use crate::{Result, StationInfo, TideChartError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const ACCEPT_ANY: [(&str, &str); 1] = [("Accept", "*/*")];

const PRODUCT_PREDICTIONS: &str = "predictions";
/// Mean Lower Low Water, the U.S. nautical chart datum
const DATUM_MLLW: &str = "MLLW";
const INTERVAL_HOURLY: &str = "h";
const UNITS_METRIC: &str = "metric";
const TIME_ZONE_GMT: &str = "gmt";
const FORMAT_JSON: &str = "json";

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Option<Vec<StationRecord>>,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: String,
    name: String,
    tidal: bool,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    predictions: Option<Vec<RawPrediction>>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

/// One prediction record exactly as the service sent it.
///
/// `v` is kept as raw JSON so that the series builder can decide how lenient to be.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPrediction {
    pub t: String,
    #[serde(default)]
    pub v: serde_json::Value,
}

/// Client for the NOAA metadata and data APIs.
pub struct StationClient<T: HttpTransport> {
    transport: T,
    api: ApiConfig,
}

impl<T: HttpTransport> StationClient<T> {
    pub fn new(transport: T, api: ApiConfig) -> Self {
        Self { transport, api }
    }

    /// URL of the metadata document for `station_id`.
    pub fn station_info_url(&self, station_id: &str) -> Result<String> {
        validate_station_id(station_id)?;
        Ok(format!(
            "{}/stations/{}.json",
            self.api.metadata_base.trim_end_matches('/'),
            station_id
        ))
    }

    /// URL of the hourly MLLW prediction query for `[begin, end]`.
    pub fn prediction_url(
        &self,
        station_id: &str,
        begin: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<String> {
        validate_station_id(station_id)?;
        let begin_date = format_query_timestamp(begin)?.replace(' ', "%20");
        let end_date = format_query_timestamp(end)?.replace(' ', "%20");

        Ok(format!(
            "{}/datagetter?begin_date={}&end_date={}&station={}&product={}&datum={}&interval={}&units={}&time_zone={}&format={}",
            self.api.data_base.trim_end_matches('/'),
            begin_date,
            end_date,
            station_id,
            PRODUCT_PREDICTIONS,
            DATUM_MLLW,
            INTERVAL_HOURLY,
            UNITS_METRIC,
            TIME_ZONE_GMT,
            FORMAT_JSON
        ))
    }

    /// Fetch metadata for `station_id`, taking the first listed station.
    pub fn fetch_station_info(&self, station_id: &str) -> Result<StationInfo> {
        let url = self.station_info_url(station_id)?;
        let body = self.get(&url)?;

        let response: StationsResponse = serde_json::from_slice(&body)
            .map_err(|e| TideChartError::InvalidJson(e.to_string()))?;

        let record = response
            .stations
            .and_then(|stations| stations.into_iter().next())
            .ok_or_else(|| TideChartError::StationNotFound(station_id.to_string()))?;

        log::info!(
            "Station {} is {} (tidal: {})",
            record.id,
            record.name,
            record.tidal
        );

        Ok(StationInfo {
            id: record.id,
            name: record.name,
            is_tidal: record.tidal,
        })
    }

    /// Fetch the raw prediction records for `[begin, end]`.
    pub fn fetch_predictions(
        &self,
        station_id: &str,
        begin: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<RawPrediction>> {
        let url = self.prediction_url(station_id, begin, end)?;
        let body = self.get(&url)?;

        let response: PredictionsResponse = serde_json::from_slice(&body)
            .map_err(|e| TideChartError::InvalidJson(e.to_string()))?;

        match response.predictions {
            Some(predictions) if !predictions.is_empty() => {
                log::info!(
                    "Received {} predictions for station {}",
                    predictions.len(),
                    station_id
                );
                Ok(predictions)
            }
            _ => {
                let detail = response.error.map(|e| e.message);
                if let Some(message) = &detail {
                    log::warn!("Data API refused station {}: {}", station_id, message);
                }
                Err(TideChartError::NoPredictions(detail))
            }
        }
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", url);
        let body = self
            .transport
            .get(url, &ACCEPT_ANY)
            .map_err(|e| TideChartError::NoResponse(e.to_string()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(TideChartError::NoResponse("empty body".to_string()));
        }
        Ok(body)
    }
}

/// Station identifiers are interpolated into URLs, so only ASCII letters and
/// digits are accepted.
fn validate_station_id(station_id: &str) -> Result<()> {
    if station_id.is_empty() || !station_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TideChartError::InvalidInput(format!(
            "station id {station_id:?} must be non-empty ASCII letters and digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use chrono::TimeZone;
    use std::cell::RefCell;

    /// Transport double returning one canned body and recording requests.
    struct CannedTransport {
        body: Option<&'static str>,
        requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedTransport {
        fn new(body: Option<&'static str>) -> Self {
            Self {
                body,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for &CannedTransport {
        fn get(&self, url: &str, headers: &[(&str, &str)]) -> std::result::Result<Vec<u8>, TransportError> {
            self.requests.borrow_mut().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.body
                .map(|b| b.as_bytes().to_vec())
                .ok_or(TransportError::Status(503))
        }
    }

    fn client(transport: &CannedTransport) -> StationClient<&CannedTransport> {
        StationClient::new(transport, ApiConfig::default())
    }

    #[test]
    fn station_info_url_and_headers() {
        let transport = CannedTransport::new(Some(
            r#"{"count":1,"stations":[{"id":"8722956","name":"South Port Everglades","tidal":true,"lat":26.08}]}"#,
        ));
        let info = client(&transport).fetch_station_info("8722956").unwrap();
        assert_eq!(info.name, "South Port Everglades");
        assert!(info.is_tidal);

        let requests = transport.requests.borrow();
        assert_eq!(
            requests[0].0,
            "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations/8722956.json"
        );
        assert_eq!(requests[0].1, vec![("Accept".to_string(), "*/*".to_string())]);
    }

    #[test]
    fn empty_station_list_is_not_found() {
        let transport = CannedTransport::new(Some(r#"{"count":0,"stations":[]}"#));
        assert_eq!(
            client(&transport).fetch_station_info("0000000"),
            Err(TideChartError::StationNotFound("0000000".into()))
        );
    }

    #[test]
    fn missing_station_list_is_not_found() {
        let transport = CannedTransport::new(Some(r#"{"count":0}"#));
        assert!(matches!(
            client(&transport).fetch_station_info("0000000"),
            Err(TideChartError::StationNotFound(_))
        ));
    }

    #[test]
    fn station_without_tidal_flag_is_invalid_json() {
        let transport =
            CannedTransport::new(Some(r#"{"stations":[{"id":"8722956","name":"X"}]}"#));
        assert!(matches!(
            client(&transport).fetch_station_info("8722956"),
            Err(TideChartError::InvalidJson(_))
        ));
    }

    #[test]
    fn garbage_body_is_invalid_json() {
        let transport = CannedTransport::new(Some("<html>maintenance</html>"));
        assert!(matches!(
            client(&transport).fetch_station_info("8722956"),
            Err(TideChartError::InvalidJson(_))
        ));
    }

    #[test]
    fn transport_failure_and_blank_body_are_no_response() {
        let failing = CannedTransport::new(None);
        assert!(matches!(
            client(&failing).fetch_station_info("8722956"),
            Err(TideChartError::NoResponse(_))
        ));

        let blank = CannedTransport::new(Some("  \n"));
        assert!(matches!(
            client(&blank).fetch_station_info("8722956"),
            Err(TideChartError::NoResponse(_))
        ));
    }

    #[test]
    fn rejects_station_ids_that_would_alter_the_url() {
        let transport = CannedTransport::new(Some("{}"));
        for id in ["", "87229 56", "../admin", "8722956&x=1"] {
            assert!(matches!(
                client(&transport).fetch_station_info(id),
                Err(TideChartError::InvalidInput(_))
            ));
        }
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn prediction_url_carries_every_parameter() {
        let transport = CannedTransport::new(None);
        let begin = Utc.with_ymd_and_hms(2024, 6, 16, 15, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 17, 14, 0, 0).unwrap();
        let url = client(&transport)
            .prediction_url("8722956", &begin, &end)
            .unwrap();
        assert_eq!(
            url,
            "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter?begin_date=20240616%2015:00&end_date=20240617%2014:00&station=8722956&product=predictions&datum=MLLW&interval=h&units=metric&time_zone=gmt&format=json"
        );
    }

    #[test]
    fn predictions_are_returned_in_order() {
        let transport = CannedTransport::new(Some(
            r#"{"predictions":[{"t":"2024-06-16 15:00","v":"0.412"},{"t":"2024-06-16 16:00","v":"0.518"}]}"#,
        ));
        let begin = Utc.with_ymd_and_hms(2024, 6, 16, 15, 0, 0).unwrap();
        let predictions = client(&transport)
            .fetch_predictions("8722956", &begin, &begin)
            .unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].t, "2024-06-16 15:00");
        assert_eq!(predictions[1].v, serde_json::json!("0.518"));
    }

    #[test]
    fn empty_or_missing_predictions() {
        let begin = Utc.with_ymd_and_hms(2024, 6, 16, 15, 0, 0).unwrap();

        let empty = CannedTransport::new(Some(r#"{"predictions":[]}"#));
        assert_eq!(
            client(&empty).fetch_predictions("8722956", &begin, &begin),
            Err(TideChartError::NoPredictions(None))
        );

        let refused = CannedTransport::new(Some(
            r#"{"error":{"message":"No Predictions data was found."}}"#,
        ));
        assert_eq!(
            client(&refused).fetch_predictions("8722956", &begin, &begin),
            Err(TideChartError::NoPredictions(Some(
                "No Predictions data was found.".into()
            )))
        );
    }

    #[test]
    fn predictions_of_wrong_shape_are_invalid_json() {
        let begin = Utc.with_ymd_and_hms(2024, 6, 16, 15, 0, 0).unwrap();
        let transport = CannedTransport::new(Some(r#"{"predictions":[{"v":"0.4"}]}"#));
        assert!(matches!(
            client(&transport).fetch_predictions("8722956", &begin, &begin),
            Err(TideChartError::InvalidJson(_))
        ));
    }
}
