//! # HTTP Transport
//!
//! The chart pipeline only needs "GET this URL with these headers, give me the
//! body". [`HttpTransport`] captures that so the station client can be driven by
//! fixtures in tests and by [`ReqwestTransport`] in production.
//!
//! ## Network Configuration
//! - Redirects are followed (up to 10 hops)
//! - One request per call, no retries; timeouts come from `api.timeout_secs`
//! - Non-2xx statuses are failures; the body of an error page is never parsed

use reqwest::{redirect, Client};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while performing a single GET.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Async runtime for the blocking wrapper could not be started
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Blocking GET, as seen by the chart pipeline.
pub trait HttpTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, TransportError>;
}

/// Production transport: a `reqwest` client driven by a private current-thread
/// Tokio runtime, so each call blocks until the response body is read.
pub struct ReqwestTransport {
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(10))
            .timeout(timeout)
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self { client, runtime })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, TransportError> {
        self.runtime.block_on(async {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                log::warn!("GET {} answered {}", url, status);
                return Err(TransportError::Status(status.as_u16()));
            }

            let body = response.bytes().await?;
            log::debug!("GET {} returned {} bytes", url, body.len());
            Ok(body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn status_error_reports_code() {
        assert_eq!(TransportError::Status(404).to_string(), "HTTP status 404");
    }
}
