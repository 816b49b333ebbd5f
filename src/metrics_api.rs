use std::time::Duration;

use reqwest::Url;

use crate::{schema::LogRequest, Error, Result};

/// Sends log records to the Metrics API.
pub trait MetricsApi {
    /// Post `log_request` to the Metrics API.
    fn run_metrics_logging(&self, log_request: &LogRequest) -> Result<()>;
}

/// Settings for [`PromotedMetricsApi`].
#[derive(Debug, Clone)]
pub struct MetricsApiConfig {
    /// Full URL log requests are posted to.
    pub endpoint: String,
    /// Sent in the `x-api-key` header.
    pub api_key: String,
    /// Deadline for the whole round trip.
    pub timeout: Duration,
}

/// HTTP client for the Metrics API.
pub struct PromotedMetricsApi {
    client: reqwest::blocking::Client,
    url: Url,
    api_key: String,
}

impl PromotedMetricsApi {
    /// Create a client for the configured endpoint.
    pub fn new(config: MetricsApiConfig) -> Result<Self> {
        let url = Url::parse(&config.endpoint).map_err(Error::InvalidEndpoint)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(PromotedMetricsApi {
            client,
            url,
            api_key: config.api_key,
        })
    }
}

impl MetricsApi for PromotedMetricsApi {
    fn run_metrics_logging(&self, log_request: &LogRequest) -> Result<()> {
        log::trace!(target: "promoted", url:display = self.url; "calling Metrics API");

        let response = self
            .client
            .post(self.url.clone())
            .header("x-api-key", &self.api_key)
            .json(log_request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                api: "Metrics",
                status,
            });
        }

        Ok(())
    }
}
