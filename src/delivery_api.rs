use std::time::Duration;

use reqwest::Url;

use crate::{schema::Response, DeliveryRequest, Error, Result};

const DELIVERY_ENDPOINT: &str = "/deliver";
const HEALTH_ENDPOINT: &str = "/healthz";

const WARMUP_REQUESTS: usize = 20;

/// Runs delivery for a request.
///
/// Implemented by the remote [`PromotedDeliveryApi`] and by the local
/// [`SdkDelivery`](crate::SdkDelivery).
pub trait DeliveryApi {
    /// Rank the insertions of `request`.
    fn run_delivery(&self, request: &DeliveryRequest) -> Result<Response>;
}

/// Settings for [`PromotedDeliveryApi`].
#[derive(Debug, Clone)]
pub struct DeliveryApiConfig {
    /// Any URL on the Delivery API host. Only scheme and authority are used.
    pub endpoint: String,
    /// Sent in the `x-api-key` header.
    pub api_key: String,
    /// Deadline for the whole round trip.
    pub timeout: Duration,
    /// Request and accept gzip-compressed responses.
    pub accept_gzip: bool,
    /// Issue health checks on construction to open pooled connections.
    pub warmup: bool,
}

/// HTTP client for the Delivery API.
pub struct PromotedDeliveryApi {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::blocking::Client,
    delivery_url: Url,
    health_url: Url,
    api_key: String,
}

impl PromotedDeliveryApi {
    /// Create a client, running the warmup if requested.
    ///
    /// Warmup failures are logged and never fail construction.
    pub fn new(config: DeliveryApiConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(Error::InvalidEndpoint)?;
        let delivery_url = endpoint
            .join(DELIVERY_ENDPOINT)
            .map_err(Error::InvalidEndpoint)?;
        let health_url = endpoint
            .join(HEALTH_ENDPOINT)
            .map_err(Error::InvalidEndpoint)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .gzip(config.accept_gzip)
            .build()?;

        let api = PromotedDeliveryApi {
            client,
            delivery_url,
            health_url,
            api_key: config.api_key,
        };

        if config.warmup {
            api.run_warmup();
        }

        Ok(api)
    }

    fn run_warmup(&self) {
        log::debug!(target: "promoted", url:display = self.health_url; "warming up Delivery API connections");
        for _ in 0..WARMUP_REQUESTS {
            let result = self
                .client
                .get(self.health_url.clone())
                .header("x-api-key", &self.api_key)
                .send();
            if let Err(err) = result {
                log::warn!(target: "promoted", "error during warmup: {}", err);
            }
        }
    }
}

impl DeliveryApi for PromotedDeliveryApi {
    fn run_delivery(&self, delivery_request: &DeliveryRequest) -> Result<Response> {
        let request = delivery_request
            .request
            .as_ref()
            .ok_or(Error::MissingRequest)?;

        log::trace!(target: "promoted",
                    url:display = self.delivery_url,
                    insertions = request.insertion.len();
                    "calling Delivery API");

        let response = self
            .client
            .post(self.delivery_url.clone())
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                api: "Delivery",
                status,
            });
        }

        let body = response.bytes()?;
        let response: Response = serde_json::from_slice(&body)?;
        if response.request_id.is_empty() {
            return Err(Error::MissingResponseId);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{DeliveryApiConfig, PromotedDeliveryApi};
    use crate::Error;

    fn config(endpoint: &str) -> DeliveryApiConfig {
        DeliveryApiConfig {
            endpoint: endpoint.to_owned(),
            api_key: "key".to_owned(),
            timeout: Duration::from_millis(250),
            accept_gzip: false,
            warmup: false,
        }
    }

    #[test]
    fn derives_endpoints_from_authority() {
        let api = PromotedDeliveryApi::new(config("https://delivery.example.com:8443/some/path?x=1"))
            .unwrap();
        assert_eq!(
            api.delivery_url.as_str(),
            "https://delivery.example.com:8443/deliver"
        );
        assert_eq!(
            api.health_url.as_str(),
            "https://delivery.example.com:8443/healthz"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let err = PromotedDeliveryApi::new(config("not a url")).err().unwrap();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }
}
