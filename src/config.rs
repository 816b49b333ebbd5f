use std::{sync::Arc, time::Duration};

use crate::{
    api_factory::{ApiFactory, DefaultApiFactory},
    sampler::{DefaultSampler, Sampler},
    treatment::ApplyTreatmentChecker,
    Client, Result,
};

/// Configuration for [`Client`].
///
/// # Examples
/// ```no_run
/// # use promoted::ClientConfig;
/// # use std::time::Duration;
/// let client = ClientConfig::new(
///     "https://delivery.example.com",
///     "delivery-api-key",
///     "https://metrics.example.com/log",
///     "metrics-api-key",
/// )
/// .delivery_timeout(Duration::from_millis(150))
/// .shadow_traffic_delivery_rate(0.1)
/// .to_client()
/// .unwrap();
/// ```
pub struct ClientConfig {
    pub(crate) delivery_endpoint: String,
    pub(crate) delivery_api_key: String,
    pub(crate) delivery_timeout: Duration,
    pub(crate) metrics_endpoint: String,
    pub(crate) metrics_api_key: String,
    pub(crate) metrics_timeout: Duration,
    pub(crate) warmup: bool,
    pub(crate) max_request_insertions: usize,
    pub(crate) apply_treatment_checker: Option<Arc<dyn ApplyTreatmentChecker + Send + Sync>>,
    pub(crate) sampler: Arc<dyn Sampler + Send + Sync>,
    pub(crate) api_factory: Box<dyn ApiFactory>,
    pub(crate) shadow_traffic_delivery_rate: f32,
    pub(crate) perform_checks: bool,
    pub(crate) blocking_shadow_traffic: bool,
    pub(crate) accept_gzip: bool,
}

impl ClientConfig {
    /// Default deadline for Delivery API calls.
    pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(250);

    /// Default deadline for Metrics API calls.
    pub const DEFAULT_METRICS_TIMEOUT: Duration = Duration::from_millis(3000);

    /// Default cap on the number of insertions sent to the Delivery API.
    pub const DEFAULT_MAX_REQUEST_INSERTIONS: usize = 1000;

    /// Create a default configuration for the given endpoints and API keys.
    pub fn new(
        delivery_endpoint: impl Into<String>,
        delivery_api_key: impl Into<String>,
        metrics_endpoint: impl Into<String>,
        metrics_api_key: impl Into<String>,
    ) -> Self {
        ClientConfig {
            delivery_endpoint: delivery_endpoint.into(),
            delivery_api_key: delivery_api_key.into(),
            delivery_timeout: Self::DEFAULT_DELIVERY_TIMEOUT,
            metrics_endpoint: metrics_endpoint.into(),
            metrics_api_key: metrics_api_key.into(),
            metrics_timeout: Self::DEFAULT_METRICS_TIMEOUT,
            warmup: false,
            max_request_insertions: Self::DEFAULT_MAX_REQUEST_INSERTIONS,
            apply_treatment_checker: None,
            sampler: Arc::new(DefaultSampler),
            api_factory: Box::new(DefaultApiFactory),
            shadow_traffic_delivery_rate: 0.0,
            perform_checks: false,
            blocking_shadow_traffic: false,
            accept_gzip: false,
        }
    }

    /// Deadline for each Delivery API call. Zero falls back to the default.
    pub fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Deadline for each Metrics API call. Zero falls back to the default.
    pub fn metrics_timeout(mut self, timeout: Duration) -> Self {
        self.metrics_timeout = timeout;
        self
    }

    /// Issue health checks against the Delivery API when the client is created.
    pub fn warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Maximum number of insertions sent to the Delivery API. Zero falls back to the default.
    pub fn max_request_insertions(mut self, max_request_insertions: usize) -> Self {
        self.max_request_insertions = max_request_insertions;
        self
    }

    /// Override how the client decides whether a user receives the Delivery API treatment.
    ///
    /// ```
    /// # use promoted::{ClientConfig, CohortMembership};
    /// let config = ClientConfig::new("", "", "", "")
    ///     .apply_treatment_checker(|_: Option<&CohortMembership>| false);
    /// ```
    pub fn apply_treatment_checker(
        mut self,
        checker: impl ApplyTreatmentChecker + Send + Sync + 'static,
    ) -> Self {
        self.apply_treatment_checker = Some(Arc::new(checker));
        self
    }

    /// Override the random source used for shadow traffic sampling.
    pub fn sampler(mut self, sampler: impl Sampler + Send + Sync + 'static) -> Self {
        self.sampler = Arc::new(sampler);
        self
    }

    /// Override how the Delivery API, Metrics API and SDK delivery are created.
    pub fn api_factory(mut self, api_factory: impl ApiFactory + 'static) -> Self {
        self.api_factory = Box::new(api_factory);
        self
    }

    /// Fraction of SDK-delivered requests mirrored to the Delivery API. Must be in `[0, 1]`.
    pub fn shadow_traffic_delivery_rate(mut self, rate: f32) -> Self {
        self.shadow_traffic_delivery_rate = rate;
        self
    }

    /// Validate requests and log violations.
    pub fn perform_checks(mut self, perform_checks: bool) -> Self {
        self.perform_checks = perform_checks;
        self
    }

    /// Send shadow traffic on the calling thread instead of in the background.
    pub fn blocking_shadow_traffic(mut self, blocking_shadow_traffic: bool) -> Self {
        self.blocking_shadow_traffic = blocking_shadow_traffic;
        self
    }

    /// Accept gzip-compressed Delivery API responses.
    pub fn accept_gzip(mut self, accept_gzip: bool) -> Self {
        self.accept_gzip = accept_gzip;
        self
    }

    /// Create a new [`Client`] using this configuration.
    ///
    /// # Errors
    ///
    /// Fails if the shadow traffic rate is outside `[0, 1]` or a collaborator cannot be created
    /// (for example, an endpoint is not a valid URL).
    pub fn to_client(self) -> Result<Client> {
        Client::new(self)
    }
}
