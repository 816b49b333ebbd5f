use std::{sync::Arc, time::Duration};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    delivery_api::{DeliveryApi, DeliveryApiConfig},
    metrics_api::{MetricsApi, MetricsApiConfig},
    sampler::Sampler,
    schema::{
        ClientType, CohortArm, CohortMembership, DeliveryExecution, DeliveryLog, ExecutionServer,
        LogRequest, Response, TrafficType,
    },
    treatment::ApplyTreatmentChecker,
    ClientConfig, DeliveryPlan, DeliveryRequest, DeliveryResponse, Error, Result,
};

const SERVER_VERSION: &str = concat!("rust.", env!("CARGO_PKG_VERSION"));

/// A client for the Promoted Delivery API and Metrics API.
///
/// In order to create a client instance, first create [`ClientConfig`].
///
/// # Execution
///
/// [`Client::deliver`] ranks insertions either remotely, by calling the Delivery API, or locally
/// in the SDK when the user is in the control arm of an experiment, the request is log-only, or
/// the Delivery API call fails. Metrics logging and shadow traffic run on background threads and
/// never affect the returned response.
///
/// # Examples
/// ```no_run
/// # use promoted::{ClientConfig, DeliveryRequest, Insertion, Request, UserInfo};
/// let client = ClientConfig::new(
///     "https://delivery.example.com",
///     "delivery-api-key",
///     "https://metrics.example.com/log",
///     "metrics-api-key",
/// )
/// .to_client()
/// .unwrap();
///
/// let request = Request {
///     user_info: Some(UserInfo {
///         anon_user_id: "anon-1".to_owned(),
///         ..Default::default()
///     }),
///     insertion: vec![Insertion::new("product-1"), Insertion::new("product-2")],
///     ..Default::default()
/// };
/// let response = client
///     .deliver(DeliveryRequest::new(Some(request), None, false, 0))
///     .unwrap();
/// ```
pub struct Client {
    delivery_api: Arc<dyn DeliveryApi + Send + Sync>,
    metrics_api: Arc<dyn MetricsApi + Send + Sync>,
    sdk_delivery: Arc<dyn DeliveryApi + Send + Sync>,
    max_request_insertions: usize,
    apply_treatment_checker: Option<Arc<dyn ApplyTreatmentChecker + Send + Sync>>,
    shadow_traffic_delivery_rate: f32,
    sampler: Arc<dyn Sampler + Send + Sync>,
    perform_checks: bool,
    blocking_shadow_traffic: bool,
}

impl Client {
    /// Create a new `Client` using the specified configuration.
    ///
    /// See [`ClientConfig::to_client`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let rate = config.shadow_traffic_delivery_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::InvalidShadowTrafficRate(rate));
        }

        let delivery_timeout = non_zero_or(
            config.delivery_timeout,
            ClientConfig::DEFAULT_DELIVERY_TIMEOUT,
        );
        let metrics_timeout =
            non_zero_or(config.metrics_timeout, ClientConfig::DEFAULT_METRICS_TIMEOUT);
        let max_request_insertions = match config.max_request_insertions {
            0 => ClientConfig::DEFAULT_MAX_REQUEST_INSERTIONS,
            max => max,
        };

        let delivery_api = config.api_factory.create_delivery_api(DeliveryApiConfig {
            endpoint: config.delivery_endpoint,
            api_key: config.delivery_api_key,
            timeout: delivery_timeout,
            accept_gzip: config.accept_gzip,
            warmup: config.warmup,
        })?;
        let metrics_api = config.api_factory.create_metrics_api(MetricsApiConfig {
            endpoint: config.metrics_endpoint,
            api_key: config.metrics_api_key,
            timeout: metrics_timeout,
        })?;

        Ok(Client {
            delivery_api,
            metrics_api,
            sdk_delivery: config.api_factory.create_sdk_delivery(),
            max_request_insertions,
            apply_treatment_checker: config.apply_treatment_checker,
            shadow_traffic_delivery_rate: rate,
            sampler: config.sampler,
            perform_checks: config.perform_checks,
            blocking_shadow_traffic: config.blocking_shadow_traffic,
        })
    }

    /// Rank the insertions of `request`.
    ///
    /// Delivery API failures are logged and fall back to SDK delivery.
    ///
    /// # Errors
    ///
    /// Returns an error only if SDK delivery was needed and failed, for example
    /// [`Error::OffsetBeforeInsertionStart`] when the requested page starts before the supplied
    /// insertions, or [`Error::MissingRequest`].
    pub fn deliver(&self, mut request: DeliveryRequest) -> Result<DeliveryResponse> {
        let plan = self.plan(request.only_log, request.experiment.as_ref());
        self.prepare_request(&mut request, &plan);

        let api_response = if plan.use_api_response {
            self.call_delivery_api(&request)
                .inspect_err(|err| {
                    log::warn!(target: "promoted", "error calling Delivery API, falling back: {}", err);
                })
                .ok()
        } else {
            None
        };

        self.handle_sdk_and_log(request, &plan, api_response)
    }

    /// Decide how a request executes.
    ///
    /// Log-only requests always use SDK delivery. Otherwise the Delivery API response is used when
    /// the treatment applies to the user's experiment arm.
    pub fn plan(&self, only_log: bool, experiment: Option<&CohortMembership>) -> DeliveryPlan {
        let use_api_response = !only_log && self.should_apply_treatment(experiment);
        let plan = DeliveryPlan::new(Uuid::new_v4().to_string(), use_api_response);
        log::trace!(target: "promoted",
                    only_log,
                    use_api_response,
                    client_request_id:display = plan.client_request_id;
                    "planned delivery");
        plan
    }

    /// Validate the request (when checks are enabled) and fill in the fields the SDK owns.
    ///
    /// Fills the client request id and client timestamp only when the caller left them unset.
    pub fn prepare_request(&self, request: &mut DeliveryRequest, plan: &DeliveryPlan) {
        if self.perform_checks {
            for validation_error in request.validate() {
                log::warn!(target: "promoted", "delivery request validation error: {}", validation_error);
            }
        }

        let Some(inner) = request.request.as_mut() else {
            return;
        };

        if inner.client_request_id.is_empty() {
            inner.client_request_id = plan.client_request_id.clone();
        }

        let client_info = inner.client_info.get_or_insert_with(Default::default);
        client_info.client_type = ClientType::PlatformServer;
        client_info.traffic_type = TrafficType::Production;

        let timing = inner.timing.get_or_insert_with(Default::default);
        if timing.client_log_timestamp == 0 {
            timing.client_log_timestamp =
                u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        }
    }

    fn call_delivery_api(&self, request: &DeliveryRequest) -> Result<Response> {
        let request = request.clone_with_max_insertions(Some(self.max_request_insertions));
        self.delivery_api.run_delivery(&request)
    }

    fn handle_sdk_and_log(
        &self,
        mut request: DeliveryRequest,
        plan: &DeliveryPlan,
        api_response: Option<Response>,
    ) -> Result<DeliveryResponse> {
        let (response, execution_server) = match api_response {
            Some(response) => (response, ExecutionServer::Api),
            None => (self.sdk_delivery.run_delivery(&request)?, ExecutionServer::Sdk),
        };

        log::debug!(target: "promoted",
                    execution_server:display = execution_server,
                    insertions = response.insertion.len();
                    "delivered");

        let shadow_request = (!plan.use_api_response && self.should_send_shadow_traffic())
            .then(|| request.clone_with_max_insertions(None));

        let client_request_id = match &mut request.request {
            Some(inner) => {
                if execution_server == ExecutionServer::Sdk {
                    inner.request_id = response.request_id.clone();
                }
                inner.client_request_id.clone()
            }
            None => plan.client_request_id.clone(),
        };

        // Delivery API requests are logged by the API itself, so only SDK deliveries and
        // experiment memberships need logging here.
        let cohort_membership = request.experiment.clone();
        if execution_server != ExecutionServer::Api || cohort_membership.is_some() {
            let log_request =
                create_log_request(&request, &response, cohort_membership, execution_server);
            self.log_to_metrics(log_request);
        }

        if let Some(shadow_request) = shadow_request {
            self.deliver_shadow_traffic(shadow_request);
        }

        Ok(DeliveryResponse {
            response,
            client_request_id,
            execution_server,
        })
    }

    fn should_apply_treatment(&self, cohort_membership: Option<&CohortMembership>) -> bool {
        if let Some(checker) = &self.apply_treatment_checker {
            return checker.should_apply_treatment(cohort_membership);
        }
        match cohort_membership {
            None => true,
            Some(membership) => membership.arm != CohortArm::Control,
        }
    }

    fn should_send_shadow_traffic(&self) -> bool {
        self.shadow_traffic_delivery_rate > 0.0
            && self.sampler.sample_random(self.shadow_traffic_delivery_rate)
    }

    fn log_to_metrics(&self, log_request: LogRequest) {
        let metrics_api = Arc::clone(&self.metrics_api);
        spawn_detached("promoted-metrics", move || {
            if let Err(err) = metrics_api.run_metrics_logging(&log_request) {
                log::warn!(target: "promoted", "error calling Metrics API: {}", err);
            }
        });
    }

    fn deliver_shadow_traffic(&self, request: DeliveryRequest) {
        log::trace!(target: "promoted", blocking = self.blocking_shadow_traffic; "sending shadow traffic");
        if self.blocking_shadow_traffic {
            send_shadow_traffic(self.delivery_api.as_ref(), request);
        } else {
            let delivery_api = Arc::clone(&self.delivery_api);
            spawn_detached("promoted-shadow", move || {
                send_shadow_traffic(delivery_api.as_ref(), request)
            });
        }
    }
}

fn send_shadow_traffic(
    delivery_api: &(dyn DeliveryApi + Send + Sync),
    mut request: DeliveryRequest,
) {
    if let Some(inner) = request.request.as_mut() {
        let client_info = inner.client_info.get_or_insert_with(Default::default);
        client_info.client_type = ClientType::PlatformServer;
        client_info.traffic_type = TrafficType::Shadow;
    }

    if let Err(err) = delivery_api.run_delivery(&request) {
        log::warn!(target: "promoted", "error calling Delivery API for shadow traffic: {}", err);
    }
}

fn create_log_request(
    request: &DeliveryRequest,
    response: &Response,
    cohort_membership: Option<CohortMembership>,
    execution_server: ExecutionServer,
) -> LogRequest {
    let inner = request.request.as_ref();
    let mut log_request = LogRequest {
        user_info: inner.and_then(|r| r.user_info.clone()),
        client_info: inner.and_then(|r| r.client_info.clone()),
        platform_id: inner.map_or(0, |r| r.platform_id),
        timing: inner.and_then(|r| r.timing.clone()),
        ..Default::default()
    };

    if execution_server != ExecutionServer::Api {
        log_request.delivery_log.push(DeliveryLog {
            execution: DeliveryExecution {
                execution_server,
                server_version: SERVER_VERSION.to_owned(),
            },
            request: inner.cloned().unwrap_or_default(),
            response: response.clone(),
        });
    }

    log_request.cohort_membership.extend(cohort_membership);

    log_request
}

/// Run `f` on a detached, named thread. Spawn failures are logged and dropped.
fn spawn_detached(name: &str, f: impl FnOnce() + Send + 'static) {
    if let Err(err) = std::thread::Builder::new().name(name.to_owned()).spawn(f) {
        log::warn!(target: "promoted", thread = name; "failed to spawn background thread: {}", err);
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}
