//! End-to-end flows through the public API with fake collaborators.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use promoted::{
    ApiFactory, ClientConfig, CohortArm, DeliveryApi, DeliveryApiConfig, DeliveryRequest,
    ExecutionServer, Insertion, LogRequest, MetricsApi, MetricsApiConfig, Paging, Request,
    Response, Result, SdkDelivery, TrafficType, TwoArmExperiment, UserInfo,
};

#[derive(Default)]
struct ReversingDelivery {
    traffic: Mutex<Vec<TrafficType>>,
}

impl DeliveryApi for ReversingDelivery {
    fn run_delivery(&self, request: &DeliveryRequest) -> Result<Response> {
        let request = request.request.as_ref().unwrap();
        self.traffic
            .lock()
            .unwrap()
            .push(request.client_info.as_ref().unwrap().traffic_type);
        Ok(Response {
            request_id: "remote".to_owned(),
            insertion: request.insertion.iter().rev().cloned().collect(),
        })
    }
}

struct NoopMetrics;

impl MetricsApi for NoopMetrics {
    fn run_metrics_logging(&self, _log_request: &LogRequest) -> Result<()> {
        Ok(())
    }
}

struct Factory(Arc<ReversingDelivery>);

impl ApiFactory for Factory {
    fn create_sdk_delivery(&self) -> Arc<dyn DeliveryApi + Send + Sync> {
        Arc::new(SdkDelivery)
    }

    fn create_delivery_api(
        &self,
        _config: DeliveryApiConfig,
    ) -> Result<Arc<dyn DeliveryApi + Send + Sync>> {
        Ok(self.0.clone())
    }

    fn create_metrics_api(
        &self,
        _config: MetricsApiConfig,
    ) -> Result<Arc<dyn MetricsApi + Send + Sync>> {
        Ok(Arc::new(NoopMetrics))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: u32,
    name: String,
}

fn products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Product 1".to_owned(),
        },
        Product {
            id: 2,
            name: "Product 2".to_owned(),
        },
    ]
}

fn client(delivery: Arc<ReversingDelivery>) -> promoted::Client {
    let _ = env_logger::builder().is_test(true).try_init();
    ClientConfig::new("", "", "", "")
        .api_factory(Factory(delivery))
        .sampler(|_threshold: f32| true)
        .shadow_traffic_delivery_rate(1.0)
        .blocking_shadow_traffic(true)
        .perform_checks(true)
        .to_client()
        .unwrap()
}

fn request_for(user_id: &str, products: &[Product]) -> Request {
    Request {
        user_info: Some(UserInfo {
            anon_user_id: user_id.to_owned(),
            ..Default::default()
        }),
        paging: Some(Paging::new(100, 0)),
        insertion: products
            .iter()
            .map(|product| Insertion::new(product.id.to_string()))
            .collect(),
        ..Default::default()
    }
}

#[test]
fn reranks_products_with_delivery_api() {
    let delivery = Arc::new(ReversingDelivery::default());
    let client = client(delivery.clone());
    let products = products();
    let by_id: HashMap<String, Product> = products
        .iter()
        .map(|product| (product.id.to_string(), product.clone()))
        .collect();

    let response = client
        .deliver(DeliveryRequest::new(
            Some(request_for("12355", &products)),
            None,
            false,
            0,
        ))
        .unwrap();

    let reranked: Vec<&Product> = response
        .response
        .insertion
        .iter()
        .map(|insertion| &by_id[&insertion.content_id])
        .collect();
    assert_eq!(response.execution_server, ExecutionServer::Api);
    assert_eq!(reranked[0].name, "Product 2");
    assert_eq!(reranked[1].name, "Product 1");
    assert_eq!(*delivery.traffic.lock().unwrap(), vec![TrafficType::Production]);
}

#[test]
fn control_user_gets_sdk_delivery_and_shadow_traffic() {
    let delivery = Arc::new(ReversingDelivery::default());
    let client = client(delivery.clone());
    let experiment = TwoArmExperiment::new_50_50("HOLD_OUT", 50, 50).unwrap();
    let membership = experiment.check_membership("user2");
    assert_eq!(membership.as_ref().map(|m| m.arm), Some(CohortArm::Control));

    let response = client
        .deliver(DeliveryRequest::new(
            Some(request_for("user2", &products())),
            membership,
            false,
            0,
        ))
        .unwrap();

    assert_eq!(response.execution_server, ExecutionServer::Sdk);
    let ids: Vec<&str> = response
        .response
        .insertion
        .iter()
        .map(|i| i.content_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(*delivery.traffic.lock().unwrap(), vec![TrafficType::Shadow]);
}

#[test]
fn treatment_user_gets_delivery_api_without_shadow_traffic() {
    let delivery = Arc::new(ReversingDelivery::default());
    let client = client(delivery.clone());
    let experiment = TwoArmExperiment::new_50_50("HOLD_OUT", 50, 50).unwrap();
    let membership = experiment.check_membership("user4");
    assert_eq!(
        membership.as_ref().map(|m| m.arm),
        Some(CohortArm::Treatment)
    );

    let response = client
        .deliver(DeliveryRequest::new(
            Some(request_for("user4", &products())),
            membership,
            false,
            0,
        ))
        .unwrap();

    assert_eq!(response.execution_server, ExecutionServer::Api);
    assert_eq!(*delivery.traffic.lock().unwrap(), vec![TrafficType::Production]);
}
