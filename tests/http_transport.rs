use std::time::Duration;

use httpmock::prelude::*;
use promoted::{
    DeliveryApi, DeliveryApiConfig, DeliveryRequest, Error, Insertion, LogRequest, MetricsApi,
    MetricsApiConfig, PromotedDeliveryApi, PromotedMetricsApi, Request, UserInfo,
};
use serde_json::json;

fn delivery_config(server: &MockServer) -> DeliveryApiConfig {
    DeliveryApiConfig {
        endpoint: server.base_url(),
        api_key: "delivery-key".to_owned(),
        timeout: Duration::from_millis(500),
        accept_gzip: false,
        warmup: false,
    }
}

fn delivery_request() -> DeliveryRequest {
    let request = Request {
        user_info: Some(UserInfo {
            anon_user_id: "anon".to_owned(),
            ..Default::default()
        }),
        insertion: vec![Insertion::new("a"), Insertion::new("b")],
        ..Default::default()
    };
    DeliveryRequest::new(Some(request), None, false, 0)
}

#[test]
fn posts_request_and_parses_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/deliver")
            .header("x-api-key", "delivery-key")
            .header("content-type", "application/json")
            .json_body_partial(r#"{"insertion":[{"contentId":"a"},{"contentId":"b"}]}"#);
        then.status(200).json_body(json!({
            "requestId": "server-request",
            "insertion": [
                {"contentId": "b", "insertionId": "i-b", "position": 0},
                {"contentId": "a", "insertionId": "i-a", "position": 1}
            ]
        }));
    });

    let api = PromotedDeliveryApi::new(delivery_config(&server)).unwrap();
    let response = api.run_delivery(&delivery_request()).unwrap();

    mock.assert();
    assert_eq!(response.request_id, "server-request");
    assert_eq!(response.insertion[0].content_id, "b");
    assert_eq!(response.insertion[1].position, Some(1));
}

#[test]
fn non_2xx_status_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/deliver");
        then.status(503);
    });

    let api = PromotedDeliveryApi::new(delivery_config(&server)).unwrap();
    let err = api.run_delivery(&delivery_request()).unwrap_err();

    assert!(matches!(
        err,
        Error::UnexpectedStatus {
            api: "Delivery",
            ..
        }
    ));
    assert!(err.to_string().contains("statusCode=503"));
}

#[test]
fn response_without_request_id_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/deliver");
        then.status(200).json_body(json!({"insertion": []}));
    });

    let api = PromotedDeliveryApi::new(delivery_config(&server)).unwrap();
    let err = api.run_delivery(&delivery_request()).unwrap_err();

    assert!(matches!(err, Error::MissingResponseId));
}

#[test]
fn malformed_response_body_is_a_json_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/deliver");
        then.status(200)
            .header("content-type", "application/json")
            .body("{\"requestId\": ");
    });

    let api = PromotedDeliveryApi::new(delivery_config(&server)).unwrap();
    let err = api.run_delivery(&delivery_request()).unwrap_err();

    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn slow_response_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/deliver");
        then.status(200)
            .delay(Duration::from_millis(500))
            .json_body(json!({"requestId": "late"}));
    });

    let api = PromotedDeliveryApi::new(DeliveryApiConfig {
        timeout: Duration::from_millis(50),
        ..delivery_config(&server)
    })
    .unwrap();
    let err = api.run_delivery(&delivery_request()).unwrap_err();

    assert!(matches!(err, Error::Http(_)));
}

#[test]
fn requests_gzip_when_accepted() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/deliver")
            .header_exists("accept-encoding");
        then.status(200).json_body(json!({"requestId": "r"}));
    });

    let api = PromotedDeliveryApi::new(DeliveryApiConfig {
        accept_gzip: true,
        ..delivery_config(&server)
    })
    .unwrap();
    api.run_delivery(&delivery_request()).unwrap();

    mock.assert();
}

#[test]
fn warmup_calls_health_endpoint() {
    let server = MockServer::start();
    let health = server.mock(|when, then| {
        when.method(GET)
            .path("/healthz")
            .header("x-api-key", "delivery-key");
        then.status(200);
    });

    PromotedDeliveryApi::new(DeliveryApiConfig {
        warmup: true,
        ..delivery_config(&server)
    })
    .unwrap();

    health.assert_hits(20);
}

#[test]
fn warmup_failures_are_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/healthz");
        then.status(500);
    });

    let api = PromotedDeliveryApi::new(DeliveryApiConfig {
        warmup: true,
        ..delivery_config(&server)
    });

    assert!(api.is_ok());
}

fn metrics_config(server: &MockServer) -> MetricsApiConfig {
    MetricsApiConfig {
        endpoint: server.url("/log"),
        api_key: "metrics-key".to_owned(),
        timeout: Duration::from_millis(500),
    }
}

#[test]
fn posts_log_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/log")
            .header("x-api-key", "metrics-key")
            .json_body_partial(r#"{"platformId":5}"#);
        then.status(200);
    });

    let api = PromotedMetricsApi::new(metrics_config(&server)).unwrap();
    api.run_metrics_logging(&LogRequest {
        platform_id: 5,
        ..Default::default()
    })
    .unwrap();

    mock.assert();
}

#[test]
fn metrics_non_2xx_status_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/log");
        then.status(401);
    });

    let api = PromotedMetricsApi::new(metrics_config(&server)).unwrap();
    let err = api.run_metrics_logging(&LogRequest::default()).unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { api: "Metrics", .. }));
}
