use promoted::{ClientConfig, DeliveryRequest, Insertion, Request, TwoArmExperiment, UserInfo};

pub fn main() {
    env_logger::init();

    let client = ClientConfig::new(
        std::env::var("PROMOTED_DELIVERY_ENDPOINT").unwrap(),
        std::env::var("PROMOTED_DELIVERY_API_KEY").unwrap(),
        std::env::var("PROMOTED_METRICS_ENDPOINT").unwrap(),
        std::env::var("PROMOTED_METRICS_API_KEY").unwrap(),
    )
    .warmup(true)
    .perform_checks(true)
    .shadow_traffic_delivery_rate(0.1)
    .to_client()
    .unwrap();

    // Hold out 10% of users from Delivery API ranking.
    let experiment = TwoArmExperiment::new_50_50("HOLD_OUT", 10, 10).unwrap();
    let user_id = "anon-user-1";

    let request = Request {
        user_info: Some(UserInfo {
            anon_user_id: user_id.to_owned(),
            ..Default::default()
        }),
        insertion: (1..=5)
            .map(|i| Insertion::new(format!("product-{i}")))
            .collect(),
        ..Default::default()
    };

    let response = client
        .deliver(DeliveryRequest::new(
            Some(request),
            experiment.check_membership(user_id),
            false,
            0,
        ))
        .unwrap();

    println!(
        "Ranked by {}: {:?}",
        response.execution_server,
        response
            .response
            .insertion
            .iter()
            .map(|insertion| &insertion.content_id)
            .collect::<Vec<_>>()
    );
}
