/// How a single [`Client::deliver`](crate::Client::deliver) call executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPlan {
    /// Client request id used when the request does not carry one.
    pub client_request_id: String,
    /// Whether to call the Delivery API and use its response.
    pub use_api_response: bool,
}

impl DeliveryPlan {
    /// Create a plan.
    pub fn new(client_request_id: impl Into<String>, use_api_response: bool) -> Self {
        DeliveryPlan {
            client_request_id: client_request_id.into(),
            use_api_response,
        }
    }
}
