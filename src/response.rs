use crate::schema::{ExecutionServer, Response};

/// Output of [`Client::deliver`](crate::Client::deliver).
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryResponse {
    /// Ranked insertions.
    pub response: Response,
    /// Client request id, generated if the request did not supply one.
    pub client_request_id: String,
    /// Whether the response came from the Delivery API or from the SDK.
    pub execution_server: ExecutionServer,
}
