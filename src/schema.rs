//! Wire model shared with the Delivery API and the Metrics API.
//!
//! Field names follow the proto JSON mapping used by Promoted services: camelCase keys, enums as
//! their upper-case names, unset optional fields omitted.
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A request for ranked content.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    /// Marketplace the request belongs to.
    #[serde(skip_serializing_if = "is_zero")]
    pub platform_id: u64,
    /// Identifies the viewer. `anon_user_id` is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// Client-side timing. The SDK fills in a missing log timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    /// Overwritten by the SDK with the client and traffic type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
    /// Assigned by the server. Must not be set by callers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    /// Client-side identifier for the request. Generated by the SDK if left empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_request_id: String,
    /// Surface the request comes from, such as `"FEED"` or `"SEARCH"`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub use_case: String,
    /// Query text for search requests.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search_query: String,
    /// Page to return. Defaults to every supplied insertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
    /// Candidates to rank.
    pub insertion: Vec<Insertion>,
    /// Free-form properties passed through to delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Response from delivery, either remote or computed by the SDK.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    /// Server-assigned id of the request this responds to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    /// Ranked insertions, in order.
    pub insertion: Vec<Insertion>,
}

/// One item being ranked.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insertion {
    /// Id of the content item. Required.
    pub content_id: String,
    /// Unique id of this impression opportunity. Generated on response insertions if missing.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub insertion_id: String,
    /// Global, 0-based position. Set on response insertions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    /// Free-form item properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl Insertion {
    /// Create an insertion for the given content id.
    pub fn new(content_id: impl Into<String>) -> Self {
        Insertion {
            content_id: content_id.into(),
            ..Default::default()
        }
    }
}

/// Page of results requested from delivery.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    /// Number of insertions to return. Non-positive means "all remaining".
    pub size: i32,
    /// Global index of the first insertion to return.
    pub offset: i32,
}

impl Paging {
    /// Create paging starting at `offset` and returning up to `size` insertions.
    pub fn new(size: i32, offset: i32) -> Self {
        Paging { size, offset }
    }
}

/// Identifies the user a request is made for.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    /// Logged-in user id, if any.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    /// Anonymous user id. Used for experiment bucketing.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub anon_user_id: String,
    /// Traffic from employees or test accounts.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_internal_user: bool,
}

/// Client-side timing of a request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    /// Milliseconds since the Unix epoch. Zero means unset.
    #[serde(skip_serializing_if = "is_zero")]
    pub client_log_timestamp: u64,
}

/// Describes the caller and the kind of traffic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    /// Kind of client issuing the request.
    pub client_type: ClientType,
    /// Whether the request is production or shadow traffic.
    pub traffic_type: TrafficType,
}

/// Kind of client issuing a request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    /// Not set.
    #[default]
    #[display(fmt = "UNKNOWN_REQUEST_CLIENT")]
    UnknownRequestClient,
    /// A platform backend. Always used by this SDK.
    #[display(fmt = "PLATFORM_SERVER")]
    PlatformServer,
    /// A platform app or web page.
    #[display(fmt = "PLATFORM_CLIENT")]
    PlatformClient,
}

/// Kind of traffic a request represents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficType {
    /// Not set.
    #[default]
    #[display(fmt = "UNKNOWN_TRAFFIC_TYPE")]
    UnknownTrafficType,
    /// Live traffic whose response is used.
    #[display(fmt = "PRODUCTION")]
    Production,
    /// Logged traffic being replayed.
    #[display(fmt = "REPLAY")]
    Replay,
    /// Mirrored traffic whose response is discarded.
    #[display(fmt = "SHADOW")]
    Shadow,
}

/// Experiment arm a user was assigned to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CohortArm {
    /// Not set.
    #[default]
    #[display(fmt = "UNKNOWN_GROUP")]
    UnknownGroup,
    /// Receives SDK delivery.
    #[display(fmt = "CONTROL")]
    Control,
    /// Receives Delivery API ranking.
    #[display(fmt = "TREATMENT")]
    Treatment,
}

/// Membership of a user in an experiment arm.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CohortMembership {
    /// Experiment the user belongs to.
    pub cohort_id: String,
    /// Arm within the experiment.
    pub arm: CohortArm,
}

impl CohortMembership {
    /// Create a membership of `cohort_id` in `arm`.
    pub fn new(cohort_id: impl Into<String>, arm: CohortArm) -> Self {
        CohortMembership {
            cohort_id: cohort_id.into(),
            arm,
        }
    }
}

/// Where the insertions of a response were ranked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionServer {
    /// Not set.
    #[default]
    #[display(fmt = "UNKNOWN_EXECUTION_SERVER")]
    UnknownExecutionServer,
    /// Ranked remotely by the Delivery API.
    #[display(fmt = "API")]
    Api,
    /// Computed locally by the SDK.
    #[display(fmt = "SDK")]
    Sdk,
}

/// Payload sent to the Metrics API.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogRequest {
    /// Copied from the delivered request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// Copied from the delivered request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
    /// Copied from the delivered request.
    #[serde(skip_serializing_if = "is_zero")]
    pub platform_id: u64,
    /// Copied from the delivered request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    /// Deliveries executed outside the Delivery API.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delivery_log: Vec<DeliveryLog>,
    /// Experiment memberships of the user.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cohort_membership: Vec<CohortMembership>,
}

/// Record of one delivery performed by the SDK.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryLog {
    /// Where and by which version the delivery ran.
    pub execution: DeliveryExecution,
    /// Request as delivered.
    pub request: Request,
    /// Response returned to the caller.
    pub response: Response,
}

/// Execution details of a logged delivery.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryExecution {
    /// Where the insertions were ranked.
    pub execution_server: ExecutionServer,
    /// SDK version, as `rust.<version>`.
    pub server_version: String,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}
