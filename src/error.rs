use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// A `Result` alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the Promoted SDK.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Experiment was configured with an empty or whitespace-only cohort id.
    #[error("cohort ID must be non-empty")]
    BlankCohortId,
    /// Experiment arm was configured with a negative number of buckets.
    #[error("{arm} buckets must be non-negative")]
    NegativeBucketCount {
        /// `"control"` or `"treatment"`.
        arm: &'static str,
    },
    /// Active buckets of an arm exceed the number of buckets in that arm (or are negative).
    #[error("active {arm} buckets must be between 0 and the total number of {arm} buckets")]
    ActiveBucketsOutOfRange {
        /// `"control"` or `"treatment"`.
        arm: &'static str,
    },
    /// 50/50 experiment percent outside of `[0, 50]`.
    #[error("{arm} percent must be in the range [0, 50]")]
    PercentOutOfRange {
        /// `"control"` or `"treatment"`.
        arm: &'static str,
    },
    /// Shadow traffic rate outside of `[0, 1]`.
    #[error("shadow traffic delivery rate must be between 0 and 1, got {0}")]
    InvalidShadowTrafficRate(f32),
    /// Endpoint could not be parsed as an absolute URL.
    #[error("invalid endpoint configuration")]
    InvalidEndpoint(#[source] url::ParseError),
    /// [`DeliveryRequest`](crate::DeliveryRequest) does not carry a request payload.
    #[error("Request builder must be set")]
    MissingRequest,
    /// Remote API responded with a non-2xx status.
    #[error("failure calling {api} API; statusCode={status}")]
    UnexpectedStatus {
        /// `"Delivery"` or `"Metrics"`.
        api: &'static str,
        /// Status returned by the server.
        status: StatusCode,
    },
    /// Delivery API response did not carry a request id.
    #[error("delivery response should contain a requestId")]
    MissingResponseId,
    /// Requested page starts before the first insertion supplied in the request.
    #[error("offset should be >= insertion start (specifically, the global position): offset={offset}, insertion start={insertion_start}")]
    OffsetBeforeInsertionStart {
        /// Global paging offset.
        offset: u64,
        /// Global index of the first supplied insertion.
        insertion_start: u64,
    },
    /// Retrieval insertion offset is negative.
    #[error("insertion start must be greater or equal to 0, got {0}")]
    NegativeInsertionStart(i64),
    /// HTTP transport failure, including timeouts.
    // reqwest::Error is not clonable, so we're wrapping it in an Arc.
    #[error(transparent)]
    Http(Arc<reqwest::Error>),
    /// Delivery API response body is not a valid response.
    #[error(transparent)]
    Json(Arc<serde_json::Error>),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(Arc::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(Arc::new(value))
    }
}
