use std::sync::Arc;

use crate::{
    schema::{CohortMembership, Request},
    validator::{DefaultDeliveryRequestValidator, DeliveryRequestValidator},
};

/// Input into [`Client::deliver`](crate::Client::deliver).
#[derive(Clone)]
pub struct DeliveryRequest {
    /// The underlying request for ranked content.
    pub request: Option<Request>,
    /// Only log to the Metrics API and never use the Delivery API response.
    pub only_log: bool,
    /// Global index of the first insertion in `request`, among all insertions the caller
    /// retrieved.
    pub retrieval_insertion_offset: i64,
    /// Experiment arm of the user. `None` means no experiment gates delivery.
    pub experiment: Option<CohortMembership>,
    validator: Arc<dyn DeliveryRequestValidator + Send + Sync>,
}

impl DeliveryRequest {
    /// Create a request validated by [`DefaultDeliveryRequestValidator`].
    pub fn new(
        request: Option<Request>,
        experiment: Option<CohortMembership>,
        only_log: bool,
        retrieval_insertion_offset: i64,
    ) -> Self {
        DeliveryRequest {
            request,
            only_log,
            retrieval_insertion_offset,
            experiment,
            validator: Arc::new(DefaultDeliveryRequestValidator),
        }
    }

    /// Replace the validator used by [`DeliveryRequest::validate`].
    pub fn with_validator(
        mut self,
        validator: impl DeliveryRequestValidator + Send + Sync + 'static,
    ) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Deep-copy the request, keeping at most `max_insertions` insertions when set.
    pub fn clone_with_max_insertions(&self, max_insertions: Option<usize>) -> Self {
        let mut copy = self.clone();
        if let (Some(max), Some(request)) = (max_insertions, copy.request.as_mut()) {
            if request.insertion.len() > max {
                log::info!(target: "promoted",
                           insertions = request.insertion.len(),
                           max;
                           "too many request insertions, truncating");
                request.insertion.truncate(max);
            }
        }
        copy
    }

    /// Check the request with the configured validator.
    pub fn validate(&self) -> Vec<String> {
        self.validator.validate(self)
    }
}

impl std::fmt::Debug for DeliveryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryRequest")
            .field("request", &self.request)
            .field("only_log", &self.only_log)
            .field("retrieval_insertion_offset", &self.retrieval_insertion_offset)
            .field("experiment", &self.experiment)
            .finish_non_exhaustive()
    }
}
