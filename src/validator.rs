use crate::{schema::Request, DeliveryRequest};

/// Checks structural invariants of a [`DeliveryRequest`].
///
/// Validation is advisory: the client logs the returned messages when
/// [`ClientConfig::perform_checks`](crate::ClientConfig::perform_checks) is on and proceeds with
/// delivery regardless.
pub trait DeliveryRequestValidator {
    /// Collect human-readable validation errors. An empty list means the request is valid.
    fn validate(&self, request: &DeliveryRequest) -> Vec<String>;
}

impl<T: Fn(&DeliveryRequest) -> Vec<String>> DeliveryRequestValidator for T {
    fn validate(&self, request: &DeliveryRequest) -> Vec<String> {
        self(request)
    }
}

/// Validation rules applied to every request unless replaced with
/// [`DeliveryRequest::with_validator`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDeliveryRequestValidator;

impl DeliveryRequestValidator for DefaultDeliveryRequestValidator {
    fn validate(&self, request: &DeliveryRequest) -> Vec<String> {
        let Some(inner) = &request.request else {
            return vec!["Request builder must be set".to_owned()];
        };

        let mut errors = validate_ids(inner);

        if request.retrieval_insertion_offset < 0 {
            errors.push("Insertion start must be greater or equal to 0".to_owned());
        }

        errors
    }
}

fn validate_ids(request: &Request) -> Vec<String> {
    let mut errors = Vec::new();

    if !request.request_id.is_empty() {
        errors.push("Request.requestID should not be set".to_owned());
    }

    match &request.user_info {
        None => errors.push("Request.userInfo should be set".to_owned()),
        Some(user_info) if user_info.anon_user_id.is_empty() => {
            errors.push("Request.userInfo.anonUserID should be set".to_owned())
        }
        Some(_) => {}
    }

    for insertion in &request.insertion {
        if insertion.content_id.is_empty() {
            errors.push("Insertion.contentID should be set".to_owned());
        }
    }

    errors
}
