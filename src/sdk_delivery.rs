//! Delivery computed inside the SDK, without calling the Delivery API.
//!
//! Insertions are returned in request order, windowed by the request paging. This is the path
//! used whenever the Delivery API is skipped or fails, so it never touches the network.
use uuid::Uuid;

use crate::{
    delivery_api::DeliveryApi,
    schema::{Insertion, Response},
    DeliveryRequest, Error, Result,
};

/// Local [`DeliveryApi`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkDelivery;

impl DeliveryApi for SdkDelivery {
    fn run_delivery(&self, delivery_request: &DeliveryRequest) -> Result<Response> {
        let request = delivery_request
            .request
            .as_ref()
            .ok_or(Error::MissingRequest)?;
        let insertions = &request.insertion;

        let (size, offset) = match request.paging {
            Some(paging) => (i64::from(paging.size), i64::from(paging.offset)),
            None => (insertions.len() as i64, 0),
        };

        let insertion_start = u64::try_from(delivery_request.retrieval_insertion_offset)
            .map_err(|_| Error::NegativeInsertionStart(delivery_request.retrieval_insertion_offset))?;
        // Negative offsets are treated as the first page.
        let offset = offset.max(0) as u64;
        if offset < insertion_start {
            return Err(Error::OffsetBeforeInsertionStart {
                offset,
                insertion_start,
            });
        }

        let index = usize::try_from(offset - insertion_start).unwrap_or(usize::MAX);
        let remaining = insertions.len().saturating_sub(index);
        let size = if size <= 0 {
            remaining
        } else {
            usize::try_from(size).unwrap_or(usize::MAX).min(remaining)
        };

        let insertion = insertions
            .iter()
            .skip(index)
            .take(size)
            .zip(offset..)
            .map(|(insertion, position)| response_insertion(insertion, position))
            .collect();

        Ok(Response {
            request_id: Uuid::new_v4().to_string(),
            insertion,
        })
    }
}

fn response_insertion(request_insertion: &Insertion, position: u64) -> Insertion {
    let insertion_id = if request_insertion.insertion_id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        request_insertion.insertion_id.clone()
    };
    Insertion {
        content_id: request_insertion.content_id.clone(),
        insertion_id,
        position: Some(position),
        properties: None,
    }
}
