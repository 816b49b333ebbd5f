use std::sync::Arc;

use crate::{
    delivery_api::{DeliveryApi, DeliveryApiConfig, PromotedDeliveryApi},
    metrics_api::{MetricsApi, MetricsApiConfig, PromotedMetricsApi},
    sdk_delivery::SdkDelivery,
    Result,
};

/// Creates the collaborators used by [`Client`](crate::Client).
///
/// Replace it with [`ClientConfig::api_factory`](crate::ClientConfig::api_factory) to substitute
/// fakes in tests.
pub trait ApiFactory {
    /// Local delivery used when the Delivery API is skipped or fails.
    fn create_sdk_delivery(&self) -> Arc<dyn DeliveryApi + Send + Sync>;

    /// Remote delivery.
    fn create_delivery_api(
        &self,
        config: DeliveryApiConfig,
    ) -> Result<Arc<dyn DeliveryApi + Send + Sync>>;

    /// Remote logging.
    fn create_metrics_api(
        &self,
        config: MetricsApiConfig,
    ) -> Result<Arc<dyn MetricsApi + Send + Sync>>;
}

/// Creates [`SdkDelivery`], [`PromotedDeliveryApi`] and [`PromotedMetricsApi`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultApiFactory;

impl ApiFactory for DefaultApiFactory {
    fn create_sdk_delivery(&self) -> Arc<dyn DeliveryApi + Send + Sync> {
        Arc::new(SdkDelivery)
    }

    fn create_delivery_api(
        &self,
        config: DeliveryApiConfig,
    ) -> Result<Arc<dyn DeliveryApi + Send + Sync>> {
        Ok(Arc::new(PromotedDeliveryApi::new(config)?))
    }

    fn create_metrics_api(
        &self,
        config: MetricsApiConfig,
    ) -> Result<Arc<dyn MetricsApi + Send + Sync>> {
        Ok(Arc::new(PromotedMetricsApi::new(config)?))
    }
}
