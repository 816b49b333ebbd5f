//! The Rust SDK for Promoted.ai Delivery, a ranking service for marketplaces and content
//! platforms.
//!
//! # Overview
//!
//! The SDK revolves around a [`Client`] that ranks the insertions (candidate items) of a
//! [`DeliveryRequest`]. Each call is planned first: the request is either sent to the remote
//! Delivery API, or ranked inside the SDK when the request is log-only, the user is in the control
//! arm of an experiment, or the Delivery API call fails. The result is a [`DeliveryResponse`] that
//! records which of the two produced it.
//!
//! SDK deliveries and experiment memberships are logged to the Metrics API in the background. A
//! fraction of SDK-delivered traffic can be mirrored to the Delivery API as shadow traffic, with
//! its result discarded.
//!
//! # Experiments
//!
//! A [`TwoArmExperiment`] deterministically assigns users to a control or a treatment arm. Users
//! in the control arm receive SDK delivery.
//!
//! ```
//! # use promoted::{CohortArm, TwoArmExperiment};
//! let experiment = TwoArmExperiment::new_50_50("HOLD_OUT", 50, 50).unwrap();
//! let membership = experiment.check_membership("user2");
//! assert_eq!(membership.map(|m| m.arm), Some(CohortArm::Control));
//! ```
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Configuration errors are returned when the client
//! is created. [`Client::deliver`] only fails when SDK delivery itself fails, since Delivery API
//! failures fall back to SDK delivery.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging messages,
//! under the `promoted` target. Consider integrating a `log`-compatible logger implementation
//! for better visibility into SDK operations.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod api_factory;
mod client;
mod config;
mod delivery_api;
mod error;
mod experiment;
mod metrics_api;
mod plan;
mod request;
mod response;
mod sampler;
mod schema;
mod sdk_delivery;
mod treatment;
mod validator;

pub use api_factory::{ApiFactory, DefaultApiFactory};
pub use client::Client;
pub use config::ClientConfig;
pub use delivery_api::{DeliveryApi, DeliveryApiConfig, PromotedDeliveryApi};
pub use error::{Error, Result};
pub use experiment::TwoArmExperiment;
pub use metrics_api::{MetricsApi, MetricsApiConfig, PromotedMetricsApi};
pub use plan::DeliveryPlan;
pub use request::DeliveryRequest;
pub use response::DeliveryResponse;
pub use sampler::{DefaultSampler, Sampler};
pub use schema::{
    ClientInfo, ClientType, CohortArm, CohortMembership, DeliveryExecution, DeliveryLog,
    ExecutionServer, Insertion, LogRequest, Paging, Request, Response, Timing, TrafficType,
    UserInfo,
};
pub use sdk_delivery::SdkDelivery;
pub use treatment::ApplyTreatmentChecker;
pub use validator::{DefaultDeliveryRequestValidator, DeliveryRequestValidator};
