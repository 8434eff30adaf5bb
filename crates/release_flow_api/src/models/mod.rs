//! HTTP request and response models
//!
//! These types exist only in the HTTP layer. They use camelCase on the wire and are
//! converted to and from domain types in [`crate::translation`].

pub mod request;
pub mod response;

pub use request::{CreateConfigurationRequest, UpdateConfigurationRequest};
pub use response::{
    BuildResponse, BuildSummary, ConfigurationResponse, HealthCheckResponse, WebhookResponse,
};
