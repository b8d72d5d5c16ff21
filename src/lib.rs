//! Elastic Cloud deployment resource.
//!
//! This crate implements the deployment resource of an infrastructure-as-code
//! provider for a managed Elastic cloud. It translates the user's declarative
//! deployment plan into the vendor's create and update request bodies, and
//! translates the API's read responses back into the plan shape.
//!
//! # Overview
//!
//! - **Topology reconciliation** ([`topology`]): partial topology requests
//!   are matched against the deployment template and filled with its defaults
//! - **Sizes** ([`size`]): `"2g"` style sizes to and from megabytes
//! - **Request building** ([`deployment`]): one pass over every component,
//!   with every failure collected into [`ComponentErrors`]
//! - **Read path** ([`deployment::flatten_deployment`]): API responses back
//!   to plan state
//! - **Resource lifecycle** ([`resource`]): plan, create, read, update and
//!   delete on top of a [`DeploymentApi`]
//! - **Validation** ([`validation`]): schema checks before any API call
//!
//! # Quick Start
//!
//! ```ignore
//! use ec_deployment_provider::{init_logging, DeploymentResource, ProviderConfig};
//!
//! init_logging();
//! let config = ProviderConfig::from_value(provider_block)?;
//! let resource = DeploymentResource::new(MyApiClient::new(&config), config);
//!
//! let plan = resource.plan(None, proposed).await?;
//! let state = resource.create(plan.planned_state).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod config;
pub mod deployment;
pub mod error;
pub mod logging;
#[allow(missing_docs)]
pub mod models;
pub mod modifiers;
pub mod observability;
pub mod plan;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod settings;
pub mod size;
pub mod testing;
pub mod topology;
pub mod validation;

pub use component::ComponentKind;
pub use config::ProviderConfig;
pub use deployment::{build_create_request, build_update_request, flatten_deployment};
pub use error::{ComponentError, ComponentErrors, DeploymentError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use plan::DeploymentPlan;
pub use resource::{AttributeChange, DeploymentApi, DeploymentResource, PlanResult};
pub use schema::{deployment_schema, provider_schema, Diagnostic, Schema};
pub use size::{format_size, parse_size};
pub use validation::{validate, validate_plan, validate_result};

pub use async_trait::async_trait;
pub use serde_json;
pub use tracing;
