//! # BindPlane Client
//!
//! Typed client for the BindPlane fleet-configuration API.
//!
//! ## Operations
//!
//! - **version**: control plane version information
//! - **apply**: submit declarative resources, get back per-resource status
//! - **configuration** / **raw_configuration**: read a named configuration
//! - **start_rollout** / **rollout_status**: drive a staged rollout
//!
//! Every operation issues exactly one request. Nothing is retried; retry and
//! polling policy belong to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod model;

pub use client::{with_timeout, BindPlane, ClientError, ClientOption, ClientSettings, KEY_HEADER};
pub use config::{AuthConfig, ClientConfig, DEFAULT_TIMEOUT};
pub use model::{Configuration, Resource, ResourceStatus, Version};
