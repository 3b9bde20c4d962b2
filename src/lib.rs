//! mediatailor-operator: Kubernetes operator for AWS Elemental MediaTailor
//!
//! This crate reconciles MediaTailor channels, source locations, their
//! VOD/live sources and ad insertion playback configurations from declarative
//! custom resources.

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod mediatailor;

#[cfg(feature = "rest-api")]
pub mod rest_api;

pub use crate::error::{Error, Result};
