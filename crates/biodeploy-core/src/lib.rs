//! Core types and configuration for biodeploy.
//!
//! This crate defines the `biodeploy.toml` schema ([`BiodeployConfig`]),
//! the [`ImageReference`] naming type, the resolved [`DeployParams`]
//! bundle, and shared error types.

pub mod config;
pub mod error;
pub mod image;

pub use config::{BiodeployConfig, BuildConfig, DeployParams, ProjectConfig, ServiceConfig};
pub use error::{Error, Result};
pub use image::ImageReference;
