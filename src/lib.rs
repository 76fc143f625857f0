//! # Flair Classifier
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Reddit submission lookup
pub mod reddit;

/// Web server
pub mod server;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;
