//! Pipelines.
//!
//! The module provides a light [pipeline::Pipeline] trait that enables easy and flexible pipeline creation.
pub mod extract;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use extract::{extract, Extract, ExtractOpts, ExtractStats};
pub use pipeline::Pipeline;
