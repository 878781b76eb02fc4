//! Projection of normalized CMS items into GeoJSON point features.

pub mod config;
pub mod feature;
pub mod project;

pub use config::*;
pub use feature::*;
pub use project::*;
