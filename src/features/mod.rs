//! Feature construction
//!
//! Converts raw game records into model-ready feature rows.

pub mod builder;
pub mod schema;

pub use builder::{build_training, build_upcoming, Labels};
pub use schema::{FeatureVector, FEATURE_COLUMNS};
