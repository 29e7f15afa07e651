//! Model training
//!
//! Split policy, fitting, and holdout metrics.

pub mod metrics;
pub mod trainer;

pub use metrics::EvalMetrics;
pub use trainer::{train_and_save, TrainOutcome};
