//! Prediction and inference
//!
//! Load the trained bundle and generate week or matchup predictions.

pub mod inference;

pub use inference::{format_matchup, format_week_table, Predictor};
