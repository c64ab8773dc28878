// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for running the pose-action pipeline.
//!
//! This module contains the command-line interface logic, including argument parsing
//! and the `predict`, `extract` and `init-classifier` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Dataset extraction and classifier initialization.
pub mod extract;

/// Console logging macros.
pub mod logging;

/// Prediction logic.
pub mod predict;
