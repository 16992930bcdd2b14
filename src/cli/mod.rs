//! Command-line interface for reviewbuddy
//!
//! Handles argument parsing and how flags layer over the loaded config.

pub mod args;

pub use args::{Args, Commands, Verbosity};
