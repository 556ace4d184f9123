//! Core application functionality
//!
//! This module contains the glue around the comparison pipeline:
//! - CLI handling
//! - The user settings file
//! - Process-level error handling
//! - The runner that wires everything together

pub mod cli;
pub mod config_file;
pub mod platform;
pub mod runner;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::{ConfigFile, Settings};
pub use runner::run_app;
