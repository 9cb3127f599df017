//! Core types and configuration
//!
//! This module contains the simulation configuration, the command-line
//! interface that populates it, and the configuration error types.

pub mod config;

pub use config::{CliArgs, ConfigError, ConfigFile, ConfigValidationError, SimulationConfig};
