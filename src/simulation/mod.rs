//! Simulation orchestration and control
//!
//! This module contains the simulation controller, the three concurrent
//! thread bodies, statistics reduction, logging setup, and error handling.
//!
//! # Overview
//!
//! - **SimulationController**: validates the configuration, spawns the
//!   arrival generator, server, and observer threads, joins all of them,
//!   and reduces their sample buffers into a [`SimulationReport`]
//! - **SummaryStats** / **QueueLengthAccumulator**: pure reductions over the
//!   recorded samples
//! - **LoggingConfig**: tracing subscriber setup for the binary
//! - **SimulationError**: error taxonomy for setup and run failures

pub mod controller;
pub mod error;
pub mod logging;
pub mod statistics;
pub(crate) mod tasks;

pub use controller::SimulationController;
pub use error::{SimulationError, SimulationResult};
pub use logging::LoggingConfig;
pub use statistics::{QueueLengthAccumulator, QueueLengthSample, SimulationReport, SummaryStats};
