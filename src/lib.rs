//! M/M/1 Queueing Simulator
//!
//! A discrete-event, multi-threaded simulator of a single-server queue with
//! Poisson arrivals and exponentially distributed service times. Three
//! threads share one queue: an arrival generator produces customers at rate
//! lambda, a server drains them at rate mu, and an observer periodically
//! samples the queue length. When the server has processed its customer
//! quota it raises a one-shot stop signal; the other threads exit
//! cooperatively and the controller reduces the recorded samples into
//! summary statistics.
//!
//! # Quick Start
//!
//! ```rust
//! use mm1_simulator::{SimulationConfig, SimulationController};
//!
//! // A short, fast run: rates are per second.
//! let config = SimulationConfig {
//!     arrival_rate: 400.0,
//!     service_rate: 600.0,
//!     customer_count: 5,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let controller = SimulationController::new(config)?;
//! let report = controller.run()?;
//!
//! assert_eq!(report.customers_served, 5);
//! assert!(report.utilization <= 1.0);
//! # Ok::<(), mm1_simulator::SimulationError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`types`]: configuration, CLI arguments, and validation
//! - [`random`]: per-thread exponential variate sampling
//! - [`queue`]: the thread-safe customer queue and stop signal
//! - [`simulation`]: controller, thread bodies, statistics, logging, errors
//!
//! # Concurrency Model
//!
//! All queue mutation happens under the queue's own mutex; the blocking
//! dequeue waits on a condition variable whose predicate is "non-empty or
//! stopped", so a consumer can never be stranded by a shutdown racing an
//! empty queue. Every sample buffer is owned by exactly one writer thread
//! and returned through its join handle, which makes the controller's
//! join-all barrier structural rather than a convention.
#![warn(missing_docs, missing_debug_implementations)]

// Module declarations
pub mod queue;
pub mod random;
pub mod simulation;
pub mod types;

// Re-export the main types for convenience

// Core queue types
pub use queue::{Customer, SharedQueue, StopSignal};

// Random variates
pub use random::ExponentialSampler;

// Simulation control and results
pub use simulation::{
    LoggingConfig, QueueLengthAccumulator, QueueLengthSample, SimulationController,
    SimulationError, SimulationReport, SimulationResult, SummaryStats,
};

// Configuration
pub use types::{CliArgs, ConfigError, ConfigValidationError, SimulationConfig};
