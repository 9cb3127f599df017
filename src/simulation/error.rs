//! Error types and handling
//!
//! This module contains the run-level error types for the simulation. There
//! is no retry or degraded mode: a run either completes for all three
//! threads or is rejected before any of them starts.

use thiserror::Error;

use crate::types::ConfigValidationError;

/// Errors that can occur while setting up or running a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed before any thread was started
    #[error("Configuration rejected: {0}")]
    Configuration(#[from] ConfigValidationError),

    /// A simulation thread could not be spawned
    #[error("Failed to spawn {task} thread")]
    TaskSpawn {
        /// Name of the thread that failed to spawn
        task: &'static str,
        /// The underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// A simulation thread panicked during the run
    #[error("{0} thread panicked during the run")]
    TaskPanicked(&'static str),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_convert() {
        let validation = ConfigValidationError::InvalidCustomerCount(0);
        let error: SimulationError = validation.into();
        assert!(matches!(error, SimulationError::Configuration(_)));
        assert_eq!(
            error.to_string(),
            "Configuration rejected: Customer count must be greater than 0, got 0"
        );
    }

    #[test]
    fn spawn_errors_carry_the_task_name() {
        let error = SimulationError::TaskSpawn {
            task: "server",
            source: std::io::Error::new(std::io::ErrorKind::Other, "no threads left"),
        };
        assert_eq!(error.to_string(), "Failed to spawn server thread");
    }

    #[test]
    fn panic_errors_name_the_task() {
        let error = SimulationError::TaskPanicked("observer");
        assert_eq!(error.to_string(), "observer thread panicked during the run");
    }
}
