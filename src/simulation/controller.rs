//! Simulation controller
//!
//! The controller owns the configuration, spawns the three simulation
//! threads over one shared queue, joins all of them, and reduces their
//! sample buffers into the final report. It never reads queue state itself.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::queue::{SharedQueue, StopSignal};
use crate::random::{seed_for_task, ExponentialSampler};
use crate::simulation::error::{SimulationError, SimulationResult};
use crate::simulation::statistics::{SimulationReport, SummaryStats};
use crate::simulation::tasks;
use crate::types::SimulationConfig;

/// Thread tags used to derive independent random streams per thread.
const ARRIVALS_TASK: u64 = 1;
const SERVER_TASK: u64 = 2;

/// Coordinates one simulation run from configuration to report.
///
/// Construction validates the configuration, so a controller that exists is
/// always runnable; an unstable or degenerate configuration never gets as
/// far as spawning a thread.
#[derive(Debug)]
pub struct SimulationController {
    config: SimulationConfig,
}

impl SimulationController {
    /// Create a controller for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Configuration`] if the configuration is
    /// invalid, including the unstable case of an arrival rate at or above
    /// total service capacity.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        info!(
            arrival_rate = config.arrival_rate,
            service_rate = config.service_rate,
            customer_count = config.customer_count,
            offered_load = config.offered_load(),
            "simulation configured"
        );
        Ok(Self { config })
    }

    /// The validated configuration this controller will run.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation to completion and reduce the results.
    ///
    /// Spawns the arrival generator, server, and observer threads, then
    /// joins all three before touching any sample buffer. The buffers travel
    /// through the join handles, so reading one before its writer has exited
    /// is unrepresentable. Wall-clock time for the utilization ratio is
    /// measured when the server finishes its quota, matching the window in
    /// which the recorded service times were spent.
    pub fn run(&self) -> SimulationResult<SimulationReport> {
        let customer_count = self.config.customer_count;
        let stop = StopSignal::new();
        let queue = Arc::new(SharedQueue::new(stop.clone()));

        let arrival_sampler = ExponentialSampler::new(
            self.config.arrival_rate,
            seed_for_task(self.config.seed, ARRIVALS_TASK),
        )?;
        let service_sampler = ExponentialSampler::new(
            self.config.service_rate,
            seed_for_task(self.config.seed, SERVER_TASK),
        )?;

        let run_start = Instant::now();

        let arrivals_handle = thread::Builder::new()
            .name("arrivals".into())
            .spawn({
                let queue = Arc::clone(&queue);
                let stop = stop.clone();
                move || tasks::run_arrival_generator(&queue, &stop, arrival_sampler, customer_count)
            })
            .map_err(|source| SimulationError::TaskSpawn { task: "arrivals", source })?;

        let server_spawn = thread::Builder::new().name("server".into()).spawn({
            let queue = Arc::clone(&queue);
            move || tasks::run_server(&queue, service_sampler, customer_count)
        });
        let server_handle = match server_spawn {
            Ok(handle) => handle,
            Err(source) => {
                // The generator is already producing; cancel it before
                // surfacing the error.
                queue.shutdown();
                let _ = arrivals_handle.join();
                return Err(SimulationError::TaskSpawn { task: "server", source });
            }
        };

        let observer_spawn = thread::Builder::new().name("observer".into()).spawn({
            let queue = Arc::clone(&queue);
            let stop = stop.clone();
            let period = self.config.observer_period();
            move || tasks::run_observer(&queue, &stop, period, run_start)
        });
        let observer_handle = match observer_spawn {
            Ok(handle) => handle,
            Err(source) => {
                queue.shutdown();
                let _ = arrivals_handle.join();
                let _ = server_handle.join();
                return Err(SimulationError::TaskSpawn { task: "observer", source });
            }
        };

        debug!("all simulation threads running");

        // The server ends the run; its join marks the end of the measured
        // service window.
        let server_result = server_handle.join();
        let elapsed = run_start.elapsed();
        if server_result.is_err() {
            // A crashed server never raised the stop signal; raise it so the
            // other two threads can exit before we report the failure.
            queue.shutdown();
        }

        let arrivals_result = arrivals_handle.join();
        let observer_result = observer_handle.join();

        let (wait_times, service_times) =
            server_result.map_err(|_| SimulationError::TaskPanicked("server"))?;
        let inter_arrivals =
            arrivals_result.map_err(|_| SimulationError::TaskPanicked("arrivals"))?;
        let observed = observer_result.map_err(|_| SimulationError::TaskPanicked("observer"))?;

        let total_service_time: f64 = service_times.iter().sum();
        let elapsed_seconds = elapsed.as_secs_f64();
        let utilization =
            if elapsed_seconds > 0.0 { total_service_time / elapsed_seconds } else { 0.0 };

        info!(
            customers_served = wait_times.len(),
            elapsed_seconds,
            utilization,
            "simulation complete"
        );

        Ok(SimulationReport {
            inter_arrival_time: SummaryStats::from_samples(&inter_arrivals),
            waiting_time: SummaryStats::from_samples(&wait_times),
            service_time: SummaryStats::from_samples(&service_times),
            queue_length: observed.accumulator.summary(),
            utilization,
            elapsed_seconds,
            customers_served: wait_times.len(),
            queue_samples: observed.accumulator.count(),
            queue_length_series: observed.series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigValidationError;

    fn fast_config(customer_count: usize) -> SimulationConfig {
        // Scaled-up rates keep the identical code paths but finish in tens
        // of milliseconds.
        SimulationConfig {
            arrival_rate: 400.0,
            service_rate: 600.0,
            customer_count,
            observer_period_ms: 1.0,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn unstable_configuration_never_starts() {
        let config = SimulationConfig {
            arrival_rate: 10.0,
            service_rate: 5.0,
            ..Default::default()
        };
        let result = SimulationController::new(config);
        assert!(matches!(
            result,
            Err(SimulationError::Configuration(ConfigValidationError::UnstableSystem { .. }))
        ));
    }

    #[test]
    fn run_serves_exactly_the_quota() {
        let controller = SimulationController::new(fast_config(50)).unwrap();
        let report = controller.run().unwrap();

        assert_eq!(report.customers_served, 50);
        assert!(report.waiting_time.mean >= 0.0);
        assert!(report.waiting_time.std_dev >= 0.0);
        assert!(report.service_time.mean > 0.0);
        assert!(report.elapsed_seconds > 0.0);
    }

    #[test]
    fn utilization_stays_within_the_wall_clock() {
        let controller = SimulationController::new(fast_config(40)).unwrap();
        let report = controller.run().unwrap();

        assert!(report.utilization >= 0.0);
        assert!(report.utilization <= 1.0, "utilization {} exceeds 1", report.utilization);
    }

    #[test]
    fn observer_contributes_samples() {
        let controller = SimulationController::new(fast_config(40)).unwrap();
        let report = controller.run().unwrap();

        assert!(report.queue_samples > 0);
        assert_eq!(report.queue_samples, report.queue_length_series.len());
        assert!(report.queue_length.mean >= 0.0);
    }
}
