//! Configuration structures for the queueing simulator
//!
//! This module contains the simulation configuration, its validation logic,
//! and the command-line interface used to populate it. Configuration can come
//! from CLI arguments (highest priority), a JSON configuration file, or the
//! built-in defaults, which mirror the classic M/M/1 textbook setup of
//! lambda = 5, mu = 7, one server, one thousand customers.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mm1-simulator",
    version,
    about = "M/M/1 queueing simulator - three concurrent threads over one shared queue",
    long_about = "Simulates a single-server queue with Poisson arrivals and exponentially \
distributed service times. An arrival generator, a server, and a queue-length observer run \
as independent threads over one shared queue; the run ends once the server has processed \
its customer quota, and summary statistics are reported for inter-arrival, waiting, and \
service times, queue length, and server utilization.

EXAMPLES:
    # Run with default settings (lambda 5.0, mu 7.0, 1000 customers)
    mm1-simulator

    # A lighter load with a shorter run
    mm1-simulator -l 2.5 -m 8.0 -c 200

    # Use a configuration file, overriding its customer count
    mm1-simulator --config sim.json -c 500

    # Validate a configuration without running
    mm1-simulator --config sim.json --dry-run

    # Reproducible run with results exported as JSON
    mm1-simulator --seed 42 --results-output report.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag, JSON format)
    3. Default values (lowest priority)

    Use --print-config to generate a template configuration file."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Mean arrival rate lambda, in customers per second
    #[arg(
        short = 'l',
        long,
        help = "Mean arrival rate lambda (customers/second)",
        long_help = "Mean rate of the Poisson arrival process, in customers per second. Must be \
positive and below service-rate x server-count for the system to be stable. Default: 5.0"
    )]
    pub arrival_rate: Option<f64>,

    /// Mean service rate mu, in customers per second
    #[arg(
        short = 'm',
        long,
        help = "Mean service rate mu (customers/second)",
        long_help = "Mean rate of the exponential service process, in customers per second. \
Must be positive. Default: 7.0"
    )]
    pub service_rate: Option<f64>,

    /// Number of servers (advisory; a single server thread is run)
    #[arg(
        short = 's',
        long,
        help = "Server count (advisory, single server supported)",
        long_help = "Number of servers used in the stability check. Only a single server thread \
is currently run regardless of this value. Default: 1"
    )]
    pub server_count: Option<usize>,

    /// Number of customers the server processes before the run ends
    #[arg(
        short = 'c',
        long,
        help = "Customer quota ending the run",
        long_help = "Number of customers the server must process before the simulation stops. \
Must be greater than 0. Default: 1000"
    )]
    pub customer_count: Option<usize>,

    /// Observer sampling period in milliseconds
    #[arg(
        long,
        help = "Queue-length sampling period (milliseconds)",
        long_help = "Fixed period at which the observer thread samples the queue length. \
Must be positive. Default: 5.0"
    )]
    pub observer_period_ms: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Output path for the results report (JSON)
    #[arg(long, help = "Output path for the JSON results report")]
    pub results_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running the simulation
    #[arg(long, help = "Validate configuration without running the simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Mean arrival rate lambda, in customers per second
    pub arrival_rate: Option<f64>,

    /// Mean service rate mu, in customers per second
    pub service_rate: Option<f64>,

    /// Number of servers (advisory)
    pub server_count: Option<usize>,

    /// Number of customers the server processes before the run ends
    pub customer_count: Option<usize>,

    /// Observer sampling period in milliseconds
    pub observer_period_ms: Option<f64>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,
}

/// Configuration for one simulation run
///
/// Immutable once the simulation starts; the controller validates it before
/// any thread is spawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Mean arrival rate lambda, in customers per second
    pub arrival_rate: f64,

    /// Mean service rate mu, in customers per second
    pub service_rate: f64,

    /// Number of servers. Participates in the stability check, but only a
    /// single server thread is currently run regardless of this value.
    pub server_count: usize,

    /// Number of customers the server processes before raising the stop
    /// signal
    pub customer_count: usize,

    /// Observer sampling period in milliseconds
    pub observer_period_ms: f64,

    /// Random seed for reproducible results. Each thread derives its own
    /// stream from this base; `None` seeds from the system clock.
    pub seed: Option<u64>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A rate parameter is not strictly positive and finite
    #[error("{parameter} must be a positive, finite rate, got {value}")]
    InvalidRate {
        /// Name of the offending rate parameter
        parameter: &'static str,
        /// The invalid rate value
        value: f64,
    },

    /// Customer count is invalid
    #[error("Customer count must be greater than 0, got {0}")]
    InvalidCustomerCount(usize),

    /// Server count is invalid
    #[error("Server count must be greater than 0, got {0}")]
    InvalidServerCount(usize),

    /// Observer period is invalid
    #[error("Observer period must be a positive, finite number of milliseconds, got {0}")]
    InvalidObserverPeriod(f64),

    /// The offered load meets or exceeds capacity; the queue would grow
    /// without bound
    #[error(
        "Unstable system: arrival rate {arrival_rate} must be below \
service rate {service_rate} x server count {server_count}"
    )]
    UnstableSystem {
        /// Configured arrival rate lambda
        arrival_rate: f64,
        /// Configured service rate mu
        service_rate: f64,
        /// Configured server count
        server_count: usize,
    },
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 5.0,
            service_rate: 7.0,
            server_count: 1,
            customer_count: 1000,
            observer_period_ms: 5.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration from command line arguments and optional
    /// config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config = Self::default();

        // Load from config file if specified
        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // Override with command line arguments (CLI takes precedence)
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file, merging with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            arrival_rate: config_file.arrival_rate.unwrap_or(defaults.arrival_rate),
            service_rate: config_file.service_rate.unwrap_or(defaults.service_rate),
            server_count: config_file.server_count.unwrap_or(defaults.server_count),
            customer_count: config_file.customer_count.unwrap_or(defaults.customer_count),
            observer_period_ms: config_file
                .observer_period_ms
                .unwrap_or(defaults.observer_period_ms),
            seed: config_file.seed.or(defaults.seed),
        }
    }

    /// Apply CLI argument overrides to the configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(arrival_rate) = args.arrival_rate {
            config.arrival_rate = arrival_rate;
        }
        if let Some(service_rate) = args.service_rate {
            config.service_rate = service_rate;
        }
        if let Some(server_count) = args.server_count {
            config.server_count = server_count;
        }
        if let Some(customer_count) = args.customer_count {
            config.customer_count = customer_count;
        }
        if let Some(observer_period_ms) = args.observer_period_ms {
            config.observer_period_ms = observer_period_ms;
        }
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
    }

    /// Validate the configuration.
    ///
    /// An unstable system (lambda >= mu x server count) is a configuration
    /// error, not a runtime condition: it is rejected here, before any thread
    /// or buffer exists.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return Err(ConfigValidationError::InvalidRate {
                parameter: "arrival-rate",
                value: self.arrival_rate,
            });
        }

        if !self.service_rate.is_finite() || self.service_rate <= 0.0 {
            return Err(ConfigValidationError::InvalidRate {
                parameter: "service-rate",
                value: self.service_rate,
            });
        }

        if self.server_count == 0 {
            return Err(ConfigValidationError::InvalidServerCount(self.server_count));
        }

        if self.customer_count == 0 {
            return Err(ConfigValidationError::InvalidCustomerCount(self.customer_count));
        }

        if !self.observer_period_ms.is_finite() || self.observer_period_ms <= 0.0 {
            return Err(ConfigValidationError::InvalidObserverPeriod(self.observer_period_ms));
        }

        if self.arrival_rate >= self.service_rate * self.server_count as f64 {
            return Err(ConfigValidationError::UnstableSystem {
                arrival_rate: self.arrival_rate,
                service_rate: self.service_rate,
                server_count: self.server_count,
            });
        }

        Ok(())
    }

    /// The observer's sampling period as a [`Duration`].
    pub fn observer_period(&self) -> Duration {
        Duration::from_secs_f64(self.observer_period_ms / 1000.0)
    }

    /// The theoretical offered load rho = lambda / (mu x server count).
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate / (self.service_rate * self.server_count as f64)
    }

    /// Serialize this configuration as pretty-printed JSON
    pub fn print_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
