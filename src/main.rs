// M/M/1 Queueing Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/mm1-simulator
// ```
//
// Or with custom parameters:
//
// ```console
// $ ./target/release/mm1-simulator -l 2.5 -m 8.0 -c 500 --verbose
// ```

use anyhow::Context;
use clap::Parser;
use mm1_simulator::simulation::LoggingConfig;
use mm1_simulator::types::CliArgs;
use mm1_simulator::{SimulationConfig, SimulationController, SimulationReport};
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        let default_config = SimulationConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        // Default: minimal logging so the report stays readable
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };

    if let Err(e) = logging_result {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    // Load configuration from CLI arguments and optional config file
    let config = match SimulationConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Validate configuration before anything is allocated or spawned
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    // Handle dry run mode
    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_configuration_summary(&config);

    let controller = match SimulationController::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Failed to initialize simulation: {}", e);
            process::exit(1);
        }
    };

    info!("Starting simulation");
    let report = match controller.run() {
        Ok(report) => report,
        Err(e) => {
            error!("Simulation failed: {}", e);
            process::exit(1);
        }
    };

    print_report(&report);

    if let Some(path) = &args.results_output {
        if let Err(e) = write_results(&report, path) {
            error!("{:#}", e);
            process::exit(1);
        }
        eprintln!("Results written to: {}", path);
    }
}

/// Print the effective configuration before the run
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("M/M/1 Queueing Simulator");
    eprintln!("========================");
    eprintln!("Configuration:");
    eprintln!("  Arrival Rate (lambda): {:.2} customers/s", config.arrival_rate);
    eprintln!("  Service Rate (mu):     {:.2} customers/s", config.service_rate);
    eprintln!("  Server Count:          {}", config.server_count);
    eprintln!("  Customer Count:        {}", config.customer_count);
    eprintln!("  Observer Period:       {:.1} ms", config.observer_period_ms);
    eprintln!("  Offered Load (rho):    {:.3}", config.offered_load());
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed:           {}", seed);
    }
    eprintln!();
}

/// Print the statistics table for a finished run
fn print_report(report: &SimulationReport) {
    println!();
    println!("Statistics ({} customers, {:.2} s)", report.customers_served, report.elapsed_seconds);
    println!("{:<25} {:<15} {}", "", "average", "standard deviation");
    print_stat_row("inter-arrival time", report.inter_arrival_time);
    print_stat_row("customer waiting time", report.waiting_time);
    print_stat_row("service time", report.service_time);
    print_stat_row("queue length", report.queue_length);
    println!();
    println!("utilization: {:.1}%", report.utilization * 100.0);
}

fn print_stat_row(label: &str, stats: mm1_simulator::SummaryStats) {
    println!("{:<25} {:<15.6} {:.6}", label, stats.mean, stats.std_dev);
}

/// Write the JSON results report
fn write_results(report: &SimulationReport, path: &str) -> anyhow::Result<()> {
    report
        .write_json(path)
        .with_context(|| format!("Failed to write results report to '{}'", path))?;
    info!("Results report written to {}", path);
    Ok(())
}
