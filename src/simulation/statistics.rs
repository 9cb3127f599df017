//! Statistics collection and reporting
//!
//! Pure reductions over the sample buffers recorded by the simulation
//! threads. Nothing here holds hidden mutable state: reducing the same
//! buffers twice yields identical results, which the controller relies on
//! when assembling the final report.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use super::error::SimulationResult;

/// Mean and standard deviation of one sample series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean of the samples
    pub mean: f64,
    /// Population standard deviation of the samples
    pub std_dev: f64,
}

impl SummaryStats {
    /// Reduce a sample slice to its mean and population standard deviation.
    ///
    /// An empty slice reduces to zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self { mean: 0.0, std_dev: 0.0 };
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let squared_deviations = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>();

        Self { mean, std_dev: (squared_deviations / n).sqrt() }
    }
}

/// Running queue-length accumulator maintained by the observer thread.
///
/// Holds only the count, sum, and sum of squares, so each sample is folded in
/// with constant work regardless of how long the run gets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueueLengthAccumulator {
    count: usize,
    sum: f64,
    sum_of_squares: f64,
}

impl QueueLengthAccumulator {
    /// Fold one queue-length snapshot into the accumulator.
    pub fn record(&mut self, queue_length: usize) {
        let x = queue_length as f64;
        self.count += 1;
        self.sum += x;
        self.sum_of_squares += x * x;
    }

    /// Number of samples folded in so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reduce the accumulator to mean and (sample) standard deviation.
    ///
    /// Fewer than two samples yield a standard deviation of zero.
    pub fn summary(&self) -> SummaryStats {
        if self.count == 0 {
            return SummaryStats { mean: 0.0, std_dev: 0.0 };
        }

        let n = self.count as f64;
        let mean = self.sum / n;
        let std_dev = if self.count < 2 {
            0.0
        } else {
            // Guard against a slightly negative variance from rounding.
            (((self.sum_of_squares - mean * mean * n) / (n - 1.0)).max(0.0)).sqrt()
        };

        SummaryStats { mean, std_dev }
    }
}

/// One timestamped queue-length observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueLengthSample {
    /// Seconds since the start of the run
    pub offset_seconds: f64,
    /// Queue length observed at that offset
    pub queue_length: usize,
}

impl QueueLengthSample {
    /// Create a sample from an offset into the run.
    pub fn new(offset: Duration, queue_length: usize) -> Self {
        Self { offset_seconds: offset.as_secs_f64(), queue_length }
    }
}

/// Results of one completed simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Inter-arrival time statistics, in seconds
    pub inter_arrival_time: SummaryStats,
    /// Customer waiting time statistics, in seconds
    pub waiting_time: SummaryStats,
    /// Service time statistics, in seconds
    pub service_time: SummaryStats,
    /// Observed queue-length statistics
    pub queue_length: SummaryStats,
    /// Fraction of wall-clock time the server spent servicing customers.
    /// Reported as computed, not clamped.
    pub utilization: f64,
    /// Wall-clock duration of the run, in seconds
    pub elapsed_seconds: f64,
    /// Number of customers the server actually processed
    pub customers_served: usize,
    /// Number of queue-length samples the observer recorded
    pub queue_samples: usize,
    /// The observer's queue-length time series, for diagnostics
    pub queue_length_series: Vec<QueueLengthSample>,
}

impl SimulationReport {
    /// Write the report as pretty-printed JSON to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> SimulationResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
