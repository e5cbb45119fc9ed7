//! Cost oracle — turns a heap configuration into a comparable scalar cost
//!
//! The optimizer never talks to Docker (or any other benchmark harness)
//! directly. It consumes the [`CostOracle`] capability: calibrate a neutral
//! baseline once, then measure candidate configurations and normalize them
//! against that baseline so time and memory contribute equitably regardless
//! of absolute units.
//!
//! Cost formula: `time / baseline_time + memory / baseline_memory`.
//! Lower is better; a configuration matching the baseline exactly on both
//! dimensions scores 2.0.

mod docker;
mod parse;

pub use docker::DockerOracle;
pub use parse::parse_probe_output;

use async_trait::async_trait;
use std::process::ExitStatus;
use thiserror::Error;

/// Oracle errors. All of these are fatal to an optimization run — the core
/// performs no retry or local recovery.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A cost was requested before `calibrate_baseline`, or the calibrated
    /// baseline has a non-positive component and cannot normalize anything.
    #[error("baseline not calibrated — call calibrate_baseline() before requesting costs")]
    BaselineNotCalibrated,

    /// Probe output contained no `duration_ms:<n>` line.
    #[error("could not parse duration_ms from probe output")]
    MissingDuration,

    /// The benchmarked workload terminated abnormally.
    #[error("benchmark probe exited with {status}: {detail}")]
    ProbeFailed { status: ExitStatus, detail: String },

    /// The probe process could not be launched at all.
    #[error("failed to spawn benchmark probe: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One averaged sampling of the benchmarked workload.
///
/// Components are the mean over the oracle's configured repeat count, parsed
/// from the workload's own `duration_ms:` / `used_memory_mb:` output lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub duration_ms: f64,
    pub used_memory_mb: f64,
}

/// Neutral-configuration reference measurement, computed exactly once per run.
///
/// Dividing raw measurements by the baseline puts time and memory on
/// comparable scales before they are summed into a cost.
#[derive(Debug, Clone, Copy)]
pub struct Baseline(pub Measurement);

impl Baseline {
    /// Normalized cost of a measurement against this baseline.
    ///
    /// Errors if either baseline component is non-positive — such a baseline
    /// cannot normalize and indicates a broken calibration.
    pub fn cost_of(&self, m: &Measurement) -> Result<f64, OracleError> {
        if self.0.duration_ms <= 0.0 || self.0.used_memory_mb <= 0.0 {
            return Err(OracleError::BaselineNotCalibrated);
        }
        Ok(m.duration_ms / self.0.duration_ms + m.used_memory_mb / self.0.used_memory_mb)
    }
}

/// The single capability the optimizer consumes from its environment.
///
/// Implementations run the benchmarked workload (however they choose) and
/// report averaged measurements. `calibrate_baseline` must be called exactly
/// once before any `cost_of`.
#[async_trait]
pub trait CostOracle {
    /// Sample the neutral configuration and store the immutable baseline.
    async fn calibrate_baseline(&mut self) -> Result<(), OracleError>;

    /// Sample the given configuration. Does not touch baseline state; each
    /// call is an independent, potentially slow and noisy external probe.
    async fn measure(&self, min_heap_mb: i64, max_heap_mb: i64)
        -> Result<Measurement, OracleError>;

    /// Normalized cost of a measurement. Errors with
    /// [`OracleError::BaselineNotCalibrated`] if no baseline exists yet.
    fn cost_of(&self, m: &Measurement) -> Result<f64, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_sum_of_normalized_components() {
        let baseline = Baseline(Measurement {
            duration_ms: 1000.0,
            used_memory_mb: 100.0,
        });
        let m = Measurement {
            duration_ms: 500.0,
            used_memory_mb: 50.0,
        };
        assert_eq!(baseline.cost_of(&m).unwrap(), 1.0);
    }

    #[test]
    fn matching_baseline_costs_two() {
        let baseline = Baseline(Measurement {
            duration_ms: 1234.0,
            used_memory_mb: 56.0,
        });
        assert_eq!(baseline.cost_of(&baseline.0).unwrap(), 2.0);
    }

    #[test]
    fn worse_than_baseline_costs_more() {
        let baseline = Baseline(Measurement {
            duration_ms: 1000.0,
            used_memory_mb: 100.0,
        });
        let m = Measurement {
            duration_ms: 2000.0,
            used_memory_mb: 200.0,
        };
        assert_eq!(baseline.cost_of(&m).unwrap(), 4.0);
    }

    #[test]
    fn non_positive_baseline_component_is_rejected() {
        let baseline = Baseline(Measurement {
            duration_ms: 1000.0,
            used_memory_mb: 0.0,
        });
        let m = Measurement {
            duration_ms: 1.0,
            used_memory_mb: 1.0,
        };
        assert!(matches!(
            baseline.cost_of(&m),
            Err(OracleError::BaselineNotCalibrated)
        ));
    }
}
