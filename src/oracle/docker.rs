//! Docker-backed cost oracle
//!
//! Each raw probe is one `docker run --rm <image>` invocation, isolated from
//! prior runs. Heap overrides are passed through the conventional `JAVA_OPTS`
//! environment variable; the neutral (baseline) configuration sets none.

use super::{parse_probe_output, Baseline, CostOracle, Measurement, OracleError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Cost oracle that benchmarks a JVM workload packaged as a Docker image.
pub struct DockerOracle {
    image: String,
    repeats: u32,
    baseline: Option<Baseline>,
}

impl DockerOracle {
    /// Create an oracle for the given image. `repeats` below 1 is coerced
    /// up — every measurement averages at least one sample.
    pub fn new(image: impl Into<String>, repeats: u32) -> Self {
        Self {
            image: image.into(),
            repeats: repeats.max(1),
            baseline: None,
        }
    }

    /// The calibrated baseline, if any.
    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Run the container once and return its captured output lines
    /// (stdout and stderr combined). Non-zero exit is a probe failure.
    async fn raw_sample(&self, java_opts: Option<&str>) -> Result<Vec<String>, OracleError> {
        let mut cmd = Command::new("docker");
        cmd.arg("run").arg("--rm");
        if let Some(opts) = java_opts {
            cmd.arg("-e").arg(format!("JAVA_OPTS={opts}"));
        }
        cmd.arg(&self.image);

        debug!(image = %self.image, java_opts = ?java_opts, "Running benchmark probe");
        let output = cmd.kill_on_drop(true).output().await?;

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_owned)
            .collect();
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_owned),
        );

        if !output.status.success() {
            return Err(OracleError::ProbeFailed {
                status: output.status,
                detail: lines.join("\n"),
            });
        }
        Ok(lines)
    }

    /// Draw `repeats` samples under the given options and average them
    /// component-wise.
    async fn averaged_sample(&self, java_opts: Option<&str>) -> Result<Measurement, OracleError> {
        let mut time_sum = 0.0;
        let mut mem_sum = 0.0;
        for _ in 0..self.repeats {
            let lines = self.raw_sample(java_opts).await?;
            let m = parse_probe_output(&lines)?;
            time_sum += m.duration_ms;
            mem_sum += m.used_memory_mb;
        }
        Ok(Measurement {
            duration_ms: time_sum / f64::from(self.repeats),
            used_memory_mb: mem_sum / f64::from(self.repeats),
        })
    }
}

#[async_trait]
impl CostOracle for DockerOracle {
    async fn calibrate_baseline(&mut self) -> Result<(), OracleError> {
        let m = self.averaged_sample(None).await?;
        info!(
            time_ms = m.duration_ms,
            mem_mb = m.used_memory_mb,
            repeats = self.repeats,
            "Baseline calibrated"
        );
        self.baseline = Some(Baseline(m));
        Ok(())
    }

    async fn measure(
        &self,
        min_heap_mb: i64,
        max_heap_mb: i64,
    ) -> Result<Measurement, OracleError> {
        let opts = format!("-Xms{min_heap_mb}m -Xmx{max_heap_mb}m");
        self.averaged_sample(Some(&opts)).await
    }

    fn cost_of(&self, m: &Measurement) -> Result<f64, OracleError> {
        self.baseline
            .as_ref()
            .ok_or(OracleError::BaselineNotCalibrated)?
            .cost_of(m)
    }
}
