//! heaptune: hybrid bacterial-swarm JVM heap auto-tuner
//!
//! Searches the `(-Xms, -Xmx)` space for a low-cost heap configuration of a
//! containerized JVM workload, using a hybrid of particle-swarm motion and
//! bacterial-foraging operators (chemotaxis, truncation reproduction,
//! elimination-dispersal). Measurements come from a pluggable
//! [`CostOracle`]; the shipped [`DockerOracle`] benchmarks a Docker image
//! and normalizes time and memory against a neutral baseline run.
//!
//! ## Architecture
//!
//! - **Optimizer**: the generational search loop and best-so-far bookkeeping
//! - **CostOracle**: calibrate-once, measure-many probe abstraction
//! - **DockerOracle**: `docker run` probe with `JAVA_OPTS` heap overrides

pub mod config;
pub mod optimizer;
pub mod oracle;

pub use config::TunerConfig;
pub use optimizer::{Candidate, Optimizer, SearchParams, TuningResult};
pub use oracle::{Baseline, CostOracle, DockerOracle, Measurement, OracleError};
