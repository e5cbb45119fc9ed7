//! Probe output parsing
//!
//! The benchmarked workload reports its own measurements on stdout as plain
//! `key:value` lines:
//!
//! ```text
//! duration_ms:1234
//! used_memory_mb:56
//! ```
//!
//! Any other output is ignored. When a key appears on several lines, the
//! latest line wins. A missing `duration_ms` is fatal; a missing
//! `used_memory_mb` defaults to 0 (some workloads simply don't report it).

use super::{Measurement, OracleError};
use regex::Regex;
use std::sync::OnceLock;

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"duration_ms:(\d+)").expect("valid regex"))
}

fn memory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"used_memory_mb:(\d+)").expect("valid regex"))
}

/// Scan captured probe output line by line into a [`Measurement`].
pub fn parse_probe_output<S: AsRef<str>>(lines: &[S]) -> Result<Measurement, OracleError> {
    let mut duration_ms = -1.0_f64;
    let mut used_memory_mb = -1.0_f64;

    for line in lines {
        let line = line.as_ref();
        if let Some(caps) = duration_re().captures(line) {
            if let Ok(v) = caps[1].parse::<f64>() {
                duration_ms = v;
            }
        }
        if let Some(caps) = memory_re().captures(line) {
            if let Ok(v) = caps[1].parse::<f64>() {
                used_memory_mb = v;
            }
        }
    }

    if duration_ms < 0.0 {
        return Err(OracleError::MissingDuration);
    }
    if used_memory_mb < 0.0 {
        used_memory_mb = 0.0;
    }

    Ok(Measurement {
        duration_ms,
        used_memory_mb,
    })
}
