//! # Trace Store
//!
//! Decoded channels share one uniformly spaced [`TimeAxis`]. A [`TraceSet`]
//! holds that axis plus a name-keyed collection of [`Trace`]s, all of the same
//! length as the axis.
//!
//! Traces are immutable once inserted. Derived traces (RMS, mean, ...) are
//! added next to their source under a new name; nothing is overwritten.

mod set;

#[cfg(test)]
mod tests;

pub use set::{CaptureGroup, DecodedChannel, TraceSet};

use serde::Serialize;

use crate::error::{Result, WaveformError};
use crate::transform::stats;

/// Ordered, strictly increasing sample timestamps in seconds
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TimeAxis {
    values: Vec<f64>,
}

impl TimeAxis {
    /// Build the axis `t[i] = i * increment` for `i` in `0..len`.
    pub fn uniform(len: usize, increment: f64) -> Result<Self> {
        if len > 1 && !(increment.is_finite() && increment > 0.0) {
            return Err(WaveformError::Decode(format!(
                "X increment must be a positive number, got {}",
                increment
            )));
        }
        Ok(Self {
            values: (0..len).map(|i| i as f64 * increment).collect(),
        })
    }

    /// Wrap explicit timestamps, checking that they strictly increase.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if let Some(pos) = values.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(WaveformError::Decode(format!(
                "time axis is not strictly increasing at index {}",
                pos + 1
            )));
        }
        Ok(Self { values })
    }

    /// Timestamps
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Spacing between the first two samples; `None` for axes shorter than two.
    pub fn sample_interval(&self) -> Option<f64> {
        match self.values.as_slice() {
            [t0, t1, ..] => Some(t1 - t0),
            _ => None,
        }
    }

    /// Time between the first and last sample
    pub fn duration(&self) -> f64 {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// One channel's amplitude samples
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Trace {
    values: Vec<f64>,
}

impl Trace {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Amplitude samples
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest sample, `None` for an empty trace.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        stats::min_max(&self.values)
    }

    /// Arithmetic mean, `None` for an empty trace.
    pub fn mean(&self) -> Option<f64> {
        stats::mean(&self.values)
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl From<Vec<f64>> for Trace {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
