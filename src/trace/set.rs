use std::collections::btree_map;
use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::Serialize;

use super::{TimeAxis, Trace};
use crate::error::{ChannelFailure, Result, WaveformError};
use crate::transform::filters;

/// Relative X increment difference tolerated between channels of one group
const X_INCREMENT_TOLERANCE: f64 = 1e-9;

/// A shared time axis plus uniquely named traces of equal length
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TraceSet {
    time: TimeAxis,
    traces: BTreeMap<String, Trace>,
}

impl TraceSet {
    /// Create an empty set on the given time axis
    pub fn new(time: TimeAxis) -> Self {
        Self {
            time,
            traces: BTreeMap::new(),
        }
    }

    /// Build a set from named sample vectors sharing one X increment.
    ///
    /// The axis length comes from the first channel in name order; every
    /// other channel must match it.
    pub fn from_samples<I, S>(x_increment: f64, channels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let channels: BTreeMap<String, Vec<f64>> = channels
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .collect();
        let len = channels.values().next().map(Vec::len).unwrap_or(0);
        let mut set = Self::new(TimeAxis::uniform(len, x_increment)?);
        for (name, values) in channels {
            set.insert(name, Trace::new(values))?;
        }
        Ok(set)
    }

    /// Shared time axis
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Add a trace. Fails if the name is taken or the length differs from the axis.
    pub fn insert(&mut self, name: impl Into<String>, trace: Trace) -> Result<()> {
        let name = name.into();
        if trace.len() != self.time.len() {
            return Err(WaveformError::LengthMismatch {
                name,
                expected: self.time.len(),
                actual: trace.len(),
            });
        }
        match self.traces.entry(name) {
            btree_map::Entry::Occupied(entry) => {
                Err(WaveformError::DuplicateTrace(entry.key().clone()))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(trace);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Trace> {
        self.traces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.traces.contains_key(name)
    }

    /// Trace names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Trace)> {
        self.traces.iter().map(|(name, trace)| (name.as_str(), trace))
    }

    /// Number of traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Number of samples per trace
    pub fn sample_count(&self) -> usize {
        self.time.len()
    }

    /// Apply a one-to-one rename map.
    ///
    /// Map entries naming no trace are skipped with a warning. Renaming onto
    /// a name that is already in use is an error.
    pub fn renamed(self, mapping: &BTreeMap<String, String>) -> Result<Self> {
        for old in mapping.keys().filter(|old| !self.traces.contains_key(*old)) {
            warn!("Rename entry '{}' matches no trace, ignored", old);
        }

        let mut renamed = Self::new(self.time);
        for (name, trace) in self.traces {
            let target = match mapping.get(&name) {
                Some(new_name) => {
                    debug!("Renaming trace {} -> {}", name, new_name);
                    new_name.clone()
                }
                None => name,
            };
            renamed.insert(target, trace).map_err(|e| match e {
                WaveformError::DuplicateTrace(name) => WaveformError::Config(format!(
                    "rename produces duplicate trace name '{}'",
                    name
                )),
                other => other,
            })?;
        }
        Ok(renamed)
    }

    /// Block-average every trace and the time axis by `ratio`.
    ///
    /// The returned set has `ceil(n / ratio)` samples per trace.
    pub fn decimated(&self, ratio: usize) -> Result<Self> {
        let (time, _) = filters::avg_filter_data(self.time.values(), self.time.values(), ratio)?;
        let mut reduced = Self::new(TimeAxis::from_values(time)?);
        for (name, trace) in &self.traces {
            let (_, values) = filters::avg_filter_data(self.time.values(), trace.values(), ratio)?;
            reduced.insert(name.clone(), Trace::new(values))?;
        }
        Ok(reduced)
    }
}

impl<'a> IntoIterator for &'a TraceSet {
    type Item = (&'a String, &'a Trace);
    type IntoIter = btree_map::Iter<'a, String, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

/// A successfully decoded channel waiting to join a capture group
#[derive(Debug, Clone)]
pub struct DecodedChannel {
    /// Channel name (e.g. `CH1`)
    pub name: String,
    /// Seconds per sample from the channel's header
    pub x_increment: f64,
    /// Scaled amplitude samples
    pub samples: Vec<f64>,
}

/// Result of assembling the channels of one capture
#[derive(Debug)]
pub struct CaptureGroup {
    /// Channels that decoded and agree with the canonical time axis
    pub traces: TraceSet,
    /// Channels that were requested but could not be used
    pub missing: Vec<ChannelFailure>,
}

impl CaptureGroup {
    /// Assemble decoded channels into one trace set.
    ///
    /// Channels are ordered by name regardless of the order they were decoded
    /// in. The first usable one defines the time axis; a later channel of a
    /// different length is moved to `missing`. Fails when no channel is usable.
    pub fn assemble(
        mut channels: Vec<DecodedChannel>,
        mut failures: Vec<ChannelFailure>,
    ) -> Result<Self> {
        channels.sort_by(|a, b| a.name.cmp(&b.name));

        let mut assembled: Option<(TraceSet, f64)> = None;
        for channel in channels {
            let name = channel.name;
            let result = match assembled.as_mut() {
                None => match TimeAxis::uniform(channel.samples.len(), channel.x_increment) {
                    Ok(axis) => {
                        let mut set = TraceSet::new(axis);
                        let inserted = set.insert(name.clone(), Trace::new(channel.samples));
                        assembled = Some((set, channel.x_increment));
                        inserted
                    }
                    Err(error) => Err(error),
                },
                Some((set, x_increment)) => {
                    let relative = ((channel.x_increment - *x_increment) / *x_increment).abs();
                    if relative > X_INCREMENT_TOLERANCE {
                        warn!(
                            "Channel {} has X increment {} but the group uses {}",
                            name, channel.x_increment, x_increment
                        );
                    }
                    set.insert(name.clone(), Trace::new(channel.samples))
                }
            };
            if let Err(error) = result {
                warn!("Channel {} dropped from capture group: {}", name, error);
                failures.push(ChannelFailure {
                    channel: name,
                    error,
                });
            }
        }

        let Some((traces, _)) = assembled else {
            return Err(WaveformError::EmptyGroup { failures });
        };

        failures.sort_by(|a, b| a.channel.cmp(&b.channel));
        info!(
            "Capture group assembled: {} traces x {} samples, {} missing",
            traces.len(),
            traces.sample_count(),
            failures.len()
        );

        Ok(Self {
            traces,
            missing: failures,
        })
    }

    /// Names of the channels that could not be used
    pub fn missing_channels(&self) -> Vec<&str> {
        self.missing.iter().map(|f| f.channel.as_str()).collect()
    }
}
