//! # Trace Pipeline
//!
//! Applies a [`PipelineConfig`] to a decoded [`TraceSet`]:
//!
//! 1. rename traces (`[rename]`)
//! 2. run each configured transform on its selected traces, adding
//!    `<name>_<suffix>` traces next to the sources
//! 3. block-average the whole set (`[decimate]`)
//!
//! Selections are matched against the names present when a step starts, so
//! they see renamed traces but never traces derived by the same step.

mod config;

pub use config::{
    AlbConfig, AlphaConfig, DecimateConfig, PipelineConfig, VoltSecondConfig, WindowConfig,
    DEFAULT_ALPHA, DEFAULT_FREQUENCY, DEFAULT_ROUND_DECIMALS,
};

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::error::{Result, WaveformError};
use crate::trace::TraceSet;
use crate::transform::TransformKind;

/// Which traces a transform step runs on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every trace present when the step starts
    #[default]
    All,
    /// Only the named traces
    Only(BTreeSet<String>),
}

impl Selection {
    fn from_names(names: Option<&BTreeSet<String>>) -> Self {
        match names {
            Some(names) => Selection::Only(names.clone()),
            None => Selection::All,
        }
    }

    /// Resolve against the current trace names.
    fn resolve(&self, traces: &TraceSet) -> Vec<String> {
        match self {
            Selection::All => traces.names().map(String::from).collect(),
            Selection::Only(names) => {
                for name in names.iter().filter(|n| !traces.contains(n)) {
                    warn!("Selected trace '{}' does not exist, skipped", name);
                }
                names
                    .iter()
                    .filter(|n| traces.contains(n))
                    .cloned()
                    .collect()
            }
        }
    }
}

/// One transform and the traces it applies to
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStep {
    pub kind: TransformKind,
    pub selection: Selection,
}

impl TransformStep {
    pub fn new(kind: TransformKind, selection: Selection) -> Self {
        Self { kind, selection }
    }

    /// Add the derived traces of this step to `traces`.
    ///
    /// Returns the names of the new traces.
    pub fn run(&self, traces: &mut TraceSet) -> Result<Vec<String>> {
        let sources = self.selection.resolve(traces);
        let mut added = Vec::with_capacity(sources.len());

        for source in sources {
            let target = self.kind.derived_name(&source);
            if traces.contains(&target) {
                return Err(WaveformError::Config(format!(
                    "{} output '{}' would overwrite an existing trace",
                    self.kind.suffix(),
                    target
                )));
            }
            let Some(trace) = traces.get(&source) else {
                continue;
            };
            let derived = self.kind.apply(traces.time(), trace)?;
            debug!("Derived {} from {}", target, source);
            traces.insert(target.clone(), derived)?;
            added.push(target);
        }
        Ok(added)
    }
}

/// Rename, transform and decimate, in that order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformPipeline {
    pub rename: BTreeMap<String, String>,
    pub steps: Vec<TransformStep>,
    pub decimate: Option<usize>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pipeline a configuration describes.
    ///
    /// Steps run in the order alpha, RMS, mean, volt-second.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let mut pipeline = Self::new().with_rename(config.rename.clone());

        if let Some(alpha) = &config.alpha {
            pipeline = pipeline.with_step(
                TransformKind::Alpha { alpha: alpha.alpha },
                Selection::from_names(alpha.traces.as_ref()),
            );
        }
        if let Some(rms) = &config.rms {
            pipeline = pipeline.with_step(
                TransformKind::Rms(rms.window()),
                Selection::from_names(rms.traces.as_ref()),
            );
        }
        if let Some(avg) = &config.avg {
            pipeline = pipeline.with_step(
                TransformKind::Mean(avg.window()),
                Selection::from_names(avg.traces.as_ref()),
            );
        }
        if let Some(voltsec) = &config.voltsec {
            pipeline = pipeline.with_step(
                voltsec.transform(),
                Selection::from_names(voltsec.traces.as_ref()),
            );
        }
        pipeline.decimate = config.decimate.map(|d| d.ratio);
        Ok(pipeline)
    }

    pub fn with_rename(mut self, rename: BTreeMap<String, String>) -> Self {
        self.rename = rename;
        self
    }

    pub fn with_step(mut self, kind: TransformKind, selection: Selection) -> Self {
        self.steps.push(TransformStep::new(kind, selection));
        self
    }

    pub fn with_decimation(mut self, ratio: usize) -> Self {
        self.decimate = Some(ratio);
        self
    }

    /// Run the pipeline, consuming the decoded set.
    pub fn apply(&self, traces: TraceSet) -> Result<TraceSet> {
        for step in &self.steps {
            step.kind.validate()?;
        }

        let mut traces = if self.rename.is_empty() {
            traces
        } else {
            traces.renamed(&self.rename)?
        };

        for step in &self.steps {
            let added = step.run(&mut traces)?;
            info!("{} step added {} trace(s)", step.kind.suffix(), added.len());
        }

        match self.decimate {
            Some(ratio) if ratio > 1 => {
                info!(
                    "Block-averaging {} samples by {}",
                    traces.sample_count(),
                    ratio
                );
                traces.decimated(ratio)
            }
            Some(0) => Err(WaveformError::Config(
                "decimation ratio must be at least 1".to_string(),
            )),
            _ => Ok(traces),
        }
    }
}
