//! TOML configuration for the trace pipeline.
//!
//! Every section is optional; an absent section disables that step.
//!
//! ```toml
//! # scopetrace.toml
//! [rename]
//! CH1 = "led_current"
//! CH2 = "supply_voltage"
//!
//! [rms]
//! frequency = 50.0
//! half_period = false
//! traces = ["led_current"]
//!
//! [voltsec]
//! frequency = 50.0
//!
//! [decimate]
//! ratio = 10
//!
//! [alb]
//! apply_probe_attenuation = false
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alb::AlbOptions;
use crate::error::{Result, WaveformError};
use crate::transform::{TransformKind, WindowSpec};

/// Default smoothing factor of the alpha filter
pub const DEFAULT_ALPHA: f64 = 0.8;
/// Default window frequency in Hz (mains)
pub const DEFAULT_FREQUENCY: f64 = 50.0;
/// Default rounding of the volt-second product
pub const DEFAULT_ROUND_DECIMALS: u32 = 2;

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY
}

fn default_true() -> bool {
    true
}

fn default_round_decimals() -> Option<u32> {
    Some(DEFAULT_ROUND_DECIMALS)
}

/// Root of a `scopetrace.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Old name → new name, applied before any transform
    #[serde(default)]
    pub rename: BTreeMap<String, String>,

    pub alpha: Option<AlphaConfig>,
    pub rms: Option<WindowConfig>,
    pub avg: Option<WindowConfig>,
    pub voltsec: Option<VoltSecondConfig>,
    pub decimate: Option<DecimateConfig>,

    #[serde(default)]
    pub alb: AlbConfig,
}

/// `[alpha]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Traces to smooth; all traces when absent
    pub traces: Option<BTreeSet<String>>,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            traces: None,
        }
    }
}

/// `[rms]` and `[avg]` sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    #[serde(default)]
    pub half_period: bool,
    pub traces: Option<BTreeSet<String>>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            half_period: false,
            traces: None,
        }
    }
}

impl WindowConfig {
    pub fn window(&self) -> WindowSpec {
        WindowSpec::new(self.frequency).with_half_period(self.half_period)
    }
}

/// `[voltsec]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltSecondConfig {
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Volt-second windows span half a period unless disabled
    #[serde(default = "default_true")]
    pub half_period: bool,
    #[serde(default = "default_round_decimals")]
    pub round_decimals: Option<u32>,
    pub traces: Option<BTreeSet<String>>,
}

impl Default for VoltSecondConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            half_period: true,
            round_decimals: default_round_decimals(),
            traces: None,
        }
    }
}

impl VoltSecondConfig {
    pub fn transform(&self) -> TransformKind {
        TransformKind::VoltSecond {
            window: WindowSpec::new(self.frequency).with_half_period(self.half_period),
            round_decimals: self.round_decimals,
        }
    }
}

/// `[decimate]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimateConfig {
    /// Samples averaged into one
    pub ratio: usize,
}

/// `[alb]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbConfig {
    #[serde(default)]
    pub apply_probe_attenuation: bool,
}

impl From<AlbConfig> for AlbOptions {
    fn from(config: AlbConfig) -> Self {
        AlbOptions {
            apply_probe_attenuation: config.apply_probe_attenuation,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| WaveformError::Config(e.to_string()))
    }

    /// Check every parameter without touching any data.
    pub fn validate(&self) -> Result<()> {
        let mut targets = BTreeSet::new();
        for (old, new) in &self.rename {
            if new.is_empty() {
                return Err(WaveformError::Config(format!(
                    "rename of '{}' has an empty target",
                    old
                )));
            }
            if !targets.insert(new) {
                return Err(WaveformError::Config(format!(
                    "rename map sends more than one trace to '{}'",
                    new
                )));
            }
        }

        if let Some(alpha) = &self.alpha {
            TransformKind::Alpha { alpha: alpha.alpha }.validate()?;
        }
        if let Some(rms) = &self.rms {
            rms.window().validate()?;
        }
        if let Some(avg) = &self.avg {
            avg.window().validate()?;
        }
        if let Some(voltsec) = &self.voltsec {
            voltsec.transform().validate()?;
        }
        if let Some(decimate) = &self.decimate {
            if decimate.ratio == 0 {
                return Err(WaveformError::Config(
                    "decimation ratio must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for PipelineConfig {
    type Err = WaveformError;

    fn from_str(content: &str) -> Result<Self> {
        Self::from_toml_str(content)
    }
}
