//! Pipeline settings from a TOML file, overridden by command-line flags.
//!
//! Instead of passing many CLI flags, users can keep settings in a file:
//!
//! ```toml
//! # scopetrace.toml
//! [rename]
//! CH1 = "led_current"
//!
//! [rms]
//! frequency = 50.0
//! traces = ["led_current"]
//! ```
//!
//! Precedence is command line, then file, then built-in defaults.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use scopetrace::pipeline::{
    AlphaConfig, DecimateConfig, PipelineConfig, VoltSecondConfig, WindowConfig,
};

/// Flags of `scopetrace convert` that override the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Enable exponential smoothing
    pub alpha: bool,
    /// Enable windowed RMS
    pub rms: bool,
    /// Enable windowed mean
    pub avg: bool,
    /// Enable windowed volt-second product
    pub voltsec: bool,
    /// Window frequency for every enabled windowed transform
    pub frequency: Option<f64>,
    /// Restrict every enabled transform to these traces
    pub channels: Vec<String>,
    /// Block-averaging ratio
    pub decimate: Option<usize>,
    /// Scale ALB amplitudes by the probe ratio
    pub probe_attenuation: bool,
}

/// Load configuration from a TOML file.
pub fn load_file(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::from_file(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Merge the optional config file with command-line overrides.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => PipelineConfig::default(),
    };

    if overrides.alpha && config.alpha.is_none() {
        config.alpha = Some(AlphaConfig::default());
    }
    if overrides.rms && config.rms.is_none() {
        config.rms = Some(WindowConfig::default());
    }
    if overrides.avg && config.avg.is_none() {
        config.avg = Some(WindowConfig::default());
    }
    if overrides.voltsec && config.voltsec.is_none() {
        config.voltsec = Some(VoltSecondConfig::default());
    }

    if let Some(frequency) = overrides.frequency {
        for window in [config.rms.as_mut(), config.avg.as_mut()].into_iter().flatten() {
            window.frequency = frequency;
        }
        if let Some(voltsec) = config.voltsec.as_mut() {
            voltsec.frequency = frequency;
        }
    }

    if !overrides.channels.is_empty() {
        let selection: BTreeSet<String> = overrides.channels.iter().cloned().collect();
        if let Some(alpha) = config.alpha.as_mut() {
            alpha.traces = Some(selection.clone());
        }
        for window in [config.rms.as_mut(), config.avg.as_mut()].into_iter().flatten() {
            window.traces = Some(selection.clone());
        }
        if let Some(voltsec) = config.voltsec.as_mut() {
            voltsec.traces = Some(selection);
        }
    }

    if let Some(ratio) = overrides.decimate {
        config.decimate = Some(DecimateConfig { ratio });
    }
    if overrides.probe_attenuation {
        config.alb.apply_probe_attenuation = true;
    }

    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, &Overrides::default()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_flags_enable_sections() {
        let overrides = Overrides {
            rms: true,
            voltsec: true,
            frequency: Some(60.0),
            channels: vec!["CH1".into()],
            ..Default::default()
        };
        let config = resolve(None, &overrides).unwrap();

        let rms = config.rms.unwrap();
        assert_eq!(rms.frequency, 60.0);
        assert!(rms.traces.unwrap().contains("CH1"));
        let voltsec = config.voltsec.unwrap();
        assert_eq!(voltsec.frequency, 60.0);
        assert!(voltsec.half_period);
        assert!(config.avg.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scopetrace.toml");
        std::fs::write(
            &path,
            "[avg]\nfrequency = 50.0\nhalf_period = true\n[decimate]\nratio = 8\n",
        )
        .unwrap();

        let overrides = Overrides {
            frequency: Some(16.7),
            decimate: Some(2),
            probe_attenuation: true,
            ..Default::default()
        };
        let config = resolve(Some(&path), &overrides).unwrap();

        let avg = config.avg.unwrap();
        assert_eq!(avg.frequency, 16.7);
        assert!(avg.half_period);
        assert_eq!(config.decimate.unwrap().ratio, 2);
        assert!(config.alb.apply_probe_attenuation);
    }

    #[test]
    fn test_invalid_override() {
        let overrides = Overrides {
            rms: true,
            frequency: Some(0.0),
            ..Default::default()
        };
        assert!(resolve(None, &overrides).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = resolve(Some(Path::new("/nonexistent/scopetrace.toml")), &Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load config file"));
    }
}
