//! # Signal Transforms
//!
//! Derived traces computed from a decoded trace and its time axis:
//!
//! | Transform | Function | Derived name |
//! |-----------|----------|--------------|
//! | Exponential smoothing | [`filters::alpha_filter`] | `<name>_alpha` |
//! | Windowed RMS | [`filters::rms_calc`] | `<name>_rms` |
//! | Windowed mean | [`filters::avg_calc`] | `<name>_avg` |
//! | Windowed volt-second | [`filters::voltsec_product`] | `<name>_vs` |
//!
//! Block averaging ([`filters::avg_filter_data`]) shortens the trace and is
//! applied to a whole [`TraceSet`](crate::trace::TraceSet) instead.

pub mod filters;
pub mod stats;
pub mod window;

pub use filters::WindowSpec;
pub use window::RollingSum;

use crate::error::Result;
use crate::trace::{TimeAxis, Trace};

/// A per-trace transform and its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformKind {
    /// Exponential smoothing with factor `alpha` in (0, 1)
    Alpha { alpha: f64 },
    /// Windowed RMS
    Rms(WindowSpec),
    /// Windowed mean
    Mean(WindowSpec),
    /// Windowed volt-second product, optionally rounded
    VoltSecond {
        window: WindowSpec,
        round_decimals: Option<u32>,
    },
}

impl TransformKind {
    /// Suffix appended to the source trace name
    pub fn suffix(&self) -> &'static str {
        match self {
            TransformKind::Alpha { .. } => "alpha",
            TransformKind::Rms(_) => "rms",
            TransformKind::Mean(_) => "avg",
            TransformKind::VoltSecond { .. } => "vs",
        }
    }

    /// Name of the trace derived from `source`
    pub fn derived_name(&self, source: &str) -> String {
        format!("{}_{}", source, self.suffix())
    }

    /// Reject invalid parameters without touching any data.
    pub fn validate(&self) -> Result<()> {
        match self {
            TransformKind::Alpha { alpha } => filters::alpha_filter(&[], *alpha).map(|_| ()),
            TransformKind::Rms(spec) | TransformKind::Mean(spec) => spec.validate(),
            TransformKind::VoltSecond {
                window,
                round_decimals,
            } => {
                window.validate()?;
                filters::check_round_decimals(*round_decimals)
            }
        }
    }

    /// Compute the derived trace.
    pub fn apply(&self, time: &TimeAxis, trace: &Trace) -> Result<Trace> {
        let time = time.values();
        let data = trace.values();
        let values = match *self {
            TransformKind::Alpha { alpha } => filters::alpha_filter(data, alpha)?,
            TransformKind::Rms(spec) => filters::rms_calc(time, data, spec)?,
            TransformKind::Mean(spec) => filters::avg_calc(time, data, spec)?,
            TransformKind::VoltSecond {
                window,
                round_decimals,
            } => filters::voltsec_product(time, data, window, round_decimals)?,
        };
        Ok(Trace::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let spec = WindowSpec::new(50.0);
        assert_eq!(TransformKind::Rms(spec).derived_name("CH1"), "CH1_rms");
        assert_eq!(TransformKind::Mean(spec).derived_name("led"), "led_avg");
        assert_eq!(
            TransformKind::Alpha { alpha: 0.8 }.derived_name("CH2"),
            "CH2_alpha"
        );
        assert_eq!(
            TransformKind::VoltSecond {
                window: spec,
                round_decimals: Some(2)
            }
            .derived_name("CH3"),
            "CH3_vs"
        );
    }

    #[test]
    fn test_validate() {
        assert!(TransformKind::Alpha { alpha: 1.5 }.validate().is_err());
        assert!(TransformKind::Rms(WindowSpec::new(-1.0)).validate().is_err());
        assert!(TransformKind::Mean(WindowSpec::new(60.0)).validate().is_ok());
    }

    #[test]
    fn test_apply_keeps_length() {
        let time = TimeAxis::uniform(50, 1e-3).unwrap();
        let trace = Trace::new((0..50).map(|i| (i as f64 * 0.3).sin()).collect());
        let rms = TransformKind::Rms(WindowSpec::new(100.0))
            .apply(&time, &trace)
            .unwrap();
        assert_eq!(rms.len(), trace.len());
    }
}
