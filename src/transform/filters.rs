//! Signal transforms over a (time axis, samples) pair.
//!
//! Every function here is pure: it reads its inputs and returns a new sample
//! vector. All of them assume uniform spacing equal to `time[1] - time[0]`.
//!
//! Two ramp-up behaviours are reproduced as-is from the reference outputs and
//! must not be unified:
//! - [`rms_calc`] divides by the number of samples seen so far (`i + 1`) until
//!   the window is full, which biases the first window low.
//! - [`avg_calc`] always divides by the full window length `W`, so its output
//!   ramps up linearly from zero over the first window.

use log::debug;
use serde::{Deserialize, Serialize};

use super::window::RollingSum;
use crate::error::{Result, WaveformError};

/// Target frequency from which a window length in samples is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Base frequency in Hz (e.g. mains frequency)
    pub frequency: f64,
    /// Use half a period (`2 * frequency`) instead of a full period
    pub half_period: bool,
}

impl WindowSpec {
    /// Full-period window at `frequency` Hz
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            half_period: false,
        }
    }

    pub fn with_half_period(mut self, half_period: bool) -> Self {
        self.half_period = half_period;
        self
    }

    /// Frequency whose period is the window length
    pub fn effective_frequency(&self) -> f64 {
        if self.half_period {
            self.frequency * 2.0
        } else {
            self.frequency
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(WaveformError::Config(format!(
                "window frequency must be a positive number, got {}",
                self.frequency
            )));
        }
        Ok(())
    }

    /// Window length `W = round((1 / effective_frequency) / sample_interval)`.
    ///
    /// Axes shorter than two samples carry no interval and get `W = 1`.
    pub fn window_len(&self, time: &[f64]) -> Result<usize> {
        self.validate()?;
        let interval = match time {
            [t0, t1, ..] => t1 - t0,
            _ => return Ok(1),
        };
        if !(interval.is_finite() && interval > 0.0) {
            return Err(WaveformError::Decode(format!(
                "sample interval must be positive, got {}",
                interval
            )));
        }
        let samples = (1.0 / self.effective_frequency() / interval).round();
        if !samples.is_finite() || samples >= usize::MAX as f64 {
            return Err(WaveformError::Config(format!(
                "a period of {} Hz spans too many samples of {} s",
                self.effective_frequency(),
                interval
            )));
        }
        if samples < 1.0 {
            return Err(WaveformError::Config(format!(
                "a period of {} Hz is shorter than one sample of {} s",
                self.effective_frequency(),
                interval
            )));
        }
        debug!(
            "Window of {} Hz at {} s/sample spans {} samples",
            self.effective_frequency(),
            interval,
            samples
        );
        Ok(samples as usize)
    }
}

fn check_lengths(time: &[f64], data: &[f64]) -> Result<()> {
    if time.len() != data.len() {
        return Err(WaveformError::LengthMismatch {
            name: "input".to_string(),
            expected: time.len(),
            actual: data.len(),
        });
    }
    Ok(())
}

/// Most decimals an `f64` volt-second value can be rounded to
pub const MAX_ROUND_DECIMALS: u32 = 15;

pub(crate) fn check_round_decimals(round_decimals: Option<u32>) -> Result<()> {
    match round_decimals {
        Some(decimals) if decimals > MAX_ROUND_DECIMALS => Err(WaveformError::Config(format!(
            "cannot round to {} decimals, at most {} are supported",
            decimals, MAX_ROUND_DECIMALS
        ))),
        _ => Ok(()),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals.min(MAX_ROUND_DECIMALS) as i32);
    (value * scale).round() / scale
}

/// Exponential smoothing: `y[0] = x[0]`, `y[n] = alpha * y[n-1] + (1 - alpha) * x[n]`.
pub fn alpha_filter(data: &[f64], alpha: f64) -> Result<Vec<f64>> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(WaveformError::Config(format!(
            "alpha must lie strictly between 0 and 1, got {}",
            alpha
        )));
    }
    let Some(&first) = data.first() else {
        return Ok(Vec::new());
    };
    let mut y = first;
    Ok(data
        .iter()
        .map(|&x| {
            y = alpha * y + (1.0 - alpha) * x;
            y
        })
        .collect())
}

/// Running RMS over the trailing window.
pub fn rms_calc(time: &[f64], data: &[f64], spec: WindowSpec) -> Result<Vec<f64>> {
    check_lengths(time, data)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut window = RollingSum::new(spec.window_len(time)?);
    Ok(data
        .iter()
        .map(|&x| {
            window.push(x * x);
            // divisor is i + 1 during ramp-up, W afterwards
            let divisor = window.len() as f64;
            (window.sum().max(0.0) / divisor).sqrt()
        })
        .collect())
}

/// Running mean over the trailing window, always divided by the full window length.
pub fn avg_calc(time: &[f64], data: &[f64], spec: WindowSpec) -> Result<Vec<f64>> {
    check_lengths(time, data)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut window = RollingSum::new(spec.window_len(time)?);
    let divisor = window.capacity() as f64;
    Ok(data
        .iter()
        .map(|&x| {
            window.push(x);
            window.sum() / divisor
        })
        .collect())
}

/// Running volt-second product: trapezoidal area of `|x|` over the last `W`
/// sample pairs.
///
/// The first output uses the `(x[0], x[1])` pair. With `round_decimals` set the
/// output is rounded the way earlier tooling reported it.
pub fn voltsec_product(
    time: &[f64],
    data: &[f64],
    spec: WindowSpec,
    round_decimals: Option<u32>,
) -> Result<Vec<f64>> {
    check_round_decimals(round_decimals)?;
    check_lengths(time, data)?;
    let dt = match time {
        [t0, t1, ..] => t1 - t0,
        [_] => return Ok(vec![0.0]),
        [] => return Ok(Vec::new()),
    };
    let mut window = RollingSum::new(spec.window_len(time)?);
    Ok((0..data.len())
        .map(|i| {
            let prev = if i == 0 { 1 } else { i - 1 };
            window.push((data[i].abs() + data[prev].abs()) / 2.0 * dt);
            let area = window.sum().max(0.0);
            match round_decimals {
                Some(decimals) => round_to(area, decimals),
                None => area,
            }
        })
        .collect())
}

/// Non-overlapping block average of both the time axis and the samples.
///
/// Every `ratio` consecutive samples collapse into their mean; a final short
/// block is padded with the last sample. Output length is `ceil(n / ratio)`.
pub fn avg_filter_data(time: &[f64], data: &[f64], ratio: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if ratio == 0 {
        return Err(WaveformError::Config(
            "block averaging ratio must be at least 1".to_string(),
        ));
    }
    check_lengths(time, data)?;

    let n = data.len();
    let blocks = n.div_ceil(ratio);
    let mut res_time = Vec::with_capacity(blocks);
    let mut res_data = Vec::with_capacity(blocks);
    for start in (0..n).step_by(ratio) {
        let end = n.min(start.saturating_add(ratio));
        let mut t_sum: f64 = time[start..end].iter().sum();
        let mut d_sum: f64 = data[start..end].iter().sum();
        // pad a short block with the last sample
        let padding = (ratio - (end - start)) as f64;
        t_sum += padding * time[n - 1];
        d_sum += padding * data[n - 1];
        res_time.push(t_sum / ratio as f64);
        res_data.push(d_sum / ratio as f64);
    }
    Ok((res_time, res_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dt).collect()
    }

    #[test]
    fn test_alpha_filter() {
        let out = alpha_filter(&[0.0, 2.0, 4.0], 0.5).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 2.5]);
    }

    #[test]
    fn test_alpha_filter_rejects_bounds() {
        assert!(alpha_filter(&[1.0], 0.0).is_err());
        assert!(alpha_filter(&[1.0], 1.0).is_err());
        assert!(alpha_filter(&[], 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_window_len() {
        // 50 Hz at 1 ms/sample -> 20 samples, half period -> 10
        let time = axis(100, 1e-3);
        assert_eq!(WindowSpec::new(50.0).window_len(&time).unwrap(), 20);
        assert_eq!(
            WindowSpec::new(50.0)
                .with_half_period(true)
                .window_len(&time)
                .unwrap(),
            10
        );
        // Rounds rather than truncates
        assert_eq!(WindowSpec::new(50.0).window_len(&axis(3, 1e-5)).unwrap(), 2000);
    }

    #[test]
    fn test_window_len_rejects_bad_frequency() {
        let time = axis(10, 1e-3);
        assert!(WindowSpec::new(0.0).window_len(&time).is_err());
        assert!(WindowSpec::new(-50.0).window_len(&time).is_err());
        // Period shorter than half a sample
        assert!(WindowSpec::new(5000.0).window_len(&time).is_err());
    }

    #[test]
    fn test_rms_ramp_up_divisor() {
        // W = 2 (250 Hz at 2 ms)
        let time = axis(4, 2e-3);
        let out = rms_calc(&time, &[3.0, 4.0, 0.0, 0.0], WindowSpec::new(250.0)).unwrap();
        assert!((out[0] - 3.0).abs() < 1e-12);
        assert!((out[1] - (12.5f64).sqrt()).abs() < 1e-12);
        assert!((out[2] - (8.0f64).sqrt()).abs() < 1e-12);
        assert!(out[3].abs() < 1e-12);
    }

    #[test]
    fn test_avg_fixed_divisor_during_ramp_up() {
        // W = 4 (250 Hz at 1 ms)
        let time = axis(6, 1e-3);
        let out = avg_calc(&time, &[4.0; 6], WindowSpec::new(250.0)).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_voltsec_product() {
        // W = 2, dt = 1 ms
        let time = axis(4, 1e-3);
        let data = [1.0, -3.0, 1.0, 1.0];
        let out = voltsec_product(&time, &data, WindowSpec::new(500.0), None).unwrap();
        // trapezoids: 2e-3, 2e-3, 2e-3, 1e-3
        let expected = [2e-3, 4e-3, 4e-3, 3e-3];
        for (a, b) in out.iter().zip(expected) {
            assert!((a - b).abs() < 1e-15);
        }

        let rounded = voltsec_product(&time, &data, WindowSpec::new(500.0), Some(2)).unwrap();
        assert!(rounded.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_block_average() {
        let time = axis(6, 1.0);
        let (t, d) = avg_filter_data(&time, &[1.0, 3.0, 5.0, 7.0, 9.0, 11.0], 3).unwrap();
        assert_eq!(t, vec![1.0, 4.0]);
        assert_eq!(d, vec![3.0, 9.0]);
    }

    #[test]
    fn test_block_average_pads_last_block() {
        let time = axis(4, 1.0);
        let (t, d) = avg_filter_data(&time, &[2.0, 2.0, 2.0, 8.0], 3).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(d[1], 8.0);
        assert_eq!(t[1], 3.0);
    }

    #[test]
    fn test_block_average_ratio_beyond_length() {
        let time = axis(3, 1.0);
        let (t, d) = avg_filter_data(&time, &[1.0, 2.0, 3.0], 4_000_000_000).unwrap();
        assert_eq!(d.len(), 1);
        assert!((d[0] - 3.0).abs() < 1e-6);
        assert!((t[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_len_rejects_unrepresentable_window() {
        let time = axis(10, 1e-9);
        let err = rms_calc(&time, &[1.0; 10], WindowSpec::new(1e-300)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ConfigError);
        assert!(avg_calc(&time, &[1.0; 10], WindowSpec::new(1e-300)).is_err());
    }

    #[test]
    fn test_window_longer_than_trace() {
        // 1 Hz at 4 ns/sample -> W = 2.5e8 on a 10-sample trace
        let time = axis(10, 4e-9);
        let out = rms_calc(&time, &[2.0; 10], WindowSpec::new(1.0)).unwrap();
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-12));
        let mean = avg_calc(&time, &[2.0; 10], WindowSpec::new(1.0)).unwrap();
        assert!((mean[9] - 20.0 / 2.5e8).abs() < 1e-15);
    }

    #[test]
    fn test_voltsec_rejects_excess_decimals() {
        let time = axis(4, 1e-3);
        let window = WindowSpec::new(500.0);
        let err = voltsec_product(&time, &[1.0; 4], window, Some(400)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ConfigError);
        let out = voltsec_product(&time, &[1.0; 4], window, Some(MAX_ROUND_DECIMALS)).unwrap();
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(avg_filter_data(&[0.0, 1.0], &[1.0], 2).is_err());
        assert!(rms_calc(&[0.0, 1.0], &[1.0], WindowSpec::new(1.0)).is_err());
        assert!(avg_filter_data(&[0.0], &[1.0], 0).is_err());
    }

    #[test]
    fn test_short_inputs() {
        assert!(rms_calc(&[], &[], WindowSpec::new(50.0)).unwrap().is_empty());
        assert_eq!(
            rms_calc(&[0.0], &[-2.0], WindowSpec::new(50.0)).unwrap(),
            vec![2.0]
        );
        assert_eq!(
            avg_calc(&[0.0], &[-2.0], WindowSpec::new(50.0)).unwrap(),
            vec![-2.0]
        );
        assert_eq!(
            voltsec_product(&[0.0], &[5.0], WindowSpec::new(50.0), Some(2)).unwrap(),
            vec![0.0]
        );
    }
}
