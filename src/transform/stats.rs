//! Whole-trace statistics. Empty input yields `None` rather than an error.

/// Smallest and largest value
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    let first = *data.first()?;
    Some(
        data.iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sum of absolute amplitudes divided by the capture duration.
///
/// `None` when the trace is empty or the time axis spans no time.
pub fn voltsec_total(time: &[f64], data: &[f64]) -> Option<f64> {
    let duration = time.last()? - time.first()?;
    if data.is_empty() || duration == 0.0 {
        return None;
    }
    Some(data.iter().map(|v| v.abs()).sum::<f64>() / duration)
}
