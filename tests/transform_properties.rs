//! Property tests for the windowed transforms and block averaging

use proptest::prelude::*;
use scopetrace::transform::filters::{avg_calc, avg_filter_data, rms_calc, voltsec_product};
use scopetrace::transform::WindowSpec;

const FREQUENCY: f64 = 50.0;

/// Time axis whose 50 Hz window spans exactly `window` samples
fn axis(len: usize, window: usize) -> Vec<f64> {
    let dt = 1.0 / FREQUENCY / window as f64;
    (0..len).map(|i| i as f64 * dt).collect()
}

fn samples() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6f64, 1..300)
}

proptest! {
    /// RMS is never negative and never NaN
    #[test]
    fn test_rms_non_negative(data in samples(), window in 1usize..40) {
        let time = axis(data.len(), window);
        let rms = rms_calc(&time, &data, WindowSpec::new(FREQUENCY)).unwrap();

        prop_assert_eq!(rms.len(), data.len());
        for value in rms {
            prop_assert!(value >= 0.0);
        }
    }

    /// Past the ramp-up region the windowed mean is the mean of the trailing window
    #[test]
    fn test_mean_matches_trailing_window(data in samples(), window in 1usize..40) {
        let time = axis(data.len(), window);
        let avg = avg_calc(&time, &data, WindowSpec::new(FREQUENCY)).unwrap();

        for i in window..data.len() {
            let trailing = &data[i + 1 - window..=i];
            let expected = trailing.iter().sum::<f64>() / window as f64;
            let tolerance = 1e-6 * (1.0 + expected.abs());
            prop_assert!(
                (avg[i] - expected).abs() < tolerance,
                "index {}: {} vs {}", i, avg[i], expected
            );
        }
    }

    /// Volt-second areas are non-negative
    #[test]
    fn test_voltsec_non_negative(data in samples(), window in 1usize..40) {
        let time = axis(data.len(), window);
        let vs = voltsec_product(&time, &data, WindowSpec::new(FREQUENCY), None).unwrap();
        prop_assert_eq!(vs.len(), data.len());
        prop_assert!(vs.iter().all(|v| *v >= 0.0));
    }

    /// Block averaging yields ceil(n / R) samples
    #[test]
    fn test_block_average_length(data in samples(), ratio in 1usize..50) {
        let time = axis(data.len(), 10);
        let (t, d) = avg_filter_data(&time, &data, ratio).unwrap();
        let expected = (data.len() + ratio - 1) / ratio;
        prop_assert_eq!(t.len(), expected);
        prop_assert_eq!(d.len(), expected);
    }

    /// When R divides n every output is the mean of its block
    #[test]
    fn test_block_average_group_means(
        blocks in prop::collection::vec(prop::collection::vec(-1.0e3..1.0e3f64, 4), 1..50)
    ) {
        let data: Vec<f64> = blocks.iter().flatten().copied().collect();
        let time = axis(data.len(), 10);
        let (_, d) = avg_filter_data(&time, &data, 4).unwrap();

        prop_assert_eq!(d.len(), blocks.len());
        for (block, mean) in blocks.iter().zip(d) {
            let expected = block.iter().sum::<f64>() / 4.0;
            prop_assert!((mean - expected).abs() < 1e-9);
        }
    }
}
