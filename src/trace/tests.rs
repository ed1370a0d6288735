use super::*;
use crate::error::{ChannelFailure, ErrorKind, WaveformError};
use std::collections::BTreeMap;

fn channel(name: &str, samples: Vec<f64>) -> DecodedChannel {
    DecodedChannel {
        name: name.to_string(),
        x_increment: 1e-3,
        samples,
    }
}

// ==================== TimeAxis ====================

#[test]
fn test_uniform_axis() {
    let axis = TimeAxis::uniform(4, 0.5).unwrap();
    assert_eq!(axis.values(), &[0.0, 0.5, 1.0, 1.5]);
    assert_eq!(axis.sample_interval(), Some(0.5));
    assert_eq!(axis.duration(), 1.5);
}

#[test]
fn test_uniform_axis_rejects_non_positive_increment() {
    assert!(TimeAxis::uniform(3, 0.0).is_err());
    assert!(TimeAxis::uniform(3, -1.0).is_err());
    assert!(TimeAxis::uniform(3, f64::NAN).is_err());
    // A single sample never uses the increment
    assert_eq!(TimeAxis::uniform(1, 0.0).unwrap().len(), 1);
}

#[test]
fn test_axis_must_increase() {
    assert!(TimeAxis::from_values(vec![0.0, 1.0, 1.0]).is_err());
    assert!(TimeAxis::from_values(vec![0.0, 1.0, 2.0]).is_ok());
    assert!(TimeAxis::from_values(Vec::new()).unwrap().is_empty());
}

#[test]
fn test_empty_trace_statistics() {
    let trace = Trace::default();
    assert_eq!(trace.min_max(), None);
    assert_eq!(trace.mean(), None);
}

// ==================== TraceSet ====================

#[test]
fn test_insert_enforces_axis_length() {
    let mut set = TraceSet::new(TimeAxis::uniform(3, 1.0).unwrap());
    set.insert("CH1", Trace::new(vec![1.0, 2.0, 3.0])).unwrap();

    let err = set.insert("CH2", Trace::new(vec![1.0, 2.0])).unwrap_err();
    assert!(matches!(
        err,
        WaveformError::LengthMismatch {
            expected: 3,
            actual: 2,
            ..
        }
    ));
    assert!(!set.contains("CH2"));
}

#[test]
fn test_insert_never_overwrites() {
    let mut set = TraceSet::new(TimeAxis::uniform(2, 1.0).unwrap());
    set.insert("CH1", Trace::new(vec![1.0, 2.0])).unwrap();
    let err = set.insert("CH1", Trace::new(vec![5.0, 6.0])).unwrap_err();
    assert!(matches!(err, WaveformError::DuplicateTrace(_)));
    assert_eq!(set.get("CH1").unwrap().values(), &[1.0, 2.0]);
}

#[test]
fn test_from_samples() {
    let set = TraceSet::from_samples(
        0.25,
        vec![("CH2", vec![3.0, 4.0]), ("CH1", vec![1.0, 2.0])],
    )
    .unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["CH1", "CH2"]);
    assert_eq!(set.time().values(), &[0.0, 0.25]);
}

#[test]
fn test_rename() {
    let set = TraceSet::from_samples(1.0, vec![("CH1", vec![1.0]), ("CH2", vec![2.0])]).unwrap();
    let mut mapping = BTreeMap::new();
    mapping.insert("CH1".to_string(), "input_voltage".to_string());
    mapping.insert("CH9".to_string(), "unused".to_string());

    let renamed = set.renamed(&mapping).unwrap();
    assert_eq!(
        renamed.names().collect::<Vec<_>>(),
        vec!["CH2", "input_voltage"]
    );
    assert_eq!(renamed.get("input_voltage").unwrap().values(), &[1.0]);
}

#[test]
fn test_rename_collision_is_config_error() {
    let set = TraceSet::from_samples(1.0, vec![("CH1", vec![1.0]), ("CH2", vec![2.0])]).unwrap();
    let mut mapping = BTreeMap::new();
    mapping.insert("CH1".to_string(), "CH2".to_string());

    let err = set.renamed(&mapping).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[test]
fn test_decimated_set() {
    let set = TraceSet::from_samples(1.0, vec![("CH1", vec![1.0, 3.0, 5.0, 7.0, 9.0])]).unwrap();
    let reduced = set.decimated(2).unwrap();

    assert_eq!(reduced.sample_count(), 3);
    assert_eq!(reduced.time().values(), &[0.5, 2.5, 4.0]);
    assert_eq!(reduced.get("CH1").unwrap().values(), &[2.0, 6.0, 9.0]);
}

// ==================== CaptureGroup ====================

#[test]
fn test_assemble_orders_by_name() {
    let group = CaptureGroup::assemble(
        vec![
            channel("CH3", vec![3.0, 3.0]),
            channel("CH1", vec![1.0, 1.0]),
            channel("CH2", vec![2.0, 2.0]),
        ],
        Vec::new(),
    )
    .unwrap();

    assert_eq!(
        group.traces.names().collect::<Vec<_>>(),
        vec!["CH1", "CH2", "CH3"]
    );
    assert!(group.missing.is_empty());
    assert_eq!(group.traces.time().len(), 2);
}

#[test]
fn test_assemble_reports_mismatched_channel() {
    let group = CaptureGroup::assemble(
        vec![channel("CH1", vec![1.0, 1.0, 1.0]), channel("CH2", vec![2.0])],
        vec![ChannelFailure {
            channel: "CH4".to_string(),
            error: WaveformError::UnsupportedFormat("bit width 12".into()),
        }],
    )
    .unwrap();

    assert_eq!(group.traces.len(), 1);
    assert_eq!(group.missing_channels(), vec!["CH2", "CH4"]);
    for (_, trace) in &group.traces {
        assert_eq!(trace.len(), group.traces.time().len());
    }
}

#[test]
fn test_assemble_empty_group_fails() {
    let err = CaptureGroup::assemble(
        Vec::new(),
        vec![ChannelFailure {
            channel: "CH1".to_string(),
            error: WaveformError::Decode("short".into()),
        }],
    )
    .unwrap_err();

    match err {
        WaveformError::EmptyGroup { failures } => assert_eq!(failures.len(), 1),
        other => panic!("unexpected error: {other}"),
    }
}
