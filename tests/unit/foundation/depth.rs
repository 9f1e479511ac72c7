use super::*;

#[test]
fn scale_doubles_per_extra_bit() {
    assert_eq!(SampleDepth::Integer(8).scale(3.0), 3.0);
    assert_eq!(SampleDepth::Integer(10).scale(3.0), 12.0);
    assert_eq!(SampleDepth::Integer(16).scale(1.0), 256.0);
    assert!((SampleDepth::Float.scale(255.0) - 1.0).abs() < 1e-12);
}

#[test]
fn unsupported_depths_are_rejected() {
    assert!(SampleDepth::integer(7).is_err());
    assert!(SampleDepth::integer(17).is_err());
    assert!(SampleDepth::from_bits(24).is_err());
    assert_eq!(SampleDepth::from_bits(32).unwrap(), SampleDepth::Float);
    assert_eq!(SampleDepth::from_bits(12).unwrap(), SampleDepth::Integer(12));
}

#[test]
fn store_rounds_and_saturates_integer_samples() {
    let d8 = SampleDepth::Integer(8);
    assert_eq!(d8.store(132.32), 132.0);
    assert_eq!(d8.store(2.5), 2.0);
    assert_eq!(d8.store(3.5), 4.0);
    assert_eq!(d8.store(-4.0), 0.0);
    assert_eq!(d8.store(300.0), 255.0);
    assert_eq!(SampleDepth::Float.store(1.25), 1.25);
}

#[test]
fn neutral_and_peak_follow_depth() {
    assert_eq!(SampleDepth::Integer(8).neutral(), 128.0);
    assert_eq!(SampleDepth::Integer(10).peak(), 1023.0);
    assert_eq!(SampleDepth::Float.neutral(), 0.5);
}

#[test]
fn scale_between_handles_down_conversion() {
    assert_eq!(scale_between(1020.0, 8, 10), 255.0);
    assert_eq!(scale_between(1.0, 16, 8), 256.0);
}

#[test]
fn hand_built_depths_are_checked_without_panicking() {
    for bits in [0u8, 4, 7, 17, 40, 255] {
        let d = SampleDepth::Integer(bits);
        assert!(d.check().is_err(), "{bits} bits accepted");
        assert!(d.scale(3.0).is_finite());
        assert!(d.peak().is_finite());
        assert!(d.neutral().is_finite());
    }
    assert_eq!(SampleDepth::Integer(16).check().unwrap(), SampleDepth::Integer(16));
    assert_eq!(SampleDepth::Float.check().unwrap(), SampleDepth::Float);
}

#[test]
fn deserialized_depth_still_needs_check() {
    let d: SampleDepth = serde_json::from_str(r#"{"integer":40}"#).unwrap();
    assert_eq!(d, SampleDepth::Integer(40));
    assert!(d.check().is_err());
}
