use super::*;

fn written(f: impl FnOnce(&mut Vec<u8>) -> XvsResult<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn v1_ranges_follow_splice_order() {
    let tc = TimecodeV1::from_segments(&[(100, 24.0), (50, 30.0), (10, 60.0)]).unwrap();
    assert_eq!(tc.assume, 24.0);
    assert_eq!(
        tc.ranges,
        vec![
            TimecodeRange { start: 100, end: 149, fps: 30.0 },
            TimecodeRange { start: 150, end: 159, fps: 60.0 },
        ]
    );

    let text = written(|b| tc.write_to(b));
    assert_eq!(
        text,
        "# timecode format v1\nassume 24.0\n100,149,30.0\n150,159,60.0\n"
    );
}

#[test]
fn v1_rejects_empty_input_and_empty_segments() {
    assert!(TimecodeV1::from_segments(&[]).is_err());
    assert!(TimecodeV1::from_segments(&[(10, 24.0), (0, 30.0)]).is_err());
    assert!(TimecodeV1::from_segments(&[(10, 0.0)]).is_err());
}

#[test]
fn v2_parse_skips_header_and_blank_lines() {
    let tc = TimecodeV2::parse("# timecode format v2\n0\n41.708\n\n83.417\n").unwrap();
    assert_eq!(tc.timestamps, vec![0.0, 41.708, 83.417]);
}

#[test]
fn v2_parse_rejects_garbage_and_disorder() {
    let err = TimecodeV2::parse("# timecode format v2\n0\nabc\n").unwrap_err();
    assert!(err.to_string().contains("line 3"));
    assert!(TimecodeV2::parse("0\n50\n40\n").is_err());
}

#[test]
fn combed_frames_get_two_fields() {
    let fps = Fps::new(25, 1).unwrap();
    let tc = TimecodeV2::from_combed(&[false, true, false], fps);
    assert_eq!(tc.timestamps, vec![0.0, 40.0, 60.0, 80.0, 120.0]);
    let text = written(|b| tc.write_to(b));
    assert_eq!(text, "# timecode format v2\n0\n40\n60\n80\n120\n");
}

#[test]
fn cfr_map_picks_nearest_frame() {
    // Source frames at 0, 40, 100 ms; output at 50 fps (20 ms).
    let fps = Fps::new(50, 1).unwrap();
    let map = cfr_frame_map(&[0.0, 40.0, 100.0], fps, false).unwrap();
    assert_eq!(map.len(), 6);
    assert_eq!(
        map,
        vec![
            CfrFrame::Copy(0),
            CfrFrame::Copy(0),
            CfrFrame::Copy(1),
            CfrFrame::Copy(1),
            CfrFrame::Copy(2),
            CfrFrame::Copy(2),
        ]
    );
}

#[test]
fn cfr_map_blends_between_neighbours() {
    let fps = Fps::new(50, 1).unwrap();
    let map = cfr_frame_map(&[0.0, 40.0, 100.0], fps, true).unwrap();
    assert_eq!(map[0], CfrFrame::Copy(0));
    assert_eq!(
        map[1],
        CfrFrame::Blend {
            from: 0,
            to: 1,
            weight: 0.5
        }
    );
    assert_eq!(map[2], CfrFrame::Copy(1));
    match map[3] {
        CfrFrame::Blend { from, to, weight } => {
            assert_eq!((from, to), (1, 2));
            assert!((weight - 20.0 / 60.0).abs() < 1e-12);
        }
        other => panic!("expected blend, got {other:?}"),
    }
    assert_eq!(map[5], CfrFrame::Copy(2));
}

#[test]
fn cfr_map_needs_timestamps() {
    assert!(cfr_frame_map(&[], Fps::new(24, 1).unwrap(), false).is_err());
}

#[test]
fn cfr_map_rejects_unbounded_timestamps() {
    let fps = Fps::new(24, 1).unwrap();
    let tc = TimecodeV2::parse("# timecode format v2\n0\n41\n1e300\n").unwrap();
    let err = cfr_frame_map(&tc.timestamps, fps, false).unwrap_err();
    assert!(err.to_string().contains("usable frame count"));

    // Just past the cap: one more frame than MAX_CFR_FRAMES.
    let frame_ms = 1000.0 / 24.0;
    let too_long = MAX_CFR_FRAMES as f64 * frame_ms + 1.0;
    assert!(cfr_frame_map(&[0.0, too_long], fps, true).is_err());
    assert!(cfr_frame_map(&[-5000.0, -10.0], fps, false).is_err());
}
