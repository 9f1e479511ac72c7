use super::*;

fn yuv420(width: u32, height: u32) -> VideoFormat {
    VideoFormat::new(
        width,
        height,
        SampleDepth::Integer(8),
        ColorFamily::Yuv,
        Subsampling::CSS_420,
    )
    .unwrap()
}

#[test]
fn css_names_cover_the_common_layouts() {
    assert_eq!(Subsampling { w: 1, h: 1 }.css_name().unwrap(), "420");
    assert_eq!(Subsampling { w: 1, h: 0 }.css_name().unwrap(), "422");
    assert_eq!(Subsampling { w: 0, h: 1 }.css_name().unwrap(), "440");
    assert_eq!(Subsampling { w: 2, h: 0 }.css_name().unwrap(), "411");
    assert!(Subsampling { w: 3, h: 3 }.css_name().is_err());
}

#[test]
fn fps_validation_and_ntsc_guess() {
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(0, 1).is_err());
    assert_eq!(Fps::from_num(24000).unwrap(), Fps { num: 24000, den: 1001 });
    assert_eq!(Fps::from_num(25).unwrap(), Fps { num: 25, den: 1 });
    assert!((Fps::new(30000, 1001).unwrap().as_f64() - 29.97).abs() < 1e-3);
}

#[test]
fn gray_plane_uses_subsampled_dimensions() {
    let f = yuv420(1920, 1080);
    let u = f.gray(1);
    assert_eq!((u.width, u.height), (960, 540));
    assert_eq!(u.color_family, ColorFamily::Gray);
    assert_eq!(f.gray(0).width, 1920);
}

#[test]
fn odd_dimensions_are_rejected_for_subsampled_clips() {
    let err = VideoFormat::new(
        1919,
        1080,
        SampleDepth::Integer(8),
        ColorFamily::Yuv,
        Subsampling::CSS_420,
    )
    .unwrap_err();
    assert!(err.to_string().contains("not divisible"));
    assert!(
        VideoFormat::new(
            64,
            64,
            SampleDepth::Integer(8),
            ColorFamily::Rgb,
            Subsampling::CSS_420
        )
        .is_err()
    );
}

#[test]
fn out_of_range_integer_depth_is_rejected() {
    for bits in [4u8, 40] {
        let err = VideoFormat::new(
            64,
            64,
            SampleDepth::Integer(bits),
            ColorFamily::Gray,
            Subsampling::CSS_444,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported bit depth"));
    }
}
