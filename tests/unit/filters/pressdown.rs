use super::*;
use crate::foundation::depth::SampleDepth;
use crate::foundation::format::{Fps, Subsampling, VideoFormat};
use crate::graph::node::Arg;

fn source(core: &mut Core, family: ColorFamily, depth: SampleDepth) -> NodeId {
    let css = match family {
        ColorFamily::Yuv => Subsampling::CSS_420,
        _ => Subsampling::CSS_444,
    };
    let f = VideoFormat::new(64, 32, depth, family, css)
        .unwrap()
        .with_frames(48, Fps::new(24000, 1001).unwrap());
    core.source("src", f)
}

fn expr_texts(core: &Core, out: NodeId) -> Vec<String> {
    let plan = core.plan(out).unwrap();
    plan.nodes
        .iter()
        .filter(|n| n.function == "Expr")
        .map(|n| match n.args.get("expr") {
            Some(Arg::Strs(s)) => s.join(" | "),
            other => panic!("unexpected expr arg {other:?}"),
        })
        .collect()
}

#[test]
fn stpresso_builds_all_three_stages() {
    let mut core = Core::new();
    let src = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(8));
    let out = stpresso(&mut core, src, &StpressoParams::default()).unwrap();

    assert_eq!(core.format(out).unwrap(), core.format(src).unwrap());
    let plan = core.plan(out).unwrap();
    assert_eq!(plan.count("rgvs", "RemoveGrain"), 1);
    assert_eq!(plan.count("flux", "SmoothT"), 1);
    assert_eq!(plan.count("std", "MakeDiff"), 2);
    assert_eq!(plan.count("std", "Expr"), 7);

    let spatial = ClampParams::new(3.0, 24, SampleDepth::Integer(8))
        .unwrap()
        .expr()
        .to_postfix();
    let temporal = ClampParams::new(3.0, 49, SampleDepth::Integer(8))
        .unwrap()
        .expr()
        .to_postfix();
    let texts = expr_texts(&core, out);
    assert_eq!(texts.iter().filter(|t| **t == spatial).count(), 3);
    assert_eq!(texts.iter().filter(|t| **t == temporal).count(), 3);
    assert!(texts.contains(&"x y 1 - max y 1 + min".to_string()));
}

#[test]
fn stpresso_skips_disabled_stages() {
    let mut core = Core::new();
    let src = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(10));
    let params = StpressoParams {
        tthr: 0,
        back: 0.0,
        ..StpressoParams::default()
    };
    let out = stpresso(&mut core, src, &params).unwrap();
    let plan = core.plan(out).unwrap();
    assert_eq!(plan.count("flux", "SmoothT"), 0);
    assert_eq!(plan.count("std", "MakeDiff"), 0);
    assert_eq!(plan.count("std", "Expr"), 3);
}

#[test]
fn stpresso_validates_before_building() {
    let mut core = Core::new();
    let gray = source(&mut core, ColorFamily::Gray, SampleDepth::Integer(8));
    let yuv = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(8));
    let before = core.len();

    let err = stpresso(&mut core, gray, &StpressoParams::default()).unwrap_err();
    assert!(err.to_string().contains("only supports Yuv"));

    let bad_bias = StpressoParams {
        tbias: 0,
        ..StpressoParams::default()
    };
    assert!(stpresso(&mut core, yuv, &bad_bias).is_err());

    let bad_back = StpressoParams {
        back: -1.0,
        ..StpressoParams::default()
    };
    assert!(stpresso(&mut core, yuv, &bad_back).is_err());
    assert_eq!(core.len(), before);
}

#[test]
fn stpresso_mc_uses_compensated_smoothing() {
    let mut core = Core::new();
    let src = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(8));
    let out = stpresso_mc(
        &mut core,
        src,
        &StpressoParams::default(),
        &MotionParams::default(),
    )
    .unwrap();

    let plan = core.plan(out).unwrap();
    assert_eq!(plan.count("flux", "SmoothT"), 1);
    assert_eq!(plan.count("mv", "Super"), 1);
    assert_eq!(plan.count("mv", "Analyse"), 2);
    assert_eq!(plan.count("mv", "Compensate"), 2);
    assert_eq!(plan.count("std", "SelectEvery"), 1);
    assert_eq!(core.format(out).unwrap().num_frames, 48);
}

#[test]
fn spresso_copies_chroma_by_default() {
    let mut core = Core::new();
    let src = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(8));
    let out = spresso(&mut core, src, &SpressoParams::default()).unwrap();

    let plan = core.plan(out).unwrap();
    assert_eq!(plan.count("std", "Expr"), 1);
    let rg = plan
        .nodes
        .iter()
        .find(|n| n.function == "RemoveGrain")
        .unwrap();
    assert_eq!(rg.args.get("mode"), Some(&Arg::Ints(vec![4, 0])));

    let luma = ClampParams::new(2.0, 25, SampleDepth::Integer(8))
        .unwrap()
        .with_near_equal(NearEqual::Exact)
        .expr()
        .to_postfix();
    assert_eq!(expr_texts(&core, out), vec![luma]);
}

#[test]
fn spresso_processes_chroma_with_its_own_limit() {
    let mut core = Core::new();
    let src = source(&mut core, ColorFamily::Yuv, SampleDepth::Integer(16));
    let params = SpressoParams {
        rg_mode_c: 4,
        ..SpressoParams::default()
    };
    let out = spresso(&mut core, src, &params).unwrap();

    let chroma = ClampParams::new(4.0, 50, SampleDepth::Integer(16))
        .unwrap()
        .with_near_equal(NearEqual::Exact)
        .expr()
        .to_postfix();
    let texts = expr_texts(&core, out);
    assert_eq!(texts.len(), 3);
    assert_eq!(texts.iter().filter(|t| **t == chroma).count(), 2);
}
