use super::*;
use crate::foundation::depth::SampleDepth;
use crate::foundation::format::{ColorFamily, Subsampling, VideoFormat};
use crate::graph::node::Arg;
use crate::graph::plan::GraphPlan;

fn source(core: &mut Core, fps: Fps) -> NodeId {
    let f = VideoFormat::new(
        128,
        64,
        SampleDepth::Integer(8),
        ColorFamily::Yuv,
        Subsampling::CSS_420,
    )
    .unwrap()
    .with_frames(100, fps);
    core.source("src", f)
}

fn only<'a>(plan: &'a GraphPlan, function: &str) -> &'a crate::graph::node::Node {
    let mut it = plan.nodes.iter().filter(|n| n.function == function);
    let n = it.next().unwrap();
    assert!(it.next().is_none(), "more than one {function}");
    n
}

#[test]
fn overrides_merge_over_defaults() {
    let user = SuperParams {
        pel: Some(4),
        ..SuperParams::default()
    };
    let merged = user.merged_over(&TMC_SUPER);
    assert_eq!(merged.pel, Some(4));
    assert_eq!(merged.sharp, Some(1));
    assert_eq!(merged.rfilter, None);

    let args = merged.to_args();
    assert_eq!(args.get("pel"), Some(&Arg::Int(4)));
    assert!(args.get("rfilter").is_none());
}

#[test]
fn fluxsmooth_tmc_chain() {
    let mut core = Core::new();
    let src = source(&mut core, Fps::new(24000, 1001).unwrap());
    let params = FluxSmoothParams {
        motion: MotionParams {
            analyse: AnalyseParams {
                blksize: Some(8),
                ..AnalyseParams::default()
            },
            ..MotionParams::default()
        },
        ..FluxSmoothParams::default()
    };
    let out = fluxsmooth_tmc(&mut core, src, &params).unwrap();
    let plan = core.plan(out).unwrap();

    let sup = only(&plan, "Super");
    assert_eq!(sup.args.get("pel"), Some(&Arg::Int(2)));
    assert_eq!(sup.args.get("sharp"), Some(&Arg::Int(1)));

    let analyses: Vec<_> = plan.nodes.iter().filter(|n| n.function == "Analyse").collect();
    assert_eq!(analyses.len(), 2);
    for a in &analyses {
        assert_eq!(a.args.get("blksize"), Some(&Arg::Int(8)));
        assert_eq!(a.args.get("overlap"), Some(&Arg::Int(8)));
        assert_eq!(a.args.get("truemotion"), Some(&Arg::Bool(false)));
    }

    let il = only(&plan, "Interleave");
    assert_eq!(il.inputs.len(), 3);
    assert_eq!(il.inputs[1], src);
    assert_eq!(il.format.num_frames, 300);

    let smooth = only(&plan, "SmoothT");
    assert_eq!(smooth.args.get("temporal_threshold"), Some(&Arg::Int(12)));

    let sel = plan.output_node().unwrap();
    assert_eq!(sel.function, "SelectEvery");
    assert_eq!(sel.args.get("offsets"), Some(&Arg::Ints(vec![1])));
    assert_eq!(sel.format, core.format(src).unwrap());
}

#[test]
fn fluxsmooth_tmc_rejects_bad_planes_early() {
    let mut core = Core::new();
    let src = source(&mut core, Fps::new(25, 1).unwrap());
    let before = core.len();
    let params = FluxSmoothParams {
        planes: vec![0, 3],
        ..FluxSmoothParams::default()
    };
    assert!(fluxsmooth_tmc(&mut core, src, &params).is_err());
    assert_eq!(core.len(), before);
}

#[test]
fn mvfrc_raises_rate_with_block_fps() {
    let mut core = Core::new();
    let src = source(&mut core, Fps::new(24000, 1001).unwrap());
    let out = mvfrc(&mut core, src, &MvFrcParams::default()).unwrap();
    let plan = core.plan(out).unwrap();

    assert_eq!(plan.count("mv", "FlowBlur"), 0);
    let fps = plan.output_node().unwrap();
    assert_eq!(fps.function, "BlockFPS");
    assert_eq!(fps.args.get("thscd1"), Some(&Arg::Int(140)));
    assert_eq!(fps.args.get("thscd2"), Some(&Arg::Int(38)));
    assert_eq!(fps.args.get("mode"), Some(&Arg::Int(0)));
    assert_eq!(fps.format.fps, Fps::new(60000, 1001).unwrap());
    assert_eq!(fps.format.num_frames, 250);

    let sup = only(&plan, "Super");
    assert_eq!(sup.args.get("rfilter"), Some(&Arg::Int(4)));
}

#[test]
fn mvfrc_slow_flow_with_blur_when_lowering_rate() {
    let mut core = Core::new();
    let src = source(&mut core, Fps::new(60, 1).unwrap());
    let params = MvFrcParams {
        preset: "slow".parse().unwrap(),
        block: false,
        num: 24,
        den: 1,
        ..MvFrcParams::default()
    };
    let out = mvfrc(&mut core, src, &params).unwrap();
    let plan = core.plan(out).unwrap();

    assert_eq!(plan.count("mv", "FlowBlur"), 1);
    let fps = plan.output_node().unwrap();
    assert_eq!(fps.function, "FlowFPS");
    assert_eq!(fps.args.get("mask"), Some(&Arg::Int(2)));
    assert_eq!(fps.format.num_frames, 40);
    for a in plan.nodes.iter().filter(|n| n.function == "Analyse") {
        assert_eq!(a.args.get("search"), Some(&Arg::Int(3)));
    }
}

#[test]
fn mvfrc_presets() {
    assert!("turbo".parse::<MvPreset>().is_err());
    assert_eq!(MvPreset::Medium.search(), 3);
    assert_eq!(MvPreset::Medium.block_mode(), 0);
    assert_eq!(MvPreset::Slow.block_mode(), 3);
    assert_eq!(MvPreset::Fast.flow_mask(), 0);

    let mut core = Core::new();
    let src = source(&mut core, Fps::new(25, 1).unwrap());
    let params = MvFrcParams {
        den: 0,
        ..MvFrcParams::default()
    };
    assert!(mvfrc(&mut core, src, &params).is_err());
}
