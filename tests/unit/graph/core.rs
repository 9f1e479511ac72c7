use super::*;
use crate::foundation::depth::SampleDepth;

fn yuv420(core: &mut Core) -> NodeId {
    let f = VideoFormat::new(
        64,
        32,
        SampleDepth::Integer(8),
        ColorFamily::Yuv,
        Subsampling::CSS_420,
    )
    .unwrap()
    .with_frames(100, Fps::new(24000, 1001).unwrap());
    core.source("src", f)
}

#[test]
fn plane_roundtrip_restores_yuv420() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    let planes = [
        core.plane(src, 0).unwrap(),
        core.plane(src, 1).unwrap(),
        core.plane(src, 2).unwrap(),
    ];
    assert_eq!(core.format(planes[1]).unwrap().width, 32);

    let joined = core.join_planes(planes, ColorFamily::Yuv).unwrap();
    let f = core.format(joined).unwrap();
    assert_eq!(f.subsampling, Subsampling::CSS_420);
    assert_eq!((f.width, f.height, f.num_frames), (64, 32, 100));
}

#[test]
fn identical_calls_share_a_node() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    let a = core.remove_grain(src, &[4]).unwrap();
    let b = core.remove_grain(src, &[4]).unwrap();
    let c = core.remove_grain(src, &[11]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(core.len(), 3);
}

#[test]
fn expr_checks_operands_and_formats() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    let y = core.plane(src, 0).unwrap();
    let u = core.plane(src, 1).unwrap();

    let err = core.expr(&[y], &[Expr::x() + Expr::y()]).unwrap_err();
    assert!(err.to_string().contains("reads 2 clips"));

    let err = core.expr(&[y, u], &[Expr::x()]).unwrap_err();
    assert!(err.to_string().contains("must share format"));

    let id = core.expr(&[y, y], &[Expr::x() - Expr::y()]).unwrap();
    let n = core.node(id).unwrap();
    assert_eq!(n.call_name(), "std.Expr");
    assert_eq!(
        n.args.get("expr"),
        Some(&crate::graph::node::Arg::Strs(vec!["x y -".to_string()]))
    );
}

#[test]
fn remove_grain_rejects_bad_modes() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    assert!(core.remove_grain(src, &[25]).is_err());
    assert!(core.remove_grain(src, &[1, 1, 1, 1]).is_err());
    assert!(core.remove_grain(src, &[]).is_err());
}

#[test]
fn interleave_and_select_every_track_rate_and_length() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    let il = core.interleave(&[src, src, src]).unwrap();
    let f = core.format(il).unwrap();
    assert_eq!(f.num_frames, 300);
    assert_eq!(f.fps, Fps::new(72000, 1001).unwrap());

    let sel = core.select_every(il, 3, &[1]).unwrap();
    let f = core.format(sel).unwrap();
    assert_eq!(f.num_frames, 100);
    assert_eq!(f.fps, Fps::new(24000, 1001).unwrap());

    assert!(core.select_every(il, 3, &[3]).is_err());
}

#[test]
fn mv_calls_require_matching_inputs() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    assert!(core.mv_analyse(src, true, Args::new()).is_err());

    let sup = core.mv_super(src, Args::new().int("pel", 2)).unwrap();
    let bv = core.mv_analyse(sup, true, Args::new()).unwrap();
    let fv = core.mv_analyse(sup, false, Args::new()).unwrap();
    assert_ne!(bv, fv);

    let out = core
        .mv_fps(
            MvFpsKind::Block,
            src,
            [sup, bv, fv],
            Fps::new(60000, 1001).unwrap(),
            Args::new(),
        )
        .unwrap();
    let f = core.format(out).unwrap();
    assert_eq!(f.num_frames, 250);
    assert_eq!(core.node(out).unwrap().function, "BlockFPS");
}

#[test]
fn morph_modes_parse_from_names() {
    assert_eq!("both".parse::<MorphMode>().unwrap(), MorphMode::Both);
    assert_eq!(MorphMode::Vertical.coordinates(), [0, 1, 0, 0, 0, 0, 1, 0]);
    assert!("diamond".parse::<MorphMode>().is_err());
}

#[test]
fn plan_keeps_only_reachable_nodes() {
    let mut core = Core::new();
    let src = yuv420(&mut core);
    let _unused = core.remove_grain(src, &[11]).unwrap();
    let rg = core.remove_grain(src, &[4]).unwrap();
    let diff = core.make_diff(src, rg, &[0]).unwrap();

    let plan = core.plan(diff).unwrap();
    assert_eq!(plan.nodes.len(), 3);
    assert_eq!(plan.count("rgvs", "RemoveGrain"), 1);
    assert_eq!(plan.output_node().unwrap().function, "MakeDiff");

    let json = plan.to_json_pretty().unwrap();
    let back = crate::graph::plan::GraphPlan::from_json(&json).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn unknown_node_ids_are_validation_errors() {
    let core = Core::new();
    assert!(core.format(NodeId(7)).is_err());
    assert!(core.plan(NodeId(0)).is_err());
}

#[test]
fn bicubic_resize_keeps_family_and_timing() {
    use crate::graph::node::Arg;

    let mut core = Core::new();
    let src = yuv420(&mut core);
    let small = core.resize_bicubic(src, 16, 16, 1.0 / 3.0, 1.0 / 3.0).unwrap();
    let f = core.format(small).unwrap();
    assert_eq!((f.width, f.height), (16, 16));
    assert_eq!(f.subsampling, Subsampling::CSS_420);
    assert_eq!(f.num_frames, 100);
    assert_eq!(f.fps, Fps::new(24000, 1001).unwrap());

    let n = core.node(small).unwrap();
    assert_eq!(n.call_name(), "resize.Bicubic");
    assert_eq!(n.args.get("width"), Some(&Arg::Int(16)));
    assert_eq!(n.args.get("filter_param_b"), Some(&Arg::Float(1.0 / 3.0)));

    // 4:2:0 chroma needs even dimensions.
    assert!(core.resize_bicubic(src, 15, 16, 1.0, 0.0).is_err());
    assert!(core.resize_bicubic(src, 0, 16, 1.0, 0.0).is_err());
}
