#![forbid(unsafe_code)]
//! Clamp-expression builders and filter-graph recipes for a frame-server host.
//!
//! Filters record their host calls into an explicit [`Core`]; the resulting [`GraphPlan`] is
//! plain data that a host binding replays. Pointwise expressions are built as [`Expr`] trees and
//! serialized to the host's postfix grammar only when a node is recorded.

mod clamp;
mod config;
mod expression;
mod filters;
mod foundation;
mod graph;
mod plane;
mod stats;
mod timecode;

pub use clamp::{Backshift, ClampParams, ClampThresholds, LimitFilter, NearEqual};
pub use config::FilterPreset;
pub use expression::ast::{BinaryOp, Expr, Operand, UnaryOp};
pub use expression::error::ExprError;
pub use expression::parser::parse_postfix;
pub use expression::vm::{Program, eval};
pub use filters::masks::{MwlMaskParams, mwlmask};
pub use filters::motion::{
    AnalyseParams, CompensateParams, FluxSmoothParams, MotionParams, MvFrcParams, MvPreset,
    SuperParams, fluxsmooth_tmc, mvfrc,
};
pub use filters::planes::{
    MorphParams, ShowPlane, expand, extract_planes, inpand, show_plane, show_plane_exprs,
};
pub use filters::pressdown::{SpressoParams, StpressoParams, spresso, stpresso, stpresso_mc};
pub use filters::sharpen::{
    NonlinUsmParams, SharpenDetailParams, UsmBlur, UsmParams, nonlin_usm, sharpen_detail, xs_usm,
};
pub use filters::splice::{SpliceRate, splicev1, vfrtocfr};
pub use foundation::depth::{SampleDepth, scale_between};
pub use foundation::error::{XvsError, XvsResult};
pub use foundation::format::{ColorFamily, Fps, Subsampling, VideoFormat};
pub use graph::core::{Core, MorphMode, MvFpsKind};
pub use graph::node::{Arg, Args, Node, NodeId};
pub use graph::plan::GraphPlan;
pub use plane::{Plane, eval_planes};
pub use stats::{
    CombLog, PictType, PlaneStatsRow, ScoreCsvWriter, StatsColumns, StatsCsvWriter, csv_file_name,
    plane_names, read_comb_log, write_pict_type,
};
pub use timecode::{
    CfrFrame, MAX_CFR_FRAMES, TimecodeRange, TimecodeV1, TimecodeV2, cfr_frame_map,
};
