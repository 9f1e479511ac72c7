//! mvtools based filters: motion-compensated temporal smoothing and frame rate conversion.

use std::str::FromStr;

use crate::filters::check_plane_list;
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::Fps;
use crate::graph::core::{Core, MvFpsKind};
use crate::graph::node::{Args, NodeId};

/// `mv.Super` overrides. Unset fields fall back to the filter's defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuperParams {
    pub pel: Option<i64>,
    pub sharp: Option<i64>,
    pub rfilter: Option<i64>,
    pub hpad: Option<i64>,
    pub vpad: Option<i64>,
}

impl SuperParams {
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            pel: self.pel.or(defaults.pel),
            sharp: self.sharp.or(defaults.sharp),
            rfilter: self.rfilter.or(defaults.rfilter),
            hpad: self.hpad.or(defaults.hpad),
            vpad: self.vpad.or(defaults.vpad),
        }
    }

    pub fn to_args(&self) -> Args {
        Args::new()
            .opt_int("pel", self.pel)
            .opt_int("sharp", self.sharp)
            .opt_int("rfilter", self.rfilter)
            .opt_int("hpad", self.hpad)
            .opt_int("vpad", self.vpad)
    }
}

/// `mv.Analyse` overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyseParams {
    pub truemotion: Option<bool>,
    pub delta: Option<i64>,
    pub blksize: Option<i64>,
    pub blksizev: Option<i64>,
    pub overlap: Option<i64>,
    pub overlapv: Option<i64>,
    pub search: Option<i64>,
    pub searchparam: Option<i64>,
    pub dct: Option<i64>,
    pub badsad: Option<i64>,
    pub badrange: Option<i64>,
    pub divide: Option<i64>,
}

impl AnalyseParams {
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            truemotion: self.truemotion.or(defaults.truemotion),
            delta: self.delta.or(defaults.delta),
            blksize: self.blksize.or(defaults.blksize),
            blksizev: self.blksizev.or(defaults.blksizev),
            overlap: self.overlap.or(defaults.overlap),
            overlapv: self.overlapv.or(defaults.overlapv),
            search: self.search.or(defaults.search),
            searchparam: self.searchparam.or(defaults.searchparam),
            dct: self.dct.or(defaults.dct),
            badsad: self.badsad.or(defaults.badsad),
            badrange: self.badrange.or(defaults.badrange),
            divide: self.divide.or(defaults.divide),
        }
    }

    pub fn to_args(&self) -> Args {
        Args::new()
            .opt_bool("truemotion", self.truemotion)
            .opt_int("delta", self.delta)
            .opt_int("blksize", self.blksize)
            .opt_int("blksizev", self.blksizev)
            .opt_int("overlap", self.overlap)
            .opt_int("overlapv", self.overlapv)
            .opt_int("search", self.search)
            .opt_int("searchparam", self.searchparam)
            .opt_int("dct", self.dct)
            .opt_int("badsad", self.badsad)
            .opt_int("badrange", self.badrange)
            .opt_int("divide", self.divide)
    }
}

/// `mv.Compensate` overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompensateParams {
    pub thsad: Option<i64>,
    pub thscd1: Option<i64>,
    pub thscd2: Option<i64>,
}

impl CompensateParams {
    pub fn merged_over(&self, defaults: &Self) -> Self {
        Self {
            thsad: self.thsad.or(defaults.thsad),
            thscd1: self.thscd1.or(defaults.thscd1),
            thscd2: self.thscd2.or(defaults.thscd2),
        }
    }

    pub fn to_args(&self) -> Args {
        Args::new()
            .opt_int("thsad", self.thsad)
            .opt_int("thscd1", self.thscd1)
            .opt_int("thscd2", self.thscd2)
    }
}

/// Overrides for the three mvtools stages of a motion-compensated filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionParams {
    #[serde(rename = "super")]
    pub super_params: SuperParams,
    pub analyse: AnalyseParams,
    pub compensate: CompensateParams,
}

const TMC_SUPER: SuperParams = SuperParams {
    pel: Some(2),
    sharp: Some(1),
    rfilter: None,
    hpad: None,
    vpad: None,
};

const TMC_ANALYSE: AnalyseParams = AnalyseParams {
    truemotion: Some(false),
    delta: Some(1),
    blksize: Some(16),
    blksizev: None,
    overlap: Some(8),
    overlapv: None,
    search: None,
    searchparam: None,
    dct: None,
    badsad: None,
    badrange: None,
    divide: None,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FluxSmoothParams {
    pub tthr: i64,
    pub planes: Vec<usize>,
    pub motion: MotionParams,
}

impl Default for FluxSmoothParams {
    fn default() -> Self {
        Self {
            tthr: 12,
            planes: vec![0, 1, 2],
            motion: MotionParams::default(),
        }
    }
}

/// FluxSmoothT along motion-compensated neighbours.
///
/// Each frame is interleaved between its forward and backward compensated versions, smoothed
/// temporally, and picked back out.
#[tracing::instrument(skip(core, params))]
pub fn fluxsmooth_tmc(
    core: &mut Core,
    src: NodeId,
    params: &FluxSmoothParams,
) -> XvsResult<NodeId> {
    fluxsmooth_tmc_planes(core, src, params.tthr, &params.planes, &params.motion)
}

pub(crate) fn fluxsmooth_tmc_planes(
    core: &mut Core,
    src: NodeId,
    tthr: i64,
    planes: &[usize],
    motion: &MotionParams,
) -> XvsResult<NodeId> {
    let format = core.format(src)?;
    check_plane_list(&format, "fluxsmooth_tmc", planes)?;
    if tthr < -1 {
        return Err(XvsError::validation(format!(
            "fluxsmooth_tmc: tthr must be >= -1, got {tthr}"
        )));
    }

    let super_args = motion.super_params.merged_over(&TMC_SUPER).to_args();
    let analyse = motion.analyse.merged_over(&TMC_ANALYSE);
    let compensate = motion.compensate.to_args();

    let sup = core.mv_super(src, super_args)?;
    let bv = core.mv_analyse(sup, true, analyse.to_args())?;
    let fv = core.mv_analyse(sup, false, analyse.to_args())?;
    let bc = core.mv_compensate(src, sup, bv, compensate.clone())?;
    let fc = core.mv_compensate(src, sup, fv, compensate)?;

    let interleaved = core.interleave(&[fc, src, bc])?;
    let smoothed = core.flux_smooth_t(interleaved, tthr, planes)?;
    core.select_every(smoothed, 3, &[1])
}

/// Speed/quality trade-off of [`mvfrc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MvPreset {
    #[default]
    Fast,
    Medium,
    Slow,
}

impl MvPreset {
    fn index(self) -> usize {
        match self {
            Self::Fast => 0,
            Self::Medium => 1,
            Self::Slow => 2,
        }
    }

    pub fn search(self) -> i64 {
        [0, 3, 3][self.index()]
    }

    pub fn block_mode(self) -> i64 {
        [0, 0, 3][self.index()]
    }

    pub fn flow_mask(self) -> i64 {
        [0, 0, 2][self.index()]
    }
}

impl FromStr for MvPreset {
    type Err = XvsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "medium" => Ok(Self::Medium),
            "slow" => Ok(Self::Slow),
            other => Err(XvsError::validation(format!(
                "mvfrc: preset should be fast, medium, or slow (got '{other}')"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MvFrcParams {
    /// Scene change SAD threshold per block (`thscd1`).
    pub it: i64,
    /// Percentage of changed blocks that marks a scene change.
    pub scp: i64,
    pub num: u32,
    pub den: u32,
    pub preset: MvPreset,
    pub pel: i64,
    /// BlockFPS when set, FlowFPS otherwise.
    pub block: bool,
    pub flow_mask: Option<i64>,
    pub block_mode: Option<i64>,
    pub blksize: i64,
    pub blksizev: i64,
    pub search: Option<i64>,
    pub truemotion: bool,
    pub searchparam: i64,
    pub overlap: i64,
    pub dct: i64,
    pub blend: bool,
    pub bad_sad: i64,
    pub badrange: i64,
    pub divide: i64,
    /// FlowBlur strength used when lowering the frame rate.
    pub mblur: f64,
}

impl Default for MvFrcParams {
    fn default() -> Self {
        Self {
            it: 140,
            scp: 15,
            num: 60000,
            den: 1001,
            preset: MvPreset::Fast,
            pel: 2,
            block: true,
            flow_mask: None,
            block_mode: None,
            blksize: 8,
            blksizev: 8,
            search: None,
            truemotion: true,
            searchparam: 2,
            overlap: 0,
            dct: 0,
            blend: true,
            bad_sad: 10000,
            badrange: 24,
            divide: 0,
            mblur: 15.0,
        }
    }
}

/// Change the frame rate to `num/den` with motion interpolation.
#[tracing::instrument(skip(core, params), fields(preset = ?params.preset))]
pub fn mvfrc(core: &mut Core, clip: NodeId, params: &MvFrcParams) -> XvsResult<NodeId> {
    let target = Fps::new(params.num, params.den)?;
    if !(0..=100).contains(&params.scp) {
        return Err(XvsError::validation(format!(
            "mvfrc: scp must be a percentage, got {}",
            params.scp
        )));
    }
    let source = core.format(clip)?.fps;

    let analyse = AnalyseParams {
        truemotion: Some(params.truemotion),
        delta: None,
        blksize: Some(params.blksize),
        blksizev: Some(params.blksizev),
        overlap: Some(params.overlap),
        overlapv: Some(params.overlap),
        search: Some(params.search.unwrap_or(params.preset.search())),
        searchparam: Some(params.searchparam),
        dct: Some(params.dct),
        badsad: Some(params.bad_sad),
        badrange: Some(params.badrange),
        divide: Some(params.divide),
    };
    let super_args = SuperParams {
        pel: Some(params.pel),
        sharp: Some(2),
        rfilter: Some(4),
        hpad: None,
        vpad: None,
    }
    .to_args();

    let sup = core.mv_super(clip, super_args)?;
    let bv = core.mv_analyse(sup, true, analyse.to_args())?;
    let fv = core.mv_analyse(sup, false, analyse.to_args())?;

    let mut last = clip;
    if u64::from(source.num) * u64::from(target.den) > u64::from(target.num) * u64::from(source.den)
    {
        tracing::debug!(blur = params.mblur, "lowering frame rate, adding motion blur");
        last = core.mv_flow_blur(last, sup, bv, fv, params.mblur)?;
    }

    let fps_args = Args::new()
        .int("thscd1", params.it)
        .int("thscd2", params.scp * 255 / 100)
        .bool("blend", params.blend);
    if params.block {
        let mode = params.block_mode.unwrap_or(params.preset.block_mode());
        core.mv_fps(
            MvFpsKind::Block,
            last,
            [sup, bv, fv],
            target,
            fps_args.int("mode", mode),
        )
    } else {
        let mask = params.flow_mask.unwrap_or(params.preset.flow_mask());
        core.mv_fps(
            MvFpsKind::Flow,
            last,
            [sup, bv, fv],
            target,
            fps_args.int("mask", mask),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/motion.rs"]
mod tests;
