//! Spatial and spatio-temporal pressdown: dampen grain a little so the clip compresses better
//! while keeping its look.

use crate::clamp::{Backshift, ClampParams, NearEqual};
use crate::filters::motion::{MotionParams, fluxsmooth_tmc_planes};
use crate::filters::{ALL_PLANES, require_family};
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::ColorFamily;
use crate::graph::core::Core;
use crate::graph::node::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StpressoParams {
    /// The spatial stage never moves a sample further than this (8-bit units).
    pub limit: f64,
    /// Percentage of the spatial filter that applies.
    pub bias: u8,
    pub rg_mode: i64,
    /// FluxSmoothT temporal threshold, `0` disables the temporal stage.
    pub tthr: i64,
    pub tlimit: f64,
    pub tbias: u8,
    /// Final shift back towards the source luma, `0` disables it.
    pub back: f64,
}

impl Default for StpressoParams {
    fn default() -> Self {
        Self {
            limit: 3.0,
            bias: 24,
            rg_mode: 4,
            tthr: 12,
            tlimit: 3.0,
            tbias: 49,
            back: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpressoParams {
    pub limit: f64,
    pub bias: u8,
    /// RemoveGrain mode for luma.
    pub rg_mode: i64,
    pub limit_c: f64,
    pub bias_c: u8,
    /// RemoveGrain mode for chroma, `0` copies chroma from the source.
    pub rg_mode_c: i64,
}

impl Default for SpressoParams {
    fn default() -> Self {
        Self {
            limit: 2.0,
            bias: 25,
            rg_mode: 4,
            limit_c: 4.0,
            bias_c: 50,
            rg_mode_c: 0,
        }
    }
}

struct Stages {
    spatial: ClampParams,
    temporal: Option<ClampParams>,
    back: Option<Backshift>,
}

impl StpressoParams {
    fn stages(&self, core: &Core, clip: NodeId, filter: &str) -> XvsResult<Stages> {
        let format = core.format(clip)?;
        require_family(&format, filter, &[ColorFamily::Yuv])?;
        if self.tthr < -1 {
            return Err(XvsError::validation(format!(
                "{filter}: tthr must be >= -1, got {}",
                self.tthr
            )));
        }
        let depth = format.depth;
        Ok(Stages {
            spatial: ClampParams::new(self.limit, self.bias, depth)?,
            temporal: (self.tthr != 0)
                .then(|| ClampParams::new(self.tlimit, self.tbias, depth))
                .transpose()?,
            back: (self.back != 0.0)
                .then(|| Backshift::new(self.back, depth))
                .transpose()?,
        })
    }
}

/// Spatio-temporal pressdown with `flux.SmoothT` as the temporal filter.
#[tracing::instrument(skip(core, params))]
pub fn stpresso(core: &mut Core, clip: NodeId, params: &StpressoParams) -> XvsResult<NodeId> {
    let stages = params.stages(core, clip, "stpresso")?;
    let tthr = params.tthr;
    build_stpresso(core, clip, params, stages, |core, blurred| {
        core.flux_smooth_t(blurred, tthr, &ALL_PLANES)
    })
}

/// [`stpresso`] with a motion-compensated temporal stage ([`crate::fluxsmooth_tmc`]).
#[tracing::instrument(skip(core, params, motion))]
pub fn stpresso_mc(
    core: &mut Core,
    clip: NodeId,
    params: &StpressoParams,
    motion: &MotionParams,
) -> XvsResult<NodeId> {
    let stages = params.stages(core, clip, "stpresso_mc")?;
    let tthr = params.tthr;
    build_stpresso(core, clip, params, stages, |core, blurred| {
        fluxsmooth_tmc_planes(core, blurred, tthr, &ALL_PLANES, motion)
    })
}

fn build_stpresso(
    core: &mut Core,
    clip: NodeId,
    params: &StpressoParams,
    stages: Stages,
    smooth: impl FnOnce(&mut Core, NodeId) -> XvsResult<NodeId>,
) -> XvsResult<NodeId> {
    let blurred = core.remove_grain(clip, &[params.rg_mode])?;

    let spatial = stages.spatial.expr();
    let mut planes = [clip; 3];
    for (i, out) in planes.iter_mut().enumerate() {
        let c = core.plane(clip, i)?;
        let b = core.plane(blurred, i)?;
        *out = core.expr(&[c, b], std::slice::from_ref(&spatial))?;
    }

    if let Some(temporal) = stages.temporal {
        let smoothed = smooth(core, blurred)?;
        let diff = core.make_diff(blurred, smoothed, &ALL_PLANES)?;
        let joined = core.join_planes(planes, ColorFamily::Yuv)?;
        let target = core.make_diff(joined, diff, &ALL_PLANES)?;

        let texpr = temporal.expr();
        for (i, out) in planes.iter_mut().enumerate() {
            let t = core.plane(target, i)?;
            *out = core.expr(&[*out, t], std::slice::from_ref(&texpr))?;
        }
    }

    if let Some(back) = stages.back {
        let luma = core.plane(clip, 0)?;
        planes[0] = core.expr(&[planes[0], luma], &[back.expr()])?;
    }

    core.join_planes(planes, ColorFamily::Yuv)
}

/// Spatial pressdown. Samples equal to their blurred value are kept exactly.
#[tracing::instrument(skip(core, params))]
pub fn spresso(core: &mut Core, clip: NodeId, params: &SpressoParams) -> XvsResult<NodeId> {
    let format = core.format(clip)?;
    require_family(&format, "spresso", &[ColorFamily::Yuv])?;
    let depth = format.depth;

    let luma = ClampParams::new(params.limit, params.bias, depth)?
        .with_near_equal(NearEqual::Exact)
        .expr();
    let chroma = if params.rg_mode_c == 0 {
        None
    } else {
        Some(
            ClampParams::new(params.limit_c, params.bias_c, depth)?
                .with_near_equal(NearEqual::Exact)
                .expr(),
        )
    };

    let blurred = core.remove_grain(clip, &[params.rg_mode, params.rg_mode_c])?;

    let y = {
        let c = core.plane(clip, 0)?;
        let b = core.plane(blurred, 0)?;
        core.expr(&[c, b], &[luma])?
    };
    let mut chroma_planes = [y; 2];
    for (slot, i) in chroma_planes.iter_mut().zip(1..) {
        let c = core.plane(clip, i)?;
        *slot = match &chroma {
            None => c,
            Some(e) => {
                let b = core.plane(blurred, i)?;
                core.expr(&[c, b], std::slice::from_ref(e))?
            }
        };
    }

    core.join_planes([y, chroma_planes[0], chroma_planes[1]], ColorFamily::Yuv)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/pressdown.rs"]
mod tests;
