//! Unsharp masking, detail-masked and non-linear sharpening.

use crate::clamp::LimitFilter;
use crate::expression::ast::Expr;
use crate::filters::planes::{MorphParams, inpand};
use crate::filters::{check_plane_list, require_family};
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::{ColorFamily, VideoFormat};
use crate::graph::core::{Core, MorphMode};
use crate::graph::node::NodeId;

/// Blur used to build the unsharp mask.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsmBlur {
    /// `rgvs.RemoveGrain` mode.
    Mode(i64),
    /// `std.Convolution` matrix.
    Matrix(Vec<i64>),
    /// A blurred clip made by the caller, same format as the source.
    Clip(NodeId),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsmParams {
    pub blur: UsmBlur,
    /// `0` no limit, `> 0` LimitFilter threshold, `< 0` Repair with mode `-limit`.
    pub limit: f64,
    pub elast: f64,
    /// Planes sharpened in a YUV clip, the rest are copied.
    pub planes: Vec<usize>,
}

impl Default for UsmParams {
    fn default() -> Self {
        Self {
            blur: UsmBlur::Mode(11),
            limit: 1.0,
            elast: 4.0,
            planes: vec![0],
        }
    }
}

enum UsmLimit {
    None,
    Filter(LimitFilter),
    Repair(i64),
}

impl UsmParams {
    fn limit_stage(&self, format: &VideoFormat) -> XvsResult<UsmLimit> {
        if !self.limit.is_finite() {
            return Err(XvsError::validation(format!(
                "xs_usm: limit must be finite, got {}",
                self.limit
            )));
        }
        if self.limit == 0.0 {
            return Ok(UsmLimit::None);
        }
        if self.limit > 0.0 {
            return Ok(UsmLimit::Filter(LimitFilter::new(
                self.limit,
                self.elast,
                format.depth,
            )?));
        }
        let mode = -self.limit;
        if mode.fract() != 0.0 || mode > 24.0 {
            return Err(XvsError::validation(format!(
                "xs_usm: negative limit selects a Repair mode, {} is not one",
                self.limit
            )));
        }
        Ok(UsmLimit::Repair(mode as i64))
    }
}

/// Simple unsharp mask: add the difference to a blurred copy back onto the source, then limit
/// the change.
///
/// Gray clips are processed whole. For YUV clips only `params.planes` are sharpened; a blur
/// clip or `mask` is split into planes the same way.
#[tracing::instrument(skip(core, params))]
pub fn xs_usm(
    core: &mut Core,
    src: NodeId,
    params: &UsmParams,
    mask: Option<NodeId>,
) -> XvsResult<NodeId> {
    let format = core.format(src)?;
    require_family(&format, "xs_usm", &[ColorFamily::Gray, ColorFamily::Yuv])?;
    let limit = params.limit_stage(&format)?;
    if let UsmBlur::Clip(b) = &params.blur
        && core.format(*b)?.color_family != format.color_family
    {
        return Err(XvsError::validation(
            "xs_usm: blur clip must have the source color family",
        ));
    }

    if format.color_family == ColorFamily::Gray {
        return usm_plane(core, src, &params.blur, &limit, mask);
    }

    check_plane_list(&format, "xs_usm", &params.planes)?;
    let mut planes = [src; 3];
    for (i, out) in planes.iter_mut().enumerate() {
        let p = core.plane(src, i)?;
        if !params.planes.contains(&i) {
            *out = p;
            continue;
        }
        let blur = match &params.blur {
            UsmBlur::Clip(b) => UsmBlur::Clip(core.plane(*b, i)?),
            other => other.clone(),
        };
        let m = mask.map(|m| core.plane(m, i)).transpose()?;
        *out = usm_plane(core, p, &blur, &limit, m)?;
    }
    core.join_planes(planes, ColorFamily::Yuv)
}

fn usm_plane(
    core: &mut Core,
    clip: NodeId,
    blur: &UsmBlur,
    limit: &UsmLimit,
    mask: Option<NodeId>,
) -> XvsResult<NodeId> {
    let blurred = match blur {
        UsmBlur::Mode(mode) => core.remove_grain(clip, &[*mode])?,
        UsmBlur::Matrix(matrix) => core.convolution(clip, matrix, &[0])?,
        UsmBlur::Clip(b) => *b,
    };
    let diff = core.make_diff(clip, blurred, &[0])?;
    let sharp = core.merge_diff(clip, diff, &[0])?;

    let limited = match limit {
        UsmLimit::None => sharp,
        UsmLimit::Filter(f) => core.expr(&[sharp, clip], &[f.expr()])?,
        UsmLimit::Repair(mode) => core.repair(sharp, clip, &[*mode])?,
    };

    match mask {
        Some(m) => core.masked_merge(limited, clip, m, &[0]),
        None => Ok(limited),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharpenDetailParams {
    /// LimitFilter threshold of the sharpener.
    pub limit: f64,
    /// Gain of the detail mask.
    pub thr: f64,
}

impl Default for SharpenDetailParams {
    fn default() -> Self {
        Self {
            limit: 4.0,
            thr: 32.0,
        }
    }
}

/// Sharpen luma with a 5x5 box unsharp mask, keeping the source where the detail mask is bright.
#[tracing::instrument(skip(core, params))]
pub fn sharpen_detail(
    core: &mut Core,
    src: NodeId,
    params: &SharpenDetailParams,
) -> XvsResult<NodeId> {
    let format = core.format(src)?;
    require_family(
        &format,
        "sharpen_detail",
        &[ColorFamily::Yuv, ColorFamily::Gray],
    )?;
    if !params.thr.is_finite() {
        return Err(XvsError::validation(format!(
            "sharpen_detail: thr must be finite, got {}",
            params.thr
        )));
    }
    let usm = UsmParams {
        blur: UsmBlur::Matrix(vec![1; 25]),
        limit: params.limit,
        ..UsmParams::default()
    };
    usm.limit_stage(&format)?;

    let clip = match format.color_family {
        ColorFamily::Yuv => core.plane(src, 0)?,
        _ => src,
    };

    let blur = core.remove_grain(clip, &[19])?;
    let detail = (Expr::x() - Expr::y()) * params.thr + format.depth.neutral();
    let mask = core.expr(&[clip, blur], &[detail])?;
    let mask = core.remove_grain(mask, &[2])?;
    let both = MorphParams {
        mode: MorphMode::Both,
        ..MorphParams::default()
    };
    let mask = inpand(core, mask, &both)?;
    let mask = core.deflate(mask, &[0])?;

    let sharp = xs_usm(core, clip, &usm, None)?;
    let last = core.masked_merge(sharp, clip, mask, &[0])?;

    if format.color_family == ColorFamily::Yuv {
        return core.shuffle_planes(&[last, src], &[0, 1, 2], ColorFamily::Yuv);
    }
    Ok(last)
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NonlinUsmParams {
    /// Zero point: differences of this size (8-bit units) pass through unchanged at `pow = 1`.
    pub z: f64,
    pub pow: f64,
    pub strength: f64,
    /// Gauss radius; the blur downsizes by this factor and scales back up.
    pub rad: f64,
    /// Damping for very small differences.
    pub ldmp: f64,
}

impl Default for NonlinUsmParams {
    fn default() -> Self {
        Self {
            z: 6.0,
            pow: 1.6,
            strength: 1.0,
            rad: 9.0,
            ldmp: 0.001,
        }
    }
}

impl NonlinUsmParams {
    fn validate(&self) -> XvsResult<()> {
        let positive = [("z", self.z), ("pow", self.pow), ("rad", self.rad)];
        if let Some((name, v)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(XvsError::validation(format!(
                "nonlin_usm: {name} must be finite and > 0, got {v}"
            )));
        }
        if !(self.ldmp.is_finite() && self.ldmp >= 0.0) || !self.strength.is_finite() {
            return Err(XvsError::validation(
                "nonlin_usm: ldmp must be finite and >= 0, strength finite",
            ));
        }
        Ok(())
    }

    /// Sharpened value of `x` given its blurred copy `y`, at a depth where one 8-bit step is
    /// `step`.
    pub fn expr(&self, step: f64) -> Expr {
        let d = || Expr::x() - Expr::y();
        let rel = || d() / step;
        let gain = (d().abs() / step / self.z).pow(Expr::c(1.0 / self.pow)) * self.z * self.strength;
        let damped = gain * (rel() * rel()) / (rel() * rel() + self.ldmp);
        let signed = damped * d() / step / (d().abs() / step + 0.001);
        Expr::x() + signed * step
    }
}

/// Side length of the gauss downscale: a multiple of four, at least 16.
fn gauss_size(full: u32, rad: f64) -> u32 {
    let v = f64::from(full) / rad;
    if v < 16.0 {
        16
    } else {
        ((v / 4.0).round_ties_even() * 4.0) as u32
    }
}

/// Non-linear unsharp mask against a wide gauss. Only luma is sharpened; YUV chroma is copied.
///
/// Without `blur`, the gauss is a bicubic downscale by `rad` followed by an upscale.
#[tracing::instrument(skip(core, params))]
pub fn nonlin_usm(
    core: &mut Core,
    src: NodeId,
    params: &NonlinUsmParams,
    blur: Option<NodeId>,
) -> XvsResult<NodeId> {
    let format = core.format(src)?;
    require_family(&format, "nonlin_usm", &[ColorFamily::Gray, ColorFamily::Yuv])?;
    params.validate()?;

    let clip = match format.color_family {
        ColorFamily::Yuv => core.plane(src, 0)?,
        _ => src,
    };
    let gauss = match blur {
        Some(b) if format.color_family == ColorFamily::Yuv => core.plane(b, 0)?,
        Some(b) => b,
        None => {
            let (w, h) = (format.width, format.height);
            let third = 1.0 / 3.0;
            let small = core.resize_bicubic(
                clip,
                gauss_size(w, params.rad),
                gauss_size(h, params.rad),
                third,
                third,
            )?;
            core.resize_bicubic(small, w, h, 1.0, 0.0)?
        }
    };
    let last = core.expr(&[clip, gauss], &[params.expr(format.depth.scale(1.0))])?;

    if format.color_family == ColorFamily::Yuv {
        return core.shuffle_planes(&[last, src], &[0, 1, 2], ColorFamily::Yuv);
    }
    Ok(last)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/sharpen.rs"]
mod tests;
