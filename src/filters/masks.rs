//! Luma range masks.

use crate::expression::ast::Expr;
use crate::filters::require_family;
use crate::foundation::depth::SampleDepth;
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::ColorFamily;
use crate::graph::core::Core;
use crate::graph::node::NodeId;

/// Ramp points of [`mwlmask`], in 8-bit units.
///
/// The mask is black up to `l1`, rises to white at `h1`, stays white up to `h2` and falls back
/// to black at `l2`. Without `h2` the mask never falls; without `l2` it falls to black at peak.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MwlMaskParams {
    pub l1: f64,
    pub h1: f64,
    pub h2: Option<f64>,
    pub l2: Option<f64>,
}

impl Default for MwlMaskParams {
    fn default() -> Self {
        Self {
            l1: 80.0,
            h1: 96.0,
            h2: None,
            l2: None,
        }
    }
}

impl MwlMaskParams {
    /// The mask expression over a luma plane of `depth`.
    pub fn expr(&self, depth: SampleDepth) -> XvsResult<Expr> {
        let values = [Some(self.l1), Some(self.h1), self.h2, self.l2];
        if values.iter().flatten().any(|v| !v.is_finite()) {
            return Err(XvsError::validation("mwlmask: ramp points must be finite"));
        }
        let white = depth.peak();
        let l1 = depth.scale(self.l1);
        let h1 = depth.scale(self.h1);
        if l1 >= h1 {
            return Err(XvsError::validation(format!(
                "mwlmask: l1 ({}) must be below h1 ({})",
                self.l1, self.h1
            )));
        }

        let tail = match self.h2.map(|h| depth.scale(h)) {
            Some(h2) if h2 < white => {
                let l2 = self.l2.map_or(white, |l| depth.scale(l));
                if h2 >= l2 {
                    return Err(XvsError::validation(format!(
                        "mwlmask: h2 ({h2}) must be below l2 ({l2}) at {depth}"
                    )));
                }
                Expr::select(
                    Expr::x().le(Expr::c(h2)),
                    Expr::c(white),
                    Expr::select(
                        Expr::x().lt(Expr::c(l2)),
                        (Expr::x() - l2) * (white / (h2 - l2)),
                        Expr::c(0.0),
                    ),
                )
            }
            _ => Expr::c(white),
        };
        Ok(Expr::select(
            Expr::x().le(Expr::c(l1)),
            Expr::c(0.0),
            Expr::select(
                Expr::x().lt(Expr::c(h1)),
                (Expr::x() - l1) * (white / (h1 - l1)),
                tail,
            ),
        ))
    }
}

/// Gray mask selecting a luma band of `clip`, computed on a lightly smoothed first plane.
#[tracing::instrument(skip(core))]
pub fn mwlmask(core: &mut Core, clip: NodeId, params: &MwlMaskParams) -> XvsResult<NodeId> {
    let format = core.format(clip)?;
    require_family(&format, "mwlmask", &[ColorFamily::Yuv, ColorFamily::Gray])?;
    let expr = params.expr(format.depth)?;
    let luma = core.plane(clip, 0)?;
    let luma = core.remove_grain(luma, &[4])?;
    core.expr(&[luma], &[expr])
}

#[cfg(test)]
#[path = "../../tests/unit/filters/masks.rs"]
mod tests;
