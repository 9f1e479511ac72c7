use crate::expression::ast::Expr;
use crate::filters::{check_plane_list, require_family};
use crate::foundation::depth::SampleDepth;
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::ColorFamily;
use crate::graph::core::{Core, MorphMode};
use crate::graph::node::NodeId;

/// Which planes of a YUV clip stay visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowPlane {
    Y,
    U,
    V,
    Uv,
}

/// Per-plane expressions for [`show_plane`]: kept planes copy `x`, luma is blanked when only
/// chroma is shown, other chroma planes are set to mid grey.
pub fn show_plane_exprs(plane: ShowPlane, depth: SampleDepth) -> Vec<Expr> {
    let grey = Expr::c(depth.neutral());
    let black = Expr::c(0.0);
    match plane {
        ShowPlane::Y => vec![Expr::x(), grey.clone(), grey],
        ShowPlane::U => vec![black, Expr::x(), grey],
        ShowPlane::V => vec![black, grey, Expr::x()],
        ShowPlane::Uv => vec![black, Expr::x(), Expr::x()],
    }
}

#[tracing::instrument(skip(core))]
pub fn show_plane(core: &mut Core, clip: NodeId, plane: ShowPlane) -> XvsResult<NodeId> {
    let format = core.format(clip)?;
    require_family(&format, "show_plane", &[ColorFamily::Yuv])?;
    core.expr(&[clip], &show_plane_exprs(plane, format.depth))
}

/// Every plane of `clip` as its own Gray clip.
pub fn extract_planes(core: &mut Core, clip: NodeId) -> XvsResult<Vec<NodeId>> {
    let n = core.format(clip)?.num_planes();
    (0..n).map(|i| core.plane(clip, i)).collect()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MorphParams {
    pub planes: Vec<usize>,
    /// Largest change allowed per pass, in samples of the clip depth.
    pub threshold: Option<f64>,
    pub mode: MorphMode,
    /// Number of passes.
    pub cycle: u32,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            planes: vec![0],
            threshold: None,
            mode: MorphMode::Square,
            cycle: 1,
        }
    }
}

impl MorphParams {
    fn check(&self, core: &Core, clip: NodeId, filter: &str) -> XvsResult<()> {
        check_plane_list(&core.format(clip)?, filter, &self.planes)?;
        if let Some(t) = self.threshold
            && !(t.is_finite() && t >= 0.0)
        {
            return Err(XvsError::validation(format!(
                "{filter}: threshold must be >= 0, got {t}"
            )));
        }
        Ok(())
    }
}

/// Repeated `std.Minimum`.
pub fn inpand(core: &mut Core, clip: NodeId, params: &MorphParams) -> XvsResult<NodeId> {
    params.check(core, clip, "inpand")?;
    let mut last = clip;
    for _ in 0..params.cycle.max(1) {
        last = core.minimum(last, &params.planes, params.threshold, params.mode)?;
    }
    Ok(last)
}

/// Repeated `std.Maximum`.
pub fn expand(core: &mut Core, clip: NodeId, params: &MorphParams) -> XvsResult<NodeId> {
    params.check(core, clip, "expand")?;
    let mut last = clip;
    for _ in 0..params.cycle.max(1) {
        last = core.maximum(last, &params.planes, params.threshold, params.mode)?;
    }
    Ok(last)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/planes.rs"]
mod tests;
