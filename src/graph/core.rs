use std::collections::HashMap;
use std::str::FromStr;

use crate::expression::ast::Expr;
use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::{ColorFamily, Fps, Subsampling, VideoFormat};
use crate::graph::fingerprint::fingerprint_call;
use crate::graph::node::{Args, Node, NodeId};

/// Neighbourhood used by `std.Minimum` / `std.Maximum`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphMode {
    #[default]
    Square,
    Horizontal,
    Vertical,
    Both,
}

impl MorphMode {
    /// The eight neighbour flags, top-left to bottom-right.
    pub fn coordinates(self) -> [i64; 8] {
        match self {
            Self::Square => [1, 1, 1, 1, 1, 1, 1, 1],
            Self::Horizontal => [0, 0, 0, 1, 1, 0, 0, 0],
            Self::Vertical => [0, 1, 0, 0, 0, 0, 1, 0],
            Self::Both => [0, 1, 0, 1, 1, 0, 1, 0],
        }
    }
}

impl FromStr for MorphMode {
    type Err = XvsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(Self::Square),
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "both" => Ok(Self::Both),
            other => Err(XvsError::validation(format!(
                "unknown morphology mode '{other}' (expected square, horizontal, vertical or both)"
            ))),
        }
    }
}

/// Explicit frame-graph context: every builder records its host calls here.
///
/// Identical calls (same function, inputs, arguments and output format) are recorded once and
/// share a [`NodeId`].
#[derive(Debug, Default)]
pub struct Core {
    nodes: Vec<Node>,
    by_fingerprint: HashMap<u64, NodeId>,
}

impl Core {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> XvsResult<&Node> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| XvsError::validation(format!("unknown node {}", id.0)))
    }

    pub fn format(&self, id: NodeId) -> XvsResult<VideoFormat> {
        Ok(self.node(id)?.format)
    }

    fn record(
        &mut self,
        plugin: &str,
        function: &str,
        inputs: Vec<NodeId>,
        args: Args,
        format: VideoFormat,
    ) -> NodeId {
        let fingerprint = fingerprint_call(plugin, function, &inputs, &args, &format);
        if let Some(&id) = self.by_fingerprint.get(&fingerprint) {
            tracing::trace!(node = id.0, "{plugin}.{function} reused");
            return id;
        }

        let id = NodeId(self.nodes.len() as u32);
        tracing::trace!(node = id.0, "{plugin}.{function}");
        self.nodes.push(Node {
            id,
            plugin: plugin.to_string(),
            function: function.to_string(),
            inputs,
            args,
            format,
            fingerprint,
        });
        self.by_fingerprint.insert(fingerprint, id);
        id
    }

    fn check_planes(&self, id: NodeId, planes: &[usize]) -> XvsResult<VideoFormat> {
        let f = self.format(id)?;
        if let Some(&p) = planes.iter().find(|&&p| p >= f.num_planes()) {
            return Err(XvsError::validation(format!(
                "plane {p} does not exist in a {}-plane clip",
                f.num_planes()
            )));
        }
        Ok(f)
    }

    fn check_same_format(&self, a: NodeId, b: NodeId, what: &str) -> XvsResult<VideoFormat> {
        let fa = self.format(a)?;
        let fb = self.format(b)?;
        if !fa.same_dimensions(&fb) || fa.depth != fb.depth || fa.color_family != fb.color_family
        {
            return Err(XvsError::validation(format!(
                "{what}: clips must share format ({}x{} {:?} {} vs {}x{} {:?} {})",
                fa.width,
                fa.height,
                fa.color_family,
                fa.depth,
                fb.width,
                fb.height,
                fb.color_family,
                fb.depth
            )));
        }
        Ok(fa)
    }

    /// Register an input clip.
    pub fn source(&mut self, name: &str, format: VideoFormat) -> NodeId {
        self.record(
            "source",
            "Clip",
            Vec::new(),
            Args::new().str("name", name),
            format,
        )
    }

    /// `std.ShufflePlanes`: output plane `i` is plane `planes[i]` of `clips[i]` (the last clip
    /// is reused when fewer clips than planes are given).
    pub fn shuffle_planes(
        &mut self,
        clips: &[NodeId],
        planes: &[usize],
        family: ColorFamily,
    ) -> XvsResult<NodeId> {
        if clips.is_empty() {
            return Err(XvsError::validation("ShufflePlanes needs at least one clip"));
        }
        if planes.len() != family.num_planes() {
            return Err(XvsError::validation(format!(
                "ShufflePlanes to {family:?} needs {} plane indices, got {}",
                family.num_planes(),
                planes.len()
            )));
        }

        let mut dims = Vec::with_capacity(planes.len());
        let first = self.format(clips[0])?;
        for (i, &p) in planes.iter().enumerate() {
            let src = clips[i.min(clips.len() - 1)];
            let f = self.check_planes(src, &[p])?;
            if f.depth != first.depth {
                return Err(XvsError::validation(
                    "ShufflePlanes: all clips must share sample depth",
                ));
            }
            dims.push(f.plane_dimensions(p));
        }

        let format = match family {
            ColorFamily::Gray => first.gray(planes[0]),
            ColorFamily::Rgb | ColorFamily::Yuv => {
                let (w, h) = dims[0];
                if dims[1] != dims[2] {
                    return Err(XvsError::validation(
                        "ShufflePlanes: chroma planes must have equal dimensions",
                    ));
                }
                let subsampling = subsampling_between((w, h), dims[1])?;
                let mut f = VideoFormat::new(w, h, first.depth, family, subsampling)?;
                f.num_frames = first.num_frames;
                f.fps = first.fps;
                f
            }
        };

        let family_name = match family {
            ColorFamily::Gray => "gray",
            ColorFamily::Yuv => "yuv",
            ColorFamily::Rgb => "rgb",
        };
        let args = Args::new()
            .ints("planes", planes.iter().map(|&p| p as i64))
            .str("colorfamily", family_name);
        Ok(self.record("std", "ShufflePlanes", clips.to_vec(), args, format))
    }

    /// Extract plane `i` as a Gray clip.
    pub fn plane(&mut self, clip: NodeId, i: usize) -> XvsResult<NodeId> {
        self.shuffle_planes(&[clip], &[i], ColorFamily::Gray)
    }

    /// Combine three Gray clips into one three-plane clip.
    pub fn join_planes(&mut self, planes: [NodeId; 3], family: ColorFamily) -> XvsResult<NodeId> {
        self.shuffle_planes(&planes, &[0, 0, 0], family)
    }

    /// `std.Expr`: one expression per output plane; missing trailing planes reuse the last one.
    pub fn expr(&mut self, clips: &[NodeId], exprs: &[Expr]) -> XvsResult<NodeId> {
        if clips.is_empty() || clips.len() > 3 {
            return Err(XvsError::validation(format!(
                "Expr takes 1..=3 clips, got {}",
                clips.len()
            )));
        }
        let format = self.format(clips[0])?;
        for &c in &clips[1..] {
            self.check_same_format(clips[0], c, "Expr")?;
        }
        if exprs.is_empty() || exprs.len() > format.num_planes() {
            return Err(XvsError::validation(format!(
                "Expr takes 1..={} expressions for this clip, got {}",
                format.num_planes(),
                exprs.len()
            )));
        }
        for e in exprs {
            if e.operand_count() > clips.len() {
                return Err(XvsError::validation(format!(
                    "expression '{e}' reads {} clips but {} were given",
                    e.operand_count(),
                    clips.len()
                )));
            }
            tracing::debug!(expr = %e, "std.Expr");
        }
        let args = Args::new().exprs("expr", exprs);
        Ok(self.record("std", "Expr", clips.to_vec(), args, format))
    }

    /// `rgvs.RemoveGrain` with one mode per plane.
    pub fn remove_grain(&mut self, clip: NodeId, modes: &[i64]) -> XvsResult<NodeId> {
        let format = self.format(clip)?;
        check_modes("RemoveGrain", modes, format.num_planes())?;
        let args = Args::new().ints("mode", modes.iter().copied());
        Ok(self.record("rgvs", "RemoveGrain", vec![clip], args, format))
    }

    /// `rgvs.Repair` of `clip` against `reference`.
    pub fn repair(&mut self, clip: NodeId, reference: NodeId, modes: &[i64]) -> XvsResult<NodeId> {
        let format = self.check_same_format(clip, reference, "Repair")?;
        check_modes("Repair", modes, format.num_planes())?;
        let args = Args::new().ints("mode", modes.iter().copied());
        Ok(self.record("rgvs", "Repair", vec![clip, reference], args, format))
    }

    /// `std.Convolution` with a 3x3 or 5x5 matrix.
    pub fn convolution(
        &mut self,
        clip: NodeId,
        matrix: &[i64],
        planes: &[usize],
    ) -> XvsResult<NodeId> {
        let format = self.check_planes(clip, planes)?;
        if matrix.len() != 9 && matrix.len() != 25 {
            return Err(XvsError::validation(format!(
                "Convolution matrix must have 9 or 25 elements, got {}",
                matrix.len()
            )));
        }
        if matrix.iter().all(|&v| v == 0) {
            return Err(XvsError::validation("Convolution matrix must not be all zero"));
        }
        let args = Args::new()
            .ints("matrix", matrix.iter().copied())
            .ints("planes", planes.iter().map(|&p| p as i64));
        Ok(self.record("std", "Convolution", vec![clip], args, format))
    }

    pub fn make_diff(&mut self, a: NodeId, b: NodeId, planes: &[usize]) -> XvsResult<NodeId> {
        self.binary_std("MakeDiff", a, b, planes)
    }

    pub fn merge_diff(&mut self, a: NodeId, b: NodeId, planes: &[usize]) -> XvsResult<NodeId> {
        self.binary_std("MergeDiff", a, b, planes)
    }

    fn binary_std(
        &mut self,
        function: &str,
        a: NodeId,
        b: NodeId,
        planes: &[usize],
    ) -> XvsResult<NodeId> {
        let format = self.check_same_format(a, b, function)?;
        self.check_planes(a, planes)?;
        let args = Args::new().ints("planes", planes.iter().map(|&p| p as i64));
        Ok(self.record("std", function, vec![a, b], args, format))
    }

    /// `std.MaskedMerge`: take `b` where `mask` is bright, `a` elsewhere.
    pub fn masked_merge(
        &mut self,
        a: NodeId,
        b: NodeId,
        mask: NodeId,
        planes: &[usize],
    ) -> XvsResult<NodeId> {
        let format = self.check_same_format(a, b, "MaskedMerge")?;
        self.check_planes(a, planes)?;
        let fm = self.format(mask)?;
        if fm.width != format.width || fm.height != format.height || fm.depth != format.depth {
            return Err(XvsError::validation(
                "MaskedMerge: mask must match the clip dimensions and depth",
            ));
        }
        let args = Args::new().ints("planes", planes.iter().map(|&p| p as i64));
        Ok(self.record("std", "MaskedMerge", vec![a, b, mask], args, format))
    }

    /// `std.Minimum` (inpand) over the neighbourhood selected by `mode`.
    pub fn minimum(
        &mut self,
        clip: NodeId,
        planes: &[usize],
        threshold: Option<f64>,
        mode: MorphMode,
    ) -> XvsResult<NodeId> {
        self.morph("Minimum", clip, planes, threshold, mode)
    }

    /// `std.Maximum` (expand) over the neighbourhood selected by `mode`.
    pub fn maximum(
        &mut self,
        clip: NodeId,
        planes: &[usize],
        threshold: Option<f64>,
        mode: MorphMode,
    ) -> XvsResult<NodeId> {
        self.morph("Maximum", clip, planes, threshold, mode)
    }

    fn morph(
        &mut self,
        function: &str,
        clip: NodeId,
        planes: &[usize],
        threshold: Option<f64>,
        mode: MorphMode,
    ) -> XvsResult<NodeId> {
        let format = self.check_planes(clip, planes)?;
        let args = Args::new()
            .ints("planes", planes.iter().map(|&p| p as i64))
            .opt_float("threshold", threshold)
            .ints("coordinates", mode.coordinates());
        Ok(self.record("std", function, vec![clip], args, format))
    }

    pub fn deflate(&mut self, clip: NodeId, planes: &[usize]) -> XvsResult<NodeId> {
        let format = self.check_planes(clip, planes)?;
        let args = Args::new().ints("planes", planes.iter().map(|&p| p as i64));
        Ok(self.record("std", "Deflate", vec![clip], args, format))
    }

    /// `std.Interleave`: frame rate and length scale with the number of clips.
    pub fn interleave(&mut self, clips: &[NodeId]) -> XvsResult<NodeId> {
        let Some(&first) = clips.first() else {
            return Err(XvsError::validation("Interleave needs at least one clip"));
        };
        let mut format = self.format(first)?;
        let mut longest = format.num_frames;
        for &c in &clips[1..] {
            self.check_same_format(first, c, "Interleave")?;
            longest = longest.max(self.format(c)?.num_frames);
        }
        let n = clips.len() as u32;
        format.num_frames = longest * u64::from(n);
        format.fps = reduce_fps(u64::from(format.fps.num) * u64::from(n), u64::from(format.fps.den))?;
        Ok(self.record("std", "Interleave", clips.to_vec(), Args::new(), format))
    }

    /// `std.SelectEvery`: keep frames whose index modulo `cycle` is in `offsets`.
    pub fn select_every(&mut self, clip: NodeId, cycle: u32, offsets: &[u32]) -> XvsResult<NodeId> {
        if cycle == 0 {
            return Err(XvsError::validation("SelectEvery cycle must be > 0"));
        }
        if offsets.is_empty() || offsets.iter().any(|&o| o >= cycle) {
            return Err(XvsError::validation(format!(
                "SelectEvery offsets must be non-empty and < cycle ({cycle})"
            )));
        }
        let mut format = self.format(clip)?;
        let full = format.num_frames / u64::from(cycle);
        let rest = format.num_frames % u64::from(cycle);
        format.num_frames = full * offsets.len() as u64
            + offsets.iter().filter(|&&o| u64::from(o) < rest).count() as u64;
        format.fps = reduce_fps(
            u64::from(format.fps.num) * offsets.len() as u64,
            u64::from(format.fps.den) * u64::from(cycle),
        )?;
        let args = Args::new()
            .int("cycle", i64::from(cycle))
            .ints("offsets", offsets.iter().map(|&o| i64::from(o)));
        Ok(self.record("std", "SelectEvery", vec![clip], args, format))
    }

    /// `std.Splice`: concatenate clips of the same format; the result keeps the first rate.
    pub fn splice(&mut self, clips: &[NodeId]) -> XvsResult<NodeId> {
        let Some(&first) = clips.first() else {
            return Err(XvsError::validation("Splice needs at least one clip"));
        };
        let mut format = self.format(first)?;
        for &c in &clips[1..] {
            self.check_same_format(first, c, "Splice")?;
            format.num_frames += self.format(c)?.num_frames;
        }
        Ok(self.record("std", "Splice", clips.to_vec(), Args::new(), format))
    }

    pub fn assume_fps(&mut self, clip: NodeId, fps: Fps) -> XvsResult<NodeId> {
        let mut format = self.format(clip)?;
        format.fps = fps;
        let args = Args::new()
            .int("fpsnum", i64::from(fps.num))
            .int("fpsden", i64::from(fps.den));
        Ok(self.record("std", "AssumeFPS", vec![clip], args, format))
    }

    /// `std.Trim` to the inclusive frame range `first..=last`.
    pub fn trim(&mut self, clip: NodeId, first: u64, last: u64) -> XvsResult<NodeId> {
        let mut format = self.format(clip)?;
        if first > last || last >= format.num_frames {
            return Err(XvsError::validation(format!(
                "Trim range {first}..={last} is outside a {}-frame clip",
                format.num_frames
            )));
        }
        format.num_frames = last - first + 1;
        let args = Args::new()
            .int("first", first as i64)
            .int("last", last as i64);
        Ok(self.record("std", "Trim", vec![clip], args, format))
    }

    /// `std.Merge`: `a * (1 - weight) + b * weight` on every plane.
    pub fn merge(&mut self, a: NodeId, b: NodeId, weight: f64) -> XvsResult<NodeId> {
        let format = self.check_same_format(a, b, "Merge")?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(XvsError::validation(format!(
                "Merge weight must be in [0, 1], got {weight}"
            )));
        }
        let args = Args::new().floats("weight", [weight]);
        Ok(self.record("std", "Merge", vec![a, b], args, format))
    }

    /// `resize.Bicubic` to `width`x`height` with the kernel's `b` and `c` parameters.
    pub fn resize_bicubic(
        &mut self,
        clip: NodeId,
        width: u32,
        height: u32,
        b: f64,
        c: f64,
    ) -> XvsResult<NodeId> {
        let src = self.format(clip)?;
        let format = VideoFormat::new(width, height, src.depth, src.color_family, src.subsampling)?
            .with_frames(src.num_frames, src.fps);
        let args = Args::new()
            .int("width", i64::from(width))
            .int("height", i64::from(height))
            .float("filter_param_a", b)
            .float("filter_param_b", c);
        Ok(self.record("resize", "Bicubic", vec![clip], args, format))
    }

    /// `flux.SmoothT` temporal smoothing.
    pub fn flux_smooth_t(
        &mut self,
        clip: NodeId,
        temporal_threshold: i64,
        planes: &[usize],
    ) -> XvsResult<NodeId> {
        let format = self.check_planes(clip, planes)?;
        if temporal_threshold < -1 {
            return Err(XvsError::validation(format!(
                "temporal_threshold must be >= -1, got {temporal_threshold}"
            )));
        }
        let args = Args::new()
            .int("temporal_threshold", temporal_threshold)
            .ints("planes", planes.iter().map(|&p| p as i64));
        Ok(self.record("flux", "SmoothT", vec![clip], args, format))
    }

    /// `mv.Super`: hierarchical super clip for motion search.
    pub fn mv_super(&mut self, clip: NodeId, args: Args) -> XvsResult<NodeId> {
        let format = self.format(clip)?;
        Ok(self.record("mv", "Super", vec![clip], args, format))
    }

    /// `mv.Analyse` on a super clip; `isb` selects backward vectors.
    pub fn mv_analyse(&mut self, sup: NodeId, isb: bool, args: Args) -> XvsResult<NodeId> {
        self.expect_call(sup, "mv", "Super")?;
        let format = self.format(sup)?;
        let args = args.bool("isb", isb);
        Ok(self.record("mv", "Analyse", vec![sup], args, format))
    }

    /// `mv.Compensate` of `clip` along `vectors`.
    pub fn mv_compensate(
        &mut self,
        clip: NodeId,
        sup: NodeId,
        vectors: NodeId,
        args: Args,
    ) -> XvsResult<NodeId> {
        self.expect_call(sup, "mv", "Super")?;
        self.expect_call(vectors, "mv", "Analyse")?;
        let format = self.format(clip)?;
        Ok(self.record("mv", "Compensate", vec![clip, sup, vectors], args, format))
    }

    /// `mv.FlowBlur` motion blur.
    pub fn mv_flow_blur(
        &mut self,
        clip: NodeId,
        sup: NodeId,
        backward: NodeId,
        forward: NodeId,
        blur: f64,
    ) -> XvsResult<NodeId> {
        self.check_vectors(sup, backward, forward)?;
        let format = self.format(clip)?;
        let args = Args::new().float("blur", blur);
        Ok(self.record(
            "mv",
            "FlowBlur",
            vec![clip, sup, backward, forward],
            args,
            format,
        ))
    }

    /// `mv.BlockFPS` / `mv.FlowFPS` frame rate conversion to `fps`.
    pub fn mv_fps(
        &mut self,
        function: MvFpsKind,
        clip: NodeId,
        vectors: [NodeId; 3],
        fps: Fps,
        args: Args,
    ) -> XvsResult<NodeId> {
        let [sup, backward, forward] = vectors;
        self.check_vectors(sup, backward, forward)?;
        let mut format = self.format(clip)?;
        format.num_frames = rescale_frames(format.num_frames, format.fps, fps);
        format.fps = fps;
        let args = args
            .int("num", i64::from(fps.num))
            .int("den", i64::from(fps.den));
        let name = match function {
            MvFpsKind::Block => "BlockFPS",
            MvFpsKind::Flow => "FlowFPS",
        };
        Ok(self.record(
            "mv",
            name,
            vec![clip, sup, backward, forward],
            args,
            format,
        ))
    }

    fn check_vectors(&self, sup: NodeId, backward: NodeId, forward: NodeId) -> XvsResult<()> {
        self.expect_call(sup, "mv", "Super")?;
        self.expect_call(backward, "mv", "Analyse")?;
        self.expect_call(forward, "mv", "Analyse")
    }

    fn expect_call(&self, id: NodeId, plugin: &str, function: &str) -> XvsResult<()> {
        let n = self.node(id)?;
        if n.plugin != plugin || n.function != function {
            return Err(XvsError::validation(format!(
                "expected a {plugin}.{function} clip, got {}",
                n.call_name()
            )));
        }
        Ok(())
    }
}

/// Which mvtools frame-rate converter to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MvFpsKind {
    Block,
    Flow,
}

fn check_modes(function: &str, modes: &[i64], num_planes: usize) -> XvsResult<()> {
    if modes.is_empty() || modes.len() > num_planes {
        return Err(XvsError::validation(format!(
            "{function} takes 1..={num_planes} modes, got {}",
            modes.len()
        )));
    }
    if let Some(m) = modes.iter().find(|m| !(0..=24).contains(*m)) {
        return Err(XvsError::validation(format!(
            "{function} mode {m} is out of range 0..=24"
        )));
    }
    Ok(())
}

fn subsampling_between(luma: (u32, u32), chroma: (u32, u32)) -> XvsResult<Subsampling> {
    fn shift(full: u32, sub: u32) -> Option<u8> {
        if sub == 0 || full % sub != 0 {
            return None;
        }
        let ratio = full / sub;
        ratio.is_power_of_two().then(|| ratio.trailing_zeros() as u8)
    }
    match (shift(luma.0, chroma.0), shift(luma.1, chroma.1)) {
        (Some(w), Some(h)) => Ok(Subsampling { w, h }),
        _ => Err(XvsError::validation(format!(
            "chroma planes {}x{} do not subsample luma {}x{}",
            chroma.0, chroma.1, luma.0, luma.1
        ))),
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub(crate) fn reduce_fps(num: u64, den: u64) -> XvsResult<Fps> {
    let g = gcd(num, den).max(1);
    let (num, den) = (num / g, den / g);
    let num = u32::try_from(num).map_err(|_| XvsError::validation("frame rate overflow"))?;
    let den = u32::try_from(den).map_err(|_| XvsError::validation("frame rate overflow"))?;
    Fps::new(num, den)
}

fn rescale_frames(frames: u64, from: Fps, to: Fps) -> u64 {
    let num = u128::from(frames) * u128::from(to.num) * u128::from(from.den);
    let den = u128::from(to.den) * u128::from(from.num);
    u64::try_from(num.div_ceil(den)).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/graph/core.rs"]
mod tests;
