//! Variable frame rate helpers: splicing clips with their own rates and converting VFR clips to a
//! constant rate.

use std::io::Write;

use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::Fps;
use crate::graph::core::Core;
use crate::graph::node::NodeId;
use crate::timecode::{CfrFrame, TimecodeV1, TimecodeV2, cfr_frame_map};

/// Playback rate of one spliced clip. A missing `num` keeps the clip's own rate, a missing `den`
/// is guessed from `num` (see [`Fps::from_num`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpliceRate {
    pub num: Option<u32>,
    pub den: Option<u32>,
}

impl SpliceRate {
    pub fn new(num: u32, den: u32) -> Self {
        Self {
            num: Some(num),
            den: Some(den),
        }
    }

    fn resolve(self, own: Fps) -> XvsResult<Fps> {
        match (self.num, self.den) {
            (None, _) => Ok(own),
            (Some(num), None) => Fps::from_num(num),
            (Some(num), Some(den)) => Fps::new(num, den),
        }
    }
}

/// Concatenate `clips`, write v1 timecodes describing each clip's rate to `timecodes`, and return
/// the splice played at the first clip's rate.
///
/// Clips past the end of `rates` keep their own rate.
#[tracing::instrument(skip_all, fields(clips = clips.len()))]
pub fn splicev1<W: Write>(
    core: &mut Core,
    clips: &[NodeId],
    rates: &[SpliceRate],
    timecodes: W,
) -> XvsResult<NodeId> {
    if rates.len() > clips.len() {
        return Err(XvsError::validation(format!(
            "splicev1: {} rates given for {} clips",
            rates.len(),
            clips.len()
        )));
    }

    let mut fps = Vec::with_capacity(clips.len());
    let mut segments = Vec::with_capacity(clips.len());
    for (i, &clip) in clips.iter().enumerate() {
        let format = core.format(clip)?;
        let rate = rates.get(i).copied().unwrap_or_default().resolve(format.fps)?;
        segments.push((format.num_frames, rate.as_f64()));
        fps.push(rate);
    }
    let tc = TimecodeV1::from_segments(&segments)?;
    let spliced = core.splice(clips)?;

    tc.write_to(timecodes)?;
    core.assume_fps(spliced, fps[0])
}

/// Convert a variable frame rate clip timed by v2 `timecodes` to the constant rate `fps`,
/// copying the nearest frame or blending the two frames around each output timestamp.
#[tracing::instrument(skip(core, timecodes), fields(timestamps = timecodes.timestamps.len()))]
pub fn vfrtocfr(
    core: &mut Core,
    clip: NodeId,
    timecodes: &TimecodeV2,
    fps: Fps,
    blend: bool,
) -> XvsResult<NodeId> {
    let frames = core.format(clip)?.num_frames;
    let stamps = timecodes.timestamps.len() as u64;
    if stamps > frames.saturating_add(1) {
        return Err(XvsError::validation(format!(
            "vfrtocfr: {stamps} timestamps but the clip has {frames} frames"
        )));
    }
    let map = cfr_frame_map(&timecodes.timestamps, fps, blend)?;
    let referenced = map
        .iter()
        .map(|f| match *f {
            CfrFrame::Copy(k) => k,
            CfrFrame::Blend { to, .. } => to,
        })
        .max()
        .unwrap_or(0);
    if referenced >= frames {
        return Err(XvsError::validation(format!(
            "vfrtocfr: timecodes reach frame {referenced} but the clip has {frames} frames"
        )));
    }

    let mut out = Vec::with_capacity(map.len());
    for f in map {
        let frame = match f {
            CfrFrame::Copy(k) => core.trim(clip, k, k)?,
            CfrFrame::Blend { from, to, weight } => {
                let a = core.trim(clip, from, from)?;
                let b = core.trim(clip, to, to)?;
                core.merge(a, b, weight)?
            }
        };
        out.push(frame);
    }
    let spliced = core.splice(&out)?;
    core.assume_fps(spliced, fps)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/splice.rs"]
mod tests;
