//! Matroska-style timecode files.
//!
//! v1 files describe frame ranges with their rate, v2 files list one millisecond timestamp per
//! frame. Both are plain text and written through any [`std::io::Write`].

use std::io::Write;

use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::Fps;

const V1_HEADER: &str = "# timecode format v1";
const V2_HEADER: &str = "# timecode format v2";

/// Upper bound on the output length of [`cfr_frame_map`] (about eight days at 24 fps).
pub const MAX_CFR_FRAMES: u64 = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimecodeRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
    pub fps: f64,
}

/// `# timecode format v1` content: a default rate plus per-range overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct TimecodeV1 {
    pub assume: f64,
    pub ranges: Vec<TimecodeRange>,
}

impl TimecodeV1 {
    /// Timecodes for clips played back to back; `segments` holds `(frames, fps)` per clip.
    ///
    /// The first clip's rate becomes the `assume` rate, every later clip gets its own range.
    pub fn from_segments(segments: &[(u64, f64)]) -> XvsResult<Self> {
        let Some(&(_, assume)) = segments.first() else {
            return Err(XvsError::validation("timecodes need at least one segment"));
        };
        if let Some((i, _)) = segments
            .iter()
            .enumerate()
            .find(|(_, (frames, fps))| *frames == 0 || !(fps.is_finite() && *fps > 0.0))
        {
            return Err(XvsError::validation(format!(
                "segment {i} must have frames and a positive rate"
            )));
        }

        let mut ranges = Vec::with_capacity(segments.len().saturating_sub(1));
        let mut start = segments[0].0;
        for &(frames, fps) in &segments[1..] {
            ranges.push(TimecodeRange {
                start,
                end: start + frames - 1,
                fps,
            });
            start += frames;
        }
        Ok(Self { assume, ranges })
    }

    #[tracing::instrument(skip_all, fields(ranges = self.ranges.len()))]
    pub fn write_to<W: Write>(&self, mut w: W) -> XvsResult<()> {
        writeln!(w, "{V1_HEADER}")?;
        writeln!(w, "assume {}", format_rate(self.assume))?;
        for r in &self.ranges {
            writeln!(w, "{},{},{}", r.start, r.end, format_rate(r.fps))?;
        }
        w.flush()?;
        Ok(())
    }
}

/// `# timecode format v2` content: one timestamp in milliseconds per line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimecodeV2 {
    pub timestamps: Vec<f64>,
}

impl TimecodeV2 {
    /// Parse a v2 file. Comment and blank lines are skipped; timestamps must not decrease.
    pub fn parse(text: &str) -> XvsResult<Self> {
        let mut timestamps = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let v: f64 = line.parse().map_err(|_| {
                XvsError::validation(format!(
                    "timecode line {}: '{line}' is not a timestamp",
                    lineno + 1
                ))
            })?;
            if !v.is_finite() || timestamps.last().is_some_and(|&prev| v < prev) {
                return Err(XvsError::validation(format!(
                    "timecode line {}: timestamp {v} is out of order",
                    lineno + 1
                )));
            }
            timestamps.push(v);
        }
        if timestamps.is_empty() {
            tracing::warn!("timecode file holds no timestamps");
        }
        Ok(Self { timestamps })
    }

    /// Timestamps after field-matching analysis: combed frames are shown as two half-duration
    /// fields, clean frames keep the source frame duration. Values are truncated to whole ms.
    pub fn from_combed(combed: &[bool], fps: Fps) -> Self {
        let frame_ms = 1000.0 * f64::from(fps.den) / f64::from(fps.num);
        let mut timestamps = Vec::with_capacity(combed.len() * 2 + 1);
        timestamps.push(0.0);
        for (i, &c) in combed.iter().enumerate() {
            let i = i as f64;
            if c {
                timestamps.push(((i + 0.5) * frame_ms).trunc());
            }
            timestamps.push(((i + 1.0) * frame_ms).trunc());
        }
        Self { timestamps }
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> XvsResult<()> {
        writeln!(w, "{V2_HEADER}")?;
        for t in &self.timestamps {
            writeln!(w, "{t}")?;
        }
        w.flush()?;
        Ok(())
    }
}

/// How an output frame of a constant-rate conversion is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CfrFrame {
    Copy(u64),
    /// `weight` is the share of `to` in the mix.
    Blend { from: u64, to: u64, weight: f64 },
}

/// Map output frames at the constant rate `fps` onto the source frames timed by `timestamps`.
///
/// Source frame `k` is shown during `[timestamps[k], timestamps[k + 1])`. Without `blend` each
/// output frame copies the source frame whose start is nearest; with `blend` it mixes the two
/// frames around its timestamp.
pub fn cfr_frame_map(timestamps: &[f64], fps: Fps, blend: bool) -> XvsResult<Vec<CfrFrame>> {
    let Some(&last) = timestamps.last() else {
        return Err(XvsError::validation("no timestamps to convert"));
    };
    let frame_ms = 1000.0 * f64::from(fps.den) / f64::from(fps.num);
    let span = (last / frame_ms).floor();
    if !(0.0..MAX_CFR_FRAMES as f64).contains(&span) {
        return Err(XvsError::validation(format!(
            "timestamp {last} ms does not give a usable frame count at {}/{} fps",
            fps.num, fps.den
        )));
    }
    let count = span as u64 + 1;

    let mut out = Vec::new();
    let mut k = 0usize;
    for i in 0..count {
        let t = i as f64 * frame_ms;
        while k + 1 < timestamps.len() && timestamps[k + 1] <= t {
            k += 1;
        }
        let Some(&next) = timestamps.get(k + 1) else {
            out.push(CfrFrame::Copy(k as u64));
            continue;
        };
        let cur = timestamps[k];
        let frame = if blend {
            let span = next - cur;
            let weight = if span > 0.0 { (t - cur) / span } else { 0.0 };
            if weight <= 0.0 {
                CfrFrame::Copy(k as u64)
            } else {
                CfrFrame::Blend {
                    from: k as u64,
                    to: k as u64 + 1,
                    weight,
                }
            }
        } else if t - cur > next - t {
            CfrFrame::Copy(k as u64 + 1)
        } else {
            CfrFrame::Copy(k as u64)
        };
        out.push(frame);
    }
    Ok(out)
}

/// Integral rates keep a trailing `.0` (`24.0`).
fn format_rate(v: f64) -> String {
    format!("{v:?}")
}

#[cfg(test)]
#[path = "../tests/unit/timecode.rs"]
mod tests;
