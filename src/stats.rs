//! Per-frame statistics logs written as CSV.

use std::io::Write;
use std::str::FromStr;

use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::ColorFamily;

/// Plane names used for per-plane file names and column headers.
pub fn plane_names(family: ColorFamily) -> &'static [&'static str] {
    match family {
        ColorFamily::Yuv => &["Y", "U", "V"],
        ColorFamily::Rgb => &["R", "G", "B"],
        ColorFamily::Gray => &["GRAY"],
    }
}

/// `<plane>.csv`, or `<namebase>.<plane>.csv` when a base name is given.
pub fn csv_file_name(namebase: Option<&str>, plane: &str) -> String {
    match namebase {
        Some(base) => format!("{base}.{plane}.csv"),
        None => format!("{plane}.csv"),
    }
}

/// PlaneStats values of one frame as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneStatsRow {
    pub frame: u64,
    /// Sample value at the clip depth.
    pub max: f64,
    /// Sample value at the clip depth.
    pub min: f64,
    /// Normalized to `[0, 1]`.
    pub avg: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StatsColumns {
    pub max: bool,
    pub min: bool,
    pub avg: bool,
}

impl Default for StatsColumns {
    fn default() -> Self {
        Self {
            max: true,
            min: true,
            avg: false,
        }
    }
}

/// Writes `n[,Max][,Min][,Avg]` rows with values rescaled to `out_bits`.
pub struct StatsCsvWriter<W: Write> {
    out: W,
    columns: StatsColumns,
    clip_bits: u8,
    out_bits: u8,
}

impl<W: Write> StatsCsvWriter<W> {
    pub fn new(mut out: W, columns: StatsColumns, clip_bits: u8, out_bits: u8) -> XvsResult<Self> {
        if !(1..=32).contains(&clip_bits) || !(1..=32).contains(&out_bits) {
            return Err(XvsError::validation(format!(
                "bit counts must be in 1..=32 (clip {clip_bits}, output {out_bits})"
            )));
        }
        let mut head = String::from("n");
        if columns.max {
            head.push_str(",Max");
        }
        if columns.min {
            head.push_str(",Min");
        }
        if columns.avg {
            head.push_str(",Avg");
        }
        writeln!(out, "{head}")?;
        Ok(Self {
            out,
            columns,
            clip_bits,
            out_bits,
        })
    }

    pub fn write_row(&mut self, row: &PlaneStatsRow) -> XvsResult<()> {
        let rescale = 2f64.powi(i32::from(self.out_bits) - i32::from(self.clip_bits));
        let full = 2f64.powi(i32::from(self.out_bits));

        let mut line = row.frame.to_string();
        if self.columns.max {
            line.push_str(&format!(",{}", (row.max * rescale).round_ties_even() as i64));
        }
        if self.columns.min {
            line.push_str(&format!(",{}", (row.min * rescale).round_ties_even() as i64));
        }
        if self.columns.avg {
            line.push_str(&format!(",{}", (row.avg * full).round_ties_even() as i64));
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    pub fn finish(mut self) -> XvsResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes one score per selected plane and frame, e.g. SSIM or GMSD.
pub struct ScoreCsvWriter<W: Write> {
    out: W,
    planes: usize,
}

impl<W: Write> ScoreCsvWriter<W> {
    /// `planes` selects which of `family`'s planes get a column.
    pub fn new(mut out: W, family: ColorFamily, planes: &[usize]) -> XvsResult<Self> {
        let names = plane_names(family);
        if planes.is_empty() {
            return Err(XvsError::validation("select at least one plane to score"));
        }
        let mut head = String::from("n");
        for &p in planes {
            let name = names.get(p).ok_or_else(|| {
                XvsError::validation(format!("plane {p} does not exist in a {family:?} clip"))
            })?;
            head.push(',');
            head.push_str(name);
        }
        writeln!(out, "{head}")?;
        Ok(Self {
            out,
            planes: planes.len(),
        })
    }

    pub fn write_row(&mut self, frame: u64, scores: &[f64]) -> XvsResult<()> {
        if scores.len() != self.planes {
            return Err(XvsError::validation(format!(
                "expected {} scores for frame {frame}, got {}",
                self.planes,
                scores.len()
            )));
        }
        let mut line = frame.to_string();
        for s in scores {
            line.push_str(&format!(",{s}"));
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    pub fn finish(mut self) -> XvsResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Frame coding type from the `_PictType` frame property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PictType {
    I,
    P,
    B,
}

impl PictType {
    pub fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::P => 'P',
            Self::B => 'B',
        }
    }
}

impl FromStr for PictType {
    type Err = XvsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "I" | "i" => Ok(Self::I),
            "P" | "p" => Ok(Self::P),
            "B" | "b" => Ok(Self::B),
            other => Err(XvsError::validation(format!(
                "unknown picture type '{other}'"
            ))),
        }
    }
}

/// `n,<type>` lines, one per frame.
pub fn write_pict_type<W: Write>(mut out: W, frame: u64, kind: PictType) -> XvsResult<()> {
    writeln!(out, "{frame},{}", kind.as_char())?;
    Ok(())
}

/// Comb detection log written by the first pass of field matching.
pub struct CombLog<W: Write> {
    out: W,
}

impl<W: Write> CombLog<W> {
    pub fn new(mut out: W) -> XvsResult<Self> {
        writeln!(out, "frame,combed")?;
        Ok(Self { out })
    }

    pub fn write(&mut self, frame: u64, combed: bool) -> XvsResult<()> {
        writeln!(self.out, "{frame},{}", u8::from(combed))?;
        Ok(())
    }

    pub fn finish(mut self) -> XvsResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Read a comb log back into per-frame flags. Rows may appear in any order but every frame in
/// `0..frames` must be present exactly once.
pub fn read_comb_log(text: &str, frames: usize) -> XvsResult<Vec<bool>> {
    let mut flags: Vec<Option<bool>> = vec![None; frames];
    for (lineno, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bad = || XvsError::validation(format!("comb log line {}: '{line}'", lineno + 1));
        let (frame, combed) = line.split_once(',').ok_or_else(bad)?;
        let frame: usize = frame.trim().parse().map_err(|_| bad())?;
        let combed = match combed.trim() {
            "0" => false,
            "1" => true,
            _ => return Err(bad()),
        };
        let slot = flags.get_mut(frame).ok_or_else(bad)?;
        if slot.replace(combed).is_some() {
            return Err(XvsError::validation(format!(
                "comb log lists frame {frame} twice"
            )));
        }
    }
    flags
        .into_iter()
        .enumerate()
        .map(|(i, f)| f.ok_or_else(|| XvsError::validation(format!("comb log misses frame {i}"))))
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/stats.rs"]
mod tests;
