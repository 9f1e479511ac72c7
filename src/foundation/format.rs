use crate::foundation::depth::SampleDepth;
use crate::foundation::error::{XvsError, XvsResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFamily {
    Gray,
    Yuv,
    Rgb,
}

impl ColorFamily {
    pub fn num_planes(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Yuv | Self::Rgb => 3,
        }
    }
}

/// Chroma subsampling as log2 shifts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Subsampling {
    pub w: u8,
    pub h: u8,
}

impl Subsampling {
    pub const CSS_420: Self = Self { w: 1, h: 1 };
    pub const CSS_444: Self = Self { w: 0, h: 0 };

    /// Conventional name of the subsampling (`"420"`, `"422"`, ...).
    pub fn css_name(self) -> XvsResult<&'static str> {
        match (self.w, self.h) {
            (1, 1) => Ok("420"),
            (1, 0) => Ok("422"),
            (0, 0) => Ok("444"),
            (2, 2) => Ok("410"),
            (2, 0) => Ok("411"),
            (0, 1) => Ok("440"),
            (w, h) => Err(XvsError::validation(format!(
                "unknown subsampling (w={w}, h={h})"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> XvsResult<Self> {
        if den == 0 {
            return Err(XvsError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(XvsError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Numerator-only rate, guessing the NTSC denominator for large numerators.
    pub fn from_num(num: u32) -> XvsResult<Self> {
        let den = if num > 10_000 { 1001 } else { 1 };
        Self::new(num, den)
    }
}

/// Format and clip attributes of a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct VideoFormat {
    pub width: u32,
    pub height: u32,
    pub depth: SampleDepth,
    pub color_family: ColorFamily,
    pub subsampling: Subsampling,
    pub num_frames: u64,
    pub fps: Fps,
}

impl VideoFormat {
    pub fn new(
        width: u32,
        height: u32,
        depth: SampleDepth,
        color_family: ColorFamily,
        subsampling: Subsampling,
    ) -> XvsResult<Self> {
        if width == 0 || height == 0 {
            return Err(XvsError::validation("clip dimensions must be non-zero"));
        }
        let depth = depth.check()?;
        if color_family != ColorFamily::Yuv && subsampling != Subsampling::CSS_444 {
            return Err(XvsError::validation(format!(
                "{color_family:?} clips cannot be subsampled"
            )));
        }
        subsampling.css_name()?;
        let (sw, sh) = (1u32 << subsampling.w, 1u32 << subsampling.h);
        if width % sw != 0 || height % sh != 0 {
            return Err(XvsError::validation(format!(
                "{width}x{height} is not divisible by the chroma subsampling"
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            color_family,
            subsampling,
            num_frames: 1,
            fps: Fps { num: 24, den: 1 },
        })
    }

    pub fn with_frames(mut self, num_frames: u64, fps: Fps) -> Self {
        self.num_frames = num_frames;
        self.fps = fps;
        self
    }

    pub fn num_planes(&self) -> usize {
        self.color_family.num_planes()
    }

    /// Dimensions of plane `i`, accounting for chroma subsampling.
    pub fn plane_dimensions(&self, plane: usize) -> (u32, u32) {
        if plane == 0 || self.color_family != ColorFamily::Yuv {
            (self.width, self.height)
        } else {
            (
                self.width >> self.subsampling.w,
                self.height >> self.subsampling.h,
            )
        }
    }

    /// Single-plane Gray format carrying plane `i` of this clip.
    pub fn gray(&self, plane: usize) -> Self {
        let (width, height) = self.plane_dimensions(plane);
        Self {
            width,
            height,
            color_family: ColorFamily::Gray,
            subsampling: Subsampling::CSS_444,
            ..*self
        }
    }

    pub fn same_dimensions(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.subsampling == other.subsampling
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/format.rs"]
mod tests;
