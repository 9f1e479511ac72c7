use crate::foundation::error::{XvsError, XvsResult};

/// Sample representation of a clip plane.
///
/// Thresholds throughout the crate are authored against an 8-bit reference range and must go
/// through [`SampleDepth::scale`] before they are compared against samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleDepth {
    /// Integer samples with the given bit count (8..=16).
    Integer(u8),
    /// 32-bit float samples normalized to `[0, 1]`.
    Float,
}

impl SampleDepth {
    /// Lowest supported integer bit depth.
    pub const MIN_BITS: u8 = 8;
    /// Highest supported integer bit depth.
    pub const MAX_BITS: u8 = 16;

    /// Validate an integer bit depth.
    pub fn integer(bits: u8) -> XvsResult<Self> {
        if !(Self::MIN_BITS..=Self::MAX_BITS).contains(&bits) {
            return Err(XvsError::validation(format!(
                "unsupported bit depth {bits} (expected {}..={} or float)",
                Self::MIN_BITS,
                Self::MAX_BITS
            )));
        }
        Ok(Self::Integer(bits))
    }

    /// Map a `bits_per_sample` value as reported by the host: 32 means float.
    pub fn from_bits(bits: u8) -> XvsResult<Self> {
        if bits == 32 {
            return Ok(Self::Float);
        }
        Self::integer(bits)
    }

    /// Re-check a value built directly from the enum (or deserialized) against the supported
    /// range.
    pub fn check(self) -> XvsResult<Self> {
        match self {
            Self::Integer(bits) => Self::integer(bits),
            Self::Float => Ok(self),
        }
    }

    pub fn bits_per_sample(self) -> u8 {
        match self {
            Self::Integer(bits) => bits,
            Self::Float => 32,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float)
    }

    /// Rescale an 8-bit reference value to this depth.
    pub fn scale(self, v: f64) -> f64 {
        match self {
            Self::Integer(bits) => v * 2f64.powi(i32::from(bits) - i32::from(Self::MIN_BITS)),
            Self::Float => v / 255.0,
        }
    }

    /// Largest representable sample value.
    pub fn peak(self) -> f64 {
        match self {
            Self::Integer(bits) => 2f64.powi(i32::from(bits)) - 1.0,
            Self::Float => 1.0,
        }
    }

    /// Neutral value used for difference clips and grey fills.
    pub fn neutral(self) -> f64 {
        match self {
            Self::Integer(bits) => 2f64.powi(i32::from(bits) - 1),
            Self::Float => 0.5,
        }
    }

    /// Convert an evaluator result to the stored sample value.
    ///
    /// Integer planes round half to even and saturate into `[0, peak]`.
    pub fn store(self, v: f64) -> f64 {
        match self {
            Self::Integer(_) => v.round_ties_even().clamp(0.0, self.peak()),
            Self::Float => v,
        }
    }
}

impl std::fmt::Display for SampleDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(bits) => write!(f, "{bits}-bit"),
            Self::Float => f.write_str("float"),
        }
    }
}

/// Rescale `v` between two integer bit depths (`v * 2^(depth_out - depth_in)`).
pub fn scale_between(v: f64, depth_out: u8, depth_in: u8) -> f64 {
    v * 2f64.powi(i32::from(depth_out) - i32::from(depth_in))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/depth.rs"]
mod tests;
