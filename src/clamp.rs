//! Clamp expressions limiting how far a filtered sample may move from its source sample.
//!
//! Every builder here produces a pointwise [`Expr`] over `x` and `y` with its thresholds already
//! scaled to the clip depth, plus an `apply` method evaluating the same formula directly.

use crate::expression::ast::Expr;
use crate::foundation::depth::SampleDepth;
use crate::foundation::error::{XvsError, XvsResult};

/// How the clamp-and-blend branch decides that `x` and `y` are equal enough to keep `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearEqual {
    /// `|x - y| < scale(1)`: sub-unit differences are noise.
    #[default]
    Unit,
    /// `|x - y| <= 0`: only identical samples are kept untouched.
    Exact,
}

/// Limit/bias pair for one pressdown stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampParams {
    limit: f64,
    bias: u8,
    depth: SampleDepth,
    near_equal: NearEqual,
}

/// Thresholds of a [`ClampParams`], in samples of the working depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampThresholds {
    /// Outer limit: `y` is clamped into `[x - lim1, x + lim1]`.
    pub lim1: f64,
    /// Inner limit: clamped values within `lim2` of `x` are accepted as is.
    pub lim2: f64,
    /// One 8-bit step at the working depth.
    pub one: f64,
}

impl ClampParams {
    /// `limit` is in 8-bit units (negative selects the soft-ratio form), `bias` a percentage.
    pub fn new(limit: f64, bias: u8, depth: SampleDepth) -> XvsResult<Self> {
        if !limit.is_finite() {
            return Err(XvsError::validation(format!("limit must be finite, got {limit}")));
        }
        if !(1..=100).contains(&bias) {
            return Err(XvsError::validation(format!(
                "bias must be in 1..=100, got {bias}"
            )));
        }
        if limit > 0.0 && outer_steps(limit, bias) < 0.0 {
            return Err(XvsError::validation(format!(
                "limit {limit} is too small for bias {bias}"
            )));
        }
        let params = Self {
            limit,
            bias,
            depth: depth.check()?,
            near_equal: NearEqual::Unit,
        };
        let t = params.thresholds();
        if !(t.lim1.is_finite() && t.lim2.is_finite()) {
            return Err(XvsError::validation(format!(
                "limit {limit} is out of range for bias {bias} at {depth}"
            )));
        }
        Ok(params)
    }

    pub fn with_near_equal(mut self, near_equal: NearEqual) -> Self {
        self.near_equal = near_equal;
        self
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn bias(&self) -> u8 {
        self.bias
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn is_soft_ratio(&self) -> bool {
        self.limit < 0.0
    }

    pub fn thresholds(&self) -> ClampThresholds {
        let lim1 = if self.limit > 0.0 {
            outer_steps(self.limit, self.bias)
        } else {
            (100.0 / f64::from(self.bias)).round_ties_even()
        };
        let lim2 = if self.limit < 0.0 { 1.0 } else { self.limit };
        ClampThresholds {
            lim1: self.depth.scale(lim1),
            lim2: self.depth.scale(lim2),
            one: self.depth.scale(1.0),
        }
    }

    /// Pointwise expression over `x` (source) and `y` (filtered).
    pub fn expr(&self) -> Expr {
        let t = self.thresholds();
        let diff = (Expr::x() - Expr::y()).abs();

        if self.is_soft_ratio() {
            // Step one unit from x towards y once the difference reaches lim1.
            let step = Expr::c(t.one) * (Expr::x() - Expr::y()) / (Expr::x() - Expr::y()).abs();
            return Expr::select(diff.lt(Expr::c(t.lim1)), Expr::x(), Expr::x() - step);
        }

        let near = match self.near_equal {
            NearEqual::Unit => diff.lt(Expr::c(t.one)),
            NearEqual::Exact => diff.le(Expr::c(0.0)),
        };
        let clamped = Expr::y().clamp(Expr::x() - t.lim1, Expr::x() + t.lim1);
        let inner = (clamped.clone() - Expr::x()).abs().le(Expr::c(t.lim2));
        let bias = f64::from(self.bias);
        let blend = (clamped.clone() * (100.0 - bias) + Expr::x() * bias) / 100.0;

        Expr::select(near, Expr::x(), Expr::select(inner, clamped, blend))
    }

    /// Evaluate the clamp formula for one sample pair.
    pub fn apply(&self, x: f64, y: f64) -> f64 {
        let t = self.thresholds();
        let diff = (x - y).abs();

        if self.is_soft_ratio() {
            return if diff < t.lim1 {
                x
            } else {
                x - t.one * (x - y) / diff
            };
        }

        let near = match self.near_equal {
            NearEqual::Unit => diff < t.one,
            NearEqual::Exact => diff <= 0.0,
        };
        if near {
            return x;
        }
        let clamped = y.max(x - t.lim1).min(x + t.lim1);
        if (clamped - x).abs() <= t.lim2 {
            return clamped;
        }
        let bias = f64::from(self.bias);
        (clamped * (100.0 - bias) + x * bias) / 100.0
    }
}

fn outer_steps(limit: f64, bias: u8) -> f64 {
    (limit * 100.0 / f64::from(bias) - 1.0).round_ties_even()
}

/// Shift a processed sample `x` back to within `back` of the original `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backshift {
    back: f64,
}

impl Backshift {
    /// `back` is in 8-bit units.
    pub fn new(back: f64, depth: SampleDepth) -> XvsResult<Self> {
        if !back.is_finite() || back < 0.0 {
            return Err(XvsError::validation(format!(
                "back must be a finite value >= 0, got {back}"
            )));
        }
        let back = depth.check()?.scale(back);
        if !back.is_finite() {
            return Err(XvsError::validation(format!(
                "back is out of range at {depth}"
            )));
        }
        Ok(Self { back })
    }

    /// Scaled shift amount.
    pub fn amount(&self) -> f64 {
        self.back
    }

    pub fn expr(&self) -> Expr {
        Expr::x().clamp(Expr::y() - self.back, Expr::y() + self.back)
    }

    pub fn apply(&self, x: f64, y: f64) -> f64 {
        x.max(y - self.back).min(y + self.back)
    }
}

/// Soft limiter between a filtered clip `x` and its source `y`.
///
/// Differences up to `thr` pass unchanged, differences beyond `thr * elast` fall back to the
/// source, and the band in between fades linearly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitFilter {
    thr: f64,
    elast: f64,
}

impl LimitFilter {
    pub fn new(thr: f64, elast: f64, depth: SampleDepth) -> XvsResult<Self> {
        if !thr.is_finite() || thr <= 0.0 {
            return Err(XvsError::validation(format!("thr must be > 0, got {thr}")));
        }
        if !elast.is_finite() || elast <= 1.0 {
            return Err(XvsError::validation(format!(
                "elast must be > 1, got {elast}"
            )));
        }
        let thr = depth.check()?.scale(thr);
        if !(thr * elast).is_finite() {
            return Err(XvsError::validation(format!(
                "thr * elast is out of range at {depth}"
            )));
        }
        Ok(Self { thr, elast })
    }

    pub fn expr(&self) -> Expr {
        let outer = self.thr * self.elast;
        let diff = Expr::x() - Expr::y();
        let fade = Expr::y()
            + diff.clone() * (Expr::c(outer) - diff.clone().abs()) / (self.thr * (self.elast - 1.0));
        Expr::select(
            diff.clone().abs().le(Expr::c(self.thr)),
            Expr::x(),
            Expr::select(diff.abs().ge(Expr::c(outer)), Expr::y(), fade),
        )
    }

    pub fn apply(&self, x: f64, y: f64) -> f64 {
        let outer = self.thr * self.elast;
        let diff = x - y;
        if diff.abs() <= self.thr {
            x
        } else if diff.abs() >= outer {
            y
        } else {
            y + diff * (outer - diff.abs()) / (self.thr * (self.elast - 1.0))
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/clamp.rs"]
mod tests;
