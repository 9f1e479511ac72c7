use rayon::prelude::*;

use crate::expression::ast::Expr;
use crate::expression::vm::{Program, Stack};
use crate::foundation::depth::SampleDepth;
use crate::foundation::error::{XvsError, XvsResult};

/// A single plane of samples, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f64>,
}

impl Plane {
    pub fn new(width: u32, height: u32, data: Vec<f64>) -> XvsResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(XvsError::validation(format!(
                "plane data has {} samples, expected {width}x{height}={expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, v: f64) -> Self {
        Self {
            width,
            height,
            data: vec![v; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Apply `expr` pointwise across `inputs` (operand `x` is `inputs[0]`, and so on) and store the
/// results at `depth`. Rows are evaluated in parallel.
#[tracing::instrument(skip(expr, inputs), fields(expr = %expr))]
pub fn eval_planes(expr: &Expr, inputs: &[&Plane], depth: SampleDepth) -> XvsResult<Plane> {
    let program = Program::compile(expr);
    let Some(first) = inputs.first() else {
        return Err(XvsError::validation("eval_planes needs at least one input plane"));
    };
    if program.operands() > inputs.len() {
        return Err(XvsError::validation(format!(
            "expression reads {} planes but {} were given",
            program.operands(),
            inputs.len()
        )));
    }
    if let Some(p) = inputs
        .iter()
        .find(|p| p.width != first.width || p.height != first.height)
    {
        return Err(XvsError::validation(format!(
            "plane dimensions differ: {}x{} vs {}x{}",
            first.width, first.height, p.width, p.height
        )));
    }

    let width = first.width as usize;
    let mut data = vec![0.0; first.data.len()];
    if width == 0 {
        return Ok(Plane {
            width: first.width,
            height: first.height,
            data,
        });
    }

    data.par_chunks_mut(width)
        .enumerate()
        .try_for_each(|(row, out)| -> XvsResult<()> {
            let mut stack = Stack::new();
            let mut samples = [0.0f64; 3];
            let base = row * width;
            for (col, dst) in out.iter_mut().enumerate() {
                for (slot, plane) in samples.iter_mut().zip(inputs) {
                    *slot = plane.data[base + col];
                }
                let v = program.eval_with_stack(&samples[..inputs.len().min(3)], &mut stack)?;
                if !v.is_finite() {
                    return Err(XvsError::evaluation(format!(
                        "non-finite result {v} at ({col}, {row})"
                    )));
                }
                *dst = depth.store(v);
            }
            Ok(())
        })?;

    Ok(Plane {
        width: first.width,
        height: first.height,
        data,
    })
}

#[cfg(test)]
#[path = "../tests/unit/plane.rs"]
mod tests;
