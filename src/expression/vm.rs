use smallvec::SmallVec;

use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::foundation::error::{XvsError, XvsResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Op {
    Const(f64),
    Load(usize),
    Unary(UnaryOp),
    Binary(BinaryOp),
    Select,
}

/// Flattened postfix program, evaluated the way the host evaluator does: every branch of a
/// ternary is computed and `?` picks one afterwards.
#[derive(Debug, Clone)]
pub struct Program {
    ops: Vec<Op>,
    operands: usize,
    max_stack: usize,
}

pub(crate) type Stack = SmallVec<[f64; 16]>;

impl Program {
    pub fn compile(expr: &Expr) -> Self {
        let mut ops = Vec::with_capacity(32);
        lower(expr, &mut ops);

        let mut depth = 0usize;
        let mut max_stack = 0usize;
        for op in &ops {
            depth = match op {
                Op::Const(_) | Op::Load(_) => depth + 1,
                Op::Unary(_) => depth,
                Op::Binary(_) => depth - 1,
                Op::Select => depth - 2,
            };
            max_stack = max_stack.max(depth);
        }

        Self {
            ops,
            operands: expr.operand_count(),
            max_stack,
        }
    }

    /// Number of input samples the program reads.
    pub fn operands(&self) -> usize {
        self.operands
    }

    pub fn eval(&self, inputs: &[f64]) -> XvsResult<f64> {
        let mut stack = Stack::new();
        self.eval_with_stack(inputs, &mut stack)
    }

    pub(crate) fn eval_with_stack(&self, inputs: &[f64], stack: &mut Stack) -> XvsResult<f64> {
        if inputs.len() < self.operands {
            return Err(XvsError::evaluation(format!(
                "expression reads {} inputs but {} were given",
                self.operands,
                inputs.len()
            )));
        }

        stack.clear();
        stack.reserve(self.max_stack);

        for &op in &self.ops {
            match op {
                Op::Const(v) => stack.push(v),
                Op::Load(i) => stack.push(inputs[i]),
                Op::Unary(u) => {
                    let a = pop(stack)?;
                    stack.push(apply_unary(u, a));
                }
                Op::Binary(b) => {
                    let rhs = pop(stack)?;
                    let lhs = pop(stack)?;
                    stack.push(apply_binary(b, lhs, rhs));
                }
                Op::Select => {
                    let otherwise = pop(stack)?;
                    let then = pop(stack)?;
                    let cond = pop(stack)?;
                    stack.push(if cond > 0.0 { then } else { otherwise });
                }
            }
        }

        let out = pop(stack)?;
        if !stack.is_empty() {
            return Err(XvsError::evaluation(format!(
                "stack has {} values at end of program",
                stack.len() + 1
            )));
        }
        Ok(out)
    }
}

/// Evaluate `expr` against one sample per operand.
pub fn eval(expr: &Expr, inputs: &[f64]) -> XvsResult<f64> {
    Program::compile(expr).eval(inputs)
}

fn lower(expr: &Expr, ops: &mut Vec<Op>) {
    match expr {
        Expr::Const(v) => ops.push(Op::Const(*v)),
        Expr::Var(op) => ops.push(Op::Load(op.index())),
        Expr::Unary { op, expr } => {
            lower(expr, ops);
            ops.push(Op::Unary(*op));
        }
        Expr::Binary { op, left, right } => {
            lower(left, ops);
            lower(right, ops);
            ops.push(Op::Binary(*op));
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            lower(cond, ops);
            lower(then, ops);
            lower(otherwise, ops);
            ops.push(Op::Select);
        }
    }
}

fn pop(stack: &mut Stack) -> XvsResult<f64> {
    stack
        .pop()
        .ok_or_else(|| XvsError::evaluation("stack underflow"))
}

fn truth(v: bool) -> f64 {
    if v { 1.0 } else { 0.0 }
}

fn apply_unary(op: UnaryOp, a: f64) -> f64 {
    match op {
        UnaryOp::Abs => a.abs(),
        UnaryOp::Sqrt => a.max(0.0).sqrt(),
        UnaryOp::Not => truth(a <= 0.0),
    }
}

fn apply_binary(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Max => a.max(b),
        BinaryOp::Min => a.min(b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::Gt => truth(a > b),
        BinaryOp::Le => truth(a <= b),
        BinaryOp::Ge => truth(a >= b),
        BinaryOp::Eq => truth(a == b),
        BinaryOp::And => truth(a > 0.0 && b > 0.0),
        BinaryOp::Or => truth(a > 0.0 || b > 0.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/vm.rs"]
mod tests;
