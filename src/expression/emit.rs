use std::fmt::{self, Write as _};

use crate::expression::ast::{BinaryOp, Expr, UnaryOp};

impl UnaryOp {
    pub fn token(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Not => "not",
        }
    }
}

impl BinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "pow",
            Self::Max => "max",
            Self::Min => "min",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl Expr {
    /// Serialize to the host evaluator's postfix grammar.
    pub fn to_postfix(&self) -> String {
        let mut out = String::with_capacity(64);
        self.write_postfix(&mut out);
        out
    }

    fn write_postfix(&self, out: &mut String) {
        match self {
            Self::Const(v) => push_token(out, &format_const(*v)),
            Self::Var(op) => push_token(out, op.token()),
            Self::Unary { op, expr } => {
                expr.write_postfix(out);
                push_token(out, op.token());
            }
            Self::Binary { op, left, right } => {
                left.write_postfix(out);
                right.write_postfix(out);
                push_token(out, op.token());
            }
            Self::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.write_postfix(out);
                then.write_postfix(out);
                otherwise.write_postfix(out);
                push_token(out, "?");
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_postfix())
    }
}

fn push_token(out: &mut String, tok: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(tok);
}

/// Integral constants print without a fractional part; others use the shortest round-trip form.
pub(crate) fn format_const(v: f64) -> String {
    let mut s = String::new();
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let _ = write!(s, "{}", v as i64);
    } else {
        let _ = write!(s, "{v}");
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/expression/emit.rs"]
mod tests;
