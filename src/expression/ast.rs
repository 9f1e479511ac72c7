//! Typed form of the host's postfix pixel-expression language.
//!
//! Filters build an [`Expr`] tree and serialize it once with [`Expr::to_postfix`] when the
//! graph node is recorded, instead of concatenating operator tokens by hand.

use std::ops;

/// Input clip referenced by an expression, in the order the clips are passed to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operand {
    X,
    Y,
    Z,
}

impl Operand {
    pub const ALL: [Operand; 3] = [Operand::X, Operand::Y, Operand::Z];

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Abs,
    Sqrt,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Max,
    Min,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(Operand),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `cond then otherwise ?` in postfix form; `then` is taken when `cond > 0`.
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn c(v: f64) -> Self {
        Self::Const(v)
    }

    pub fn x() -> Self {
        Self::Var(Operand::X)
    }

    pub fn y() -> Self {
        Self::Var(Operand::Y)
    }

    pub fn z() -> Self {
        Self::Var(Operand::Z)
    }

    pub fn select(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::Ternary {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn abs(self) -> Self {
        Self::unary(UnaryOp::Abs, self)
    }

    pub fn sqrt(self) -> Self {
        Self::unary(UnaryOp::Sqrt, self)
    }

    pub fn pow(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Pow, self, rhs)
    }

    pub fn max(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Max, self, rhs)
    }

    pub fn min(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Min, self, rhs)
    }

    /// `self` limited to `[lo, hi]`, emitted as `self lo max hi min`.
    pub fn clamp(self, lo: Expr, hi: Expr) -> Self {
        self.max(lo).min(hi)
    }

    pub fn lt(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Lt, self, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Gt, self, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Le, self, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Ge, self, rhs)
    }

    /// Number of input clips the expression needs (one past the highest operand read).
    pub fn operand_count(&self) -> usize {
        match self {
            Self::Const(_) => 0,
            Self::Var(op) => op.index() + 1,
            Self::Unary { expr, .. } => expr.operand_count(),
            Self::Binary { left, right, .. } => left.operand_count().max(right.operand_count()),
            Self::Ternary {
                cond,
                then,
                otherwise,
            } => cond
                .operand_count()
                .max(then.operand_count())
                .max(otherwise.operand_count()),
        }
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Self::Const(v)
    }
}

impl From<Operand> for Expr {
    fn from(op: Operand) -> Self {
        Self::Var(op)
    }
}

macro_rules! impl_arith {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl ops::$trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, Expr::Const(rhs))
            }
        }
    };
}

impl_arith!(Add, add, BinaryOp::Add);
impl_arith!(Sub, sub, BinaryOp::Sub);
impl_arith!(Mul, mul, BinaryOp::Mul);
impl_arith!(Div, div, BinaryOp::Div);
