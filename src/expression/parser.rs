use crate::expression::ast::Expr;
use crate::expression::error::ExprError;
use crate::expression::lexer::{TokenKind, lex};

/// Parse postfix expression text into an [`Expr`] tree.
pub fn parse_postfix(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex(src)?;
    let mut stack: Vec<Expr> = Vec::with_capacity(16);

    for tok in tokens {
        let at = tok.offset;
        match tok.kind {
            TokenKind::Number(v) => stack.push(Expr::Const(v)),
            TokenKind::Operand(op) => stack.push(Expr::Var(op)),
            TokenKind::Unary(op) => {
                let e = pop(&mut stack, at, "unary operator")?;
                stack.push(Expr::unary(op, e));
            }
            TokenKind::Binary(op) => {
                let right = pop(&mut stack, at, "binary operator")?;
                let left = pop(&mut stack, at, "binary operator")?;
                stack.push(Expr::binary(op, left, right));
            }
            TokenKind::Question => {
                let otherwise = pop(&mut stack, at, "'?'")?;
                let then = pop(&mut stack, at, "'?'")?;
                let cond = pop(&mut stack, at, "'?'")?;
                stack.push(Expr::select(cond, then, otherwise));
            }
        }
    }

    let expr = stack
        .pop()
        .ok_or_else(|| ExprError::new(src.len(), "empty expression"))?;
    if !stack.is_empty() {
        return Err(ExprError::new(
            src.len(),
            format!("{} values left on the stack (expected 1)", stack.len() + 1),
        ));
    }
    Ok(expr)
}

fn pop(stack: &mut Vec<Expr>, at: usize, what: &str) -> Result<Expr, ExprError> {
    stack
        .pop()
        .ok_or_else(|| ExprError::new(at, format!("stack underflow at {what}")))
}
