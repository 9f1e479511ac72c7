use crate::expression::ast::{BinaryOp, Operand, UnaryOp};
use crate::expression::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Byte offset of the token in the source text.
    pub(crate) offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Operand(Operand),
    Unary(UnaryOp),
    Binary(BinaryOp),
    Question,
}

/// Split postfix text into tokens. Tokens are separated by ASCII whitespace.
pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let word = &input[start..i];
        let kind = classify(word).ok_or_else(|| {
            ExprError::new(start, format!("unknown token '{word}'"))
        })?;
        out.push(Token {
            kind,
            offset: start,
        });
    }

    Ok(out)
}

fn classify(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "x" => TokenKind::Operand(Operand::X),
        "y" => TokenKind::Operand(Operand::Y),
        "z" => TokenKind::Operand(Operand::Z),

        "abs" => TokenKind::Unary(UnaryOp::Abs),
        "sqrt" => TokenKind::Unary(UnaryOp::Sqrt),
        "not" => TokenKind::Unary(UnaryOp::Not),

        "+" => TokenKind::Binary(BinaryOp::Add),
        "-" => TokenKind::Binary(BinaryOp::Sub),
        "*" => TokenKind::Binary(BinaryOp::Mul),
        "/" => TokenKind::Binary(BinaryOp::Div),
        "pow" => TokenKind::Binary(BinaryOp::Pow),
        "max" => TokenKind::Binary(BinaryOp::Max),
        "min" => TokenKind::Binary(BinaryOp::Min),
        "<" => TokenKind::Binary(BinaryOp::Lt),
        ">" => TokenKind::Binary(BinaryOp::Gt),
        "<=" => TokenKind::Binary(BinaryOp::Le),
        ">=" => TokenKind::Binary(BinaryOp::Ge),
        "=" => TokenKind::Binary(BinaryOp::Eq),
        "and" => TokenKind::Binary(BinaryOp::And),
        "or" => TokenKind::Binary(BinaryOp::Or),

        "?" => TokenKind::Question,

        _ => return parse_number(word).map(TokenKind::Number),
    };
    Some(kind)
}

fn parse_number(word: &str) -> Option<f64> {
    // Rust's float parser also accepts "inf"/"nan"; the host grammar does not.
    let first = word.as_bytes().first()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    word.parse::<f64>().ok().filter(|v| v.is_finite())
}
