pub(crate) mod ast;
mod emit;
pub(crate) mod error;
mod lexer;
pub(crate) mod parser;
pub(crate) mod vm;

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
