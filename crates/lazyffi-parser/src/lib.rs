//! lazyffi host parser: converts a JavaScript token stream into an AST.
//!
//! Used to check that assembled call glue and the runtime prelude are
//! well-formed host code, and to drive the minification lint.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{parse_expression, parse_program, ExprParseResult, ParseResult, Parser};
