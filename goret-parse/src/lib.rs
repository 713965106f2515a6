#![forbid(unsafe_code)]

mod error;
mod fmt;
mod parser;

use goret_ast::{Ast, ExprId, File};
use goret_lex::{LexError, Lexer};

pub use error::{ParseError, ParseErrorKind};
pub use fmt::{format_expr, format_signature, format_type};
pub use parser::{Parser, MAX_NESTING};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseConfig {
    /// Keep parsing after an error, resynchronizing at the next top-level declaration.
    pub all_errors: bool,
}

pub fn parse_source(name: &str, src: &str) -> Result<File, ParseError> {
    parse_source_with_config(name, src, &ParseConfig::default())
}

pub fn parse_source_with_config(
    name: &str,
    src: &str,
    config: &ParseConfig,
) -> Result<File, ParseError> {
    let tokens = Lexer::new(src).lex().map_err(lex_error)?;
    Parser::new_with_config(&tokens, config).parse_file(name, src)
}

pub fn parse_expr(src: &str) -> Result<(Ast, ExprId), ParseError> {
    let tokens = Lexer::new(src).lex().map_err(lex_error)?;
    Parser::new(&tokens).parse_expr_eof()
}

fn lex_error(err: LexError) -> ParseError {
    ParseError::syntax(err.message, err.span)
}
