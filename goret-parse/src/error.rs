#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use goret_ast::Span;
use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification callers use to pick a fallback parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The unit does not start with a package clause.
    ExpectedPackage,
    /// A top-level token cannot start a declaration.
    ExpectedDeclaration,
    Syntax,
}

#[derive(Clone, Debug, Error, Diagnostic)]
#[error("{message}{}", more_errors(.others))]
#[diagnostic(code(goret::parse))]
#[allow(unused_assignments)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[label]
    pub span: Span,
    /// Further errors collected when parsing with recovery.
    #[related]
    pub others: Vec<ParseError>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            others: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ParseErrorKind::Syntax, message, span)
    }
}

fn more_errors(others: &[ParseError]) -> String {
    match others.len() {
        0 => String::new(),
        1 => " (and 1 more error)".to_string(),
        n => format!(" (and {n} more errors)"),
    }
}
