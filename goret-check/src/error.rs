#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use goret_ast::Span;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// A return statement's value count disagrees with its signature.
    WrongReturnCount,
    Undefined,
    Redeclared,
}

#[derive(Clone, Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(goret::check))]
#[allow(unused_assignments)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub message: String,
    #[label]
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}
