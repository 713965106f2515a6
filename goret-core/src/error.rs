#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use goret_ast::Span;
use goret_parse::ParseError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ProcessError {
    /// None of the applicable wrappings parsed. Position and source text
    /// refer to the text that was handed to the parser.
    #[error("{filename}:{line}:{column}: {source}")]
    #[diagnostic(code(goret::process))]
    Parse {
        filename: String,
        line: usize,
        column: usize,
        #[source]
        source: ParseError,
        #[source_code]
        text: String,
        #[label("here")]
        span: Span,
    },

    #[error("{filename}: source is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    #[diagnostic(code(goret::process))]
    Encoding { filename: String, valid_up_to: usize },

    #[error(transparent)]
    #[diagnostic(code(goret::process))]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(code(goret::process))]
    Format(#[from] FormatError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("offset {offset} is outside the {len}-byte source")]
    OutOfBounds { offset: usize, len: usize },

    #[error("rendered text no longer carries the fragment {0} it was parsed with")]
    MissingWrapper(&'static str),
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Failed { program: String, stderr: String },

    #[error("{program} produced output that is not valid UTF-8")]
    Encoding { program: String },
}
