#![forbid(unsafe_code)]

//! Return completion for Go sources.
//!
//! A `return` that supplies fewer values than its function declares gets
//! zero values for the missing leading results, so `return err` in a
//! `(int, error)` function becomes `return 0, err`. Statements whose zero
//! values cannot be read off the declared types are left alone.

mod analysis;
mod arity;
mod bare;
mod collect;
mod complete;
mod error;
mod format;
mod normalize;
mod package;
mod process;
mod render;
mod zero;

pub use analysis::{SemanticAnalyzer, TypeLookup};
pub use arity::{call_arity, split_qualified, ArityPolicy, CallArity};
pub use bare::expand_bare_returns;
pub use collect::{collect_returns, Binding};
pub use complete::Completer;
pub use error::{FormatError, ProcessError, RenderError};
pub use format::{ExternalFormatter, Formatter, Passthrough};
pub use normalize::{match_space, normalize, Normalized, ParseFailure, Unwrap, WrapMode};
pub use package::load_siblings;
pub use process::{process, Options, Processor};
pub use render::{Printer, SpliceRenderer};
pub use zero::{zero_value, Zero};
