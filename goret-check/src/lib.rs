#![forbid(unsafe_code)]

//! Declaration-level checking for Go files.
//!
//! Binds every identifier a file uses to the universe, package, file, or
//! local scope that declares it, then uses those bindings to count call
//! results and to flag return statements that disagree with their
//! function's signature.

mod checker;
mod error;
mod object;
mod resolve;

pub use checker::{Analysis, CallResult, Checker, TypeTable};
pub use error::{TypeError, TypeErrorKind};
pub use object::{Object, VarType};
pub use resolve::{resolve_file, Resolution};
