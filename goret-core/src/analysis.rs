#![forbid(unsafe_code)]

use goret_ast::{ExprId, File};
use goret_check::{Analysis, CallResult, Checker, TypeTable};

/// Read-only call information from a semantic pass.
pub trait TypeLookup {
    fn call_result(&self, call: ExprId) -> Option<CallResult>;
}

impl TypeLookup for TypeTable {
    fn call_result(&self, call: ExprId) -> Option<CallResult> {
        TypeTable::call_result(self, call)
    }
}

/// Checks a unit in the context of the other files of its package.
pub trait SemanticAnalyzer {
    fn analyze(&self, unit: &File, siblings: &[File]) -> Analysis;
}

impl SemanticAnalyzer for Checker {
    fn analyze(&self, unit: &File, siblings: &[File]) -> Analysis {
        self.check(unit, siblings)
    }
}
