#![forbid(unsafe_code)]

use std::collections::HashSet;

use goret_ast::{Ast, ExprId, ExprKind};
use goret_check::{Object, Resolution, VarType};

use crate::analysis::TypeLookup;

const DEFAULT_SINGLE_RESULT: &[&str] = &["errors.New", "fmt.Errorf"];

/// Qualified calls known to produce exactly one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityPolicy {
    single_result: HashSet<(String, String)>,
}

impl Default for ArityPolicy {
    fn default() -> Self {
        let mut policy = Self::empty();
        for name in DEFAULT_SINGLE_RESULT {
            policy.allow(name);
        }
        policy
    }
}

impl ArityPolicy {
    pub fn empty() -> Self {
        Self {
            single_result: HashSet::new(),
        }
    }

    /// Adds a `pkg.Name` entry. Returns `false` if `qualified` is not of that form.
    pub fn allow(&mut self, qualified: &str) -> bool {
        match split_qualified(qualified) {
            Some((pkg, name)) => {
                self.single_result.insert((pkg.to_string(), name.to_string()));
                true
            }
            None => false,
        }
    }

    pub fn is_single_result(&self, pkg: &str, name: &str) -> bool {
        self.single_result
            .contains(&(pkg.to_string(), name.to_string()))
    }
}

/// Splits `pkg.Name` into its two identifiers.
pub fn split_qualified(qualified: &str) -> Option<(&str, &str)> {
    let (pkg, name) = qualified.split_once('.')?;
    let ident = |s: &str| {
        let mut chars = s.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    };
    (ident(pkg) && ident(name)).then_some((pkg, name))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallArity {
    Single,
    /// Several values, or not known to be one.
    Multi,
}

impl CallArity {
    fn from_count(count: usize) -> Self {
        if count == 1 {
            CallArity::Single
        } else {
            CallArity::Multi
        }
    }
}

/// Decides how many values the call expression `call` yields.
///
/// Semantic information wins when it has an entry; otherwise the callee's
/// shape and the file's own bindings decide, and anything unrecognised
/// counts as multi-valued.
pub fn call_arity(
    ast: &Ast,
    call: ExprId,
    resolution: &Resolution,
    lookup: Option<&dyn TypeLookup>,
    policy: &ArityPolicy,
) -> CallArity {
    if let Some(result) = lookup.and_then(|l| l.call_result(call)) {
        return CallArity::from_count(result.count());
    }
    match &ast.exprs[call].kind {
        ExprKind::Call { callee, .. } => callee_arity(ast, *callee, resolution, policy),
        _ => CallArity::Multi,
    }
}

fn callee_arity(
    ast: &Ast,
    callee: ExprId,
    resolution: &Resolution,
    policy: &ArityPolicy,
) -> CallArity {
    match &ast.exprs[callee].kind {
        ExprKind::Paren(inner) | ExprKind::Index { base: inner, .. } => {
            callee_arity(ast, *inner, resolution, policy)
        }
        ExprKind::Ident(_) => match resolution.expr(callee) {
            Some(Object::Func { results })
            | Some(Object::Var {
                ty: Some(VarType::Func { results }),
            }) => CallArity::from_count(*results),
            Some(Object::TypeName { .. })
            | Some(Object::TypeParam)
            | Some(Object::PredeclaredType(_)) => CallArity::Single,
            _ => CallArity::Multi,
        },
        ExprKind::Type(_) => CallArity::Single,
        ExprKind::FuncLit { sig, .. } => CallArity::from_count(ast.sigs[*sig].arity()),
        ExprKind::Selector { base, sel } => {
            let ExprKind::Ident(pkg) = &ast.exprs[*base].kind else {
                return CallArity::Multi;
            };
            // A local binding named like the package hides it.
            let hidden = resolution.expr(*base).is_some_and(|obj| !obj.is_package());
            if !hidden && policy.is_single_result(pkg, &sel.node) {
                CallArity::Single
            } else {
                CallArity::Multi
            }
        }
        _ => CallArity::Multi,
    }
}
