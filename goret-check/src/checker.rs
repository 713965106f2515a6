#![forbid(unsafe_code)]

use std::collections::HashMap;

use goret_ast::{ExprId, ExprKind, File, Node};
use tracing::debug;

use crate::error::{TypeError, TypeErrorKind};
use crate::object::{Object, VarType, VOID_BUILTINS};
use crate::resolve::{Resolution, Resolved, Resolver};

/// How many values a call expression produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallResult {
    /// A function call yielding this many values.
    Tuple(usize),
    /// A conversion or value-producing builtin: exactly one value.
    Value,
}

impl CallResult {
    pub fn count(self) -> usize {
        match self {
            CallResult::Tuple(n) => n,
            CallResult::Value => 1,
        }
    }
}

/// Call results the checker could determine, keyed by call expression.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    calls: HashMap<ExprId, CallResult>,
}

impl TypeTable {
    pub fn call_result(&self, call: ExprId) -> Option<CallResult> {
        self.calls.get(&call).copied()
    }

    pub fn insert(&mut self, call: ExprId, result: CallResult) {
        self.calls.insert(call, result);
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub types: TypeTable,
    pub resolution: Resolution,
    /// Sorted by source offset.
    pub diagnostics: Vec<TypeError>,
}

/// A package-level checker over one file and its siblings.
///
/// It knows declarations, not types: calls are counted from what the
/// callee's declaration says, and anything that needs real inference
/// (imported functions, method values on interfaces) stays unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct Checker;

impl Checker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, unit: &File, siblings: &[File]) -> Analysis {
        let resolved = Resolver::new(unit, siblings).run();
        let types = classify_calls(unit, &resolved);
        let Resolved {
            resolution,
            returns,
            mut diagnostics,
            ..
        } = resolved;

        let ast = &unit.ast;
        for (ret, sig) in returns {
            let ret = &ast.returns[ret];
            let sig = &ast.sigs[sig];
            let want = sig.arity();
            let have = ret.results.len();
            if have == want {
                continue;
            }
            if have == 0 && sig.result_slots().iter().all(|s| s.name.is_some()) {
                continue;
            }
            if let [single] = ret.results.as_slice() {
                if types.call_result(*single) == Some(CallResult::Tuple(want)) {
                    continue;
                }
            }
            diagnostics.push(TypeError::new(
                TypeErrorKind::WrongReturnCount,
                format!("wrong number of return values (have {have}, want {want})"),
                ret.span,
            ));
        }
        diagnostics.sort_by_key(|d| d.span.offset());

        debug!(
            file = %unit.name,
            calls = types.len(),
            diagnostics = diagnostics.len(),
            "checked"
        );
        Analysis {
            types,
            resolution,
            diagnostics,
        }
    }
}

fn classify_calls(unit: &File, resolved: &Resolved) -> TypeTable {
    let ast = &unit.ast;
    let mut calls = HashMap::new();
    let mut stack = unit.roots();
    stack.reverse();
    let mut children = Vec::new();
    while let Some(node) = stack.pop() {
        if let Node::Expr(id) = node {
            if let ExprKind::Call { callee, .. } = &ast.exprs[id].kind {
                if let Some(result) = callee_result(unit, resolved, *callee) {
                    calls.insert(id, result);
                }
            }
        }
        children.clear();
        ast.children(node, &mut children);
        stack.extend(children.drain(..).rev());
    }
    TypeTable { calls }
}

fn callee_result(unit: &File, resolved: &Resolved, callee: ExprId) -> Option<CallResult> {
    let ast = &unit.ast;
    let objects = &resolved.resolution;
    match &ast.exprs[callee].kind {
        ExprKind::Paren(inner) => callee_result(unit, resolved, *inner),
        // Instantiation: `F[int](x)`.
        ExprKind::Index { base, .. } => callee_result(unit, resolved, *base),
        ExprKind::Ident(_) => match objects.expr(callee)? {
            Object::Func { results } => Some(CallResult::Tuple(*results)),
            Object::Var {
                ty: Some(VarType::Func { results }),
            } => Some(CallResult::Tuple(*results)),
            Object::TypeName { .. } | Object::TypeParam | Object::PredeclaredType(_) => {
                Some(CallResult::Value)
            }
            Object::Builtin(name) if VOID_BUILTINS.contains(name) => Some(CallResult::Tuple(0)),
            Object::Builtin(_) => Some(CallResult::Value),
            _ => None,
        },
        ExprKind::FuncLit { sig, .. } => Some(CallResult::Tuple(ast.sigs[*sig].arity())),
        ExprKind::Type(_) => Some(CallResult::Value),
        ExprKind::Selector { base, sel } => {
            let receiver = match objects.expr(*base)? {
                Object::Var {
                    ty: Some(VarType::Named(name)),
                } => name,
                Object::TypeName { name } => name,
                _ => return None,
            };
            resolved
                .methods
                .get(&(receiver.clone(), sel.node.clone()))
                .map(|n| CallResult::Tuple(*n))
        }
        _ => None,
    }
}
