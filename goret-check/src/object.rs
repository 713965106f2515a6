#![forbid(unsafe_code)]

use std::collections::HashMap;

/// What an identifier denotes. Objects carry no arena ids so that
/// declarations from sibling files can live in the same scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    /// An imported package, keyed by its local name.
    Package { path: String },
    /// A package-level function.
    Func { results: usize },
    TypeName { name: String },
    TypeParam,
    Var { ty: Option<VarType> },
    Const,
    Builtin(&'static str),
    PredeclaredType(&'static str),
    PredeclaredConst(&'static str),
}

/// The little a variable's declaration tells us about its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarType {
    /// A locally declared named type, pointer indirection stripped.
    Named(String),
    Func { results: usize },
}

impl Object {
    pub fn is_package(&self) -> bool {
        matches!(self, Object::Package { .. })
    }
}

pub(crate) const PREDECLARED_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

const PREDECLARED_CONSTS: &[&str] = &["true", "false", "iota", "nil"];

const BUILTINS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// Builtins whose call is a statement rather than a value.
pub(crate) const VOID_BUILTINS: &[&str] = &["clear", "close", "delete", "panic", "print", "println"];

pub(crate) fn universe() -> HashMap<String, Object> {
    let mut scope = HashMap::new();
    for name in PREDECLARED_TYPES {
        scope.insert(name.to_string(), Object::PredeclaredType(name));
    }
    for name in PREDECLARED_CONSTS {
        scope.insert(name.to_string(), Object::PredeclaredConst(name));
    }
    for name in BUILTINS {
        scope.insert(name.to_string(), Object::Builtin(name));
    }
    scope
}
