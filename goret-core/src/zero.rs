#![forbid(unsafe_code)]

use goret_ast::{Ast, ExprId, ExprKind, LitKind, TypeId, TypeKind};
use goret_check::{Object, Resolution};

/// A zero value the synthesizer knows how to spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zero {
    Int,
    Float,
    Imag,
    False,
    EmptyString,
    Nil,
    /// `T{}` for the fixed-size array type `T`.
    Array(TypeId),
}

impl Zero {
    pub fn into_kind(self) -> ExprKind {
        match self {
            Zero::Int => lit(LitKind::Int, "0"),
            Zero::Float => lit(LitKind::Float, "0"),
            Zero::Imag => lit(LitKind::Imag, "0"),
            Zero::EmptyString => lit(LitKind::String, "\"\""),
            Zero::False => ExprKind::Ident("false".to_string()),
            Zero::Nil => ExprKind::Ident("nil".to_string()),
            Zero::Array(ty) => ExprKind::CompositeLit {
                ty: Some(ty),
                elems: Vec::new(),
            },
        }
    }

    /// Allocates the zero value as a synthetic expression.
    pub fn alloc(self, ast: &mut Ast) -> ExprId {
        ast.synthetic_expr(self.into_kind())
    }
}

fn lit(kind: LitKind, raw: &str) -> ExprKind {
    ExprKind::BasicLit {
        kind,
        raw: raw.to_string(),
    }
}

/// The zero value of the declared type `ty`, if its shape alone decides it.
///
/// Names only count when they resolve to the predeclared type: a file that
/// declares its own `int` gets nothing.
pub fn zero_value(ast: &Ast, ty: TypeId, resolution: &Resolution) -> Option<Zero> {
    match &ast.types[ty].kind {
        TypeKind::Named {
            pkg: None, args, ..
        } if args.is_empty() => match resolution.ty(ty)? {
            Object::PredeclaredType(name) => predeclared_zero(name),
            _ => None,
        },
        TypeKind::Pointer(_) | TypeKind::Slice(_) | TypeKind::Interface(_) => Some(Zero::Nil),
        TypeKind::Array { len: Some(_), .. } => Some(Zero::Array(ty)),
        TypeKind::Paren(inner) => zero_value(ast, *inner, resolution),
        _ => None,
    }
}

fn predeclared_zero(name: &str) -> Option<Zero> {
    let zero = match name {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" => Zero::Int,
        "float32" | "float64" => Zero::Float,
        "complex64" | "complex128" => Zero::Imag,
        "bool" => Zero::False,
        "string" => Zero::EmptyString,
        "error" | "any" => Zero::Nil,
        _ => return None,
    };
    Some(zero)
}
