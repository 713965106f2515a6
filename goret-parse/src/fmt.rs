#![forbid(unsafe_code)]

use goret_ast::{
    Ast, ChanDir, ExprId, ExprKind, Field, InterfaceElem, SigId, TypeId, TypeKind,
};

/// Renders an expression in canonical Go syntax. Function literal bodies are elided.
pub fn format_expr(ast: &Ast, expr: ExprId) -> String {
    let mut out = String::new();
    fmt_expr(&mut out, ast, expr, Prec::Lowest);
    out
}

pub fn format_type(ast: &Ast, ty: TypeId) -> String {
    let mut out = String::new();
    fmt_type(&mut out, ast, ty);
    out
}

/// `(params) results`, without the `func` keyword.
pub fn format_signature(ast: &Ast, sig: SigId) -> String {
    let mut out = String::new();
    fmt_signature(&mut out, ast, sig);
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Lowest,
    Binary(u8),
    Unary,
}

fn fmt_expr(out: &mut String, ast: &Ast, id: ExprId, parent: Prec) {
    match &ast.exprs[id].kind {
        ExprKind::Ident(name) => out.push_str(name),
        ExprKind::BasicLit { raw, .. } => out.push_str(raw),
        ExprKind::CompositeLit { ty, elems } => {
            if let Some(ty) = ty {
                fmt_type(out, ast, *ty);
            }
            out.push('{');
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                fmt_expr(out, ast, *e, Prec::Lowest);
            }
            out.push('}');
        }
        ExprKind::KeyValue { key, value } => {
            fmt_expr(out, ast, *key, Prec::Lowest);
            out.push_str(": ");
            fmt_expr(out, ast, *value, Prec::Lowest);
        }
        ExprKind::FuncLit { sig, .. } => {
            out.push_str("func");
            fmt_signature(out, ast, *sig);
            out.push_str(" {...}");
        }
        ExprKind::Paren(inner) => {
            out.push('(');
            fmt_expr(out, ast, *inner, Prec::Lowest);
            out.push(')');
        }
        ExprKind::Selector { base, sel } => {
            fmt_expr(out, ast, *base, Prec::Unary);
            out.push('.');
            out.push_str(&sel.node);
        }
        ExprKind::Index { base, indices } => {
            fmt_expr(out, ast, *base, Prec::Unary);
            out.push('[');
            fmt_list(out, ast, indices);
            out.push(']');
        }
        ExprKind::Slice { base, lo, hi, max } => {
            fmt_expr(out, ast, *base, Prec::Unary);
            out.push('[');
            if let Some(lo) = lo {
                fmt_expr(out, ast, *lo, Prec::Lowest);
            }
            out.push(':');
            if let Some(hi) = hi {
                fmt_expr(out, ast, *hi, Prec::Lowest);
            }
            if let Some(max) = max {
                out.push(':');
                fmt_expr(out, ast, *max, Prec::Lowest);
            }
            out.push(']');
        }
        ExprKind::TypeAssert { base, ty } => {
            fmt_expr(out, ast, *base, Prec::Unary);
            out.push_str(".(");
            match ty {
                Some(ty) => fmt_type(out, ast, *ty),
                None => out.push_str("type"),
            }
            out.push(')');
        }
        ExprKind::Call {
            callee,
            args,
            ellipsis,
        } => {
            fmt_expr(out, ast, *callee, Prec::Unary);
            out.push('(');
            fmt_list(out, ast, args);
            if *ellipsis {
                out.push_str("...");
            }
            out.push(')');
        }
        ExprKind::Unary { op, expr } => {
            out.push_str(op.as_str());
            fmt_expr(out, ast, *expr, Prec::Unary);
        }
        ExprKind::Binary { left, op, right } => {
            let prec = Prec::Binary(op.precedence());
            let wrap = parent > prec;
            if wrap {
                out.push('(');
            }
            fmt_expr(out, ast, *left, prec);
            out.push(' ');
            out.push_str(op.as_str());
            out.push(' ');
            fmt_expr(out, ast, *right, Prec::Binary(op.precedence() + 1));
            if wrap {
                out.push(')');
            }
        }
        ExprKind::Type(ty) => fmt_type(out, ast, *ty),
    }
}

fn fmt_list(out: &mut String, ast: &Ast, exprs: &[ExprId]) {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        fmt_expr(out, ast, *e, Prec::Lowest);
    }
}

fn fmt_type(out: &mut String, ast: &Ast, id: TypeId) {
    match &ast.types[id].kind {
        TypeKind::Named { pkg, name, args } => {
            if let Some(pkg) = pkg {
                out.push_str(&pkg.node);
                out.push('.');
            }
            out.push_str(&name.node);
            if !args.is_empty() {
                out.push('[');
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    fmt_type(out, ast, *a);
                }
                out.push(']');
            }
        }
        TypeKind::Pointer(elem) => {
            out.push('*');
            fmt_type(out, ast, *elem);
        }
        TypeKind::Array { len, elem } => {
            out.push('[');
            match len {
                Some(len) => fmt_expr(out, ast, *len, Prec::Lowest),
                None => out.push_str("..."),
            }
            out.push(']');
            fmt_type(out, ast, *elem);
        }
        TypeKind::Slice(elem) => {
            out.push_str("[]");
            fmt_type(out, ast, *elem);
        }
        TypeKind::Map { key, value } => {
            out.push_str("map[");
            fmt_type(out, ast, *key);
            out.push(']');
            fmt_type(out, ast, *value);
        }
        TypeKind::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            fmt_type(out, ast, *elem);
        }
        TypeKind::Func(sig) => {
            out.push_str("func");
            fmt_signature(out, ast, *sig);
        }
        TypeKind::Struct(fields) => {
            out.push_str("struct{");
            for (i, f) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                fmt_field(out, ast, f);
                if let Some(tag) = &f.tag {
                    out.push(' ');
                    out.push_str(&tag.node);
                }
            }
            out.push('}');
        }
        TypeKind::Interface(elems) => {
            out.push_str("interface{");
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                match elem {
                    InterfaceElem::Method { name, sig } => {
                        out.push_str(&name.node);
                        fmt_signature(out, ast, *sig);
                    }
                    InterfaceElem::Embed(ty) => fmt_type(out, ast, *ty),
                }
            }
            out.push('}');
        }
        TypeKind::Paren(inner) => {
            out.push('(');
            fmt_type(out, ast, *inner);
            out.push(')');
        }
        TypeKind::Union(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                fmt_type(out, ast, term.ty);
            }
        }
    }
}

fn fmt_field(out: &mut String, ast: &Ast, field: &Field) {
    for (i, name) in field.names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&name.node);
    }
    if !field.names.is_empty() {
        out.push(' ');
    }
    if field.variadic {
        out.push_str("...");
    }
    fmt_type(out, ast, field.ty);
}

fn fmt_fields(out: &mut String, ast: &Ast, fields: &[Field]) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        fmt_field(out, ast, f);
    }
}

fn fmt_signature(out: &mut String, ast: &Ast, sig: SigId) {
    let sig = &ast.sigs[sig];
    out.push('(');
    fmt_fields(out, ast, &sig.params);
    out.push(')');
    match sig.results.as_slice() {
        [] => {}
        [single] if single.names.is_empty() => {
            out.push(' ');
            fmt_type(out, ast, single.ty);
        }
        results => {
            out.push_str(" (");
            fmt_fields(out, ast, results);
            out.push(')');
        }
    }
}
