#![forbid(unsafe_code)]

use std::collections::HashMap;

use goret_ast::{
    AssignOp, Ast, Decl, ExprId, ExprKind, Field, File, FuncId, GenDecl, GenKind, Ident, InterfaceElem,
    ReturnId, SigId, Spec, StmtId, StmtKind, TypeId, TypeKind, UnaryOp,
};

use crate::error::{TypeError, TypeErrorKind};
use crate::object::{universe, Object, VarType};

/// Identifier bindings for one file.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub exprs: HashMap<ExprId, Object>,
    pub types: HashMap<TypeId, Object>,
    /// Identifiers no scope declares, in traversal order.
    pub unresolved: Vec<Ident>,
}

impl Resolution {
    pub fn expr(&self, id: ExprId) -> Option<&Object> {
        self.exprs.get(&id)
    }

    pub fn ty(&self, id: TypeId) -> Option<&Object> {
        self.types.get(&id)
    }
}

/// Resolves `file` against its own declarations and imports only.
pub fn resolve_file(file: &File) -> Resolution {
    Resolver::new(file, &[]).run().resolution
}

pub(crate) struct Resolved {
    pub resolution: Resolution,
    /// Every return statement with the signature of its enclosing function.
    pub returns: Vec<(ReturnId, SigId)>,
    /// `(receiver type, method)` to result count, across all files.
    pub methods: HashMap<(String, String), usize>,
    pub diagnostics: Vec<TypeError>,
}

const PACKAGE: usize = 1;
const FILE: usize = 2;

pub(crate) struct Resolver<'a> {
    ast: &'a Ast,
    file: &'a File,
    scopes: Vec<HashMap<String, Object>>,
    dot_import: bool,
    sigs: Vec<SigId>,
    out: Resolved,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(file: &'a File, siblings: &[File]) -> Self {
        let mut r = Self {
            ast: &file.ast,
            file,
            scopes: vec![universe(), HashMap::new(), HashMap::new()],
            dot_import: false,
            sigs: Vec::new(),
            out: Resolved {
                resolution: Resolution::default(),
                returns: Vec::new(),
                methods: HashMap::new(),
                diagnostics: Vec::new(),
            },
        };
        // Siblings first, so a clash is reported against the unit's own declaration.
        for sibling in siblings {
            r.declare_package(sibling, false);
        }
        r.declare_package(file, true);
        r.declare_imports();
        r
    }

    pub(crate) fn run(mut self) -> Resolved {
        let file = self.file;
        for decl in &file.decls {
            match decl {
                Decl::Func(id) => self.walk_func(*id),
                Decl::Gen(g) => self.walk_gen(g, true),
            }
        }
        if !self.dot_import {
            for ident in &self.out.resolution.unresolved {
                self.out.diagnostics.push(TypeError::new(
                    TypeErrorKind::Undefined,
                    format!("undefined: {}", ident.node),
                    ident.span,
                ));
            }
        }
        self.out
    }

    fn declare_package(&mut self, file: &File, report: bool) {
        let ast = &file.ast;
        for decl in &file.decls {
            match decl {
                Decl::Func(id) => {
                    let f = &ast.funcs[*id];
                    let results = ast.sigs[f.sig].arity();
                    match &f.recv {
                        Some(recv) => {
                            if let Some(base) = receiver_base(ast, recv.ty) {
                                self.out
                                    .methods
                                    .insert((base, f.name.node.clone()), results);
                            }
                        }
                        None if f.name.node == "init" => {}
                        None => {
                            self.declare_in(PACKAGE, &f.name, Object::Func { results }, report)
                        }
                    }
                }
                Decl::Gen(g) => {
                    for spec in &g.specs {
                        match spec {
                            Spec::Value(v) => {
                                for (i, name) in v.names.iter().enumerate() {
                                    let obj = match g.kind {
                                        GenKind::Const => Object::Const,
                                        _ => Object::Var {
                                            ty: infer_var_type(ast, v.ty, v.values.get(i).copied()),
                                        },
                                    };
                                    self.declare_in(PACKAGE, name, obj, report);
                                }
                            }
                            Spec::Type(t) => {
                                let obj = Object::TypeName {
                                    name: t.name.node.clone(),
                                };
                                self.declare_in(PACKAGE, &t.name, obj, report);
                            }
                        }
                    }
                }
            }
        }
    }

    fn declare_imports(&mut self) {
        let file = self.file;
        for import in &file.imports {
            if import.is_dot() {
                self.dot_import = true;
                continue;
            }
            let Some(local) = import.local_name() else {
                continue;
            };
            let name = Ident::new(import.span, local.to_string());
            let obj = Object::Package {
                path: import.path.node.clone(),
            };
            self.declare_in(FILE, &name, obj, true);
        }
    }

    fn declare_in(&mut self, scope: usize, name: &Ident, obj: Object, report: bool) {
        if name.node == "_" {
            return;
        }
        let scope = &mut self.scopes[scope];
        if scope.contains_key(&name.node) && report {
            self.out.diagnostics.push(TypeError::new(
                TypeErrorKind::Redeclared,
                format!("{} redeclared in this block", name.node),
                name.span,
            ));
        }
        scope.insert(name.node.clone(), obj);
    }

    fn declare(&mut self, name: &Ident, obj: Object) {
        let top = self.scopes.len() - 1;
        self.declare_in(top, name, obj, true);
    }

    fn lookup(&self, name: &str) -> Option<Object> {
        self.scopes.iter().rev().find_map(|s| s.get(name)).cloned()
    }

    fn in_current_scope(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|s| s.contains_key(name))
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    // ----- declarations -----

    fn walk_func(&mut self, id: FuncId) {
        let ast = self.ast;
        let f = &ast.funcs[id];
        self.push_scope();
        self.declare_type_params(&f.type_params);
        if let Some(recv) = &f.recv {
            // `func (s *S[T]) M()` binds `T` for the method.
            for arg in receiver_type_args(ast, recv.ty) {
                self.declare(arg, Object::TypeParam);
            }
            self.resolve_type(recv.ty);
            let ty = var_type_of(ast, recv.ty);
            for name in &recv.names {
                self.declare(name, Object::Var { ty: ty.clone() });
            }
        }
        self.declare_signature(f.sig);
        if let Some(body) = &f.body {
            self.sigs.push(f.sig);
            self.walk_stmts(&body.stmts);
            self.sigs.pop();
        }
        self.pop_scope();
    }

    fn declare_type_params(&mut self, params: &[Field]) {
        for field in params {
            for name in &field.names {
                self.declare(name, Object::TypeParam);
            }
        }
        for field in params {
            self.resolve_type(field.ty);
        }
    }

    /// Resolves parameter and result types, then binds their names in the current scope.
    fn declare_signature(&mut self, sig: SigId) {
        let ast = self.ast;
        let sig = &ast.sigs[sig];
        for field in sig.params.iter().chain(&sig.results) {
            self.resolve_type(field.ty);
        }
        for field in sig.params.iter().chain(&sig.results) {
            let ty = var_type_of(ast, field.ty);
            for name in &field.names {
                self.declare(name, Object::Var { ty: ty.clone() });
            }
        }
    }

    fn walk_gen(&mut self, g: &GenDecl, top_level: bool) {
        let ast = self.ast;
        for spec in &g.specs {
            match spec {
                Spec::Value(v) => {
                    if let Some(ty) = v.ty {
                        self.resolve_type(ty);
                    }
                    for value in &v.values {
                        self.walk_expr(*value);
                    }
                    if top_level {
                        continue;
                    }
                    for (i, name) in v.names.iter().enumerate() {
                        let obj = match g.kind {
                            GenKind::Const => Object::Const,
                            _ => Object::Var {
                                ty: infer_var_type(ast, v.ty, v.values.get(i).copied()),
                            },
                        };
                        self.declare(name, obj);
                    }
                }
                Spec::Type(t) => {
                    if !top_level {
                        let obj = Object::TypeName {
                            name: t.name.node.clone(),
                        };
                        self.declare(&t.name, obj);
                    }
                    self.push_scope();
                    self.declare_type_params(&t.type_params);
                    self.resolve_type(t.ty);
                    self.pop_scope();
                }
            }
        }
    }

    // ----- statements -----

    fn walk_stmts(&mut self, stmts: &[StmtId]) {
        for stmt in stmts {
            self.walk_stmt(*stmt);
        }
    }

    fn walk_block(&mut self, stmts: &[StmtId]) {
        self.push_scope();
        self.walk_stmts(stmts);
        self.pop_scope();
    }

    fn walk_opt_stmt(&mut self, stmt: Option<StmtId>) {
        if let Some(stmt) = stmt {
            self.walk_stmt(stmt);
        }
    }

    fn walk_opt_expr(&mut self, expr: Option<ExprId>) {
        if let Some(expr) = expr {
            self.walk_expr(expr);
        }
    }

    fn walk_stmt(&mut self, id: StmtId) {
        let ast = self.ast;
        match &ast.stmts[id].kind {
            StmtKind::Empty | StmtKind::Branch { .. } => {}
            StmtKind::Decl(g) => self.walk_gen(g, false),
            StmtKind::Labeled { stmt, .. } => self.walk_stmt(*stmt),
            StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => self.walk_expr(*e),
            StmtKind::Send { chan, value } => {
                self.walk_expr(*chan);
                self.walk_expr(*value);
            }
            StmtKind::IncDec { expr, .. } => self.walk_expr(*expr),
            StmtKind::Assign { lhs, op, rhs } => {
                for e in rhs {
                    self.walk_expr(*e);
                }
                if *op != AssignOp::Define {
                    for e in lhs {
                        self.walk_expr(*e);
                    }
                    return;
                }
                let paired = lhs.len() == rhs.len();
                for (i, e) in lhs.iter().enumerate() {
                    let Some(name) = ident_of(ast, *e) else {
                        self.walk_expr(*e);
                        continue;
                    };
                    if self.in_current_scope(&name.node) {
                        self.walk_expr(*e);
                        continue;
                    }
                    let value = if paired { Some(rhs[i]) } else { None };
                    let obj = Object::Var {
                        ty: infer_var_type(ast, None, value),
                    };
                    self.declare(&name, obj);
                }
            }
            StmtKind::Return(ret) => {
                for e in &ast.returns[*ret].results {
                    self.walk_expr(*e);
                }
                if let Some(sig) = self.sigs.last() {
                    self.out.returns.push((*ret, *sig));
                }
            }
            StmtKind::Block(b) => self.walk_block(&b.stmts),
            StmtKind::If {
                init,
                cond,
                then_block,
                else_stmt,
            } => {
                self.push_scope();
                self.walk_opt_stmt(*init);
                self.walk_expr(*cond);
                self.walk_block(&then_block.stmts);
                self.walk_opt_stmt(*else_stmt);
                self.pop_scope();
            }
            StmtKind::Switch { init, tag, clauses } => {
                self.push_scope();
                self.walk_opt_stmt(*init);
                self.walk_opt_expr(*tag);
                for clause in clauses {
                    for e in &clause.exprs {
                        self.walk_expr(*e);
                    }
                    self.walk_block(&clause.body);
                }
                self.pop_scope();
            }
            StmtKind::TypeSwitch {
                init,
                binding,
                guard,
                clauses,
            } => {
                self.push_scope();
                self.walk_opt_stmt(*init);
                self.walk_expr(*guard);
                for clause in clauses {
                    for e in &clause.exprs {
                        self.walk_expr(*e);
                    }
                    self.push_scope();
                    if let Some(binding) = binding {
                        let ty = match clause.exprs.as_slice() {
                            [single] => expr_as_var_type(ast, *single),
                            _ => None,
                        };
                        self.declare(binding, Object::Var { ty });
                    }
                    self.walk_stmts(&clause.body);
                    self.pop_scope();
                }
                self.pop_scope();
            }
            StmtKind::Select { clauses } => {
                for clause in clauses {
                    self.push_scope();
                    self.walk_opt_stmt(clause.comm);
                    self.walk_stmts(&clause.body);
                    self.pop_scope();
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.push_scope();
                self.walk_opt_stmt(*init);
                self.walk_opt_expr(*cond);
                self.walk_opt_stmt(*post);
                self.walk_block(&body.stmts);
                self.pop_scope();
            }
            StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            } => {
                self.walk_expr(*expr);
                self.push_scope();
                for e in [key, value].into_iter().flatten() {
                    match ident_of(ast, *e) {
                        Some(name) if *define => self.declare(&name, Object::Var { ty: None }),
                        _ => self.walk_expr(*e),
                    }
                }
                self.walk_block(&body.stmts);
                self.pop_scope();
            }
        }
    }

    // ----- expressions -----

    fn walk_expr(&mut self, id: ExprId) {
        let ast = self.ast;
        let expr = &ast.exprs[id];
        match &expr.kind {
            ExprKind::Ident(name) => {
                if name == "_" {
                    return;
                }
                match self.lookup(name) {
                    Some(obj) => {
                        self.out.resolution.exprs.insert(id, obj);
                    }
                    None => {
                        if let Some(span) = expr.span {
                            self.out
                                .resolution
                                .unresolved
                                .push(Ident::new(span, name.clone()));
                        }
                    }
                }
            }
            ExprKind::BasicLit { .. } => {}
            ExprKind::CompositeLit { ty, elems } => {
                if let Some(ty) = ty {
                    self.resolve_type(*ty);
                }
                let keys_are_values = ty.is_some_and(|t| keyed_by_value(ast, t));
                for elem in elems {
                    match &ast.exprs[*elem].kind {
                        ExprKind::KeyValue { key, value } => {
                            if keys_are_values {
                                self.walk_expr(*key);
                            }
                            self.walk_expr(*value);
                        }
                        _ => self.walk_expr(*elem),
                    }
                }
            }
            ExprKind::KeyValue { value, .. } => self.walk_expr(*value),
            ExprKind::FuncLit { sig, body } => {
                self.push_scope();
                self.declare_signature(*sig);
                self.sigs.push(*sig);
                self.walk_stmts(&body.stmts);
                self.sigs.pop();
                self.pop_scope();
            }
            ExprKind::Paren(inner) => self.walk_expr(*inner),
            ExprKind::Selector { base, .. } => self.walk_expr(*base),
            ExprKind::Index { base, indices } => {
                self.walk_expr(*base);
                for e in indices {
                    self.walk_expr(*e);
                }
            }
            ExprKind::Slice { base, lo, hi, max } => {
                self.walk_expr(*base);
                for e in [lo, hi, max].into_iter().flatten() {
                    self.walk_expr(*e);
                }
            }
            ExprKind::TypeAssert { base, ty } => {
                self.walk_expr(*base);
                if let Some(ty) = ty {
                    self.resolve_type(*ty);
                }
            }
            ExprKind::Call { callee, args, .. } => {
                self.walk_expr(*callee);
                for e in args {
                    self.walk_expr(*e);
                }
            }
            ExprKind::Unary { expr, .. } => self.walk_expr(*expr),
            ExprKind::Binary { left, right, .. } => {
                self.walk_expr(*left);
                self.walk_expr(*right);
            }
            ExprKind::Type(ty) => self.resolve_type(*ty),
        }
    }

    fn resolve_type(&mut self, id: TypeId) {
        let ast = self.ast;
        match &ast.types[id].kind {
            TypeKind::Named { pkg, name, args } => {
                match pkg {
                    Some(pkg) => {
                        if self.lookup(&pkg.node).is_none() {
                            self.out.resolution.unresolved.push(pkg.clone());
                        }
                    }
                    None => match self.lookup(&name.node) {
                        Some(obj) => {
                            self.out.resolution.types.insert(id, obj);
                        }
                        None => self.out.resolution.unresolved.push(name.clone()),
                    },
                }
                for arg in args {
                    self.resolve_type(*arg);
                }
            }
            TypeKind::Pointer(t) | TypeKind::Slice(t) | TypeKind::Paren(t) => self.resolve_type(*t),
            TypeKind::Array { len, elem } => {
                self.walk_opt_expr(*len);
                self.resolve_type(*elem);
            }
            TypeKind::Map { key, value } => {
                self.resolve_type(*key);
                self.resolve_type(*value);
            }
            TypeKind::Chan { elem, .. } => self.resolve_type(*elem),
            TypeKind::Func(sig) => self.resolve_signature_types(*sig),
            TypeKind::Struct(fields) => {
                for field in fields {
                    self.resolve_type(field.ty);
                }
            }
            TypeKind::Interface(elems) => {
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { sig, .. } => self.resolve_signature_types(*sig),
                        InterfaceElem::Embed(t) => self.resolve_type(*t),
                    }
                }
            }
            TypeKind::Union(terms) => {
                for term in terms {
                    self.resolve_type(term.ty);
                }
            }
        }
    }

    fn resolve_signature_types(&mut self, sig: SigId) {
        let ast = self.ast;
        let sig = &ast.sigs[sig];
        for field in sig.params.iter().chain(&sig.results) {
            self.resolve_type(field.ty);
        }
    }
}

fn ident_of(ast: &Ast, e: ExprId) -> Option<Ident> {
    let expr = &ast.exprs[e];
    match &expr.kind {
        ExprKind::Ident(name) => Some(Ident::new(expr.span?, name.clone())),
        _ => None,
    }
}

/// Composite literals of these types use keys as values rather than field names.
fn keyed_by_value(ast: &Ast, ty: TypeId) -> bool {
    match &ast.types[ty].kind {
        TypeKind::Map { .. } | TypeKind::Slice(_) | TypeKind::Array { .. } => true,
        TypeKind::Paren(inner) => keyed_by_value(ast, *inner),
        _ => false,
    }
}

fn receiver_base(ast: &Ast, ty: TypeId) -> Option<String> {
    match &ast.types[ty].kind {
        TypeKind::Named { pkg: None, name, .. } => Some(name.node.clone()),
        TypeKind::Pointer(inner) | TypeKind::Paren(inner) => receiver_base(ast, *inner),
        _ => None,
    }
}

fn receiver_type_args(ast: &Ast, ty: TypeId) -> Vec<&Ident> {
    match &ast.types[ty].kind {
        TypeKind::Named { args, .. } => args
            .iter()
            .filter_map(|a| match &ast.types[*a].kind {
                TypeKind::Named {
                    pkg: None,
                    name,
                    args,
                } if args.is_empty() => Some(name),
                _ => None,
            })
            .collect(),
        TypeKind::Pointer(inner) | TypeKind::Paren(inner) => receiver_type_args(ast, *inner),
        _ => Vec::new(),
    }
}

pub(crate) fn var_type_of(ast: &Ast, ty: TypeId) -> Option<VarType> {
    match &ast.types[ty].kind {
        TypeKind::Named { pkg: None, name, .. } => Some(VarType::Named(name.node.clone())),
        TypeKind::Pointer(inner) | TypeKind::Paren(inner) => var_type_of(ast, *inner),
        TypeKind::Func(sig) => Some(VarType::Func {
            results: ast.sigs[*sig].arity(),
        }),
        _ => None,
    }
}

/// A type-switch case written as an expression (`*T`, `T`).
fn expr_as_var_type(ast: &Ast, e: ExprId) -> Option<VarType> {
    match &ast.exprs[e].kind {
        ExprKind::Ident(name) => Some(VarType::Named(name.clone())),
        ExprKind::Unary {
            op: UnaryOp::Deref,
            expr,
        }
        | ExprKind::Paren(expr) => expr_as_var_type(ast, *expr),
        ExprKind::Type(ty) => var_type_of(ast, *ty),
        _ => None,
    }
}

pub(crate) fn infer_var_type(
    ast: &Ast,
    ty: Option<TypeId>,
    value: Option<ExprId>,
) -> Option<VarType> {
    if let Some(ty) = ty {
        return var_type_of(ast, ty);
    }
    let value = value?;
    match &ast.exprs[value].kind {
        ExprKind::CompositeLit { ty: Some(ty), .. } => var_type_of(ast, *ty),
        ExprKind::Unary {
            op: UnaryOp::Addr,
            expr,
        }
        | ExprKind::Paren(expr) => infer_var_type(ast, None, Some(*expr)),
        ExprKind::FuncLit { sig, .. } => Some(VarType::Func {
            results: ast.sigs[*sig].arity(),
        }),
        ExprKind::Call { callee, args, .. } => match (&ast.exprs[*callee].kind, args.as_slice()) {
            (ExprKind::Ident(f), [arg]) if f == "new" => expr_as_var_type(ast, *arg),
            _ => None,
        },
        _ => None,
    }
}
