#![forbid(unsafe_code)]

use crate::{
    Ast, Block, Decl, ExprId, ExprKind, Field, File, FuncId, GenDecl, InterfaceElem, ReturnId,
    SigId, Spec, StmtId, StmtKind, TypeId, TypeKind,
};

/// A handle to any node a traversal can visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Func(FuncId),
    Sig(SigId),
    Stmt(StmtId),
    Expr(ExprId),
    Type(TypeId),
    Return(ReturnId),
}

impl File {
    /// Top-level nodes in declaration order.
    pub fn roots(&self) -> Vec<Node> {
        let mut out = Vec::new();
        for decl in &self.decls {
            match decl {
                Decl::Func(id) => out.push(Node::Func(*id)),
                Decl::Gen(g) => gen_children(g, &mut out),
            }
        }
        out
    }
}

impl Ast {
    /// Pushes the direct children of `node` onto `out`, in source order.
    pub fn children(&self, node: Node, out: &mut Vec<Node>) {
        match node {
            Node::Func(id) => {
                let f = &self.funcs[id];
                if let Some(recv) = &f.recv {
                    field_children(recv, out);
                }
                for tp in &f.type_params {
                    field_children(tp, out);
                }
                out.push(Node::Sig(f.sig));
                if let Some(body) = &f.body {
                    block_children(body, out);
                }
            }
            Node::Sig(id) => {
                let sig = &self.sigs[id];
                for field in sig.params.iter().chain(&sig.results) {
                    field_children(field, out);
                }
            }
            Node::Return(id) => {
                out.extend(self.returns[id].results.iter().map(|e| Node::Expr(*e)));
            }
            Node::Stmt(id) => self.stmt_children(id, out),
            Node::Expr(id) => self.expr_children(id, out),
            Node::Type(id) => self.type_children(id, out),
        }
    }

    fn stmt_children(&self, id: StmtId, out: &mut Vec<Node>) {
        let opt_stmt = |s: &Option<StmtId>, out: &mut Vec<Node>| {
            if let Some(s) = s {
                out.push(Node::Stmt(*s));
            }
        };
        let opt_expr = |e: &Option<ExprId>, out: &mut Vec<Node>| {
            if let Some(e) = e {
                out.push(Node::Expr(*e));
            }
        };

        match &self.stmts[id].kind {
            StmtKind::Empty | StmtKind::Branch { .. } => {}
            StmtKind::Decl(g) => gen_children(g, out),
            StmtKind::Labeled { stmt, .. } => out.push(Node::Stmt(*stmt)),
            StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => out.push(Node::Expr(*e)),
            StmtKind::Send { chan, value } => {
                out.push(Node::Expr(*chan));
                out.push(Node::Expr(*value));
            }
            StmtKind::IncDec { expr, .. } => out.push(Node::Expr(*expr)),
            StmtKind::Assign { lhs, rhs, .. } => {
                out.extend(lhs.iter().chain(rhs).map(|e| Node::Expr(*e)));
            }
            StmtKind::Return(r) => out.push(Node::Return(*r)),
            StmtKind::Block(b) => block_children(b, out),
            StmtKind::If {
                init,
                cond,
                then_block,
                else_stmt,
            } => {
                opt_stmt(init, out);
                out.push(Node::Expr(*cond));
                block_children(then_block, out);
                opt_stmt(else_stmt, out);
            }
            StmtKind::Switch { init, tag, clauses } => {
                opt_stmt(init, out);
                opt_expr(tag, out);
                for c in clauses {
                    out.extend(c.exprs.iter().map(|e| Node::Expr(*e)));
                    out.extend(c.body.iter().map(|s| Node::Stmt(*s)));
                }
            }
            StmtKind::TypeSwitch {
                init,
                guard,
                clauses,
                ..
            } => {
                opt_stmt(init, out);
                out.push(Node::Expr(*guard));
                for c in clauses {
                    out.extend(c.exprs.iter().map(|e| Node::Expr(*e)));
                    out.extend(c.body.iter().map(|s| Node::Stmt(*s)));
                }
            }
            StmtKind::Select { clauses } => {
                for c in clauses {
                    opt_stmt(&c.comm, out);
                    out.extend(c.body.iter().map(|s| Node::Stmt(*s)));
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                opt_stmt(init, out);
                opt_expr(cond, out);
                opt_stmt(post, out);
                block_children(body, out);
            }
            StmtKind::Range {
                key,
                value,
                expr,
                body,
                ..
            } => {
                opt_expr(key, out);
                opt_expr(value, out);
                out.push(Node::Expr(*expr));
                block_children(body, out);
            }
        }
    }

    fn expr_children(&self, id: ExprId, out: &mut Vec<Node>) {
        match &self.exprs[id].kind {
            ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
            ExprKind::CompositeLit { ty, elems } => {
                if let Some(ty) = ty {
                    out.push(Node::Type(*ty));
                }
                out.extend(elems.iter().map(|e| Node::Expr(*e)));
            }
            ExprKind::KeyValue { key, value } => {
                out.push(Node::Expr(*key));
                out.push(Node::Expr(*value));
            }
            ExprKind::FuncLit { sig, body } => {
                out.push(Node::Sig(*sig));
                block_children(body, out);
            }
            ExprKind::Paren(e) => out.push(Node::Expr(*e)),
            ExprKind::Selector { base, .. } => out.push(Node::Expr(*base)),
            ExprKind::Index { base, indices } => {
                out.push(Node::Expr(*base));
                out.extend(indices.iter().map(|e| Node::Expr(*e)));
            }
            ExprKind::Slice { base, lo, hi, max } => {
                out.push(Node::Expr(*base));
                out.extend([lo, hi, max].into_iter().flatten().map(|e| Node::Expr(*e)));
            }
            ExprKind::TypeAssert { base, ty } => {
                out.push(Node::Expr(*base));
                if let Some(ty) = ty {
                    out.push(Node::Type(*ty));
                }
            }
            ExprKind::Call { callee, args, .. } => {
                out.push(Node::Expr(*callee));
                out.extend(args.iter().map(|e| Node::Expr(*e)));
            }
            ExprKind::Unary { expr, .. } => out.push(Node::Expr(*expr)),
            ExprKind::Binary { left, right, .. } => {
                out.push(Node::Expr(*left));
                out.push(Node::Expr(*right));
            }
            ExprKind::Type(ty) => out.push(Node::Type(*ty)),
        }
    }

    fn type_children(&self, id: TypeId, out: &mut Vec<Node>) {
        match &self.types[id].kind {
            TypeKind::Named { args, .. } => out.extend(args.iter().map(|t| Node::Type(*t))),
            TypeKind::Pointer(t) | TypeKind::Slice(t) | TypeKind::Paren(t) => {
                out.push(Node::Type(*t))
            }
            TypeKind::Array { len, elem } => {
                if let Some(len) = len {
                    out.push(Node::Expr(*len));
                }
                out.push(Node::Type(*elem));
            }
            TypeKind::Map { key, value } => {
                out.push(Node::Type(*key));
                out.push(Node::Type(*value));
            }
            TypeKind::Chan { elem, .. } => out.push(Node::Type(*elem)),
            TypeKind::Func(sig) => out.push(Node::Sig(*sig)),
            TypeKind::Struct(fields) => {
                for f in fields {
                    field_children(f, out);
                }
            }
            TypeKind::Interface(elems) => {
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { sig, .. } => out.push(Node::Sig(*sig)),
                        InterfaceElem::Embed(t) => out.push(Node::Type(*t)),
                    }
                }
            }
            TypeKind::Union(terms) => out.extend(terms.iter().map(|t| Node::Type(t.ty))),
        }
    }
}

fn field_children(field: &Field, out: &mut Vec<Node>) {
    out.push(Node::Type(field.ty));
}

fn block_children(block: &Block, out: &mut Vec<Node>) {
    out.extend(block.stmts.iter().map(|s| Node::Stmt(*s)));
}

fn gen_children(g: &GenDecl, out: &mut Vec<Node>) {
    for spec in &g.specs {
        match spec {
            Spec::Value(v) => {
                if let Some(ty) = v.ty {
                    out.push(Node::Type(ty));
                }
                out.extend(v.values.iter().map(|e| Node::Expr(*e)));
            }
            Spec::Type(t) => {
                for tp in &t.type_params {
                    field_children(tp, out);
                }
                out.push(Node::Type(t.ty));
            }
        }
    }
}
