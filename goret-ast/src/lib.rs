#![forbid(unsafe_code)]

mod arena;
mod walk;

pub use arena::{Arena, Id};
pub use walk::Node;

use std::fmt;

use miette::SourceSpan;

pub type Span = SourceSpan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub node: T,
}

impl<T> Spanned<T> {
    pub fn new(span: Span, node: T) -> Self {
        Self { span, node }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            span: self.span,
            node: f(self.node),
        }
    }
}

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

pub fn span_between(start: usize, end: usize) -> Span {
    debug_assert!(end >= start);
    span(start, end - start)
}

pub fn span_end(s: Span) -> usize {
    s.offset() + s.len()
}

pub type Ident = Spanned<String>;

pub type ExprId = Id<Expr>;
pub type TypeId = Id<TypeExpr>;
pub type StmtId = Id<Stmt>;
pub type SigId = Id<Signature>;
pub type FuncId = Id<FuncDecl>;
pub type ReturnId = Id<ReturnStmt>;

/// Node storage for one parsed unit.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    pub exprs: Arena<Expr>,
    pub types: Arena<TypeExpr>,
    pub stmts: Arena<Stmt>,
    pub sigs: Arena<Signature>,
    pub funcs: Arena<FuncDecl>,
    pub returns: Arena<ReturnStmt>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an expression that has no counterpart in the source text.
    pub fn synthetic_expr(&mut self, kind: ExprKind) -> ExprId {
        self.exprs.alloc(Expr { span: None, kind })
    }
}

/// 1-based line and byte column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

/// A parsed Go source file together with the arena that owns its nodes.
#[derive(Clone, Debug)]
pub struct File {
    pub name: String,
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub ast: Ast,
    pub lines: LineIndex,
}

impl File {
    pub fn position(&self, span: Span) -> Position {
        self.lines.position(span.offset())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportSpec {
    pub span: Span,
    /// Explicit local name, including `.` and `_`.
    pub name: Option<Ident>,
    /// Unquoted import path.
    pub path: Spanned<String>,
}

impl ImportSpec {
    /// Name the import binds in file scope, `None` for `_` and `.` imports.
    pub fn local_name(&self) -> Option<&str> {
        if let Some(name) = &self.name {
            return match name.node.as_str() {
                "_" | "." => None,
                n => Some(n),
            };
        }
        let mut segments = self.path.node.rsplit('/');
        let mut last = segments.next().unwrap_or("");
        if is_major_version(last) {
            if let Some(prev) = segments.next() {
                last = prev;
            }
        }
        let last = last.strip_prefix("go-").unwrap_or(last);
        let end = last
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(last.len());
        if end == 0 { None } else { Some(&last[..end]) }
    }

    pub fn is_dot(&self) -> bool {
        self.name.as_ref().is_some_and(|n| n.node == ".")
    }
}

fn is_major_version(seg: &str) -> bool {
    seg.strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Func(FuncId),
    Gen(GenDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenDecl {
    pub span: Span,
    pub kind: GenKind,
    pub specs: Vec<Spec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenKind {
    Const,
    Var,
    Type,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValueSpec {
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: Option<TypeId>,
    pub values: Vec<ExprId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub span: Span,
    pub name: Ident,
    pub type_params: Vec<Field>,
    pub alias: bool,
    pub ty: TypeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub span: Span,
    pub recv: Option<Field>,
    pub name: Ident,
    pub type_params: Vec<Field>,
    pub sig: SigId,
    pub body: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub span: Span,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// One declared result position of a signature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResultSlot<'a> {
    pub name: Option<&'a Ident>,
    pub ty: TypeId,
}

impl ResultSlot<'_> {
    /// The slot's name if a return statement can refer to it.
    pub fn referable_name(&self) -> Option<&str> {
        self.name.map(|n| n.node.as_str()).filter(|n| *n != "_")
    }
}

impl Signature {
    /// Results flattened to one slot per value: `(a, b int)` yields two slots.
    pub fn result_slots(&self) -> Vec<ResultSlot<'_>> {
        let mut slots = Vec::with_capacity(self.results.len());
        for field in &self.results {
            if field.names.is_empty() {
                slots.push(ResultSlot {
                    name: None,
                    ty: field.ty,
                });
            } else {
                slots.extend(field.names.iter().map(|name| ResultSlot {
                    name: Some(name),
                    ty: field.ty,
                }));
            }
        }
        slots
    }

    pub fn arity(&self) -> usize {
        self.results.iter().map(|f| f.names.len().max(1)).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: TypeId,
    pub variadic: bool,
    pub tag: Option<Spanned<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<StmtId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub span: Span,
    pub keyword: Span,
    pub results: Vec<ExprId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Empty,
    Decl(GenDecl),
    Labeled {
        label: Ident,
        stmt: StmtId,
    },
    Expr(ExprId),
    Send {
        chan: ExprId,
        value: ExprId,
    },
    IncDec {
        expr: ExprId,
        inc: bool,
    },
    Assign {
        lhs: Vec<ExprId>,
        op: AssignOp,
        rhs: Vec<ExprId>,
    },
    Go(ExprId),
    Defer(ExprId),
    Return(ReturnId),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<StmtId>,
        cond: ExprId,
        then_block: Block,
        else_stmt: Option<StmtId>,
    },
    Switch {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        clauses: Vec<CaseClause>,
    },
    /// `switch [init;] [binding :=] x.(type) { ... }`; `guard` is the `x.(type)` expression.
    TypeSwitch {
        init: Option<StmtId>,
        binding: Option<Ident>,
        guard: ExprId,
        clauses: Vec<CaseClause>,
    },
    Select {
        clauses: Vec<CommClause>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: Block,
    },
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
        body: Block,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub span: Span,
    /// Empty for `default`.
    pub exprs: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommClause {
    pub span: Span,
    /// `None` for `default`.
    pub comm: Option<StmtId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Op(BinOp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// `None` for expressions synthesized after parsing.
    pub span: Option<Span>,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Ident(String),
    /// Literal exactly as written, quotes and prefixes included.
    BasicLit {
        kind: LitKind,
        raw: String,
    },
    /// `T{...}`; `ty` is `None` for elided element types.
    CompositeLit {
        ty: Option<TypeId>,
        elems: Vec<ExprId>,
    },
    /// `key: value` inside a composite literal.
    KeyValue {
        key: ExprId,
        value: ExprId,
    },
    FuncLit {
        sig: SigId,
        body: Block,
    },
    Paren(ExprId),
    Selector {
        base: ExprId,
        sel: Ident,
    },
    /// Indexing or generic instantiation: `a[i]`, `F[int, string]`.
    Index {
        base: ExprId,
        indices: Vec<ExprId>,
    },
    Slice {
        base: ExprId,
        lo: Option<ExprId>,
        hi: Option<ExprId>,
        max: Option<ExprId>,
    },
    /// `x.(T)`; `ty` is `None` for `x.(type)`.
    TypeAssert {
        base: ExprId,
        ty: Option<TypeId>,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
        ellipsis: bool,
    },
    Unary {
        op: UnaryOp,
        expr: ExprId,
    },
    Binary {
        left: ExprId,
        op: BinOp,
        right: ExprId,
    },
    /// A type literal in operand position (`[]byte(s)`, `make(chan int)`).
    Type(TypeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Complement,
    Deref,
    Addr,
    Recv,
    Tilde,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Complement => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
            UnaryOp::Tilde => "~",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    AndNot,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    And,
    Or,
}

impl BinOp {
    /// Go operator precedence, 1 (`||`) through 5 (multiplicative).
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub | BinOp::BitOr | BinOp::BitXor => 4,
            BinOp::Mul
            | BinOp::Div
            | BinOp::Rem
            | BinOp::Shl
            | BinOp::Shr
            | BinOp::BitAnd
            | BinOp::AndNot => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::AndNot => "&^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// `Name`, `pkg.Name`, `Name[T]`.
    Named {
        pkg: Option<Ident>,
        name: Ident,
        args: Vec<TypeId>,
    },
    Pointer(TypeId),
    /// `[N]T`; `len` is `None` for `[...]T`.
    Array {
        len: Option<ExprId>,
        elem: TypeId,
    },
    Slice(TypeId),
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    Func(SigId),
    Struct(Vec<Field>),
    Interface(Vec<InterfaceElem>),
    Paren(TypeId),
    /// Constraint union: `~int | string`.
    Union(Vec<TypeTerm>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InterfaceElem {
    Method { name: Ident, sig: SigId },
    Embed(TypeId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeId,
}
