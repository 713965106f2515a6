#![forbid(unsafe_code)]

use std::mem;

use goret_ast::{
    span, span_between, span_end, AssignOp, Ast, BinOp, Block, BranchKind, CaseClause, ChanDir,
    CommClause, Decl, Expr, ExprId, ExprKind, Field, File, FuncDecl, GenDecl, GenKind, Ident,
    ImportSpec, InterfaceElem, LineIndex, LitKind, ReturnStmt, SigId, Signature, Span, Spanned,
    Spec, Stmt, StmtId, StmtKind, TypeExpr, TypeId, TypeKind, TypeSpec, TypeTerm, UnaryOp,
    ValueSpec,
};
use goret_lex::{Token, TokenKind};

use crate::error::{ParseError, ParseErrorKind};
use crate::ParseConfig;

/// Deepest nesting of expressions, types and blocks the parser descends into.
pub const MAX_NESTING: usize = 100;

pub struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
    config: ParseConfig,
    ast: Ast,
    /// Negative inside control clauses, where `T {` opens a block rather than a literal.
    expr_lev: i32,
    depth: usize,
    eof: Token,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StmtMode {
    Basic,
    LabelOk,
    RangeOk,
}

enum Simple {
    Stmt(StmtId),
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
    },
}

enum ParamItem {
    /// A lone identifier: a parameter name or a type, decided by its neighbours.
    Bare(Ident),
    Named {
        name: Ident,
        ty: TypeId,
        variadic: bool,
    },
    Type {
        ty: TypeId,
        variadic: bool,
        span: Span,
    },
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::new_with_config(tokens, &ParseConfig::default())
    }

    pub fn new_with_config(tokens: &'a [Token], config: &ParseConfig) -> Self {
        let end = tokens.last().map(|t| span_end(t.span)).unwrap_or(0);
        Self {
            tokens,
            idx: 0,
            config: config.clone(),
            ast: Ast::new(),
            expr_lev: 0,
            depth: 0,
            eof: Token {
                kind: TokenKind::Eof,
                span: span(end, 0),
            },
        }
    }

    pub fn parse_file(mut self, name: &str, src: &str) -> Result<File, ParseError> {
        if !self.at(TokenKind::KwPackage) {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedPackage,
                format!("expected 'package', found {}", self.peek_kind()),
                self.peek_span(),
            ));
        }
        self.bump();
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut errors = Vec::new();
        let mut imports = Vec::new();
        while self.at(TokenKind::KwImport) {
            if let Err(err) = self.parse_import_decl(&mut imports) {
                self.recover(err, &mut errors)?;
            }
        }

        let mut decls = Vec::new();
        while !self.at(TokenKind::Eof) {
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(err) => self.recover(err, &mut errors)?,
            }
        }

        if !errors.is_empty() {
            let mut first = errors.remove(0);
            first.others = errors;
            return Err(first);
        }

        Ok(File {
            name: name.to_string(),
            package,
            imports,
            decls,
            ast: self.ast,
            lines: LineIndex::new(src),
        })
    }

    /// Parses a single expression followed by end of input.
    pub fn parse_expr_eof(mut self) -> Result<(Ast, ExprId), ParseError> {
        let expr = self.parse_expr()?;
        if self.at_semi() {
            self.bump();
        }
        if !self.at(TokenKind::Eof) {
            return Err(self.error_expected("EOF"));
        }
        Ok((self.ast, expr))
    }

    fn recover(&mut self, err: ParseError, errors: &mut Vec<ParseError>) -> Result<(), ParseError> {
        if !self.config.all_errors {
            return Err(err);
        }
        errors.push(err);
        self.sync_decl();
        Ok(())
    }

    /// Skips to the next token that can start a top-level declaration.
    fn sync_decl(&mut self) {
        self.expr_lev = 0;
        self.bump();
        while !self.at(TokenKind::Eof) {
            let after_semi = self
                .idx
                .checked_sub(1)
                .and_then(|i| self.tokens.get(i))
                .is_some_and(|t| matches!(t.kind, TokenKind::Semi { .. }));
            let starts_decl = matches!(
                self.peek_kind(),
                TokenKind::KwFunc
                    | TokenKind::KwConst
                    | TokenKind::KwVar
                    | TokenKind::KwType
                    | TokenKind::KwImport
            );
            if after_semi && starts_decl {
                break;
            }
            self.bump();
        }
    }

    // ----- declarations -----

    fn parse_import_decl(&mut self, out: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        self.expect(TokenKind::KwImport)?;
        if self.at(TokenKind::LParen) {
            self.bump();
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                out.push(self.parse_import_spec()?);
                self.expect_semi()?;
            }
            self.expect(TokenKind::RParen)?;
        } else {
            out.push(self.parse_import_spec()?);
        }
        self.expect_semi()
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let start = self.start();
        let name = match self.peek_kind() {
            TokenKind::Ident(_) => Some(self.expect_ident()?),
            TokenKind::Dot => {
                let tok = self.next();
                Some(Ident::new(tok.span, ".".to_string()))
            }
            _ => None,
        };
        let tok = self.peek().clone();
        let TokenKind::String(raw) = tok.kind else {
            return Err(self.error_expected("import path"));
        };
        self.bump();
        let path = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        Ok(ImportSpec {
            span: self.span_from(start),
            name,
            path: Spanned::new(tok.span, path),
        })
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let decl = match self.peek_kind() {
            TokenKind::KwConst | TokenKind::KwVar | TokenKind::KwType => {
                Decl::Gen(self.parse_gen_decl()?)
            }
            TokenKind::KwFunc => Decl::Func(self.parse_func_decl()?),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedDeclaration,
                    format!("expected declaration, found {}", self.peek_kind()),
                    self.peek_span(),
                ));
            }
        };
        if !self.at(TokenKind::Eof) {
            self.expect_semi()?;
        }
        Ok(decl)
    }

    fn parse_gen_decl(&mut self) -> Result<GenDecl, ParseError> {
        let start = self.start();
        let kind = match self.next().kind {
            TokenKind::KwConst => GenKind::Const,
            TokenKind::KwVar => GenKind::Var,
            _ => GenKind::Type,
        };

        let mut specs = Vec::new();
        if self.at(TokenKind::LParen) {
            self.bump();
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                specs.push(self.parse_spec(kind)?);
                self.expect_semi()?;
            }
            self.expect(TokenKind::RParen)?;
        } else {
            specs.push(self.parse_spec(kind)?);
        }

        Ok(GenDecl {
            span: self.span_from(start),
            kind,
            specs,
        })
    }

    fn parse_spec(&mut self, kind: GenKind) -> Result<Spec, ParseError> {
        let start = self.start();
        if kind == GenKind::Type {
            let name = self.expect_ident()?;
            let type_params = if self.at_type_params() {
                self.parse_type_params()?
            } else {
                Vec::new()
            };
            let alias = self.at(TokenKind::Eq);
            if alias {
                self.bump();
            }
            let ty = self.parse_type()?;
            return Ok(Spec::Type(TypeSpec {
                span: self.span_from(start),
                name,
                type_params,
                alias,
                ty,
            }));
        }

        let names = self.parse_ident_list()?;
        let ty = if !self.at(TokenKind::Eq) && !self.at_semi() && !self.at(TokenKind::RParen) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let values = if self.at(TokenKind::Eq) {
            self.bump();
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(Spec::Value(ValueSpec {
            span: self.span_from(start),
            names,
            ty,
            values,
        }))
    }

    /// `type A[T any]` versus `type A [N]T`.
    fn at_type_params(&self) -> bool {
        self.at(TokenKind::LBracket)
            && matches!(self.peek_kind_n(1), TokenKind::Ident(_))
            && matches!(
                self.peek_kind_n(2),
                TokenKind::Ident(_)
                    | TokenKind::Comma
                    | TokenKind::Tilde
                    | TokenKind::KwInterface
                    | TokenKind::KwFunc
                    | TokenKind::KwChan
                    | TokenKind::KwMap
                    | TokenKind::KwStruct
            )
    }

    fn parse_type_params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            let start = self.start();
            let names = self.parse_ident_list()?;
            let ty = self.parse_constraint()?;
            fields.push(Field {
                span: self.span_from(start),
                names,
                ty,
                variadic: false,
                tag: None,
            });
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(TokenKind::RBracket)?;
        Ok(fields)
    }

    /// A type, or a union of `~`-prefixed terms.
    fn parse_constraint(&mut self) -> Result<TypeId, ParseError> {
        let start = self.start();
        let mut terms = Vec::new();
        loop {
            let tilde = self.at(TokenKind::Tilde);
            if tilde {
                self.bump();
            }
            let ty = self.parse_type()?;
            terms.push(TypeTerm { tilde, ty });
            if !self.at(TokenKind::Pipe) {
                break;
            }
            self.bump();
        }
        if terms.len() == 1 && !terms[0].tilde {
            return Ok(terms[0].ty);
        }
        Ok(self.alloc_type(start, TypeKind::Union(terms)))
    }

    fn parse_func_decl(&mut self) -> Result<goret_ast::FuncId, ParseError> {
        let start = self.start();
        self.expect(TokenKind::KwFunc)?;

        let recv = if self.at(TokenKind::LParen) {
            self.parse_params()?.into_iter().next()
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.at(TokenKind::LBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let sig_start = self.start();
        let sig = self.parse_signature(sig_start)?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(self.ast.funcs.alloc(FuncDecl {
            span: self.span_from(start),
            recv,
            name,
            type_params,
            sig,
            body,
        }))
    }

    fn parse_signature(&mut self, start: usize) -> Result<SigId, ParseError> {
        let params = self.parse_params()?;
        let results = if self.at(TokenKind::LParen) {
            self.parse_params()?
        } else if self.at_type_start() {
            let ty_start = self.start();
            let ty = self.parse_type()?;
            vec![Field {
                span: self.span_from(ty_start),
                names: Vec::new(),
                ty,
                variadic: false,
                tag: None,
            }]
        } else {
            Vec::new()
        };
        Ok(self.ast.sigs.alloc(Signature {
            span: self.span_from(start),
            params,
            results,
        }))
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::KwFunc
                | TokenKind::KwMap
                | TokenKind::KwChan
                | TokenKind::KwStruct
                | TokenKind::KwInterface
                | TokenKind::Arrow
        )
    }

    fn parse_params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut items = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            items.push(self.parse_param_item()?);
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(TokenKind::RParen)?;

        let any_named = items.iter().any(|i| matches!(i, ParamItem::Named { .. }));
        let mut fields = Vec::with_capacity(items.len());
        if !any_named {
            for item in items {
                let (ty, variadic, span) = match item {
                    ParamItem::Bare(ident) => {
                        let span = ident.span;
                        let ty = self.ast.types.alloc(TypeExpr {
                            span,
                            kind: TypeKind::Named {
                                pkg: None,
                                name: ident,
                                args: Vec::new(),
                            },
                        });
                        (ty, false, span)
                    }
                    ParamItem::Type { ty, variadic, span }
                    | ParamItem::Named {
                        ty,
                        variadic,
                        name: Ident { span, .. },
                    } => (ty, variadic, span),
                };
                fields.push(Field {
                    span,
                    names: Vec::new(),
                    ty,
                    variadic,
                    tag: None,
                });
            }
            return Ok(fields);
        }

        let mut pending: Vec<Ident> = Vec::new();
        for item in items {
            match item {
                ParamItem::Bare(ident) => pending.push(ident),
                ParamItem::Named { name, ty, variadic } => {
                    pending.push(name);
                    let first = pending[0].span.offset();
                    let end = span_end(self.ast.types[ty].span);
                    fields.push(Field {
                        span: span_between(first, end),
                        names: mem::take(&mut pending),
                        ty,
                        variadic,
                        tag: None,
                    });
                }
                ParamItem::Type { span, .. } => {
                    return Err(ParseError::syntax("mixed named and unnamed parameters", span));
                }
            }
        }
        if let Some(ident) = pending.first() {
            return Err(ParseError::syntax("mixed named and unnamed parameters", ident.span));
        }
        Ok(fields)
    }

    fn parse_param_item(&mut self) -> Result<ParamItem, ParseError> {
        let start = self.start();
        if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            match self.peek_kind_n(1) {
                TokenKind::Comma | TokenKind::RParen => {
                    return Ok(ParamItem::Bare(self.expect_ident()?));
                }
                TokenKind::Dot => {
                    let ty = self.parse_type()?;
                    return Ok(ParamItem::Type {
                        ty,
                        variadic: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::LBracket => {
                    // `T[int]` is a type; `buf []byte` and `a [4]int` are named.
                    let save = self.save();
                    if let Ok(ty) = self.parse_type() {
                        if self.at(TokenKind::Comma) || self.at(TokenKind::RParen) {
                            return Ok(ParamItem::Type {
                                ty,
                                variadic: false,
                                span: self.span_from(start),
                            });
                        }
                    }
                    self.restore(save);
                }
                _ => {}
            }
            let name = self.expect_ident()?;
            let variadic = self.eat(TokenKind::Ellipsis);
            let ty = self.parse_type()?;
            return Ok(ParamItem::Named { name, ty, variadic });
        }

        let variadic = self.eat(TokenKind::Ellipsis);
        let ty = self.parse_type()?;
        Ok(ParamItem::Type {
            ty,
            variadic,
            span: self.span_from(start),
        })
    }

    // ----- types -----

    fn parse_type(&mut self) -> Result<TypeId, ParseError> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> Result<TypeId, ParseError> {
        let start = self.start();
        let kind = match self.peek_kind() {
            TokenKind::Ident(_) => return self.parse_type_name(),
            TokenKind::Star => {
                self.bump();
                TypeKind::Pointer(self.parse_type()?)
            }
            TokenKind::LBracket => {
                self.bump();
                if self.eat(TokenKind::RBracket) {
                    TypeKind::Slice(self.parse_type()?)
                } else if self.at(TokenKind::Ellipsis)
                    && matches!(self.peek_kind_n(1), TokenKind::RBracket)
                {
                    self.bump();
                    self.bump();
                    TypeKind::Array {
                        len: None,
                        elem: self.parse_type()?,
                    }
                } else {
                    self.expr_lev += 1;
                    let len = self.parse_expr()?;
                    self.expr_lev -= 1;
                    self.expect(TokenKind::RBracket)?;
                    TypeKind::Array {
                        len: Some(len),
                        elem: self.parse_type()?,
                    }
                }
            }
            TokenKind::KwMap => {
                self.bump();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                TypeKind::Map { key, value }
            }
            TokenKind::KwChan => {
                self.bump();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                TypeKind::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            TokenKind::Arrow => {
                self.bump();
                self.expect(TokenKind::KwChan)?;
                TypeKind::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            TokenKind::KwFunc => {
                self.bump();
                TypeKind::Func(self.parse_signature(start)?)
            }
            TokenKind::KwStruct => TypeKind::Struct(self.parse_struct_fields()?),
            TokenKind::KwInterface => TypeKind::Interface(self.parse_interface_elems()?),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                TypeKind::Paren(inner)
            }
            _ => return Err(self.error_expected("type")),
        };
        Ok(self.alloc_type(start, kind))
    }

    fn parse_type_name(&mut self) -> Result<TypeId, ParseError> {
        let start = self.start();
        let first = self.expect_ident()?;
        let (pkg, name) =
            if self.at(TokenKind::Dot) && matches!(self.peek_kind_n(1), TokenKind::Ident(_)) {
                self.bump();
                (Some(first), self.expect_ident()?)
            } else {
                (None, first)
            };
        let mut args = Vec::new();
        if self.at(TokenKind::LBracket) {
            self.bump();
            self.expr_lev += 1;
            while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
                args.push(self.parse_type()?);
                if !self.at(TokenKind::Comma) {
                    break;
                }
                self.bump();
            }
            self.expr_lev -= 1;
            self.expect(TokenKind::RBracket)?;
            if args.is_empty() {
                return Err(ParseError::syntax("expected type argument list", self.span_from(start)));
            }
        }
        Ok(self.alloc_type(start, TypeKind::Named { pkg, name, args }))
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(TokenKind::KwStruct)?;
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            fields.push(self.parse_struct_field()?);
            self.expect_semi()?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_struct_field(&mut self) -> Result<Field, ParseError> {
        let start = self.start();
        let (names, ty) = match self.peek_kind() {
            TokenKind::Star => {
                self.bump();
                let inner = self.parse_type_name()?;
                (Vec::new(), self.alloc_type(start, TypeKind::Pointer(inner)))
            }
            TokenKind::Ident(_) => match self.peek_kind_n(1) {
                TokenKind::Dot | TokenKind::Semi { .. } | TokenKind::RBrace | TokenKind::String(_) => {
                    (Vec::new(), self.parse_type_name()?)
                }
                TokenKind::LBracket => {
                    let save = self.save();
                    match self.parse_type_name() {
                        Ok(ty)
                            if self.at_semi()
                                || self.at(TokenKind::RBrace)
                                || matches!(self.peek_kind(), TokenKind::String(_)) =>
                        {
                            (Vec::new(), ty)
                        }
                        _ => {
                            self.restore(save);
                            let names = self.parse_ident_list()?;
                            (names, self.parse_type()?)
                        }
                    }
                }
                _ => {
                    let names = self.parse_ident_list()?;
                    (names, self.parse_type()?)
                }
            },
            _ => return Err(self.error_expected("field name or embedded type")),
        };
        let tag = match self.peek().clone() {
            Token {
                kind: TokenKind::String(raw),
                span,
            } => {
                self.bump();
                Some(Spanned::new(span, raw))
            }
            _ => None,
        };
        Ok(Field {
            span: self.span_from(start),
            names,
            ty,
            variadic: false,
            tag,
        })
    }

    fn parse_interface_elems(&mut self) -> Result<Vec<InterfaceElem>, ParseError> {
        self.expect(TokenKind::KwInterface)?;
        self.expect(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if matches!(self.peek_kind(), TokenKind::Ident(_))
                && matches!(self.peek_kind_n(1), TokenKind::LParen)
            {
                let name = self.expect_ident()?;
                let sig_start = self.start();
                let sig = self.parse_signature(sig_start)?;
                elems.push(InterfaceElem::Method { name, sig });
            } else {
                elems.push(InterfaceElem::Embed(self.parse_constraint()?));
            }
            self.expect_semi()?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(elems)
    }

    // ----- statements -----

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(Self::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> Result<Block, ParseError> {
        let start = self.start();
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            span: self.span_from(start),
            stmts,
        })
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<StmtId>, ParseError> {
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace)
            && !self.at(TokenKind::KwCase)
            && !self.at(TokenKind::KwDefault)
            && !self.at(TokenKind::Eof)
        {
            stmts.push(self.parse_stmt()?);
            if self.at_semi() {
                self.bump();
            } else if !self.at(TokenKind::RBrace) {
                return Err(self.error_expected("';'"));
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        let kind = match self.peek_kind() {
            TokenKind::KwConst | TokenKind::KwVar | TokenKind::KwType => {
                StmtKind::Decl(self.parse_gen_decl()?)
            }
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imag(_)
            | TokenKind::Char(_)
            | TokenKind::String(_)
            | TokenKind::KwFunc
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::KwStruct
            | TokenKind::KwMap
            | TokenKind::KwChan
            | TokenKind::KwInterface
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Amp
            | TokenKind::Caret
            | TokenKind::Arrow
            | TokenKind::Bang
            | TokenKind::Tilde => return self.parse_simple_stmt(StmtMode::LabelOk),
            TokenKind::KwGo | TokenKind::KwDefer => {
                let is_go = self.at(TokenKind::KwGo);
                self.bump();
                let call = self.parse_expr()?;
                if !matches!(self.ast.exprs[call].kind, ExprKind::Call { .. }) {
                    let what = if is_go { "go" } else { "defer" };
                    return Err(ParseError::syntax(
                        format!("expression in {what} must be function call"),
                        self.span_from(start),
                    ));
                }
                if is_go {
                    StmtKind::Go(call)
                } else {
                    StmtKind::Defer(call)
                }
            }
            TokenKind::KwReturn => return self.parse_return(),
            TokenKind::KwBreak
            | TokenKind::KwContinue
            | TokenKind::KwGoto
            | TokenKind::KwFallthrough => {
                let kind = match self.next().kind {
                    TokenKind::KwBreak => BranchKind::Break,
                    TokenKind::KwContinue => BranchKind::Continue,
                    TokenKind::KwGoto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label = if kind != BranchKind::Fallthrough
                    && matches!(self.peek_kind(), TokenKind::Ident(_))
                {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                StmtKind::Branch { kind, label }
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::KwIf => return self.parse_if(),
            TokenKind::KwSwitch => return self.parse_switch(),
            TokenKind::KwSelect => return self.parse_select(),
            TokenKind::KwFor => return self.parse_for(),
            TokenKind::Semi { .. } | TokenKind::RBrace => {
                return Ok(self.ast.stmts.alloc(Stmt {
                    span: span(start, 0),
                    kind: StmtKind::Empty,
                }));
            }
            _ => return Err(self.error_expected("statement")),
        };
        Ok(self.alloc_stmt(start, kind))
    }

    fn parse_simple_stmt(&mut self, mode: StmtMode) -> Result<StmtId, ParseError> {
        let start = self.start();
        match self.parse_simple(mode)? {
            Simple::Stmt(id) => Ok(id),
            Simple::Range { .. } => Err(ParseError::syntax(
                "unexpected range clause",
                self.span_from(start),
            )),
        }
    }

    fn parse_simple(&mut self, mode: StmtMode) -> Result<Simple, ParseError> {
        let start = self.start();
        if mode == StmtMode::RangeOk && self.eat(TokenKind::KwRange) {
            let expr = self.parse_expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let lhs = self.parse_expr_list()?;
        let assign = match self.peek_kind() {
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::Eq => Some(AssignOp::Assign),
            other => assign_binop(other).map(AssignOp::Op),
        };
        if let Some(op) = assign {
            self.bump();
            if mode == StmtMode::RangeOk && self.at(TokenKind::KwRange) {
                if matches!(op, AssignOp::Op(_)) || lhs.len() > 2 {
                    return Err(ParseError::syntax(
                        "range clause permits at most two iteration variables",
                        self.span_from(start),
                    ));
                }
                self.bump();
                let expr = self.parse_expr()?;
                return Ok(Simple::Range {
                    key: lhs.first().copied(),
                    value: lhs.get(1).copied(),
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            return Ok(Simple::Stmt(
                self.alloc_stmt(start, StmtKind::Assign { lhs, op, rhs }),
            ));
        }

        let &[first] = lhs.as_slice() else {
            return Err(self.error_expected("':=' or '=' or ','"));
        };

        let kind = match self.peek_kind() {
            TokenKind::Colon if mode == StmtMode::LabelOk => {
                let Some(label) = self.ident_of(first) else {
                    return Err(self.error_expected("label"));
                };
                self.bump();
                let stmt = if self.at(TokenKind::RBrace) {
                    let at = self.start();
                    self.ast.stmts.alloc(Stmt {
                        span: span(at, 0),
                        kind: StmtKind::Empty,
                    })
                } else {
                    self.parse_stmt()?
                };
                StmtKind::Labeled { label, stmt }
            }
            TokenKind::Arrow => {
                self.bump();
                let value = self.parse_expr()?;
                StmtKind::Send { chan: first, value }
            }
            TokenKind::Inc | TokenKind::Dec => {
                let inc = self.at(TokenKind::Inc);
                self.bump();
                StmtKind::IncDec { expr: first, inc }
            }
            _ => StmtKind::Expr(first),
        };
        Ok(Simple::Stmt(self.alloc_stmt(start, kind)))
    }

    fn parse_return(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        let keyword = self.expect(TokenKind::KwReturn)?.span;
        let results = if !self.at_semi() && !self.at(TokenKind::RBrace) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        let ret = self.ast.returns.alloc(ReturnStmt {
            span: self.span_from(start),
            keyword,
            results,
        });
        Ok(self.alloc_stmt(start, StmtKind::Return(ret)))
    }

    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        self.expect(TokenKind::KwIf)?;
        if self.at(TokenKind::LBrace) {
            return Err(ParseError::syntax(
                "missing condition in if statement",
                self.peek_span(),
            ));
        }

        let outer = mem::replace(&mut self.expr_lev, -1);
        let mut init = None;
        if !self.at_semi() {
            init = Some(self.parse_simple_stmt(StmtMode::Basic)?);
        }
        let cond_stmt = if self.at_semi() {
            self.bump();
            if self.at(TokenKind::LBrace) {
                return Err(ParseError::syntax(
                    "missing condition in if statement",
                    self.peek_span(),
                ));
            }
            self.parse_simple_stmt(StmtMode::Basic)?
        } else {
            match init.take() {
                Some(s) => s,
                None => return Err(self.error_expected("condition")),
            }
        };
        self.expr_lev = outer;
        let cond = self.stmt_expr(cond_stmt, "boolean expression")?;

        let then_block = self.parse_block()?;
        let else_stmt = if self.eat(TokenKind::KwElse) {
            match self.peek_kind() {
                TokenKind::KwIf => Some(self.nested(Self::parse_if)?),
                TokenKind::LBrace => {
                    let block_start = self.start();
                    let block = self.parse_block()?;
                    Some(self.alloc_stmt(block_start, StmtKind::Block(block)))
                }
                _ => return Err(self.error_expected("if statement or block")),
            }
        } else {
            None
        };

        Ok(self.alloc_stmt(
            start,
            StmtKind::If {
                init,
                cond,
                then_block,
                else_stmt,
            },
        ))
    }

    fn parse_switch(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        self.expect(TokenKind::KwSwitch)?;

        let outer = mem::replace(&mut self.expr_lev, -1);
        let mut init = None;
        let mut tag_stmt = None;
        if !self.at(TokenKind::LBrace) {
            if !self.at_semi() {
                tag_stmt = Some(self.parse_simple_stmt(StmtMode::Basic)?);
            }
            if self.at_semi() {
                self.bump();
                init = tag_stmt.take();
                if !self.at(TokenKind::LBrace) {
                    tag_stmt = Some(self.parse_simple_stmt(StmtMode::Basic)?);
                }
            }
        }
        self.expr_lev = outer;

        let guard = tag_stmt.and_then(|s| self.type_switch_guard(s));
        let clauses = self.parse_case_clauses()?;

        let kind = match guard {
            Some((binding, guard)) => StmtKind::TypeSwitch {
                init,
                binding,
                guard,
                clauses,
            },
            None => {
                let tag = match tag_stmt {
                    Some(s) => Some(self.stmt_expr(s, "switch expression")?),
                    None => None,
                };
                StmtKind::Switch { init, tag, clauses }
            }
        };
        Ok(self.alloc_stmt(start, kind))
    }

    /// Recognizes `x.(type)` and `v := x.(type)`.
    fn type_switch_guard(&self, stmt: StmtId) -> Option<(Option<Ident>, ExprId)> {
        let is_guard = |e: ExprId| {
            matches!(
                self.ast.exprs[e].kind,
                ExprKind::TypeAssert { ty: None, .. }
            )
        };
        match &self.ast.stmts[stmt].kind {
            StmtKind::Expr(e) if is_guard(*e) => Some((None, *e)),
            StmtKind::Assign {
                lhs,
                op: AssignOp::Define,
                rhs,
            } if lhs.len() == 1 && rhs.len() == 1 && is_guard(rhs[0]) => {
                Some((Some(self.ident_of(lhs[0])?), rhs[0]))
            }
            _ => None,
        }
    }

    fn parse_case_clauses(&mut self) -> Result<Vec<CaseClause>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while self.at(TokenKind::KwCase) || self.at(TokenKind::KwDefault) {
            let start = self.start();
            let exprs = if self.eat(TokenKind::KwCase) {
                self.parse_expr_list()?
            } else {
                self.bump();
                Vec::new()
            };
            self.expect(TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CaseClause {
                span: self.span_from(start),
                exprs,
                body,
            });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(clauses)
    }

    fn parse_select(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        self.expect(TokenKind::KwSelect)?;
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while self.at(TokenKind::KwCase) || self.at(TokenKind::KwDefault) {
            let clause_start = self.start();
            let comm = if self.eat(TokenKind::KwCase) {
                Some(self.parse_simple_stmt(StmtMode::Basic)?)
            } else {
                self.bump();
                None
            };
            self.expect(TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause {
                span: self.span_from(clause_start),
                comm,
                body,
            });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.alloc_stmt(start, StmtKind::Select { clauses }))
    }

    fn parse_for(&mut self) -> Result<StmtId, ParseError> {
        let start = self.start();
        self.expect(TokenKind::KwFor)?;

        let outer = mem::replace(&mut self.expr_lev, -1);
        let mut init = None;
        let mut cond_stmt = None;
        let mut post = None;
        let mut range = None;
        if !self.at(TokenKind::LBrace) {
            if !self.at_semi() {
                match self.parse_simple(StmtMode::RangeOk)? {
                    Simple::Stmt(s) => cond_stmt = Some(s),
                    r @ Simple::Range { .. } => range = Some(r),
                }
            }
            if range.is_none() && self.at_semi() {
                self.bump();
                init = cond_stmt.take();
                if !self.at_semi() {
                    cond_stmt = Some(self.parse_simple_stmt(StmtMode::Basic)?);
                }
                if !self.at_semi() {
                    return Err(self.error_expected("';'"));
                }
                self.bump();
                if !self.at(TokenKind::LBrace) {
                    post = Some(self.parse_simple_stmt(StmtMode::Basic)?);
                }
            }
        }
        self.expr_lev = outer;

        let cond = match cond_stmt {
            Some(s) => Some(self.stmt_expr(s, "for loop condition")?),
            None => None,
        };
        let body = self.parse_block()?;

        let kind = match range {
            Some(Simple::Range {
                key,
                value,
                define,
                expr,
            }) => StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            _ => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
        };
        Ok(self.alloc_stmt(start, kind))
    }

    fn stmt_expr(&self, stmt: StmtId, what: &str) -> Result<ExprId, ParseError> {
        match self.ast.stmts[stmt].kind {
            StmtKind::Expr(e) => Ok(e),
            _ => Err(ParseError::syntax(
                format!("expected {what}"),
                self.ast.stmts[stmt].span,
            )),
        }
    }

    // ----- expressions -----

    fn parse_expr_list(&mut self) -> Result<Vec<ExprId>, ParseError> {
        let mut list = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.nested(|p| p.parse_binary(1))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let start = self.start();
        let mut left = self.parse_unary()?;
        while let Some(op) = binop(self.peek_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_binary(prec + 1)?;
            left = self.alloc_expr(start, ExprKind::Binary { left, op, right });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.start();
        let op = match self.peek_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Caret => UnaryOp::Complement,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Amp => UnaryOp::Addr,
            TokenKind::Arrow if !matches!(self.peek_kind_n(1), TokenKind::KwChan) => UnaryOp::Recv,
            TokenKind::Tilde => UnaryOp::Tilde,
            _ => return self.parse_primary(),
        };
        self.bump();
        let expr = self.nested(Self::parse_unary)?;
        Ok(self.alloc_expr(start, ExprKind::Unary { op, expr }))
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.start();
        let mut x = self.parse_operand()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.bump();
                    match self.peek_kind() {
                        TokenKind::Ident(_) => {
                            let sel = self.expect_ident()?;
                            x = self.alloc_expr(start, ExprKind::Selector { base: x, sel });
                        }
                        TokenKind::LParen => {
                            self.bump();
                            let ty = if self.eat(TokenKind::KwType) {
                                None
                            } else {
                                Some(self.parse_type()?)
                            };
                            self.expect(TokenKind::RParen)?;
                            x = self.alloc_expr(start, ExprKind::TypeAssert { base: x, ty });
                        }
                        _ => return Err(self.error_expected("selector or type assertion")),
                    }
                }
                TokenKind::LBracket => x = self.parse_index_or_slice(start, x)?,
                TokenKind::LParen => x = self.parse_call(start, x)?,
                TokenKind::LBrace => {
                    if !self.starts_composite(x) {
                        break;
                    }
                    let Some(ty) = self.expr_to_type(x) else {
                        break;
                    };
                    x = self.parse_literal_value(start, Some(ty))?;
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_operand(&mut self) -> Result<ExprId, ParseError> {
        let start = self.start();
        let tok = self.peek().clone();
        let kind = match tok.kind {
            TokenKind::Ident(name) => {
                self.bump();
                ExprKind::Ident(name)
            }
            TokenKind::Int(raw) => self.basic_lit(LitKind::Int, raw),
            TokenKind::Float(raw) => self.basic_lit(LitKind::Float, raw),
            TokenKind::Imag(raw) => self.basic_lit(LitKind::Imag, raw),
            TokenKind::Char(raw) => self.basic_lit(LitKind::Char, raw),
            TokenKind::String(raw) => self.basic_lit(LitKind::String, raw),
            TokenKind::LParen => {
                self.bump();
                self.expr_lev += 1;
                let inner = self.parse_expr()?;
                self.expr_lev -= 1;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(inner)
            }
            TokenKind::KwFunc => {
                self.bump();
                let sig = self.parse_signature(start)?;
                if self.at(TokenKind::LBrace) {
                    self.expr_lev += 1;
                    let body = self.parse_block()?;
                    self.expr_lev -= 1;
                    ExprKind::FuncLit { sig, body }
                } else {
                    ExprKind::Type(self.alloc_type(start, TypeKind::Func(sig)))
                }
            }
            TokenKind::LBracket
            | TokenKind::KwStruct
            | TokenKind::KwMap
            | TokenKind::KwChan
            | TokenKind::KwInterface
            | TokenKind::Arrow => ExprKind::Type(self.parse_type()?),
            _ => return Err(self.error_expected("operand")),
        };
        Ok(self.alloc_expr(start, kind))
    }

    fn basic_lit(&mut self, kind: LitKind, raw: String) -> ExprKind {
        self.bump();
        ExprKind::BasicLit { kind, raw }
    }

    fn parse_call(&mut self, start: usize, callee: ExprId) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LParen)?;
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            args.push(self.parse_expr()?);
            if self.eat(TokenKind::Ellipsis) {
                ellipsis = true;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect(TokenKind::RParen)?;
        Ok(self.alloc_expr(
            start,
            ExprKind::Call {
                callee,
                args,
                ellipsis,
            },
        ))
    }

    fn parse_index_or_slice(&mut self, start: usize, base: ExprId) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LBracket)?;
        self.expr_lev += 1;

        let mut parts: [Option<ExprId>; 3] = [None; 3];
        let mut colons = 0usize;
        if !self.at(TokenKind::Colon) {
            parts[0] = Some(self.parse_expr()?);
        }
        let mut indices = Vec::new();
        while self.at(TokenKind::Colon) && colons < 2 {
            self.bump();
            colons += 1;
            if !self.at(TokenKind::Colon) && !self.at(TokenKind::RBracket) {
                parts[colons] = Some(self.parse_expr()?);
            }
        }
        if colons == 0 {
            indices.extend(parts[0]);
            while self.eat(TokenKind::Comma) {
                if self.at(TokenKind::RBracket) {
                    break;
                }
                indices.push(self.parse_expr()?);
            }
        }

        self.expr_lev -= 1;
        self.expect(TokenKind::RBracket)?;

        let kind = if colons == 0 {
            if indices.is_empty() {
                return Err(ParseError::syntax("expected operand", self.span_from(start)));
            }
            ExprKind::Index { base, indices }
        } else {
            let [lo, hi, max] = parts;
            if colons == 2 && (hi.is_none() || max.is_none()) {
                return Err(ParseError::syntax(
                    "middle and final index required in 3-index slice",
                    self.span_from(start),
                ));
            }
            ExprKind::Slice { base, lo, hi, max }
        };
        Ok(self.alloc_expr(start, kind))
    }

    /// Whether a `{` after `x` opens a composite literal.
    fn starts_composite(&self, x: ExprId) -> bool {
        match &self.ast.exprs[x].kind {
            ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::Index { .. } => {
                self.expr_lev >= 0
            }
            ExprKind::Type(ty) => matches!(
                self.ast.types[*ty].kind,
                TypeKind::Array { .. } | TypeKind::Slice(_) | TypeKind::Map { .. } | TypeKind::Struct(_)
            ),
            _ => false,
        }
    }

    /// Reinterprets an operand as the type of a composite literal.
    fn expr_to_type(&mut self, x: ExprId) -> Option<TypeId> {
        let span = self.ast.exprs[x].span?;
        let kind = match self.ast.exprs[x].kind.clone() {
            ExprKind::Type(ty) => return Some(ty),
            ExprKind::Ident(name) => TypeKind::Named {
                pkg: None,
                name: Ident::new(span, name),
                args: Vec::new(),
            },
            ExprKind::Selector { base, sel } => TypeKind::Named {
                pkg: Some(self.ident_of(base)?),
                name: sel,
                args: Vec::new(),
            },
            ExprKind::Index { base, indices } => {
                let base_ty = self.expr_to_type(base)?;
                let TypeKind::Named { pkg, name, .. } = self.ast.types[base_ty].kind.clone() else {
                    return None;
                };
                let mut args = Vec::with_capacity(indices.len());
                for index in indices {
                    args.push(self.expr_to_type(index)?);
                }
                TypeKind::Named { pkg, name, args }
            }
            ExprKind::Unary {
                op: UnaryOp::Deref,
                expr,
            } => TypeKind::Pointer(self.expr_to_type(expr)?),
            ExprKind::Paren(inner) => TypeKind::Paren(self.expr_to_type(inner)?),
            _ => return None,
        };
        Some(self.ast.types.alloc(TypeExpr { span, kind }))
    }

    fn parse_literal_value(&mut self, start: usize, ty: Option<TypeId>) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LBrace)?;
        self.expr_lev += 1;
        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            elems.push(self.parse_element()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        if !self.at(TokenKind::RBrace) {
            return Err(self.error_expected("'}'"));
        }
        self.bump();
        Ok(self.alloc_expr(start, ExprKind::CompositeLit { ty, elems }))
    }

    fn parse_element(&mut self) -> Result<ExprId, ParseError> {
        let start = self.start();
        let key = self.parse_element_value()?;
        if self.eat(TokenKind::Colon) {
            let value = self.parse_element_value()?;
            return Ok(self.alloc_expr(start, ExprKind::KeyValue { key, value }));
        }
        Ok(key)
    }

    fn parse_element_value(&mut self) -> Result<ExprId, ParseError> {
        if self.at(TokenKind::LBrace) {
            let start = self.start();
            return self.nested(|p| p.parse_literal_value(start, None));
        }
        self.parse_expr()
    }

    // ----- helpers -----

    /// Runs `f` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::syntax(
                "exceeded max nesting depth",
                self.peek_span(),
            ));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn ident_of(&self, e: ExprId) -> Option<Ident> {
        let expr = &self.ast.exprs[e];
        match &expr.kind {
            ExprKind::Ident(name) => Some(Ident::new(expr.span?, name.clone())),
            _ => None,
        }
    }

    fn alloc_expr(&mut self, start: usize, kind: ExprKind) -> ExprId {
        let span = self.span_from(start);
        self.ast.exprs.alloc(Expr {
            span: Some(span),
            kind,
        })
    }

    fn alloc_type(&mut self, start: usize, kind: TypeKind) -> TypeId {
        let span = self.span_from(start);
        self.ast.types.alloc(TypeExpr { span, kind })
    }

    fn alloc_stmt(&mut self, start: usize, kind: StmtKind) -> StmtId {
        let span = self.span_from(start);
        self.ast.stmts.alloc(Stmt { span, kind })
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = self.prev_end().max(start);
        span_between(start, end)
    }

    fn prev_end(&self) -> usize {
        self.idx
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| span_end(t.span))
            .unwrap_or(0)
    }

    fn start(&self) -> usize {
        self.peek_span().offset()
    }

    fn error_expected(&self, what: &str) -> ParseError {
        ParseError::syntax(
            format!("expected {what}, found {}", self.peek_kind()),
            self.peek_span(),
        )
    }

    /// Declarations and statements end in `;`, except right before a closing `)` or `}`.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Semi { .. } => {
                self.bump();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace => Ok(()),
            _ => Err(self.error_expected("';'")),
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Ident::new(tok.span, name))
            }
            _ => Err(self.error_expected("'IDENT'")),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.at(expected.clone()) {
            Ok(self.next())
        } else {
            Err(self.error_expected(&expected.to_string()))
        }
    }

    fn save(&self) -> (usize, i32) {
        (self.idx, self.expr_lev)
    }

    /// Backtracks; nodes allocated since `save` stay in the arena unreferenced.
    fn restore(&mut self, (idx, expr_lev): (usize, i32)) {
        self.idx = idx;
        self.expr_lev = expr_lev;
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        mem::discriminant(self.peek_kind()) == mem::discriminant(&kind)
    }

    fn at_semi(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Semi { .. })
    }

    fn next(&mut self) -> Token {
        let tok = self.peek().clone();
        self.bump();
        tok
    }

    fn bump(&mut self) {
        if self.idx < self.tokens.len() {
            self.idx += 1;
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.idx).unwrap_or(&self.eof)
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_kind_n(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.idx + n)
            .map(|t| &t.kind)
            .unwrap_or(&self.eof.kind)
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }
}

fn binop(kind: &TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Rem,
        TokenKind::Amp => BinOp::BitAnd,
        TokenKind::Pipe => BinOp::BitOr,
        TokenKind::Caret => BinOp::BitXor,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
        TokenKind::AmpCaret => BinOp::AndNot,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::Neq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Le => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::Ge => BinOp::Ge,
        TokenKind::AndAnd => BinOp::And,
        TokenKind::OrOr => BinOp::Or,
        _ => return None,
    })
}

fn assign_binop(kind: &TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::PlusEq => BinOp::Add,
        TokenKind::MinusEq => BinOp::Sub,
        TokenKind::StarEq => BinOp::Mul,
        TokenKind::SlashEq => BinOp::Div,
        TokenKind::PercentEq => BinOp::Rem,
        TokenKind::AmpEq => BinOp::BitAnd,
        TokenKind::PipeEq => BinOp::BitOr,
        TokenKind::CaretEq => BinOp::BitXor,
        TokenKind::ShlEq => BinOp::Shl,
        TokenKind::ShrEq => BinOp::Shr,
        TokenKind::AmpCaretEq => BinOp::AndNot,
        _ => return None,
    })
}
