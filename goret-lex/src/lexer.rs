#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use goret_ast::{span, span_between, Span};
use logos::Logos;
use miette::Diagnostic;
use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Diagnostic)]
#[error("lex error: {message}")]
#[diagnostic(code(goret::lex))]
#[allow(unused_assignments)]
pub struct LexError {
    pub message: String,
    #[label]
    pub span: Span,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*")]
    LineComment,
    /// `Some(true)` when the comment spans a line break.
    #[token("/*", block_comment)]
    BlockComment(Option<bool>),

    #[token("break")]
    KwBreak,
    #[token("case")]
    KwCase,
    #[token("chan")]
    KwChan,
    #[token("const")]
    KwConst,
    #[token("continue")]
    KwContinue,
    #[token("default")]
    KwDefault,
    #[token("defer")]
    KwDefer,
    #[token("else")]
    KwElse,
    #[token("fallthrough")]
    KwFallthrough,
    #[token("for")]
    KwFor,
    #[token("func")]
    KwFunc,
    #[token("go")]
    KwGo,
    #[token("goto")]
    KwGoto,
    #[token("if")]
    KwIf,
    #[token("import")]
    KwImport,
    #[token("interface")]
    KwInterface,
    #[token("map")]
    KwMap,
    #[token("package")]
    KwPackage,
    #[token("range")]
    KwRange,
    #[token("return")]
    KwReturn,
    #[token("select")]
    KwSelect,
    #[token("struct")]
    KwStruct,
    #[token("switch")]
    KwSwitch,
    #[token("type")]
    KwType,
    #[token("var")]
    KwVar,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AmpCaret,

    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&^=")]
    AmpCaretEq,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("==")]
    EqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token(":=")]
    Define,
    #[token("...")]
    Ellipsis,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,

    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| check_digits(lex.slice(), 2))]
    #[regex(r"0[bB][01_]+", |lex| check_digits(lex.slice(), 2))]
    #[regex(r"0[oO][0-7_]+", |lex| check_digits(lex.slice(), 2))]
    #[regex(r"[0-9][0-9_]*", |lex| check_digits(lex.slice(), 0))]
    Int(Option<String>),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F_]*(\.[0-9a-fA-F_]*)?[pP][+-]?[0-9_]+", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r"[0-9][0-9_]*i", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?i", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?i", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+i", |lex| lex.slice().to_string())]
    Imag(String),

    #[regex(r"'([^'\\\n]|\\[^\n][^'\n]*)'", |lex| lex.slice().to_string())]
    Char(String),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| lex.slice().to_string())]
    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    String(String),

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

/// Underscores may only separate digits (or follow a base prefix).
fn check_digits(s: &str, prefix_len: usize) -> Option<String> {
    let digits = s.get(prefix_len..)?;
    if digits.is_empty() || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    if prefix_len == 0 && digits.starts_with('_') {
        return None;
    }
    Some(s.to_string())
}

fn block_comment(lex: &mut logos::Lexer<RawToken>) -> Option<bool> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Some(rest[..end].contains('\n'))
        }
        None => {
            lex.bump(rest.len());
            None
        }
    }
}

/// Go tokenizer. Emits the semicolons the language inserts at line ends.
pub struct Lexer<'a> {
    src: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src }
    }

    pub fn lex(&self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut lex = RawToken::lexer(self.src);

        // Whether the last emitted token allows an automatic semicolon.
        let mut semi_eligible = false;

        while let Some(raw) = lex.next() {
            let range = lex.span();
            let tok_span = span_between(range.start, range.end);

            let kind = match raw {
                Ok(RawToken::Newline) | Ok(RawToken::BlockComment(Some(true))) => {
                    if semi_eligible {
                        tokens.push(Token {
                            kind: TokenKind::Semi { newline: true },
                            span: span(range.start, 0),
                        });
                        semi_eligible = false;
                    }
                    continue;
                }
                Ok(RawToken::LineComment) | Ok(RawToken::BlockComment(Some(false))) => continue,
                Ok(RawToken::BlockComment(None)) => {
                    return Err(LexError {
                        message: "comment not terminated".to_string(),
                        span: tok_span,
                    });
                }

                Ok(RawToken::KwBreak) => TokenKind::KwBreak,
                Ok(RawToken::KwCase) => TokenKind::KwCase,
                Ok(RawToken::KwChan) => TokenKind::KwChan,
                Ok(RawToken::KwConst) => TokenKind::KwConst,
                Ok(RawToken::KwContinue) => TokenKind::KwContinue,
                Ok(RawToken::KwDefault) => TokenKind::KwDefault,
                Ok(RawToken::KwDefer) => TokenKind::KwDefer,
                Ok(RawToken::KwElse) => TokenKind::KwElse,
                Ok(RawToken::KwFallthrough) => TokenKind::KwFallthrough,
                Ok(RawToken::KwFor) => TokenKind::KwFor,
                Ok(RawToken::KwFunc) => TokenKind::KwFunc,
                Ok(RawToken::KwGo) => TokenKind::KwGo,
                Ok(RawToken::KwGoto) => TokenKind::KwGoto,
                Ok(RawToken::KwIf) => TokenKind::KwIf,
                Ok(RawToken::KwImport) => TokenKind::KwImport,
                Ok(RawToken::KwInterface) => TokenKind::KwInterface,
                Ok(RawToken::KwMap) => TokenKind::KwMap,
                Ok(RawToken::KwPackage) => TokenKind::KwPackage,
                Ok(RawToken::KwRange) => TokenKind::KwRange,
                Ok(RawToken::KwReturn) => TokenKind::KwReturn,
                Ok(RawToken::KwSelect) => TokenKind::KwSelect,
                Ok(RawToken::KwStruct) => TokenKind::KwStruct,
                Ok(RawToken::KwSwitch) => TokenKind::KwSwitch,
                Ok(RawToken::KwType) => TokenKind::KwType,
                Ok(RawToken::KwVar) => TokenKind::KwVar,

                Ok(RawToken::Plus) => TokenKind::Plus,
                Ok(RawToken::Minus) => TokenKind::Minus,
                Ok(RawToken::Star) => TokenKind::Star,
                Ok(RawToken::Slash) => TokenKind::Slash,
                Ok(RawToken::Percent) => TokenKind::Percent,
                Ok(RawToken::Amp) => TokenKind::Amp,
                Ok(RawToken::Pipe) => TokenKind::Pipe,
                Ok(RawToken::Caret) => TokenKind::Caret,
                Ok(RawToken::Shl) => TokenKind::Shl,
                Ok(RawToken::Shr) => TokenKind::Shr,
                Ok(RawToken::AmpCaret) => TokenKind::AmpCaret,

                Ok(RawToken::PlusEq) => TokenKind::PlusEq,
                Ok(RawToken::MinusEq) => TokenKind::MinusEq,
                Ok(RawToken::StarEq) => TokenKind::StarEq,
                Ok(RawToken::SlashEq) => TokenKind::SlashEq,
                Ok(RawToken::PercentEq) => TokenKind::PercentEq,
                Ok(RawToken::AmpEq) => TokenKind::AmpEq,
                Ok(RawToken::PipeEq) => TokenKind::PipeEq,
                Ok(RawToken::CaretEq) => TokenKind::CaretEq,
                Ok(RawToken::ShlEq) => TokenKind::ShlEq,
                Ok(RawToken::ShrEq) => TokenKind::ShrEq,
                Ok(RawToken::AmpCaretEq) => TokenKind::AmpCaretEq,

                Ok(RawToken::AndAnd) => TokenKind::AndAnd,
                Ok(RawToken::OrOr) => TokenKind::OrOr,
                Ok(RawToken::Arrow) => TokenKind::Arrow,
                Ok(RawToken::Inc) => TokenKind::Inc,
                Ok(RawToken::Dec) => TokenKind::Dec,
                Ok(RawToken::EqEq) => TokenKind::EqEq,
                Ok(RawToken::Lt) => TokenKind::Lt,
                Ok(RawToken::Gt) => TokenKind::Gt,
                Ok(RawToken::Eq) => TokenKind::Eq,
                Ok(RawToken::Bang) => TokenKind::Bang,
                Ok(RawToken::Tilde) => TokenKind::Tilde,
                Ok(RawToken::Neq) => TokenKind::Neq,
                Ok(RawToken::Le) => TokenKind::Le,
                Ok(RawToken::Ge) => TokenKind::Ge,
                Ok(RawToken::Define) => TokenKind::Define,
                Ok(RawToken::Ellipsis) => TokenKind::Ellipsis,

                Ok(RawToken::LParen) => TokenKind::LParen,
                Ok(RawToken::RParen) => TokenKind::RParen,
                Ok(RawToken::LBracket) => TokenKind::LBracket,
                Ok(RawToken::RBracket) => TokenKind::RBracket,
                Ok(RawToken::LBrace) => TokenKind::LBrace,
                Ok(RawToken::RBrace) => TokenKind::RBrace,
                Ok(RawToken::Comma) => TokenKind::Comma,
                Ok(RawToken::Dot) => TokenKind::Dot,
                Ok(RawToken::Colon) => TokenKind::Colon,
                Ok(RawToken::Semi) => TokenKind::Semi { newline: false },

                Ok(RawToken::Int(Some(s))) => TokenKind::Int(s),
                Ok(RawToken::Int(None)) => {
                    return Err(LexError {
                        message: "'_' must separate successive digits".to_string(),
                        span: tok_span,
                    });
                }
                Ok(RawToken::Float(s)) => TokenKind::Float(s),
                Ok(RawToken::Imag(s)) => TokenKind::Imag(s),
                Ok(RawToken::Char(s)) => TokenKind::Char(s),
                Ok(RawToken::String(s)) => TokenKind::String(s),
                Ok(RawToken::Ident(s)) => TokenKind::Ident(s),

                Err(_) => {
                    return Err(LexError {
                        message: self.describe_invalid(range.start),
                        span: tok_span,
                    });
                }
            };

            semi_eligible = kind.ends_statement();
            tokens.push(Token {
                kind,
                span: tok_span,
            });
        }

        let end = self.src.len();
        if semi_eligible {
            tokens.push(Token {
                kind: TokenKind::Semi { newline: true },
                span: span(end, 0),
            });
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: span(end, 0),
        });

        Ok(tokens)
    }

    fn describe_invalid(&self, at: usize) -> String {
        match self.src[at..].chars().next() {
            Some('"') | Some('`') => "string literal not terminated".to_string(),
            Some('\'') => "rune literal not terminated".to_string(),
            Some(c) => format!("invalid character {c:?}"),
            None => "unexpected end of input".to_string(),
        }
    }
}
