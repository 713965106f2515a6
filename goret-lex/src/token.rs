#![forbid(unsafe_code)]

use std::fmt;

use goret_ast::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    // Operators / punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AmpCaret,

    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    AmpCaretEq,

    AndAnd,
    OrOr,
    Arrow,
    Inc,
    Dec,
    EqEq,
    Lt,
    Gt,
    Eq,
    Bang,
    Tilde,
    Neq,
    Le,
    Ge,
    Define,
    Ellipsis,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    /// `newline` is set for semicolons inserted at a line break or end of input.
    Semi {
        newline: bool,
    },

    Eof,

    // Literals keep their source text.
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    String(String),
}

impl TokenKind {
    pub fn keyword(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::KwBreak => "break",
            TokenKind::KwCase => "case",
            TokenKind::KwChan => "chan",
            TokenKind::KwConst => "const",
            TokenKind::KwContinue => "continue",
            TokenKind::KwDefault => "default",
            TokenKind::KwDefer => "defer",
            TokenKind::KwElse => "else",
            TokenKind::KwFallthrough => "fallthrough",
            TokenKind::KwFor => "for",
            TokenKind::KwFunc => "func",
            TokenKind::KwGo => "go",
            TokenKind::KwGoto => "goto",
            TokenKind::KwIf => "if",
            TokenKind::KwImport => "import",
            TokenKind::KwInterface => "interface",
            TokenKind::KwMap => "map",
            TokenKind::KwPackage => "package",
            TokenKind::KwRange => "range",
            TokenKind::KwReturn => "return",
            TokenKind::KwSelect => "select",
            TokenKind::KwStruct => "struct",
            TokenKind::KwSwitch => "switch",
            TokenKind::KwType => "type",
            TokenKind::KwVar => "var",
            _ => return None,
        })
    }

    pub fn punct(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AmpCaret => "&^",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            TokenKind::AmpCaretEq => "&^=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Arrow => "<-",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::EqEq => "==",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "=",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Neq => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Define => ":=",
            TokenKind::Ellipsis => "...",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Semi { .. } => ";",
            _ => return None,
        })
    }

    /// A semicolon is inserted after a line ending in one of these tokens.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::String(_)
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwFallthrough
                | TokenKind::KwReturn
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

/// Renders a token the way parse errors mention it: `'func'`, `newline`, `IDENT x`.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Semi { newline: true } => f.write_str("newline"),
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Ident(s) => write!(f, "IDENT {s}"),
            TokenKind::Int(s) => write!(f, "INT {s}"),
            TokenKind::Float(s) => write!(f, "FLOAT {s}"),
            TokenKind::Imag(s) => write!(f, "IMAG {s}"),
            TokenKind::Char(s) => write!(f, "CHAR {s}"),
            TokenKind::String(s) => write!(f, "STRING {s}"),
            other => {
                let text = other.keyword().or_else(|| other.punct()).unwrap_or("?");
                write!(f, "'{text}'")
            }
        }
    }
}
