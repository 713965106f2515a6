#![forbid(unsafe_code)]

mod lexer;
mod token;

pub use lexer::{LexError, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn auto_semi() -> TokenKind {
        TokenKind::Semi { newline: true }
    }

    #[test]
    fn lex_inserts_semicolons_at_line_ends() {
        let got = kinds("return x\n}\n");
        assert_eq!(
            got,
            vec![
                TokenKind::KwReturn,
                TokenKind::Ident("x".into()),
                auto_semi(),
                TokenKind::RBrace,
                auto_semi(),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_no_semicolon_after_operators_or_open_braces() {
        let got = kinds("a +\nb {\n");
        assert_eq!(
            got,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Plus,
                TokenKind::Ident("b".into()),
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_bare_return_gets_semicolon() {
        let got = kinds("return\n");
        assert_eq!(got, vec![TokenKind::KwReturn, auto_semi(), TokenKind::Eof]);
    }

    #[test]
    fn lex_semicolon_at_eof_and_after_line_comment() {
        let got = kinds("x++ // bump");
        assert_eq!(
            got,
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Inc,
                auto_semi(),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_multiline_block_comment_acts_as_newline() {
        let got = kinds("x /* a\nb */ y");
        assert_eq!(
            got,
            vec![
                TokenKind::Ident("x".into()),
                auto_semi(),
                TokenKind::Ident("y".into()),
                auto_semi(),
                TokenKind::Eof,
            ]
        );
        let got = kinds("x /* inline */ + y");
        assert_eq!(got[1], TokenKind::Plus);
    }

    #[test]
    fn lex_number_literals_keep_source_text() {
        let got = kinds("0x_FF 1_000 0b101 1.5 .5 1e9 2i 1.5i 0o7");
        let expected = vec![
            TokenKind::Int("0x_FF".into()),
            TokenKind::Int("1_000".into()),
            TokenKind::Int("0b101".into()),
            TokenKind::Float("1.5".into()),
            TokenKind::Float(".5".into()),
            TokenKind::Float("1e9".into()),
            TokenKind::Imag("2i".into()),
            TokenKind::Imag("1.5i".into()),
            TokenKind::Int("0o7".into()),
            auto_semi(),
            TokenKind::Eof,
        ];
        assert_eq!(got, expected);
    }

    #[test]
    fn lex_rejects_bad_digit_separators() {
        let err = Lexer::new("x := 1__0\n").lex().unwrap_err();
        assert!(err.message.contains("'_' must separate successive digits"));
    }

    #[test]
    fn lex_strings_runes_and_raw_strings() {
        let got = kinds("\"a\\\"b\" 'x' '\\n' `raw\nline`");
        assert_eq!(
            got,
            vec![
                TokenKind::String("\"a\\\"b\"".into()),
                TokenKind::Char("'x'".into()),
                TokenKind::Char("'\\n'".into()),
                TokenKind::String("`raw\nline`".into()),
                auto_semi(),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_compound_operators() {
        let got = kinds("a &^= b <- c := d ...");
        assert_eq!(got[1], TokenKind::AmpCaretEq);
        assert_eq!(got[3], TokenKind::Arrow);
        assert_eq!(got[5], TokenKind::Define);
        assert_eq!(got[7], TokenKind::Ellipsis);
    }

    #[test]
    fn lex_reports_unterminated_string() {
        let err = Lexer::new("s := \"abc\n").lex().unwrap_err();
        assert!(err.message.contains("not terminated"), "{}", err.message);
    }

    #[test]
    fn lex_reports_unterminated_comment() {
        let err = Lexer::new("/* open").lex().unwrap_err();
        assert_eq!(err.message, "comment not terminated");
    }

    #[test]
    fn lex_spans_cover_source_text() {
        let src = "package foo";
        let tokens = Lexer::new(src).lex().unwrap();
        assert_eq!(tokens[1].span.offset(), 8);
        assert_eq!(tokens[1].span.len(), 3);
    }

    #[test]
    fn token_display_matches_parser_messages() {
        assert_eq!(TokenKind::KwFunc.to_string(), "'func'");
        assert_eq!(auto_semi().to_string(), "newline");
        assert_eq!(TokenKind::Ident("x".into()).to_string(), "IDENT x");
        assert_eq!(TokenKind::Semi { newline: false }.to_string(), "';'");
    }
}
