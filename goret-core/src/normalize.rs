#![forbid(unsafe_code)]

use goret_ast::{Decl, File};
use goret_parse::{parse_source_with_config, ParseConfig, ParseError, ParseErrorKind};
use tracing::debug;

use crate::error::RenderError;

/// How the input had to be wrapped before it parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    WholeUnit,
    DeclarationList,
    StatementList,
}

/// Undoes a fragment wrapping on rendered text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unwrap {
    prefix: &'static str,
    suffix: &'static str,
}

impl Unwrap {
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// Strips the synthetic text from `rendered`, then gives the remainder
    /// the leading, trailing, and indentation whitespace of `original`.
    pub fn apply(&self, original: &str, rendered: &str) -> Result<String, RenderError> {
        let body = rendered
            .strip_prefix(self.prefix)
            .ok_or(RenderError::MissingWrapper("prefix"))?;
        let body = body
            .strip_suffix(self.suffix)
            .ok_or(RenderError::MissingWrapper("suffix"))?;
        Ok(match_space(original, &dedent(body)))
    }
}

#[derive(Debug)]
pub struct Normalized {
    pub file: File,
    /// The text `file` was parsed from, wrapping included.
    pub text: String,
    pub mode: WrapMode,
    pub unwrap: Option<Unwrap>,
}

/// The last parse error, with the text it refers to.
#[derive(Debug)]
pub struct ParseFailure {
    pub error: ParseError,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    TryWhole,
    TryDeclarations,
    TryStatements,
}

impl Strategy {
    // Neither prefix contains a newline, so line numbers survive wrapping.
    fn wrapping(self) -> (&'static str, &'static str) {
        match self {
            Strategy::TryWhole => ("", ""),
            Strategy::TryDeclarations => ("package main;", ""),
            // The brace goes on its own line so a trailing `//` comment cannot eat it.
            Strategy::TryStatements => ("package p; func _() {", "\n}"),
        }
    }

    fn mode(self) -> WrapMode {
        match self {
            Strategy::TryWhole => WrapMode::WholeUnit,
            Strategy::TryDeclarations => WrapMode::DeclarationList,
            Strategy::TryStatements => WrapMode::StatementList,
        }
    }

    /// The strategy to fall back to after `self` failed with `err`.
    fn next(self, err: &ParseError, accept_fragments: bool) -> Option<Strategy> {
        match (self, err.kind) {
            (Strategy::TryWhole, ParseErrorKind::ExpectedPackage) if accept_fragments => {
                Some(Strategy::TryDeclarations)
            }
            (Strategy::TryDeclarations, ParseErrorKind::ExpectedDeclaration) => {
                Some(Strategy::TryStatements)
            }
            _ => None,
        }
    }
}

/// Parses `src` as a file, or, with `accept_fragments`, as a declaration or
/// statement list wrapped into one.
pub fn normalize(
    name: &str,
    src: &str,
    accept_fragments: bool,
    config: &ParseConfig,
) -> Result<Normalized, ParseFailure> {
    let mut strategy = Strategy::TryWhole;
    loop {
        let (prefix, suffix) = strategy.wrapping();
        let text = format!("{prefix}{src}{suffix}");
        match parse_source_with_config(name, &text, config) {
            Ok(file) => {
                let (mode, unwrap) = match strategy {
                    Strategy::TryWhole => (WrapMode::WholeUnit, None),
                    // A `func main()` means the snippet is a program: keep the clause.
                    Strategy::TryDeclarations if declares_main(&file) => {
                        (WrapMode::WholeUnit, None)
                    }
                    _ => (strategy.mode(), Some(Unwrap { prefix, suffix })),
                };
                debug!(file = name, ?mode, "parsed");
                return Ok(Normalized {
                    file,
                    text,
                    mode,
                    unwrap,
                });
            }
            Err(error) => match strategy.next(&error, accept_fragments) {
                Some(next) => strategy = next,
                None => return Err(ParseFailure { error, text }),
            },
        }
    }
}

fn declares_main(file: &File) -> bool {
    file.decls.iter().any(|decl| {
        let Decl::Func(id) = decl else {
            return false;
        };
        let f = &file.ast.funcs[*id];
        let sig = &file.ast.sigs[f.sig];
        f.recv.is_none() && f.name.node == "main" && sig.params.is_empty() && sig.results.is_empty()
    })
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// Splits `s` into leading whitespace, content, and trailing whitespace.
fn cut_space(s: &str) -> (&str, &str, &str) {
    let start = s.len() - s.trim_start_matches(is_space).len();
    let end = s.trim_end_matches(is_space).len();
    if start <= end {
        (&s[..start], &s[start..end], &s[end..])
    } else {
        ("", "", s)
    }
}

/// Reformats `src` to sit in the same whitespace context as `original`:
/// the leading blank lines, the first line's indentation (applied to every
/// non-blank line), and the exact trailing whitespace are copied over.
pub fn match_space(original: &str, src: &str) -> String {
    let (before, _, after) = cut_space(original);
    let (before, indent) = match before.rfind('\n') {
        Some(i) => before.split_at(i + 1),
        None => ("", before),
    };
    let (_, src, _) = cut_space(src);

    let mut out = String::with_capacity(before.len() + src.len() + after.len());
    out.push_str(before);
    for line in src.split_inclusive('\n') {
        if !line.starts_with('\n') {
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out.push_str(after);
    out
}

/// Removes the first non-blank line's indentation from every line that carries it.
fn dedent(src: &str) -> String {
    let indent = src
        .split_inclusive('\n')
        .find(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start_matches([' ', '\t']).len()])
        .unwrap_or("");
    if indent.is_empty() {
        return src.to_string();
    }
    src.split_inclusive('\n')
        .map(|line| line.strip_prefix(indent).unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_space_splits_surrounding_whitespace() {
        assert_eq!(cut_space("\n\t x \n"), ("\n\t ", "x", " \n"));
        assert_eq!(cut_space("x"), ("", "x", ""));
        assert_eq!(cut_space(" \n "), ("", "", " \n "));
        assert_eq!(cut_space(""), ("", "", ""));
    }

    #[test]
    fn match_space_copies_blank_lines_and_indentation() {
        let original = "\n\n\tx := 1\n\treturn x\n\n";
        let rendered = "x := 1\nreturn 0, x\n";
        assert_eq!(
            match_space(original, rendered),
            "\n\n\tx := 1\n\treturn 0, x\n\n"
        );
    }

    #[test]
    fn match_space_leaves_blank_lines_unindented() {
        assert_eq!(match_space("  a\n", "a\n\nb"), "  a\n\n  b\n");
    }

    #[test]
    fn dedent_strips_the_leading_indentation() {
        assert_eq!(dedent("\n\t\ta\n\t\t\tb\nc\n"), "\na\n\tb\nc\n");
        assert_eq!(dedent("a\n\tb\n"), "a\n\tb\n");
    }

    #[test]
    fn unwrap_round_trips_a_statement_list() {
        let original = "\tif err != nil {\n\t\treturn err\n\t}\n";
        let unwrap = Unwrap {
            prefix: "package p; func _() {",
            suffix: "\n}",
        };
        let rendered = format!("{}{}{}", unwrap.prefix, original, unwrap.suffix);
        assert_eq!(unwrap.apply(original, &rendered), Ok(original.to_string()));
    }

    #[test]
    fn unwrap_rejects_text_without_its_wrapper() {
        let unwrap = Unwrap {
            prefix: "package main;",
            suffix: "",
        };
        assert_eq!(
            unwrap.apply("x", "package main\nx"),
            Err(RenderError::MissingWrapper("prefix"))
        );
    }

    #[test]
    fn fallback_chain_follows_error_kinds() {
        let cfg = ParseConfig::default();

        let n = normalize("a.go", "package p\n", true, &cfg).expect("whole file");
        assert_eq!(n.mode, WrapMode::WholeUnit);
        assert!(n.unwrap.is_none());

        let n = normalize("a.go", "func f() {}\n", true, &cfg).expect("declarations");
        assert_eq!(n.mode, WrapMode::DeclarationList);
        assert_eq!(n.text, "package main;func f() {}\n");

        let n = normalize("a.go", "x := 1\n_ = x\n", true, &cfg).expect("statements");
        assert_eq!(n.mode, WrapMode::StatementList);
        assert_eq!(n.text, "package p; func _() {x := 1\n_ = x\n\n}");
    }

    #[test]
    fn programs_keep_their_synthesized_package_clause() {
        let n = normalize("a.go", "func main() {}\n", true, &ParseConfig::default())
            .expect("should parse");
        assert_eq!(n.mode, WrapMode::WholeUnit);
        assert!(n.unwrap.is_none());
        assert_eq!(n.file.package.node, "main");
    }

    #[test]
    fn fragments_need_opting_in() {
        let err = normalize("a.go", "func f() {}\n", false, &ParseConfig::default())
            .expect_err("fragment without opt-in");
        assert_eq!(err.error.kind, ParseErrorKind::ExpectedPackage);
        assert_eq!(err.text, "func f() {}\n");
    }

    #[test]
    fn last_error_is_reported_with_its_text() {
        let err = normalize("a.go", "return (\n", true, &ParseConfig::default())
            .expect_err("broken statement list");
        assert_eq!(err.error.kind, ParseErrorKind::Syntax);
        assert!(err.text.starts_with("package p; func _() {"));
    }
}
