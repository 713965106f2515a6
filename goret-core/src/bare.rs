#![forbid(unsafe_code)]

use goret_ast::{Ast, ExprKind};

use crate::collect::Binding;

/// Rewrites bare returns in functions whose results are all named into
/// explicit returns of those names. Returns how many were rewritten.
pub fn expand_bare_returns(ast: &mut Ast, binding: &Binding) -> usize {
    let mut rewritten = 0;
    for (ret, sig) in binding.iter() {
        if !ast.returns[ret].results.is_empty() {
            continue;
        }
        let names: Option<Vec<String>> = ast.sigs[sig]
            .result_slots()
            .iter()
            .map(|slot| slot.referable_name().map(str::to_string))
            .collect();
        let Some(names) = names.filter(|n| !n.is_empty()) else {
            continue;
        };
        let values = names
            .into_iter()
            .map(|name| ast.synthetic_expr(ExprKind::Ident(name)))
            .collect();
        ast.returns[ret].results = values;
        rewritten += 1;
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use goret_parse::{format_expr, parse_source};

    use super::*;
    use crate::collect::collect_returns;

    fn expand(src: &str) -> (usize, Vec<String>) {
        let mut file = parse_source("b.go", src).expect("source should parse");
        let binding = collect_returns(&file);
        let n = expand_bare_returns(&mut file.ast, &binding);
        let got = binding
            .iter()
            .map(|(ret, _)| {
                file.ast.returns[ret]
                    .results
                    .iter()
                    .map(|e| format_expr(&file.ast, *e))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();
        (n, got)
    }

    #[test]
    fn named_results_are_spelled_out() {
        let (n, got) = expand("package p\nfunc f() (count int, err error) {\n\treturn\n}\n");
        assert_eq!(n, 1);
        assert_eq!(got, vec!["count, err"]);
    }

    #[test]
    fn grouped_names_expand_in_order() {
        let (_, got) = expand("package p\nfunc f() (a, b int, c string) { return }\n");
        assert_eq!(got, vec!["a, b, c"]);
    }

    #[test]
    fn unnamed_or_blank_results_block_expansion() {
        let src = "package p\nfunc a() (int, error) { return }\nfunc b() (_ int, err error) { return }\nfunc c() { return }\n";
        let (n, got) = expand(src);
        assert_eq!(n, 0);
        assert_eq!(got, vec!["", "", ""]);
    }

    #[test]
    fn returns_with_values_are_untouched() {
        let (n, got) = expand("package p\nfunc f() (n int) { return 3 }\n");
        assert_eq!(n, 0);
        assert_eq!(got, vec!["3"]);
    }
}
