#![forbid(unsafe_code)]

use goret_ast::{Ast, ExprId, ExprKind, ReturnId, SigId};
use goret_check::Resolution;

use crate::analysis::TypeLookup;
use crate::arity::{call_arity, ArityPolicy, CallArity};
use crate::collect::Binding;
use crate::zero::{zero_value, Zero};

/// Left-fills deficient return statements with zero values.
pub struct Completer<'a> {
    resolution: &'a Resolution,
    lookup: Option<&'a dyn TypeLookup>,
    policy: &'a ArityPolicy,
}

impl<'a> Completer<'a> {
    pub fn new(
        resolution: &'a Resolution,
        lookup: Option<&'a dyn TypeLookup>,
        policy: &'a ArityPolicy,
    ) -> Self {
        Self {
            resolution,
            lookup,
            policy,
        }
    }

    /// Rewrites every return in `binding` that can be completed and
    /// returns how many were rewritten.
    pub fn complete(&self, ast: &mut Ast, binding: &Binding) -> usize {
        let mut rewritten = 0;
        for (ret, sig) in binding.iter() {
            let Some(zeros) = self.plan(ast, ret, sig) else {
                continue;
            };
            let mut values: Vec<ExprId> = zeros.into_iter().map(|z| z.alloc(ast)).collect();
            let results = &mut ast.returns[ret].results;
            values.append(results);
            *results = values;
            rewritten += 1;
        }
        rewritten
    }

    /// The zero values to prepend, or `None` to leave the statement alone.
    fn plan(&self, ast: &Ast, ret: ReturnId, sig: SigId) -> Option<Vec<Zero>> {
        let slots = ast.sigs[sig].result_slots();
        let results = &ast.returns[ret].results;
        let (want, have) = (slots.len(), results.len());
        // Bare returns belong to the bare-return pass; excess values stay as written.
        if want == 0 || have == 0 || have >= want {
            return None;
        }
        if let [single] = results.as_slice() {
            if matches!(ast.exprs[*single].kind, ExprKind::Call { .. })
                && call_arity(ast, *single, self.resolution, self.lookup, self.policy)
                    == CallArity::Multi
            {
                return None;
            }
        }
        slots[..want - have]
            .iter()
            .map(|slot| zero_value(ast, slot.ty, self.resolution))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use goret_check::resolve_file;
    use goret_parse::{format_expr, parse_source};

    use super::*;
    use crate::collect::collect_returns;

    /// Completes `src` and renders each return's values.
    fn complete(src: &str) -> (usize, Vec<String>) {
        let mut file = parse_source("c.go", src).expect("source should parse");
        let resolution = resolve_file(&file);
        let binding = collect_returns(&file);
        let policy = ArityPolicy::default();
        let n = Completer::new(&resolution, None, &policy).complete(&mut file.ast, &binding);
        let rendered = binding
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
        (n, rendered)
    }

    #[test]
    fn fills_leading_slots_only() {
        let (n, got) = complete("package p\nfunc f() (int, bool, error) { return true, nil }\n");
        assert_eq!(n, 1);
        assert_eq!(got, vec!["0, true, nil"]);
    }

    #[test]
    fn correct_excess_and_bare_returns_are_left_alone() {
        let src = "package p\nfunc a() (int, error) { return 1, nil }\nfunc b() int { return 1, 2 }\nfunc c() (int, error) { return }\nfunc d() { return }\n";
        let (n, got) = complete(src);
        assert_eq!(n, 0);
        assert_eq!(got, vec!["1, nil", "1, 2", "", ""]);
    }

    #[test]
    fn undeterminable_slot_aborts_the_whole_fill() {
        let (n, got) = complete("package p\ntype T struct{}\nfunc f() (int, T, error) { return nil }\n");
        assert_eq!(n, 0);
        assert_eq!(got, vec!["nil"]);
    }

    #[test]
    fn multi_valued_calls_are_not_padded() {
        let src = "package p\nfunc two() (int, error) { return 0, nil }\nfunc f() (string, int, error) { return two() }\n";
        let (n, got) = complete(src);
        assert_eq!(n, 0);
        assert_eq!(got[1], "two()");
    }

    #[test]
    fn single_valued_calls_are_padded() {
        let src = "package p\nfunc fail() error { return nil }\nfunc f() (string, error) { return fail() }\n";
        let (n, got) = complete(src);
        assert_eq!(n, 1);
        assert_eq!(got[1], "\"\", fail()");
    }

    #[test]
    fn a_call_among_several_values_does_not_need_resolving() {
        let src = "package p\nimport \"os\"\nfunc f() (int, string, error) { return os.Getpid(), nil }\n";
        let (n, got) = complete(src);
        assert_eq!(n, 1);
        assert_eq!(got, vec!["0, os.Getpid(), nil"]);
    }

    #[test]
    fn named_result_groups_count_each_name() {
        let (n, got) = complete("package p\nfunc f() (a, b int, err error) { return nil }\n");
        assert_eq!(n, 1);
        assert_eq!(got, vec!["0, 0, nil"]);
    }
}
