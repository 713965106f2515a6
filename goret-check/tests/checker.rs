use goret_ast::{ExprId, ExprKind, File};
use goret_check::{Analysis, CallResult, Checker, TypeErrorKind};
use goret_parse::{format_expr, parse_source};

fn parse(name: &str, src: &str) -> File {
    parse_source(name, src).expect("source should parse")
}

fn check(src: &str) -> (File, Analysis) {
    let file = parse("x.go", src);
    let analysis = Checker::new().check(&file, &[]);
    (file, analysis)
}

/// The first call whose callee renders as `callee`.
fn call(file: &File, callee: &str) -> ExprId {
    file.ast
        .exprs
        .iter()
        .find_map(|(id, e)| match &e.kind {
            ExprKind::Call { callee: c, .. } if format_expr(&file.ast, *c) == callee => Some(id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no call to {callee}"))
}

fn messages(analysis: &Analysis) -> Vec<String> {
    analysis
        .diagnostics
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn local_function_calls_count_their_results() {
    let src = "package p\nfunc two() (int, error) { return 0, nil }\nfunc one() int { return 1 }\nfunc none() {}\nfunc F() (int, error) {\n\tnone()\n\t_ = one()\n\treturn two()\n}\n";
    let (file, analysis) = check(src);
    assert_eq!(analysis.types.call_result(call(&file, "two")), Some(CallResult::Tuple(2)));
    assert_eq!(analysis.types.call_result(call(&file, "one")), Some(CallResult::Tuple(1)));
    assert_eq!(analysis.types.call_result(call(&file, "none")), Some(CallResult::Tuple(0)));
    assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
}

#[test]
fn conversions_and_builtins_yield_one_value() {
    let src = "package p\ntype ID int\nfunc f(s string) {\n\t_ = ID(3)\n\t_ = int(2)\n\t_ = len(s)\n\t_ = []byte(s)\n\tpanic(s)\n}\n";
    let (file, analysis) = check(src);
    for callee in ["ID", "int", "len", "[]byte"] {
        assert_eq!(
            analysis.types.call_result(call(&file, callee)),
            Some(CallResult::Value),
            "call to {callee}"
        );
    }
    assert_eq!(analysis.types.call_result(call(&file, "panic")), Some(CallResult::Tuple(0)));
}

#[test]
fn imported_calls_are_unknown() {
    let src = "package p\nimport \"strconv\"\nfunc f(s string) (int, error) { return strconv.Atoi(s) }\n";
    let (file, analysis) = check(src);
    assert_eq!(analysis.types.call_result(call(&file, "strconv.Atoi")), None);
    assert_eq!(
        messages(&analysis),
        vec!["wrong number of return values (have 1, want 2)"]
    );
}

#[test]
fn method_calls_use_the_receiver_declaration() {
    let src = "package p\ntype S struct{}\nfunc (s *S) Pair() (int, error) { return 0, nil }\nfunc a() (int, error) {\n\tvar s S\n\treturn s.Pair()\n}\nfunc b() (int, error) {\n\tp := &S{}\n\treturn p.Pair()\n}\n";
    let (file, analysis) = check(src);
    assert_eq!(analysis.types.call_result(call(&file, "s.Pair")), Some(CallResult::Tuple(2)));
    assert_eq!(analysis.types.call_result(call(&file, "p.Pair")), Some(CallResult::Tuple(2)));
    assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
}

#[test]
fn function_literals_and_generic_instantiations_are_counted() {
    let src = "package p\nfunc Id[T any](v T) T { return v }\nfunc f() (int, error) {\n\tg := func() (int, error) { return 0, nil }\n\t_ = Id[int](1)\n\treturn g()\n}\n";
    let (file, analysis) = check(src);
    assert_eq!(analysis.types.call_result(call(&file, "g")), Some(CallResult::Tuple(2)));
    assert_eq!(analysis.types.call_result(call(&file, "Id[int]")), Some(CallResult::Tuple(1)));
    assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
}

#[test]
fn short_returns_are_reported() {
    let src = "package p\nimport \"errors\"\nfunc f() (int, string, error) {\n\treturn errors.New(\"x\")\n}\n";
    let (_, analysis) = check(src);
    assert_eq!(analysis.diagnostics.len(), 1);
    let diag = &analysis.diagnostics[0];
    assert_eq!(diag.kind, TypeErrorKind::WrongReturnCount);
    assert_eq!(diag.message, "wrong number of return values (have 1, want 3)");
}

#[test]
fn bare_returns_need_named_results() {
    let src = "package p\nfunc named() (n int, err error) { return }\nfunc unnamed() (int, error) { return }\nfunc void() { return }\n";
    let (_, analysis) = check(src);
    assert_eq!(
        messages(&analysis),
        vec!["wrong number of return values (have 0, want 2)"]
    );
}

#[test]
fn closures_are_checked_against_their_own_signature() {
    let src = "package p\nfunc f() string {\n\tg := func() (int, error) {\n\t\treturn 1\n\t}\n\t_ = g\n\treturn \"\"\n}\n";
    let (_, analysis) = check(src);
    assert_eq!(
        messages(&analysis),
        vec!["wrong number of return values (have 1, want 2)"]
    );
}

#[test]
fn undefined_names_are_reported_unless_dot_imported() {
    let (_, analysis) = check("package p\nfunc f() int { return missing }\n");
    assert_eq!(messages(&analysis), vec!["undefined: missing"]);
    assert_eq!(analysis.diagnostics[0].kind, TypeErrorKind::Undefined);

    let (_, analysis) = check("package p\nimport . \"math\"\nfunc f() float64 { return Pi }\n");
    assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
}

#[test]
fn redeclarations_are_reported() {
    let (_, analysis) = check("package p\nvar a int\nvar a string\nfunc f() {\n\tb := 1\n\tvar b int\n\t_ = b\n}\n");
    assert_eq!(
        messages(&analysis),
        vec!["a redeclared in this block", "b redeclared in this block"]
    );
    assert!(analysis
        .diagnostics
        .iter()
        .all(|d| d.kind == TypeErrorKind::Redeclared));
}

#[test]
fn sibling_files_contribute_package_declarations() {
    let unit = parse("a.go", "package p\nfunc F() (int, error) { return helper() }\n");
    let sibling = parse(
        "b.go",
        "package p\nfunc helper() (int, error) { return 0, nil }\n",
    );

    let alone = Checker::new().check(&unit, &[]);
    assert_eq!(messages(&alone), vec!["wrong number of return values (have 1, want 2)", "undefined: helper"]);

    let together = Checker::new().check(&unit, &[sibling]);
    assert!(together.diagnostics.is_empty(), "{:?}", messages(&together));
    assert_eq!(
        together.types.call_result(call(&unit, "helper")),
        Some(CallResult::Tuple(2))
    );
}

#[test]
fn init_functions_may_repeat() {
    let (_, analysis) = check("package p\nfunc init() {}\nfunc init() {}\n");
    assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
}
