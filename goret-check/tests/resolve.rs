use goret_ast::{ExprKind, File};
use goret_check::{resolve_file, Object, Resolution, VarType};
use goret_parse::parse_source;

fn resolve(src: &str) -> (File, Resolution) {
    let file = parse_source("x.go", src).expect("source should parse");
    let resolution = resolve_file(&file);
    (file, resolution)
}

fn unresolved(resolution: &Resolution) -> Vec<&str> {
    resolution
        .unresolved
        .iter()
        .map(|i| i.node.as_str())
        .collect()
}

/// Objects bound to every use of `name`, in arena order.
fn uses<'a>(file: &File, resolution: &'a Resolution, name: &str) -> Vec<&'a Object> {
    file.ast
        .exprs
        .iter()
        .filter(|(_, e)| matches!(&e.kind, ExprKind::Ident(n) if n == name))
        .filter_map(|(id, _)| resolution.expr(id))
        .collect()
}

#[test]
fn predeclared_names_resolve_to_the_universe() {
    let (file, res) = resolve("package p\nfunc f() bool { return len(\"x\") > 0 && true }\n");
    assert!(unresolved(&res).is_empty());
    assert_eq!(uses(&file, &res, "len"), vec![&Object::Builtin("len")]);
    assert_eq!(uses(&file, &res, "true"), vec![&Object::PredeclaredConst("true")]);
}

#[test]
fn local_declarations_shadow_predeclared_names() {
    let src = "package p\nfunc f() {\n\tint := 3\n\t_ = int\n}\n";
    let (file, res) = resolve(src);
    assert_eq!(uses(&file, &res, "int"), vec![&Object::Var { ty: None }]);
}

#[test]
fn imports_bind_their_local_names() {
    let src = "package p\nimport (\n\t\"net/url\"\n\tyaml \"gopkg.in/yaml.v3\"\n)\nfunc f() {\n\turl.Parse(\"\")\n\tyaml.Marshal(nil)\n}\n";
    let (file, res) = resolve(src);
    assert!(unresolved(&res).is_empty(), "{:?}", unresolved(&res));
    assert_eq!(
        uses(&file, &res, "url"),
        vec![&Object::Package {
            path: "net/url".to_string()
        }]
    );
    assert_eq!(
        uses(&file, &res, "yaml"),
        vec![&Object::Package {
            path: "gopkg.in/yaml.v3".to_string()
        }]
    );
}

#[test]
fn missing_import_is_unresolved() {
    let (_, res) = resolve("package p\nfunc f() error { return errors.New(\"x\") }\n");
    assert_eq!(unresolved(&res), vec!["errors"]);
}

#[test]
fn package_declarations_are_visible_before_their_definition() {
    let src = "package p\nfunc f() T { return g() }\nfunc g() T { return T{} }\ntype T struct{}\n";
    let (file, res) = resolve(src);
    assert!(unresolved(&res).is_empty());
    assert_eq!(uses(&file, &res, "g"), vec![&Object::Func { results: 1 }]);
}

#[test]
fn variables_remember_their_declared_type() {
    let src = "package p\ntype S struct{}\nfunc f(a S, b *S, c func() (int, error)) {\n\td := &S{}\n\tvar e = S{}\n\t_, _, _, _, _ = a, b, c, d, e\n}\n";
    let (file, res) = resolve(src);
    let named = Object::Var {
        ty: Some(VarType::Named("S".to_string())),
    };
    for name in ["a", "b", "d", "e"] {
        assert_eq!(uses(&file, &res, name), vec![&named], "binding of {name}");
    }
    assert_eq!(
        uses(&file, &res, "c"),
        vec![&Object::Var {
            ty: Some(VarType::Func { results: 2 })
        }]
    );
}

#[test]
fn block_scopes_end_with_their_statement() {
    let src = "package p\nfunc f() {\n\tif x := 1; x > 0 {\n\t\t_ = x\n\t}\n\t_ = x\n}\n";
    let (_, res) = resolve(src);
    assert_eq!(unresolved(&res), vec!["x"]);
}

#[test]
fn struct_literal_keys_are_field_names() {
    let src = "package p\ntype T struct{ a int }\nfunc f() {\n\t_ = T{a: 1}\n\t_ = map[string]int{k: 1}\n}\n";
    let (_, res) = resolve(src);
    assert_eq!(unresolved(&res), vec!["k"]);
}

#[test]
fn type_switch_binding_is_scoped_per_clause() {
    let src = "package p\ntype S struct{}\nfunc f(v any) {\n\tswitch x := v.(type) {\n\tcase *S:\n\t\t_ = x\n\tcase int, string:\n\t\t_ = x\n\t}\n}\n";
    let (file, res) = resolve(src);
    assert!(unresolved(&res).is_empty());
    assert_eq!(
        uses(&file, &res, "x"),
        vec![
            &Object::Var {
                ty: Some(VarType::Named("S".to_string()))
            },
            &Object::Var { ty: None },
        ]
    );
}

#[test]
fn labels_and_selectors_are_not_resolved() {
    let src = "package p\ntype T struct{ n int }\nfunc f(t T) int {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n\treturn t.n\n}\n";
    let (_, res) = resolve(src);
    assert!(unresolved(&res).is_empty(), "{:?}", unresolved(&res));
}

#[test]
fn generic_type_parameters_are_in_scope() {
    let src = "package p\ntype List[T any] struct{ items []T }\nfunc (l *List[T]) First() T { return l.items[0] }\nfunc Map[A, B any](xs []A, f func(A) B) []B { return nil }\n";
    let (_, res) = resolve(src);
    assert!(unresolved(&res).is_empty(), "{:?}", unresolved(&res));
}

#[test]
fn range_variables_are_declared_for_the_body() {
    let src = "package p\nfunc f(xs []int) (n int) {\n\tfor i, v := range xs {\n\t\tn += i + v\n\t}\n\treturn\n}\n";
    let (_, res) = resolve(src);
    assert!(unresolved(&res).is_empty(), "{:?}", unresolved(&res));
}
