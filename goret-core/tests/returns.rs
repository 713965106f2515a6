use goret_core::{process, Options};

struct Case {
    name: &'static str,
    input: &'static str,
    output: &'static str,
}

const CASES: &[Case] = &[
    Case {
        name: "noop",
        input: "package foo\nfunc F() error { return nil }\n",
        output: "package foo\nfunc F() error { return nil }\n",
    },
    // An invalid bare return is not completed either.
    Case {
        name: "naked return",
        input: "package foo\nfunc F() error { return }\n",
        output: "package foo\nfunc F() error { return }\n",
    },
    Case {
        name: "preceding",
        input: "package foo\nfunc F() (int, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (int, error) { return 0, errors.New(\"foo\") }\n",
    },
    Case {
        name: "preserve rightmost return values",
        input: "package foo\nfunc F() (int, int, error) { return 7, errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (int, int, error) { return 0, 7, errors.New(\"foo\") }\n",
    },
    Case {
        name: "direct return of multiple return funcs",
        input: "package foo\nimport \"io/ioutil\"\nfunc F() ([]byte, error) { return ioutil.ReadFile(\"f\") }\n",
        output: "package foo\nimport \"io/ioutil\"\nfunc F() ([]byte, error) { return ioutil.ReadFile(\"f\") }\n",
    },
    Case {
        name: "primitives",
        input: "package foo\nfunc F() (uint8, uint16, uint32, uint64, int8, int16, int32, int64, float32, float64, complex64, complex128, byte, rune, uint, int, uintptr, string, bool, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (uint8, uint16, uint32, uint64, int8, int16, int32, int64, float32, float64, complex64, complex128, byte, rune, uint, int, uintptr, string, bool, error) { return 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, \"\", false, errors.New(\"foo\") }\n",
    },
    Case {
        name: "pointers",
        input: "package foo\nfunc F() (*int, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (*int, error) { return nil, errors.New(\"foo\") }\n",
    },
    Case {
        name: "slices",
        input: "package foo\nfunc F() ([]int, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() ([]int, error) { return nil, errors.New(\"foo\") }\n",
    },
    Case {
        name: "arrays",
        input: "package foo\nfunc F() ([2]int, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() ([2]int, error) { return [2]int{}, errors.New(\"foo\") }\n",
    },
    Case {
        name: "local structs",
        input: "package foo\ntype T struct {}\nfunc F() (T, error) { return errors.New(\"foo\") }\n",
        output: "package foo\ntype T struct {}\nfunc F() (T, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "external structs",
        input: "package foo\nimport \"net/url\"\nfunc F() (url.URL, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nimport \"net/url\"\nfunc F() (url.URL, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "external structs with import alias",
        input: "package foo\nimport url2 \"net/url\"\nfunc F() (url2.URL, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nimport url2 \"net/url\"\nfunc F() (url2.URL, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "named interfaces",
        input: "package foo\ntype I interface {}\nfunc F() (I, error) { return errors.New(\"foo\") }\n",
        output: "package foo\ntype I interface {}\nfunc F() (I, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "external interfaces",
        input: "package foo\nimport \"io\"\nfunc F() (io.Reader, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nimport \"io\"\nfunc F() (io.Reader, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "interface literals",
        input: "package foo\nfunc F() (interface{ Close() error }, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (interface{ Close() error }, error) { return nil, errors.New(\"foo\") }\n",
    },
    Case {
        name: "preserve type errors",
        input: "package foo\nfunc F() (X, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (X, error) { return errors.New(\"foo\") }\n",
    },
    // Trailing values need not match the trailing result types.
    Case {
        name: "return type errors",
        input: "package foo\nfunc F() (int, int) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (int, int) { return 0, errors.New(\"foo\") }\n",
    },
    Case {
        name: "preserve valid-arity returns",
        input: "package foo\nfunc F() (int, error) { return 7, errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() (int, error) { return 7, errors.New(\"foo\") }\n",
    },
    Case {
        name: "preserve excess returns",
        input: "package foo\nfunc F() error { return 1, errors.New(\"foo\") }\n",
        output: "package foo\nfunc F() error { return 1, errors.New(\"foo\") }\n",
    },
    Case {
        name: "closures",
        input: "package foo\nfunc main() { _ = func() (int, error) { return errors.New(\"foo\") } }\n",
        output: "package foo\nfunc main() { _ = func() (int, error) { return 0, errors.New(\"foo\") } }\n",
    },
    Case {
        name: "closure scopes",
        input: "package foo\nfunc outer() (string, error) {\n\t_ = func() (int, error) { return errors.New(\"foo\") }\n\treturn errors.New(\"foo\")\n}\n",
        output: "package foo\nfunc outer() (string, error) {\n\t_ = func() (int, error) { return 0, errors.New(\"foo\") }\n\treturn \"\", errors.New(\"foo\")\n}\n",
    },
    Case {
        name: "local single-result functions",
        input: "package foo\nfunc fail() error { return nil }\nfunc F() (bool, error) {\n\treturn fail()\n}\n",
        output: "package foo\nfunc fail() error { return nil }\nfunc F() (bool, error) {\n\treturn false, fail()\n}\n",
    },
    Case {
        name: "local multi-result functions",
        input: "package foo\nfunc pair() (int, error) { return 0, nil }\nfunc F() (string, int, error) {\n\treturn pair()\n}\n",
        output: "package foo\nfunc pair() (int, error) { return 0, nil }\nfunc F() (string, int, error) {\n\treturn pair()\n}\n",
    },
    Case {
        name: "conversions",
        input: "package foo\ntype Code int\nfunc F() (string, Code) { return Code(3) }\n",
        output: "package foo\ntype Code int\nfunc F() (string, Code) { return \"\", Code(3) }\n",
    },
    Case {
        name: "redeclared predeclared type",
        input: "package foo\ntype string struct{}\nfunc F() (string, error) { return errors.New(\"foo\") }\n",
        output: "package foo\ntype string struct{}\nfunc F() (string, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "shadowed package name",
        input: "package foo\nfunc F(errors E) (int, error) { return errors.New(\"foo\") }\n",
        output: "package foo\nfunc F(errors E) (int, error) { return errors.New(\"foo\") }\n",
    },
    Case {
        name: "comments survive",
        input: "package foo\n\n// F fails.\nfunc F() (int, error) {\n\t// always\n\treturn /* now */ fmt.Errorf(\"x\") // done\n}\n",
        output: "package foo\n\n// F fails.\nfunc F() (int, error) {\n\t// always\n\treturn /* now */ 0, fmt.Errorf(\"x\") // done\n}\n",
    },
];

#[test]
fn completes_returns() {
    let options = Options {
        accept_fragments: true,
        ..Options::default()
    };
    let mut failures = Vec::new();
    for case in CASES {
        let file = format!("{}.go", case.name.replace(' ', "_"));
        match process(None, &file, case.input.as_bytes(), &options) {
            Ok(out) => {
                let got = String::from_utf8(out).expect("utf-8 output");
                if got != case.output {
                    failures.push(format!(
                        "{}:\nGOT:\n{got}\nWANT:\n{}",
                        case.name, case.output
                    ));
                }
            }
            Err(err) => failures.push(format!("{}: error: {err}", case.name)),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn output_is_stable_under_reprocessing() {
    let options = Options::default();
    for case in CASES {
        let once = process(None, "a.go", case.input.as_bytes(), &options).expect("first pass");
        let twice = process(None, "a.go", &once, &options).expect("second pass");
        assert_eq!(once, twice, "reprocessing changed {}", case.name);
    }
}

#[test]
fn bare_returns_are_expanded_on_request() {
    let src = "package foo\nfunc F() (count int, err error) {\n\treturn\n}\nfunc G() (int, error) {\n\treturn\n}\n";
    let plain = process(None, "a.go", src.as_bytes(), &Options::default()).expect("process");
    assert_eq!(String::from_utf8(plain).expect("utf-8"), src);

    let options = Options {
        expand_bare_returns: true,
        ..Options::default()
    };
    let out = process(None, "a.go", src.as_bytes(), &options).expect("process");
    assert_eq!(
        String::from_utf8(out).expect("utf-8"),
        "package foo\nfunc F() (count int, err error) {\n\treturn count, err\n}\nfunc G() (int, error) {\n\treturn\n}\n"
    );
}

#[test]
fn extra_single_result_calls_extend_the_allow_list() {
    let src = "package foo\nimport \"github.com/pkg/errors\"\nfunc F() (int, error) { return errors.Wrap(err, \"x\") }\n";
    let out = process(None, "a.go", src.as_bytes(), &Options::default()).expect("process");
    assert_eq!(out, src.as_bytes());

    let options = Options {
        single_result_calls: vec!["errors.Wrap".to_string()],
        ..Options::default()
    };
    let out = process(None, "a.go", src.as_bytes(), &options).expect("process");
    assert_eq!(
        String::from_utf8(out).expect("utf-8"),
        "package foo\nimport \"github.com/pkg/errors\"\nfunc F() (int, error) { return 0, errors.Wrap(err, \"x\") }\n"
    );
}
