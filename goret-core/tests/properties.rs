use goret_core::{process, Options};
use miette::{miette, Result};
use proptest::{
    prelude::prop,
    test_runner::{Config, TestCaseError, TestRunner},
};

/// Result types with the zero value the completer should synthesize, if any.
const TYPES: &[(&str, Option<&str>)] = &[
    ("int", Some("0")),
    ("string", Some("\"\"")),
    ("bool", Some("false")),
    ("error", Some("nil")),
    ("*T", Some("nil")),
    ("[]byte", Some("nil")),
    ("[3]int", Some("[3]int{}")),
    ("float64", Some("0")),
    ("T", None),
    ("map[string]int", None),
];

const VALUES: &[&str] = &[
    "errors.New(\"x\")",
    "fmt.Errorf(\"y\")",
    "7",
    "nil",
    "x",
];

fn source(types: &[usize], values: &[usize]) -> String {
    let types: Vec<_> = types.iter().map(|&t| TYPES[t].0).collect();
    let values: Vec<_> = values.iter().map(|&v| VALUES[v]).collect();
    let ret = if values.is_empty() {
        "return".to_string()
    } else {
        format!("return {}", values.join(", "))
    };
    format!(
        "package p\n\ntype T struct{{}}\n\nfunc F() ({}) {{\n\t{ret}\n}}\n",
        types.join(", ")
    )
}

/// What the completer should turn `source(types, values)` into.
fn expected(types: &[usize], values: &[usize]) -> String {
    let (want, have) = (types.len(), values.len());
    if have == 0 || have >= want {
        return source(types, values);
    }
    let zeros: Option<Vec<&str>> = types[..want - have].iter().map(|&t| TYPES[t].1).collect();
    let Some(zeros) = zeros else {
        return source(types, values);
    };
    let values: Vec<_> = values.iter().map(|&v| VALUES[v]).collect();
    let types: Vec<_> = types.iter().map(|&t| TYPES[t].0).collect();
    format!(
        "package p\n\ntype T struct{{}}\n\nfunc F() ({}) {{\n\treturn {}, {}\n}}\n",
        types.join(", "),
        zeros.join(", "),
        values.join(", ")
    )
}

fn run(src: &str, options: &Options) -> std::result::Result<String, TestCaseError> {
    let out = process(None, "prop.go", src.as_bytes(), options)
        .map_err(|e| TestCaseError::fail(format!("{e}")))?;
    String::from_utf8(out).map_err(|e| TestCaseError::fail(format!("{e}")))
}

#[test]
fn completion_matches_the_zero_value_model() -> Result<()> {
    let mut runner = TestRunner::new(Config {
        cases: 128,
        ..Config::default()
    });
    let strat = (
        prop::collection::vec(0..TYPES.len(), 1..5),
        prop::collection::vec(0..VALUES.len(), 0..6),
    );

    runner
        .run(&strat, |(types, values)| {
            let src = source(&types, &values);
            let options = Options::default();
            let once = run(&src, &options)?;
            let want = expected(&types, &values);
            if once != want {
                return Err(TestCaseError::fail(format!(
                    "input:\n{src}\ngot:\n{once}\nwant:\n{want}"
                )));
            }
            let twice = run(&once, &options)?;
            if twice != once {
                return Err(TestCaseError::fail(format!(
                    "second pass changed:\n{once}\ninto:\n{twice}"
                )));
            }
            Ok(())
        })
        .map_err(|e| miette!("completion property failed: {e}"))?;

    Ok(())
}

const INDENTS: &[&str] = &["", "\t", "  ", "\t\t"];

#[test]
fn statement_fragments_keep_their_whitespace() -> Result<()> {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        ..Config::default()
    });
    let strat = (0..INDENTS.len(), 0usize..3, 0usize..3);
    let options = Options {
        accept_fragments: true,
        ..Options::default()
    };

    runner
        .run(&strat, |(indent, lead, trail)| {
            let indent = INDENTS[indent];
            let fragment = |ret: &str| {
                format!(
                    "{}{indent}_ = func() (int, error) {{\n{indent}\t{ret}\n{indent}}}{}",
                    "\n".repeat(lead),
                    "\n".repeat(trail)
                )
            };
            let src = fragment("return errors.New(\"x\")");
            let got = run(&src, &options)?;
            let want = fragment("return 0, errors.New(\"x\")");
            if got != want {
                return Err(TestCaseError::fail(format!("got {got:?}, want {want:?}")));
            }
            Ok(())
        })
        .map_err(|e| miette!("fragment property failed: {e}"))?;

    Ok(())
}
