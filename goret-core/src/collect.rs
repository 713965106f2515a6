#![forbid(unsafe_code)]

use goret_ast::{Ast, ExprKind, File, Node, ReturnId, SigId};
use goret_parse::{format_expr, format_signature};
use tracing::trace;

/// Every return statement paired with the signature of its innermost
/// enclosing function declaration or literal, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    pairs: Vec<(ReturnId, SigId)>,
}

impl Binding {
    pub fn iter(&self) -> impl Iterator<Item = (ReturnId, SigId)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn signature_of(&self, ret: ReturnId) -> Option<SigId> {
        self.pairs.iter().find(|(r, _)| *r == ret).map(|(_, sig)| *sig)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub fn collect_returns(file: &File) -> Binding {
    let ast = &file.ast;
    let mut pairs = Vec::new();
    // Each entry carries the signature in force where it was found.
    let mut stack: Vec<(Node, Option<SigId>)> =
        file.roots().into_iter().rev().map(|n| (n, None)).collect();
    let mut children = Vec::new();

    while let Some((node, enclosing)) = stack.pop() {
        let enclosing = match node {
            Node::Func(id) => Some(ast.funcs[id].sig),
            Node::Expr(id) => match &ast.exprs[id].kind {
                ExprKind::FuncLit { sig, .. } => Some(*sig),
                _ => enclosing,
            },
            _ => enclosing,
        };
        if let (Node::Return(ret), Some(sig)) = (node, enclosing) {
            trace!(
                ret = %describe_return(ast, ret),
                sig = %format_signature(ast, sig),
                "collected return"
            );
            pairs.push((ret, sig));
        }
        children.clear();
        ast.children(node, &mut children);
        stack.extend(children.drain(..).rev().map(|n| (n, enclosing)));
    }

    Binding { pairs }
}

fn describe_return(ast: &Ast, ret: ReturnId) -> String {
    let values: Vec<String> = ast.returns[ret]
        .results
        .iter()
        .map(|e| format_expr(ast, *e))
        .collect();
    if values.is_empty() {
        "return".to_string()
    } else {
        format!("return {}", values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use goret_parse::parse_source;

    use super::*;

    fn bindings(src: &str) -> Vec<(String, String)> {
        let file = parse_source("c.go", src).expect("source should parse");
        collect_returns(&file)
            .iter()
            .map(|(ret, sig)| {
                (
                    describe_return(&file.ast, ret),
                    format_signature(&file.ast, sig),
                )
            })
            .collect()
    }

    #[test]
    fn returns_bind_to_their_declaration() {
        let src = "package p\nfunc a() int { return 1 }\nfunc (r R) b() (int, error) {\n\tif true {\n\t\treturn 0, nil\n\t}\n\treturn 1, nil\n}\n";
        assert_eq!(
            bindings(src),
            vec![
                ("return 1".to_string(), "() int".to_string()),
                ("return 0, nil".to_string(), "() (int, error)".to_string()),
                ("return 1, nil".to_string(), "() (int, error)".to_string()),
            ]
        );
    }

    #[test]
    fn literals_bind_their_own_returns_and_restore_the_outer_one() {
        let src = "package p\nfunc outer() (string, error) {\n\tf := func(x int) bool {\n\t\treturn x > 0\n\t}\n\t_ = f\n\treturn \"\", nil\n}\n";
        assert_eq!(
            bindings(src),
            vec![
                ("return x > 0".to_string(), "(x int) bool".to_string()),
                ("return \"\", nil".to_string(), "() (string, error)".to_string()),
            ]
        );
    }

    #[test]
    fn literals_inside_return_values_are_visited_after_the_return() {
        let src = "package p\nfunc f() func() int {\n\treturn func() int { return 2 }\n}\n";
        let got = bindings(src);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].1, "() func() int");
        assert_eq!(got[1], ("return 2".to_string(), "() int".to_string()));
    }

    #[test]
    fn package_level_literals_are_collected() {
        let src = "package p\nvar handler = func() error { return nil }\n";
        assert_eq!(
            bindings(src),
            vec![("return nil".to_string(), "() error".to_string())]
        );
    }

    #[test]
    fn lookup_by_return() {
        let file = parse_source("c.go", "package p\nfunc f() int { return 1 }\n").expect("parse");
        let binding = collect_returns(&file);
        let (ret, sig) = binding.iter().next().expect("one return");
        assert_eq!(binding.signature_of(ret), Some(sig));
        assert_eq!(binding.len(), 1);
    }
}
