#![forbid(unsafe_code)]

use goret_ast::{span_end, Ast, ExprId, ExprKind, File, ReturnStmt};
use goret_parse::format_expr;

use crate::error::RenderError;

/// Turns a (possibly rewritten) file back into text.
pub trait Printer {
    /// `src` is the text `file` was parsed from.
    fn render(&self, file: &File, src: &str) -> Result<String, RenderError>;
}

/// Prints by inserting the text of synthesized return values into the
/// original source. Everything the passes did not touch, comments and
/// layout included, comes out byte for byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpliceRenderer;

impl Printer for SpliceRenderer {
    fn render(&self, file: &File, src: &str) -> Result<String, RenderError> {
        let ast = &file.ast;
        let mut edits = Vec::new();
        for (_, ret) in ast.returns.iter() {
            splice_return(ast, src, ret, &mut edits)?;
        }
        edits.sort_by_key(|(at, _)| *at);

        let extra: usize = edits.iter().map(|(_, text)| text.len()).sum();
        let mut out = String::with_capacity(src.len() + extra);
        let mut cursor = 0;
        for (at, text) in edits {
            out.push_str(slice(src, cursor, at)?);
            out.push_str(&text);
            cursor = at;
        }
        out.push_str(slice(src, cursor, src.len())?);
        Ok(out)
    }
}

fn slice(src: &str, start: usize, end: usize) -> Result<&str, RenderError> {
    src.get(start..end).ok_or(RenderError::OutOfBounds {
        offset: end,
        len: src.len(),
    })
}

/// Queues the insertions that make `ret`'s source text match its values.
///
/// Runs of synthetic values go in front of the next original value, after
/// the last one when nothing original follows, or after the keyword when
/// the statement had no values.
fn splice_return(
    ast: &Ast,
    src: &str,
    ret: &ReturnStmt,
    edits: &mut Vec<(usize, String)>,
) -> Result<(), RenderError> {
    let mut pending = Vec::new();
    let mut last_end = None;
    for id in &ret.results {
        match ast.exprs[*id].span {
            None => pending.push(synthetic_text(ast, src, *id)?),
            Some(span) => {
                if !pending.is_empty() {
                    edits.push((span.offset(), format!("{}, ", pending.join(", "))));
                    pending.clear();
                }
                last_end = Some(span_end(span));
            }
        }
    }
    if !pending.is_empty() {
        let joined = pending.join(", ");
        match last_end {
            Some(end) => edits.push((end, format!(", {joined}"))),
            None => edits.push((span_end(ret.keyword), format!(" {joined}"))),
        }
    }
    Ok(())
}

fn synthetic_text(ast: &Ast, src: &str, id: ExprId) -> Result<String, RenderError> {
    match &ast.exprs[id].kind {
        // Array zero values reuse the declared type, spelled as written.
        ExprKind::CompositeLit { ty: Some(ty), elems } if elems.is_empty() => {
            let span = ast.types[*ty].span;
            let ty = slice(src, span.offset(), span_end(span))?;
            Ok(format!("{ty}{{}}"))
        }
        _ => Ok(format_expr(ast, id)),
    }
}
