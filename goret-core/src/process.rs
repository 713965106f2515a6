#![forbid(unsafe_code)]

use std::path::Path;

use goret_ast::{File, LineIndex};
use goret_check::{resolve_file, Checker, TypeErrorKind, TypeTable};
use goret_parse::ParseConfig;
use tracing::{debug, warn};

use crate::analysis::{SemanticAnalyzer, TypeLookup};
use crate::arity::ArityPolicy;
use crate::bare::expand_bare_returns;
use crate::collect::collect_returns;
use crate::complete::Completer;
use crate::error::ProcessError;
use crate::format::{Formatter, Passthrough};
use crate::normalize::{normalize, ParseFailure};
use crate::package::load_siblings;
use crate::render::{Printer, SpliceRenderer};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Accept declaration and statement lists without a package clause.
    pub accept_fragments: bool,
    /// Report every parse error, and every type error when logging them.
    pub all_errors: bool,
    /// Log non-fatal type errors.
    pub log_type_errors: bool,
    pub expand_bare_returns: bool,
    /// `pkg.Name` calls known to return one value, on top of the defaults.
    pub single_result_calls: Vec<String>,
}

/// The completion pipeline with its pluggable stages.
pub struct Processor {
    options: Options,
    policy: ArityPolicy,
    printer: Box<dyn Printer + Send + Sync>,
    formatter: Box<dyn Formatter + Send + Sync>,
    analyzer: Box<dyn SemanticAnalyzer + Send + Sync>,
}

impl Processor {
    pub fn new(options: Options) -> Self {
        let mut policy = ArityPolicy::default();
        for call in &options.single_result_calls {
            if !policy.allow(call) {
                warn!("ignoring single-result call {call:?}: expected pkg.Name");
            }
        }
        Self {
            options,
            policy,
            printer: Box::new(SpliceRenderer),
            formatter: Box::new(Passthrough),
            analyzer: Box::new(Checker::new()),
        }
    }

    pub fn with_printer(mut self, printer: impl Printer + Send + Sync + 'static) -> Self {
        self.printer = Box::new(printer);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Formatter + Send + Sync + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl SemanticAnalyzer + Send + Sync + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Completes the returns of `src`, read from `filename`.
    ///
    /// With `pkg_dir`, the unit is checked together with the other files of
    /// its package first; without it only the unit's own syntax is used.
    pub fn process(
        &self,
        pkg_dir: Option<&Path>,
        filename: &str,
        src: &[u8],
    ) -> Result<Vec<u8>, ProcessError> {
        let text = std::str::from_utf8(src).map_err(|err| ProcessError::Encoding {
            filename: filename.to_string(),
            valid_up_to: err.valid_up_to(),
        })?;
        let config = ParseConfig {
            all_errors: self.options.all_errors,
        };
        let normalized = normalize(filename, text, self.options.accept_fragments, &config)
            .map_err(|failure| parse_error(filename, failure))?;
        let mut file = normalized.file;

        let types = match pkg_dir {
            Some(dir) => {
                let siblings = load_siblings(dir, filename, &file.package.node, &config);
                self.type_info(&file, &siblings)
            }
            None => None,
        };
        let lookup = types.as_ref().map(|t| t as &dyn TypeLookup);

        let resolution = resolve_file(&file);
        let binding = collect_returns(&file);
        let completed =
            Completer::new(&resolution, lookup, &self.policy).complete(&mut file.ast, &binding);
        let expanded = if self.options.expand_bare_returns {
            expand_bare_returns(&mut file.ast, &binding)
        } else {
            0
        };
        debug!(
            file = filename,
            returns = binding.len(),
            completed,
            expanded,
            "rewrote returns"
        );

        let rendered = self.printer.render(&file, &normalized.text)?;
        let unwrapped = match &normalized.unwrap {
            Some(unwrap) => unwrap.apply(text, &rendered)?,
            None => rendered,
        };
        Ok(self.formatter.format(&unwrapped)?.into_bytes())
    }

    /// Runs the analyzer. Any error besides a return-count mismatch means the
    /// pass continues without type information.
    fn type_info(&self, file: &File, siblings: &[File]) -> Option<TypeTable> {
        let analysis = self.analyzer.analyze(file, siblings);
        let errors: Vec<_> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.kind != TypeErrorKind::WrongReturnCount)
            .collect();
        if errors.is_empty() {
            return Some(analysis.types);
        }
        if self.options.log_type_errors {
            let shown = if self.options.all_errors { errors.len() } else { 1 };
            for err in errors.iter().take(shown) {
                warn!("{}:{}: {}", file.name, file.position(err.span), err.message);
            }
            warn!(
                "{}: typechecking failed (continuing without type info)",
                file.name
            );
        }
        None
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

fn parse_error(filename: &str, failure: ParseFailure) -> ProcessError {
    let ParseFailure { error, text } = failure;
    let position = LineIndex::new(&text).position(error.span.offset());
    ProcessError::Parse {
        filename: filename.to_string(),
        line: position.line,
        column: position.column,
        span: error.span,
        source: error,
        text,
    }
}

/// Runs the default pipeline over one file.
pub fn process(
    pkg_dir: Option<&Path>,
    filename: &str,
    src: &[u8],
    options: &Options,
) -> Result<Vec<u8>, ProcessError> {
    Processor::new(options.clone()).process(pkg_dir, filename, src)
}
