#![forbid(unsafe_code)]

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use goret_core::{ExternalFormatter, Processor};
use miette::{IntoDiagnostic, WrapErr};
use rayon::prelude::*;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Flags, FormatterKind, Settings};

const STDIN_NAME: &str = "<standard input>";

#[derive(Parser, Debug)]
#[command(
    name = "goret",
    version,
    about = "Fills in zero values for incomplete Go return statements"
)]
struct Cli {
    /// List files whose output differs from the input
    #[arg(short = 'l')]
    list: bool,

    /// Write results back to the source files instead of stdout
    #[arg(short = 'w')]
    write: bool,

    /// Report all errors, not just the first
    #[arg(short = 'e')]
    all_errors: bool,

    /// Print non-fatal type errors to stderr
    #[arg(short = 'p')]
    print_errors: bool,

    /// Expand bare returns in functions with named results
    #[arg(short = 'b')]
    bare_returns: bool,

    /// Accept declaration or statement lists without a package clause
    #[arg(long)]
    fragment: bool,

    #[arg(long, value_enum)]
    formatter: Option<FormatterKind>,

    /// Import prefix `goimports` groups after third-party imports
    #[arg(long)]
    local: Option<String>,

    /// Config file to use instead of `~/.goret.json`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Files or directories to process; standard input when empty
    paths: Vec<PathBuf>,
}

impl Cli {
    fn flags(&self) -> Flags {
        Flags {
            fragment: self.fragment,
            print_errors: self.print_errors,
            all_errors: self.all_errors,
            bare_returns: self.bare_returns,
            formatter: self.formatter,
            local: self.local.clone(),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GORET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn build_processor(settings: &Settings) -> Processor {
    let processor = Processor::new(settings.options.clone());
    match settings.formatter {
        FormatterKind::None => processor,
        FormatterKind::Gofmt => processor.with_formatter(ExternalFormatter::gofmt()),
        FormatterKind::Goimports => processor
            .with_formatter(ExternalFormatter::goimports(settings.local.as_deref())),
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = config::load_config(cli.config.as_deref())?;
    let mut settings = config.settings(&cli.flags())?;

    let failures = if cli.paths.is_empty() {
        if cli.write {
            miette::bail!("cannot use -w with standard input");
        }
        settings.options.accept_fragments = true;
        process_stdin(&build_processor(&settings), cli.list)?
    } else {
        let files = collect_files(&cli.paths)?;
        debug!(count = files.len(), "processing files");
        process_files(&build_processor(&settings), &files, cli.list, cli.write)?
    };

    if failures > 0 {
        std::process::exit(2);
    }
    Ok(())
}

/// Standard input is never type-checked: it has no package directory.
fn process_stdin(processor: &Processor, list: bool) -> miette::Result<usize> {
    let mut src = Vec::new();
    io::stdin().read_to_end(&mut src).into_diagnostic()?;
    let out = match processor.process(None, STDIN_NAME, &src) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            return Ok(1);
        }
    };
    let mut stdout = io::stdout().lock();
    if list {
        if out != src {
            writeln!(stdout, "{STDIN_NAME}").into_diagnostic()?;
        }
    } else {
        stdout.write_all(&out).into_diagnostic()?;
    }
    Ok(0)
}

struct Outcome {
    path: PathBuf,
    changed: bool,
    out: Vec<u8>,
}

/// Processes `files` in parallel and reports in input order.
fn process_files(
    processor: &Processor,
    files: &[PathBuf],
    list: bool,
    write: bool,
) -> miette::Result<usize> {
    let results: Vec<miette::Result<Outcome>> = files
        .par_iter()
        .map(|path| process_file(processor, path, write))
        .collect();

    let mut failures = 0;
    let mut stdout = io::stdout().lock();
    for result in results {
        match result {
            Ok(outcome) => {
                if list {
                    if outcome.changed {
                        writeln!(stdout, "{}", outcome.path.display()).into_diagnostic()?;
                    }
                } else if !write {
                    stdout.write_all(&outcome.out).into_diagnostic()?;
                }
            }
            Err(report) => {
                failures += 1;
                eprintln!("{report:?}");
            }
        }
    }
    Ok(failures)
}

fn process_file(processor: &Processor, path: &Path, write: bool) -> miette::Result<Outcome> {
    let src = fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path.display().to_string();
    let out = processor.process(Some(dir), &name, &src)?;
    let changed = out != src;
    if write && changed {
        fs::write(path, &out)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {name}"))?;
    }
    Ok(Outcome {
        path: path.to_path_buf(),
        changed,
        out,
    })
}

/// Expands directories into the `*.go` files below them, skipping hidden
/// entries. Paths named explicitly are kept whatever their extension.
fn collect_files(paths: &[PathBuf]) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let meta = fs::metadata(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot access {}", path.display()))?;
        if meta.is_dir() {
            walk_dir(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> miette::Result<()> {
    let mut entries = fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read directory {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_dir() {
            walk_dir(&path, files)?;
        } else if file_type.is_file() && name.ends_with(".go") {
            files.push(path);
        }
    }
    Ok(())
}
