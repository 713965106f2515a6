#![forbid(unsafe_code)]

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::FormatError;

/// The final canonical-formatting pass.
pub trait Formatter {
    fn format(&self, src: &str) -> Result<String, FormatError>;
}

/// Leaves the text as the printer produced it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Formatter for Passthrough {
    fn format(&self, src: &str) -> Result<String, FormatError> {
        Ok(src.to_string())
    }
}

/// Pipes the text through an external Go formatter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
}

impl ExternalFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn gofmt() -> Self {
        Self::new("gofmt", Vec::new())
    }

    /// `goimports`, grouping imports that start with `local` after third-party ones.
    pub fn goimports(local: Option<&str>) -> Self {
        let args = match local {
            Some(prefix) => vec!["-local".to_string(), prefix.to_string()],
            None => Vec::new(),
        };
        Self::new("goimports", args)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Formatter for ExternalFormatter {
    fn format(&self, src: &str) -> Result<String, FormatError> {
        debug!(program = %self.program, args = ?self.args, "formatting");
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        // gofmt and goimports read all of stdin before writing anything.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(src.as_bytes()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(e));
            }
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| FormatError::Encoding {
            program: self.program.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_is_identity() {
        let src = "package p\nfunc f() {  }\n";
        assert_eq!(Passthrough.format(src).expect("format"), src);
    }

    #[test]
    fn goimports_receives_the_local_prefix() {
        let f = ExternalFormatter::goimports(Some("example.com/me"));
        assert_eq!(f.program(), "goimports");
        assert_eq!(f.args(), ["-local", "example.com/me"]);
        assert!(ExternalFormatter::goimports(None).args().is_empty());
        assert!(ExternalFormatter::gofmt().args().is_empty());
    }

    #[test]
    fn missing_programs_fail_to_spawn() {
        let f = ExternalFormatter::new("goret-no-such-formatter", Vec::new());
        let err = f.format("package p\n").expect_err("should not spawn");
        assert!(matches!(err, FormatError::Spawn { .. }), "{err}");
        assert!(err.to_string().starts_with("could not run goret-no-such-formatter"));
    }

    #[cfg(unix)]
    #[test]
    fn formatters_that_stop_reading_are_reaped() {
        // `true` exits without reading, so a write larger than the pipe buffer fails.
        let f = ExternalFormatter::new("true", Vec::new());
        let src = "x".repeat(4 << 20);
        let err = f.format(&src).expect_err("broken pipe");
        assert!(matches!(err, FormatError::Spawn { .. }), "{err}");
    }
}
