#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use goret_core::{split_qualified, Options};
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Diagnostic)]
#[error("config error: {message}")]
#[diagnostic(code(goret::config))]
pub struct ConfigError {
    pub message: String,
}

/// The final formatting pass to run on completed output.
#[derive(clap::ValueEnum, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// Print the spliced output as is
    #[default]
    None,
    /// Pipe through `gofmt`
    Gofmt,
    /// Pipe through `goimports`
    Goimports,
}

/// `~/.goret.json`. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub fragment: Option<bool>,
    pub print_errors: Option<bool>,
    pub all_errors: Option<bool>,
    pub remove_bare_returns: Option<bool>,
    pub formatter: Option<FormatterKind>,

    /// Import prefix grouped last by `goimports`.
    pub local: Option<String>,

    /// Extra `pkg.Name` calls known to return a single value.
    #[serde(default)]
    pub single_result_calls: Vec<String>,
}

/// What the command line asked for. Flags can only switch options on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub fragment: bool,
    pub print_errors: bool,
    pub all_errors: bool,
    pub bare_returns: bool,
    pub formatter: Option<FormatterKind>,
    pub local: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub options: Options,
    pub formatter: FormatterKind,
    pub local: Option<String>,
}

impl Config {
    pub fn settings(&self, flags: &Flags) -> Result<Settings, ConfigError> {
        if let Some(bad) = self
            .single_result_calls
            .iter()
            .find(|call| split_qualified(call).is_none())
        {
            return Err(ConfigError {
                message: format!("singleResultCalls: {bad:?} is not of the form pkg.Name"),
            });
        }
        let options = Options {
            accept_fragments: flags.fragment || self.fragment.unwrap_or(false),
            all_errors: flags.all_errors || self.all_errors.unwrap_or(false),
            log_type_errors: flags.print_errors || self.print_errors.unwrap_or(false),
            expand_bare_returns: flags.bare_returns || self.remove_bare_returns.unwrap_or(false),
            single_result_calls: self.single_result_calls.clone(),
        };
        Ok(Settings {
            options,
            formatter: flags.formatter.or(self.formatter).unwrap_or_default(),
            local: flags
                .local
                .clone()
                .or_else(|| self.local.clone().filter(|l| !l.is_empty())),
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".goret.json"))
}

/// Loads the `--config` file, or the default one when none was named.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_config_from(path, true),
        None => match default_config_path() {
            Some(path) => load_config_from(&path, false),
            None => Ok(Config::default()),
        },
    }
}

/// A missing file is only an error when `required`.
pub fn load_config_from(path: &Path, required: bool) -> Result<Config, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no config file");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ConfigError {
                message: format!("failed to read {}: {e}", path.display()),
            });
        }
    };
    let config: Config = serde_json::from_str(&raw).map_err(|e| ConfigError {
        message: format!("failed to parse {}: {e}", path.display()),
    })?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}
