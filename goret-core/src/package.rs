#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use goret_ast::File;
use goret_parse::{parse_source_with_config, ParseConfig};
use tracing::{debug, warn};

/// Parses the other files of `package` found in `dir`.
///
/// Test files, files that fail to parse, and files of another package are
/// skipped; an unreadable directory yields no siblings at all.
pub fn load_siblings(dir: &Path, unit: &str, package: &str, config: &ParseConfig) -> Vec<File> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "package directory unreadable");
            return Vec::new();
        }
    };
    let unit_name = Path::new(unit).file_name();
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_package_source(path) && path.file_name() != unit_name)
        .collect();
    paths.sort();

    let mut siblings = Vec::new();
    for path in paths {
        let name = path.display().to_string();
        let src = match fs::read_to_string(&path) {
            Ok(src) => src,
            Err(err) => {
                warn!("could not read {name}: {err}");
                continue;
            }
        };
        match parse_source_with_config(&name, &src, config) {
            Ok(file) if file.package.node == package => siblings.push(file),
            Ok(file) => debug!(file = %name, package = %file.package.node, "other package"),
            Err(err) => warn!("could not parse {name}: {err}"),
        }
    }
    debug!(dir = %dir.display(), count = siblings.len(), "loaded sibling files");
    siblings
}

fn is_package_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file() && name.ends_with(".go") && !name.ends_with("_test.go")
}
