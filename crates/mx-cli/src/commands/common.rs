//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use mx_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only, nothing to show on stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// File extensions recognized as test definitions
const DEFINITION_EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

/// Load the project config, honoring `--config` when given
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let config = match &global.config {
        Some(path) => {
            let path = resolve_path(&global.project_dir, path);
            Config::load(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => Config::load_from_dir(&global.project_dir).with_context(|| {
            format!(
                "Failed to load config from project: {}",
                global.project_dir.display()
            )
        })?,
    };

    if global.verbose {
        eprintln!(
            "[verbose] Config: definition_paths={:?}, max_combinations={}, default_timeout={}s",
            config.definition_paths, config.max_combinations, config.default_timeout
        );
    }
    Ok(config)
}

/// Resolve `path` against the project directory unless it is absolute
pub(crate) fn resolve_path(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

/// Find all definition files under the configured definition paths
///
/// Missing directories are skipped. The result is sorted and free of
/// duplicates so output is stable across runs.
pub(crate) fn discover_definitions(config: &Config, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in config.definition_paths_absolute(root) {
        if !dir.is_dir() {
            log::warn!("Definition path does not exist: {}", dir.display());
            continue;
        }
        for ext in DEFINITION_EXTENSIONS {
            let pattern = dir.join(format!("**/*.{ext}"));
            let pattern_str = pattern.to_string_lossy();
            let entries = glob::glob(&pattern_str)
                .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable path: {e}"),
                }
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_definitions_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let tests_dir = dir.path().join("tests");
        fs::create_dir_all(tests_dir.join("nested")).unwrap();
        fs::write(tests_dir.join("b.json"), "{}").unwrap();
        fs::write(tests_dir.join("a.yml"), "").unwrap();
        fs::write(tests_dir.join("nested/c.yaml"), "").unwrap();
        fs::write(tests_dir.join("notes.txt"), "").unwrap();

        let files = discover_definitions(&Config::default(), dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(&tests_dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.yml", "b.json", "nested/c.yaml"]);
    }

    #[test]
    fn test_discover_definitions_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover_definitions(&Config::default(), dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_resolve_path() {
        let project = Path::new("/nonexistent/project");
        assert_eq!(
            resolve_path(project, Path::new("defs/x.json")),
            PathBuf::from("/nonexistent/project/defs/x.json")
        );
        assert_eq!(
            resolve_path(project, Path::new("/abs/x.json")),
            PathBuf::from("/abs/x.json")
        );
    }

    #[test]
    fn test_exit_code_has_empty_display() {
        let err: anyhow::Error = ExitCode(2).into();
        assert_eq!(err.to_string(), "");
        assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(2));
    }
}
