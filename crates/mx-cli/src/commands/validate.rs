//! Validate command implementation

use anyhow::Result;
use mx_core::{Severity, TestDefinition, ValidationResult};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{self, ExitCode};

/// Findings for one definition file
struct FileReport {
    path: PathBuf,
    results: Vec<ValidationResult>,
}

impl FileReport {
    fn count(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }
}

/// Execute the validate command
pub fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let files = if args.files.is_empty() {
        let config = common::load_config(global)?;
        common::discover_definitions(&config, &global.project_dir)?
    } else {
        args.files
            .iter()
            .map(|f| common::resolve_path(&global.project_dir, f))
            .collect()
    };

    if files.is_empty() {
        println!("No test definitions found");
        return Ok(());
    }

    println!("Validating {} test definition(s)\n", files.len());

    let reports: Vec<FileReport> = files.iter().map(|path| validate_file(path, global)).collect();

    let mut error_count = 0;
    let mut warning_count = 0;
    for report in &reports {
        let errors = report.count(Severity::Error);
        let warnings = report.count(Severity::Warning);
        error_count += errors;
        warning_count += warnings;

        let marker = if errors > 0 { "✗" } else { "✓" };
        println!("{} {}", marker, report.path.display());
        for result in &report.results {
            println!("    {}", result);
        }
    }

    println!();
    if error_count == 0 && (warning_count == 0 || !args.strict) {
        println!(
            "Validation passed: {} errors, {} warnings",
            error_count, warning_count
        );
        Ok(())
    } else if args.strict && error_count == 0 {
        println!(
            "Validation failed (strict mode): {} errors, {} warnings",
            error_count, warning_count
        );
        Err(ExitCode(1).into())
    } else {
        println!(
            "Validation failed: {} errors, {} warnings",
            error_count, warning_count
        );
        Err(ExitCode(1).into())
    }
}

/// Load and validate a single file, turning load failures into findings
fn validate_file(path: &Path, global: &GlobalArgs) -> FileReport {
    if global.verbose {
        eprintln!("[verbose] Validating {}", path.display());
    }

    let results = match TestDefinition::load(path) {
        Ok(definition) => definition.validate(),
        Err(e) => vec![ValidationResult::error("", e.to_string())],
    };

    FileReport {
        path: path.to_path_buf(),
        results,
    }
}
