//! Matrix command implementation

use anyhow::{Context, Result};
use mx_core::{has_errors, TestDefinition, TestObjectType};
use mx_matrix::{MatrixBuilder, TestCase, TestCaseCollection};
use serde::Serialize;

use crate::cli::{GlobalArgs, MatrixArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// JSON form of a built matrix
#[derive(Debug, Serialize)]
struct MatrixReport<'a> {
    target_object: String,
    object_type: TestObjectType,
    total: usize,
    cases: Vec<CaseReport<'a>>,
    diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CaseReport<'a> {
    #[serde(flatten)]
    case: &'a TestCase,
    sql: String,
}

/// Execute the matrix command
pub fn execute(args: &MatrixArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let path = common::resolve_path(&global.project_dir, &args.file);

    let definition = TestDefinition::load(&path)
        .with_context(|| format!("Failed to load test definition: {}", path.display()))?;

    let findings = definition.validate();
    if has_errors(&findings) {
        for finding in findings.iter().filter(|f| f.is_error()) {
            eprintln!("{}", finding);
        }
        eprintln!("Definition {} is invalid, no matrix built", path.display());
        return Err(ExitCode(1).into());
    }

    let max_combinations = args.max_combinations.unwrap_or(config.max_combinations);
    let cases = MatrixBuilder::new()
        .with_max_combinations(max_combinations)
        .build_for_definition(&definition, config.default_timeout)
        .with_context(|| format!("Failed to build matrix for {}", definition.target_object()))?;

    if global.verbose {
        eprintln!(
            "[verbose] Built {} test cases for {} ({} dropped user values)",
            cases.len(),
            definition.target_object(),
            cases.diagnostics().len()
        );
    }

    match args.output {
        OutputFormat::Table => print_table(&definition, &cases, args.limit),
        OutputFormat::Json => print_json(&definition, &cases, args.limit)?,
    }
    Ok(())
}

fn print_table(definition: &TestDefinition, cases: &TestCaseCollection, limit: Option<usize>) {
    let object_type = definition.test_object_type;
    println!(
        "Test matrix for {} {} ({} cases)\n",
        object_type,
        definition.target_object(),
        cases.len()
    );

    let shown = limit.unwrap_or(cases.len()).min(cases.len());
    let width = cases.len().to_string().len();
    for case in cases.iter().take(shown) {
        println!(
            "#{:>width$}  {}",
            case.id,
            case.sql_statement(object_type),
            width = width
        );
    }
    if shown < cases.len() {
        println!("... {} more", cases.len() - shown);
    }

    if !cases.diagnostics().is_empty() {
        println!();
        for diagnostic in cases.diagnostics() {
            println!("Warning: {}", diagnostic);
        }
    }
}

fn print_json(
    definition: &TestDefinition,
    cases: &TestCaseCollection,
    limit: Option<usize>,
) -> Result<()> {
    let object_type = definition.test_object_type;
    let report = MatrixReport {
        target_object: definition.target_object(),
        object_type,
        total: cases.len(),
        cases: cases
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|case| CaseReport {
                case,
                sql: case.sql_statement(object_type),
            })
            .collect(),
        diagnostics: cases.diagnostics().iter().map(|d| d.to_string()).collect(),
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize matrix")?;
    println!("{json}");
    Ok(())
}
