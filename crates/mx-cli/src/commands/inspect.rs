//! Inspect command implementation

use anyhow::{Context, Result};
use mx_core::{has_errors, SqlTypeDefinition, SqlTypeKind, SqlValue, ValidationResult};
use serde::Serialize;

use crate::cli::{GlobalArgs, InspectArgs, OutputFormat};
use crate::commands::common::ExitCode;

/// Literals longer than this are cut in table output
const MAX_LITERAL_WIDTH: usize = 60;

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    sql_type: &'a SqlTypeDefinition,
    kind: SqlTypeKind,
    findings: &'a [ValidationResult],
    values: &'a [SqlValue],
}

/// Execute the inspect command
pub fn execute(args: &InspectArgs, global: &GlobalArgs) -> Result<()> {
    let type_def = SqlTypeDefinition::parse(&args.sql_type)
        .with_context(|| format!("Failed to parse SQL type '{}'", args.sql_type))?;

    if global.verbose {
        eprintln!("[verbose] Parsed '{}' as {:?}", args.sql_type, type_def);
    }

    let findings = type_def.validate();
    let values = if has_errors(&findings) {
        Vec::new()
    } else {
        mx_matrix::builtin::generate(&type_def)
            .with_context(|| format!("Failed to generate boundary values for {type_def}"))?
    };

    match args.output {
        OutputFormat::Table => print_table(&type_def, &findings, &values),
        OutputFormat::Json => {
            let report = InspectReport {
                sql_type: &type_def,
                kind: type_def.kind,
                findings: &findings,
                values: &values,
            };
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
        }
    }

    if has_errors(&findings) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_table(type_def: &SqlTypeDefinition, findings: &[ValidationResult], values: &[SqlValue]) {
    println!("Type: {}", type_def);
    println!("Kind: {:?}", type_def.kind);

    if !findings.is_empty() {
        println!();
        for finding in findings {
            println!("  {}", finding);
        }
    }

    if !values.is_empty() {
        println!("\nBoundary values ({}):", values.len());
        for value in values {
            println!("  {}", truncate_literal(&value.to_sql_literal()));
        }
    }
}

fn truncate_literal(literal: &str) -> String {
    let len = literal.chars().count();
    if len <= MAX_LITERAL_WIDTH {
        return literal.to_string();
    }
    let head: String = literal.chars().take(MAX_LITERAL_WIDTH).collect();
    format!("{head}... ({len} chars)")
}
