//! Integration tests for loading a project's configuration and definition files.

use mx_core::{
    has_errors, Config, LiteralToken, ParameterDirection, SqlTypeDefinition, SqlTypeKind,
    TestDefinition, SIZE_MAX,
};
use std::path::Path;

// ── Helpers ────────────────────────────────────────────────────────────

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

const YAML_DEFINITION: &str = r#"
SQL-Matrix-Api-Version: v1
TestObjectType: ScalarFunction
SchemaName: finance
TestObjectName: fn_NetPrice
MaxExecutionTime: 0
Inputs:
  - ParameterName: "@Price"
    SqlType: numeric(9, 2)
    Nullable: false
    UserValues: ["19.99", 5]
  - ParameterName: "@Note"
    SqlType: NVARCHAR(MAX)
    Direction: Output
"#;

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_project_with_config_and_yaml_definition() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "sqlmatrix.yml",
        "definition_paths: [defs]\ndefault_timeout: 45\n",
    );
    let def_path = write(dir.path(), "defs/net_price.yaml", YAML_DEFINITION);

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(
        config.definition_paths_absolute(dir.path()),
        vec![dir.path().join("defs")]
    );

    let def = TestDefinition::load(&def_path).unwrap();
    assert_eq!(def.target_object(), "finance.fn_NetPrice");
    assert_eq!(def.timeout_seconds(config.default_timeout), 45);

    let params = def.parameters().unwrap();
    assert_eq!(
        params[0].type_def,
        SqlTypeDefinition::with_precision(SqlTypeKind::Decimal, 9, 2)
    );
    assert_eq!(
        params[0].user_values,
        vec![
            LiteralToken::Text("19.99".to_string()),
            LiteralToken::Number("5".to_string())
        ]
    );
    assert_eq!(
        params[1].type_def,
        SqlTypeDefinition::with_size(SqlTypeKind::NVarChar, SIZE_MAX)
    );
    assert_eq!(params[1].direction, ParameterDirection::Output);
    assert!(params[1].nullable);

    let results = def.validate();
    assert!(!has_errors(&results));
    assert_eq!(results.len(), 1, "only the MaxExecutionTime warning: {results:?}");
}

#[test]
fn test_json_and_yaml_forms_agree() {
    let dir = tempfile::tempdir().unwrap();
    let yaml_def = TestDefinition::load(&write(dir.path(), "a.yml", YAML_DEFINITION)).unwrap();

    let json = yaml_def.to_json_string().unwrap();
    let json_def = TestDefinition::load(&write(dir.path(), "a.json", &json)).unwrap();

    assert_eq!(json_def.target_object(), yaml_def.target_object());
    assert_eq!(json_def.parameters().unwrap(), yaml_def.parameters().unwrap());
}
