use super::*;
use crate::sql_type::SqlTypeKind;
use crate::validation::{has_errors, Severity};

const JSON_DEFINITION: &str = r#"{
    "SQL-Matrix-Api-Version": "v1",
    "TestObjectType": "StoredProcedure",
    "SchemaName": "sales",
    "TestObjectName": "usp_GetOrders",
    "MaxExecutionTime": 20,
    "Inputs": [
        {
            "ParameterName": "@CustomerId",
            "SqlType": "INT",
            "Nullable": false,
            "UserValues": [42, 1000]
        },
        {
            "ParameterName": "@Region",
            "SqlType": "nvarchar(10)",
            "Default": true,
            "Direction": "input",
            "UserValues": ["EMEA"]
        }
    ]
}"#;

#[test]
fn test_parse_json_definition() {
    let def = TestDefinition::from_json_str(JSON_DEFINITION).unwrap();
    assert_eq!(def.api_version, ApiVersion::V1);
    assert_eq!(def.test_object_type, TestObjectType::StoredProcedure);
    assert_eq!(def.target_object(), "sales.usp_GetOrders");
    assert_eq!(def.timeout_seconds(30), 20);
    assert_eq!(def.inputs.len(), 2);

    let region = &def.inputs[1];
    assert!(region.nullable);
    assert!(region.has_default);
    assert_eq!(region.user_values, vec![LiteralToken::from("EMEA")]);
}

#[test]
fn test_defaults_applied() {
    let yaml = r#"
SQL-Matrix-Api-Version: V1
TestObjectName: fn_Total
Inputs:
  - ParameterName: "@Amount"
    SqlType: DECIMAL(10, 2)
"#;
    let def = TestDefinition::from_yaml_str(yaml).unwrap();
    assert_eq!(def.schema_name, "dbo");
    assert_eq!(def.max_execution_time, 10);
    assert_eq!(def.test_object_type, TestObjectType::StoredProcedure);

    let input = &def.inputs[0];
    assert!(input.nullable);
    assert!(!input.has_default);
    assert_eq!(input.direction, ParameterDirection::Input);
    assert!(input.user_values.is_empty());
}

#[test]
fn test_rejects_unknown_api_version() {
    let json = r#"{"SQL-Matrix-Api-Version": "v2", "TestObjectName": "p"}"#;
    assert!(TestDefinition::from_json_str(json).is_err());
}

#[test]
fn test_rejects_missing_required_fields() {
    let json = r#"{"SQL-Matrix-Api-Version": "v1"}"#;
    assert!(TestDefinition::from_json_str(json).is_err());
}

#[test]
fn test_parameters_are_typed() {
    let def = TestDefinition::from_json_str(JSON_DEFINITION).unwrap();
    let params = def.parameters().unwrap();
    assert_eq!(params[0].name, "@CustomerId");
    assert_eq!(params[0].type_def, SqlTypeDefinition::new(SqlTypeKind::Int));
    assert!(!params[0].nullable);
    assert_eq!(
        params[1].type_def,
        SqlTypeDefinition::with_size(SqlTypeKind::NVarChar, 10)
    );
}

#[test]
fn test_parameters_fail_on_bad_type() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "TestObjectName": "p",
        "Inputs": [{"ParameterName": "@Shape", "SqlType": "GEOMETRY"}]
    }"#;
    let def = TestDefinition::from_json_str(json).unwrap();
    let err = def.parameters().unwrap_err();
    assert!(matches!(err, CoreError::InvalidParameterType { ref parameter, .. } if parameter == "@Shape"));
    assert!(err.to_string().contains("[E007]"));
}

#[test]
fn test_validate_clean_definition() {
    let def = TestDefinition::from_json_str(JSON_DEFINITION).unwrap();
    assert!(def.validate().is_empty());
}

#[test]
fn test_validate_collects_all_problems() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "SchemaName": "",
        "TestObjectName": "p",
        "MaxExecutionTime": 0,
        "Inputs": [
            {"ParameterName": "@A", "SqlType": "VARCHAR(9000)"},
            {"ParameterName": "@a", "SqlType": "INT"},
            {"ParameterName": "B", "SqlType": "XML"}
        ]
    }"#;
    let def = TestDefinition::from_json_str(json).unwrap();
    let results = def.validate();
    assert!(has_errors(&results));

    let properties: Vec<(&str, Severity)> = results
        .iter()
        .map(|r| (r.property.as_str(), r.severity))
        .collect();
    assert!(properties.contains(&("SchemaName", Severity::Error)));
    assert!(properties.contains(&("MaxExecutionTime", Severity::Warning)));
    assert!(properties.contains(&("Size", Severity::Error)));
    assert!(properties.contains(&("ParameterName", Severity::Error)));
    assert!(properties.contains(&("ParameterName", Severity::Warning)));
    assert!(properties.contains(&("SqlType", Severity::Error)));

    let size = results.iter().find(|r| r.property == "Size").unwrap();
    assert!(size.message.starts_with("Parameter '@A':"));
}

#[test]
fn test_timeout_falls_back_to_default() {
    let json = r#"{"SQL-Matrix-Api-Version": "v1", "TestObjectName": "p", "MaxExecutionTime": -5}"#;
    let def = TestDefinition::from_json_str(json).unwrap();
    assert_eq!(def.timeout_seconds(30), 30);
}

#[test]
fn test_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("orders.json");
    std::fs::write(&json_path, JSON_DEFINITION).unwrap();
    let def = TestDefinition::load(&json_path).unwrap();
    assert_eq!(def.test_object_name, "usp_GetOrders");

    let txt_path = dir.path().join("orders.txt");
    std::fs::write(&txt_path, JSON_DEFINITION).unwrap();
    assert!(matches!(
        TestDefinition::load(&txt_path),
        Err(CoreError::UnsupportedFormat { .. })
    ));

    assert!(matches!(
        TestDefinition::load(&dir.path().join("missing.json")),
        Err(CoreError::DefinitionNotFound { .. })
    ));

    let broken = dir.path().join("broken.yml");
    std::fs::write(&broken, "SQL-Matrix-Api-Version: [").unwrap();
    assert!(matches!(
        TestDefinition::load(&broken),
        Err(CoreError::DefinitionParseError { .. })
    ));
}

#[test]
fn test_json_round_trip_keeps_keys() {
    let def = TestDefinition::from_json_str(JSON_DEFINITION).unwrap();
    let json = def.to_json_string().unwrap();
    assert!(json.contains("\"SQL-Matrix-Api-Version\": \"v1\""));
    assert!(json.contains("\"Direction\": \"INPUT\""));
    let again = TestDefinition::from_json_str(&json).unwrap();
    assert_eq!(again.target_object(), def.target_object());
    assert_eq!(again.inputs.len(), 2);
}

#[test]
fn test_json_user_values_keep_exact_numerics() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "TestObjectName": "usp_Post",
        "Inputs": [
            {"ParameterName": "@Amount", "SqlType": "MONEY",
             "UserValues": [922337203685477.5807, -922337203685477.5808]},
            {"ParameterName": "@Rate", "SqlType": "DECIMAL(38, 10)",
             "UserValues": [1234567890123456789.0123456789]}
        ]
    }"#;
    let def = TestDefinition::from_json_str(json).unwrap();
    assert_eq!(
        def.inputs[0].user_values,
        vec![
            LiteralToken::Number("922337203685477.5807".to_string()),
            LiteralToken::Number("-922337203685477.5808".to_string()),
        ]
    );

    let params = def.parameters().unwrap();
    assert_eq!(
        params[1].user_values,
        vec![LiteralToken::Number(
            "1234567890123456789.0123456789".to_string()
        )]
    );
    assert!(def.validate().is_empty());

    let again = TestDefinition::from_json_str(&def.to_json_string().unwrap()).unwrap();
    assert_eq!(again.inputs[0].user_values, def.inputs[0].user_values);
    assert_eq!(again.inputs[1].user_values, def.inputs[1].user_values);
}

#[test]
fn test_parse_expected_results() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "TestObjectName": "usp_Fail",
        "Inputs": [],
        "ExpectedResults": [
            {"ExpectedResultType": "Exception", "ExpectedErrorNumber": 50000},
            {"ExpectedResultType": "value", "ExpectedValue": 12.50,
             "LastExecutionDateTime": "2024-03-01T10:15:00",
             "LastExecutionDuration": "00:00:00.0120000"}
        ]
    }"#;
    let def = TestDefinition::from_json_str(json).unwrap();
    assert_eq!(def.expected_results.len(), 2);

    let exception = &def.expected_results[0];
    assert_eq!(exception.result_type, ExpectedResultType::Exception);
    assert_eq!(exception.error_number, Some(50000));
    assert_eq!(exception.value, None);

    let value = &def.expected_results[1];
    assert_eq!(value.result_type, ExpectedResultType::Value);
    assert_eq!(value.value, Some(LiteralToken::Number("12.50".to_string())));
    assert_eq!(value.last_execution_duration.as_deref(), Some("00:00:00.0120000"));

    assert!(def.validate().is_empty());

    let out = def.to_json_string().unwrap();
    assert!(out.contains("\"ExpectedErrorNumber\": 50000"));
    assert!(out.contains("\"ExpectedResultType\": \"Exception\""));
}

#[test]
fn test_expected_results_omitted_when_empty() {
    let def = TestDefinition::from_json_str(JSON_DEFINITION).unwrap();
    assert!(def.expected_results.is_empty());
    assert!(!def.to_json_string().unwrap().contains("ExpectedResults"));
}

#[test]
fn test_validate_incomplete_expected_results() {
    let yaml = r#"
SQL-Matrix-Api-Version: v1
TestObjectName: usp_Fail
ExpectedResults:
  - ExpectedResultType: Exception
  - ExpectedResultType: Value
  - ExpectedResultType: Resultset
"#;
    let def = TestDefinition::from_yaml_str(yaml).unwrap();
    let results = def.validate();
    let properties: Vec<(&str, Severity)> = results
        .iter()
        .map(|r| (r.property.as_str(), r.severity))
        .collect();
    assert_eq!(
        properties,
        vec![
            ("ExpectedErrorNumber", Severity::Error),
            ("ExpectedValue", Severity::Error),
            ("ExpectedResultSets", Severity::Warning),
        ]
    );
    assert!(results[0].message.starts_with("Expected result 1:"));
}

#[test]
fn test_rejects_unknown_expected_result_type() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "TestObjectName": "p",
        "ExpectedResults": [{"ExpectedResultType": "Timeout"}]
    }"#;
    assert!(TestDefinition::from_json_str(json).is_err());
}
