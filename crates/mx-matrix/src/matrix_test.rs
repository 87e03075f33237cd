use super::*;
use mx_core::{LiteralToken, ParameterName, SqlTypeDefinition, SqlTypeKind, SqlValue};
use std::collections::HashSet;

fn param(name: &str, kind: SqlTypeKind) -> ParameterDefinition {
    ParameterDefinition::new(
        ParameterName::try_new(name).unwrap(),
        SqlTypeDefinition::new(kind),
    )
}

fn rendered(case: &TestCase) -> Vec<String> {
    case.bindings.iter().map(|b| b.value.to_sql_literal()).collect()
}

#[test]
fn test_no_parameters_yields_one_case() {
    let cases = MatrixBuilder::new()
        .build_test_cases(&[], "dbo.Proc", 30)
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert!(cases[0].bindings.is_empty());
    assert_eq!(cases[0].target_object, "dbo.Proc");
    assert_eq!(cases[0].timeout_seconds, 30);
    assert_eq!(cases[0].state, TestCaseState::Initialized);
}

#[test]
fn test_nullable_int_times_bit() {
    let params = vec![
        param("@P1", SqlTypeKind::Int).nullable(true),
        param("@P2", SqlTypeKind::Bit),
    ];
    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap();

    assert_eq!(cases.len(), 8);
    let unique: HashSet<Vec<String>> = cases.iter().map(rendered).collect();
    assert_eq!(unique.len(), 8);

    assert_eq!(rendered(&cases[0]), vec!["NULL", "0"]);
    assert_eq!(rendered(&cases[1]), vec!["NULL", "1"]);
    assert_eq!(rendered(&cases[7]), vec!["2147483647", "1"]);

    for (n, case) in cases.iter().enumerate() {
        assert_eq!(case.id, n + 1);
        assert_eq!(case.bindings[0].parameter.name, "@P1");
        assert_eq!(case.bindings[1].parameter.name, "@P2");
        assert_eq!(case.state, TestCaseState::Initialized);
    }
}

#[test]
fn test_bindings_share_parameter_definitions() {
    let params = vec![param("@P", SqlTypeKind::TinyInt)];
    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap();
    assert!(Arc::ptr_eq(
        &cases[0].bindings[0].parameter,
        &cases[1].bindings[0].parameter
    ));
}

#[test]
fn test_cases_can_move_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TestCase>();
    assert_send_sync::<TestCaseCollection>();
}

#[test]
fn test_empty_dimension_aborts_build() {
    let empty = |_: &SqlTypeDefinition| -> MatrixResult<Vec<SqlValue>> { Ok(Vec::new()) };
    let params = vec![
        param("@Ok", SqlTypeKind::Int).nullable(true),
        param("@Empty", SqlTypeKind::Int),
    ];
    let err = MatrixBuilder::with_source(&empty)
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap_err();
    assert!(matches!(err, MatrixError::EmptyDimension { ref parameter } if parameter == "@Empty"));
}

#[test]
fn test_invalid_type_aborts_build() {
    let params = vec![ParameterDefinition::new(
        ParameterName::try_new("@Amount").unwrap(),
        SqlTypeDefinition::with_precision(SqlTypeKind::Decimal, 39, 40),
    )];
    let err = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap_err();
    assert_eq!(err.parameter(), Some("@Amount"));
}

#[test]
fn test_combination_limit() {
    let params = vec![
        param("@A", SqlTypeKind::BigInt),
        param("@B", SqlTypeKind::BigInt),
    ];
    let err = MatrixBuilder::new()
        .with_max_combinations(8)
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap_err();
    assert!(matches!(
        err,
        MatrixError::TooManyCombinations { total: 9, limit: 8 }
    ));

    let cases = MatrixBuilder::new()
        .with_max_combinations(9)
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap();
    assert_eq!(cases.len(), 9);
}

#[test]
fn test_user_values_join_the_matrix() {
    let params = vec![ParameterDefinition::new(
        ParameterName::try_new("@Code").unwrap(),
        SqlTypeDefinition::with_size(SqlTypeKind::Char, 2),
    )
    .user_values([LiteralToken::from("X"), LiteralToken::from(3i64)])];

    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.Proc", 10)
        .unwrap();
    assert_eq!(cases.len(), 3);
    assert_eq!(
        cases[2].bindings[0].value,
        CandidateValue::User(SqlValue::Text("X".to_string()))
    );
    assert_eq!(cases.diagnostics().len(), 1);
    assert_eq!(cases.diagnostics()[0].parameter, "@Code");
}

#[test]
fn test_state_machine() {
    let mut case = MatrixBuilder::new()
        .build_test_cases(&[], "dbo.Proc", 30)
        .unwrap()
        .into_cases()
        .remove(0);

    assert!(matches!(
        case.transition(TestCaseState::Running),
        Err(MatrixError::InvalidTransition {
            from: TestCaseState::Initialized,
            to: TestCaseState::Running
        })
    ));
    case.transition(TestCaseState::Ready).unwrap();
    case.transition(TestCaseState::Running).unwrap();
    case.transition(TestCaseState::TestTimeout).unwrap();
    assert!(case.state.is_terminal());
    assert!(case.transition(TestCaseState::Ready).is_err());
    assert_eq!(case.state, TestCaseState::TestTimeout);
}

#[test]
fn test_early_exit_states() {
    for state in [
        TestCaseState::MissingExpectedResult,
        TestCaseState::InvalidInputParameter,
        TestCaseState::RequiredDataTableFailed,
        TestCaseState::TestObjectNotExist,
    ] {
        assert!(TestCaseState::Initialized.can_transition_to(state));
        assert!(!TestCaseState::Ready.can_transition_to(state));
        assert!(state.is_terminal());
    }
    assert!(!TestCaseState::Ready.can_transition_to(TestCaseState::TestSuccessful));
}

#[test]
fn test_sql_statements() {
    let params = vec![
        param("@Id", SqlTypeKind::TinyInt),
        param("@Out", SqlTypeKind::Bit).direction(mx_core::ParameterDirection::Output),
    ];
    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.usp_Test", 10)
        .unwrap();
    assert_eq!(
        cases[0].sql_statement(TestObjectType::StoredProcedure),
        "DECLARE @Out BIT = 0; EXEC dbo.usp_Test @Id = 0, @Out = @Out OUTPUT;"
    );
    assert_eq!(
        cases[3].sql_statement(TestObjectType::ScalarFunction),
        "SELECT dbo.usp_Test(255, 1);"
    );
    assert_eq!(
        cases[1].sql_statement(TestObjectType::TableValuedFunction),
        "SELECT * FROM dbo.usp_Test(0, 1);"
    );
}

#[test]
fn test_exec_prefixes_names_and_declares_outputs() {
    let params = vec![
        param("Input1", SqlTypeKind::Int),
        param("@Out", SqlTypeKind::Int)
            .nullable(true)
            .with_default(true)
            .direction(mx_core::ParameterDirection::Output),
    ];
    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.P", 10)
        .unwrap();

    assert_eq!(cases[0].bindings[0].sql_name(), "@Input1");
    assert_eq!(
        cases[0].sql_statement(TestObjectType::StoredProcedure),
        "DECLARE @Out INT = NULL; EXEC dbo.P @Input1 = -2147483648, @Out = @Out OUTPUT;"
    );
    assert_eq!(
        cases[1].sql_statement(TestObjectType::StoredProcedure),
        "EXEC dbo.P @Input1 = -2147483648, @Out = DEFAULT;"
    );
    assert_eq!(
        cases[4].sql_statement(TestObjectType::StoredProcedure),
        "DECLARE @Out INT = 2147483647; EXEC dbo.P @Input1 = -2147483648, @Out = @Out OUTPUT;"
    );
    assert_eq!(
        cases[0].sql_statement(TestObjectType::ScalarFunction),
        "SELECT dbo.P(-2147483648, NULL);"
    );
}

#[test]
fn test_build_for_definition() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "SchemaName": "sales",
        "TestObjectName": "usp_Find",
        "MaxExecutionTime": 0,
        "Inputs": [
            {"ParameterName": "@Id", "SqlType": "SMALLINT", "Nullable": false},
            {"ParameterName": "@Active", "SqlType": "BIT", "Default": true}
        ]
    }"#;
    let definition = TestDefinition::from_json_str(json).unwrap();
    let cases = MatrixBuilder::new()
        .build_for_definition(&definition, 45)
        .unwrap();
    // 3 smallint values x (NULL, DEFAULT, 0, 1)
    assert_eq!(cases.len(), 12);
    assert!(cases
        .iter()
        .all(|c| c.target_object == "sales.usp_Find" && c.timeout_seconds == 45));
}

#[test]
fn test_build_for_definition_rejects_bad_types() {
    let json = r#"{
        "SQL-Matrix-Api-Version": "v1",
        "TestObjectName": "p",
        "Inputs": [{"ParameterName": "@X", "SqlType": "CHAR(MAX)"}]
    }"#;
    let definition = TestDefinition::from_json_str(json).unwrap();
    let err = MatrixBuilder::new()
        .build_for_definition(&definition, 30)
        .unwrap_err();
    assert!(matches!(err, MatrixError::InvalidDefinition(_)));
    assert!(err.to_string().starts_with("[M008]"));
}

#[test]
fn test_serialized_case() {
    let params = vec![param("@Flag", SqlTypeKind::Bit)];
    let cases = MatrixBuilder::new()
        .build_test_cases(&params, "dbo.Proc", 5)
        .unwrap();
    let json = serde_json::to_value(&cases[1]).unwrap();
    assert_eq!(json["id"], 2);
    assert_eq!(json["state"], "Initialized");
    assert_eq!(json["bindings"][0]["parameter"], "@Flag");
    assert_eq!(json["bindings"][0]["sql_type"], "BIT");
    assert_eq!(json["bindings"][0]["value"]["value"], true);
}
