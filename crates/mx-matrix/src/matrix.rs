//! Test case materialization

use mx_core::{ParameterDefinition, ParameterDirection, TestDefinition, TestObjectType};
use serde::ser::SerializeStruct;
use serde::Serialize;
use std::sync::Arc;

use crate::builtin::{BoundaryValues, BuiltinValues};
use crate::candidate::{CandidateBuilder, CandidateValue, ConversionDiagnostic};
use crate::combinator::Combinator;
use crate::error::{MatrixError, MatrixResult};

static BUILTIN_VALUES: BuiltinValues = BuiltinValues;

/// Lifecycle state of a test case
///
/// The matrix builder only produces `Initialized` cases; everything after
/// that belongs to whoever executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TestCaseState {
    /// Freshly built
    #[default]
    Initialized,
    /// Checked and ready to run
    Ready,
    /// Executing
    Running,
    /// No expected result was defined
    MissingExpectedResult,
    /// An input value could not be bound
    InvalidInputParameter,
    /// Setting up required table data failed
    RequiredDataTableFailed,
    /// The routine does not exist in the database
    TestObjectNotExist,
    /// Finished and matched the expected result
    TestSuccessful,
    /// Finished with a different result
    TestFailed,
    /// Did not finish within the timeout
    TestTimeout,
}

impl TestCaseState {
    /// Returns true if the state can be left again
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            TestCaseState::Initialized | TestCaseState::Ready | TestCaseState::Running
        )
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: TestCaseState) -> bool {
        use TestCaseState::*;
        matches!(
            (self, next),
            (
                Initialized,
                Ready
                    | MissingExpectedResult
                    | InvalidInputParameter
                    | RequiredDataTableFailed
                    | TestObjectNotExist
            ) | (Ready, Running)
                | (Running, TestSuccessful | TestFailed | TestTimeout)
        )
    }
}

impl std::fmt::Display for TestCaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A parameter bound to one of its candidate values
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    /// The parameter, shared by all cases of a matrix
    pub parameter: Arc<ParameterDefinition>,

    /// Value used in this case
    pub value: CandidateValue,
}

impl ParameterBinding {
    /// Parameter name as T-SQL expects it, with a leading `@`
    pub fn sql_name(&self) -> String {
        let name = &self.parameter.name;
        if name.has_at_prefix() {
            name.to_string()
        } else {
            format!("@{name}")
        }
    }

    /// Returns true when the value travels through a local variable
    fn is_output_variable(&self) -> bool {
        self.parameter.direction == ParameterDirection::Output
            && !matches!(self.value, CandidateValue::Default)
    }

    /// `DECLARE @Name TYPE = value;` for output parameters
    fn declaration(&self) -> Option<String> {
        self.is_output_variable().then(|| {
            format!(
                "DECLARE {} {} = {};",
                self.sql_name(),
                self.parameter.type_def,
                self.value.to_sql_literal()
            )
        })
    }

    /// Argument text for an EXEC call: `@Name = value` or `@Name = @Name OUTPUT`
    fn exec_argument(&self) -> String {
        let name = self.sql_name();
        if self.is_output_variable() {
            format!("{name} = {name} OUTPUT")
        } else {
            format!("{name} = {}", self.value.to_sql_literal())
        }
    }
}

impl Serialize for ParameterBinding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ParameterBinding", 3)?;
        state.serialize_field("parameter", self.parameter.name.as_str())?;
        state.serialize_field("sql_type", &self.parameter.type_def)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// One concrete invocation of the routine under test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    /// 1-based position in the matrix
    pub id: usize,

    /// Parameter values, in parameter order
    pub bindings: Vec<ParameterBinding>,

    /// Qualified name of the routine, `schema.object`
    pub target_object: String,

    /// Timeout in seconds
    pub timeout_seconds: u32,

    /// Lifecycle state
    pub state: TestCaseState,
}

impl TestCase {
    /// Move the case to `next`, rejecting moves the lifecycle does not allow
    pub fn transition(&mut self, next: TestCaseState) -> MatrixResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(MatrixError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// T-SQL statement invoking the routine with this case's values
    pub fn sql_statement(&self, object_type: TestObjectType) -> String {
        match object_type {
            TestObjectType::StoredProcedure => {
                let mut statement: String = self
                    .bindings
                    .iter()
                    .filter_map(ParameterBinding::declaration)
                    .map(|declaration| declaration + " ")
                    .collect();
                let args: Vec<String> =
                    self.bindings.iter().map(ParameterBinding::exec_argument).collect();
                statement.push_str("EXEC ");
                statement.push_str(&self.target_object);
                if !args.is_empty() {
                    statement.push(' ');
                    statement.push_str(&args.join(", "));
                }
                statement.push(';');
                statement
            }
            TestObjectType::ScalarFunction => {
                format!("SELECT {}({});", self.target_object, self.positional_arguments())
            }
            TestObjectType::TableValuedFunction => {
                format!(
                    "SELECT * FROM {}({});",
                    self.target_object,
                    self.positional_arguments()
                )
            }
        }
    }

    fn positional_arguments(&self) -> String {
        self.bindings
            .iter()
            .map(|b| b.value.to_sql_literal())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read-only, ordered collection of built test cases
#[derive(Debug, Clone, Default)]
pub struct TestCaseCollection {
    cases: Vec<TestCase>,
    diagnostics: Vec<ConversionDiagnostic>,
}

impl TestCaseCollection {
    /// Number of test cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true when the collection holds no cases
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Test case at `index`
    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }

    /// Iterate over the test cases in order
    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }

    /// User values dropped while building the cases
    pub fn diagnostics(&self) -> &[ConversionDiagnostic] {
        &self.diagnostics
    }

    /// Take ownership of the cases, e.g. to hand them to an executor
    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases
    }
}

impl std::ops::Index<usize> for TestCaseCollection {
    type Output = TestCase;

    fn index(&self, index: usize) -> &TestCase {
        &self.cases[index]
    }
}

impl<'a> IntoIterator for &'a TestCaseCollection {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

/// Builds the full test matrix for a routine
pub struct MatrixBuilder<'a> {
    source: &'a dyn BoundaryValues,
    max_combinations: Option<u64>,
}

impl Default for MatrixBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixBuilder<'static> {
    /// Builder using the builtin boundary values and no size limit
    pub fn new() -> Self {
        Self {
            source: &BUILTIN_VALUES,
            max_combinations: None,
        }
    }
}

impl<'a> MatrixBuilder<'a> {
    /// Builder drawing boundary values from `source`
    pub fn with_source(source: &'a dyn BoundaryValues) -> Self {
        Self {
            source,
            max_combinations: None,
        }
    }

    /// Refuse to build matrices with more than `limit` cases
    pub fn with_max_combinations(mut self, limit: u64) -> Self {
        self.max_combinations = Some(limit);
        self
    }

    /// Build one test case per combination of parameter candidates
    ///
    /// Without parameters a single case without bindings is returned. Any
    /// failure aborts the whole build; no partial collection is returned.
    pub fn build_test_cases(
        &self,
        params: &[ParameterDefinition],
        target_object: &str,
        timeout_seconds: u32,
    ) -> MatrixResult<TestCaseCollection> {
        let candidate_builder = CandidateBuilder::new(self.source);
        let mut dimensions = Vec::with_capacity(params.len());
        let mut diagnostics = Vec::new();
        for param in params {
            let mut candidates = candidate_builder.build_candidates(param)?;
            diagnostics.append(&mut candidates.diagnostics);
            dimensions.push((Arc::new(param.clone()), candidates.values));
        }

        let new_case = |id: usize, bindings: Vec<ParameterBinding>| TestCase {
            id,
            bindings,
            target_object: target_object.to_string(),
            timeout_seconds,
            state: TestCaseState::Initialized,
        };

        if dimensions.is_empty() {
            log::debug!("No parameters for {target_object}, building a single test case");
            return Ok(TestCaseCollection {
                cases: vec![new_case(1, Vec::new())],
                diagnostics,
            });
        }

        let combinator = Combinator::with_dimensions(dimensions.iter().map(|(_, c)| c.len()))?;
        let total = combinator.total_combinations();
        log::debug!("Matrix for {target_object} has {total} combinations");
        if let Some(limit) = self.max_combinations {
            if total > u128::from(limit) {
                return Err(MatrixError::TooManyCombinations { total, limit });
            }
        }

        let cases = combinator
            .iter()
            .enumerate()
            .map(|(n, tuple)| {
                let bindings = tuple
                    .iter()
                    .zip(&dimensions)
                    .map(|(&index, (param, candidates))| ParameterBinding {
                        parameter: Arc::clone(param),
                        value: candidates[index].clone(),
                    })
                    .collect();
                new_case(n + 1, bindings)
            })
            .collect();

        Ok(TestCaseCollection { cases, diagnostics })
    }

    /// Build the matrix for a loaded definition file
    ///
    /// Uses `schema.object` as target and the definition's timeout, or
    /// `default_timeout` when the definition has none.
    pub fn build_for_definition(
        &self,
        definition: &TestDefinition,
        default_timeout: u32,
    ) -> MatrixResult<TestCaseCollection> {
        let params = definition.parameters()?;
        self.build_test_cases(
            &params,
            &definition.target_object(),
            definition.timeout_seconds(default_timeout),
        )
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod tests;
