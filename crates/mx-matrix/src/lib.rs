//! mx-matrix - Test matrix generation for SQL Matrix
//!
//! This crate derives boundary values for SQL types, assembles per-parameter
//! candidate lists, and enumerates their Cartesian product into test cases.

pub mod builtin;
pub mod candidate;
pub mod combinator;
pub mod convert;
pub mod error;
pub mod matrix;

pub use builtin::{BoundaryValues, BuiltinValues};
pub use candidate::{CandidateBuilder, CandidateValue, ConversionDiagnostic, ParameterCandidates};
pub use combinator::{Combinations, Combinator};
pub use convert::convert_user_value;
pub use error::{ConversionError, MatrixError, MatrixResult};
pub use matrix::{MatrixBuilder, ParameterBinding, TestCase, TestCaseCollection, TestCaseState};
