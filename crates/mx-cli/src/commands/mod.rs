//! CLI command implementations

pub(crate) mod common;
pub(crate) mod inspect;
pub(crate) mod matrix;
pub(crate) mod validate;
