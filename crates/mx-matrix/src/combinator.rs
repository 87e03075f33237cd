//! N-dimensional Cartesian product over index ranges
//!
//! Each dimension is a size `n >= 1`; enumeration yields every coordinate
//! tuple `[i0, i1, ...]` with `ik < nk` exactly once, last axis fastest.

use crate::error::{MatrixError, MatrixResult};

/// Cartesian-product enumerator over a list of dimension sizes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combinator {
    dimensions: Vec<usize>,
}

impl Combinator {
    /// Create a combinator without dimensions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a combinator from a list of dimension sizes
    pub fn with_dimensions(sizes: impl IntoIterator<Item = usize>) -> MatrixResult<Self> {
        let mut combinator = Self::new();
        for size in sizes {
            combinator.add_dimension(size)?;
        }
        Ok(combinator)
    }

    /// Append a dimension of `size` values
    pub fn add_dimension(&mut self, size: usize) -> MatrixResult<()> {
        if size == 0 {
            return Err(MatrixError::ZeroDimension);
        }
        self.dimensions.push(size);
        Ok(())
    }

    /// Sizes of all dimensions, in order
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Product of all dimension sizes; 0 when there are no dimensions
    ///
    /// Saturates at `u128::MAX`.
    pub fn total_combinations(&self) -> u128 {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions
            .iter()
            .fold(1u128, |acc, &n| acc.saturating_mul(n as u128))
    }

    /// Lazily enumerate all coordinate tuples
    ///
    /// Each call starts a fresh enumeration; the combinator is not modified.
    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            dimensions: &self.dimensions,
            current: vec![0; self.dimensions.len()],
            done: self.dimensions.is_empty(),
        }
    }
}

impl<'a> IntoIterator for &'a Combinator {
    type Item = Vec<usize>;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mixed-radix odometer over the dimensions of a [`Combinator`]
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    dimensions: &'a [usize],
    current: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tuple = self.current.clone();

        // advance, carrying from the last axis towards the first
        let mut axis = self.dimensions.len();
        loop {
            if axis == 0 {
                self.done = true;
                break;
            }
            axis -= 1;
            self.current[axis] += 1;
            if self.current[axis] < self.dimensions[axis] {
                break;
            }
            self.current[axis] = 0;
        }

        Some(tuple)
    }
}

#[cfg(test)]
#[path = "combinator_test.rs"]
mod tests;
