//! Ordered sparse vectors: the column representation every matrix in this
//! crate is built from, with the merge primitives the reduction kernel
//! spends nearly all of its time in.

use std::fmt::{self, Debug};

use itertools::{merge_join_by, EitherOrBoth};

use crate::fields::Ring;

/// One column (or, dually, one row) of a sparse matrix: `(row, value)`
/// pairs strictly increasing by row, with no stored zeros. Any operation
/// that produces a zero at some row removes that entry.
#[derive(Clone, PartialEq, Eq)]
pub struct SparseVector<R> {
    entries: Vec<(usize, R)>,
}

impl<R: Debug> Debug for SparseVector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(row, value)| (row, value)))
            .finish()
    }
}

impl<R> Default for SparseVector<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

// Merges two sorted entry runs, adding coefficients on collisions and
// dropping anything that sums to zero.
fn merge_add<R: Ring>(
    lhs: Vec<(usize, R)>,
    rhs: impl IntoIterator<Item = (usize, R)>,
) -> Vec<(usize, R)> {
    merge_join_by(lhs, rhs, |(a, _), (b, _)| a.cmp(b))
        .filter_map(|pair| match pair {
            EitherOrBoth::Left(entry) => Some(entry),
            EitherOrBoth::Right(entry) => (!entry.1.is_zero()).then_some(entry),
            EitherOrBoth::Both((row, a), (_, b)) => {
                let sum = a + b;
                (!sum.is_zero()).then_some((row, sum))
            }
        })
        .collect()
}

impl<R: Ring> SparseVector<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vector with a single entry.
    pub fn single(row: usize, value: R) -> Self {
        debug_assert!(!value.is_zero());
        Self {
            entries: vec![(row, value)],
        }
    }

    /// Builds from entries already sorted strictly by row. Zero values are
    /// dropped rather than stored.
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, R)>) -> Self {
        let mut out = Self::new();
        for (row, value) in entries {
            if !value.is_zero() {
                out.push_unchecked(row, value);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (usize, R)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends an entry. The caller guarantees `row` exceeds every stored
    /// row index and `value` is non-zero.
    pub fn push_unchecked(&mut self, row: usize, value: R) {
        debug_assert!(self.entries.last().map_or(true, |(last, _)| *last < row));
        debug_assert!(!value.is_zero());
        self.entries.push((row, value));
    }

    /// The lowest stored entry - the pivot, in echelon contexts.
    pub fn first(&self) -> Option<&(usize, R)> {
        self.entries.first()
    }

    /// The highest stored entry.
    pub fn last(&self) -> Option<&(usize, R)> {
        self.entries.last()
    }

    /// Mutable access to the lowest entry's value.
    pub fn first_value_mut(&mut self) -> Option<(usize, &mut R)> {
        self.entries.first_mut().map(|(row, value)| (*row, value))
    }

    /// The first stored entry with row index at least `row`.
    pub fn lower_bound(&self, row: usize) -> Option<&(usize, R)> {
        let at = self.entries.partition_point(|(r, _)| *r < row);
        self.entries.get(at)
    }

    /// The stored value at `row`, if any.
    pub fn value_at(&self, row: usize) -> Option<&R> {
        self.entries
            .binary_search_by_key(&row, |(r, _)| *r)
            .ok()
            .map(|at| &self.entries[at].1)
    }

    /// The stored entries with row index in `row_start..row_end`.
    pub fn range(&self, row_start: usize, row_end: usize) -> &[(usize, R)] {
        let lo = self.entries.partition_point(|(r, _)| *r < row_start);
        let hi = self.entries.partition_point(|(r, _)| *r < row_end);
        &self.entries[lo..hi]
    }

    /// The tail of the vector from `row` on, as an owned vector.
    pub fn suffix(&self, row: usize) -> Self {
        let at = self.entries.partition_point(|(r, _)| *r < row);
        Self {
            entries: self.entries[at..].to_vec(),
        }
    }

    /// Adds `coeff * other` into `self`, restricted to rows in
    /// `row_start..row_end`, keeping sorted order and dropping entries that
    /// cancel.
    pub fn axpy(&mut self, coeff: &R, other: &Self, row_start: usize, row_end: usize) {
        if coeff.is_zero() {
            return;
        }
        let existing = std::mem::take(&mut self.entries);
        let incoming = other
            .range(row_start, row_end)
            .iter()
            .map(|(row, value)| (*row, coeff.clone() * value.clone()));
        self.entries = merge_add(existing, incoming);
    }

    /// Applies a deferred elimination history against `source`: for every
    /// step `(pivot_row, target_row, coeff)` such that `source` stores a
    /// value `v` at `pivot_row`, adds `v * coeff` at `target_row`.
    ///
    /// The steps of one reduction carry pairwise distinct target rows, so
    /// the generated updates cannot collide with each other; they are
    /// sorted and merged into `self` in a single pass. This is what lets
    /// the reduction kernel materialize a column of U once, when the
    /// column is fixed or abandoned, instead of after every elimination.
    pub fn apply_history(&mut self, source: &Self, history: &[(usize, usize, R)]) {
        let mut updates: Vec<(usize, R)> = history
            .iter()
            .filter_map(|(pivot_row, target_row, coeff)| {
                source
                    .value_at(*pivot_row)
                    .map(|v| (*target_row, v.clone() * coeff.clone()))
            })
            .collect();
        if updates.is_empty() {
            return;
        }
        updates.sort_unstable_by_key(|(row, _)| *row);
        let existing = std::mem::take(&mut self.entries);
        self.entries = merge_add(existing, updates);
    }
}
