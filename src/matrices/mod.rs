//! Column-major sparse matrices with the algebraic operations and shape
//! predicates the factorization and commutation routines are written
//! against.

use std::ops::Mul;

use rand::Rng;

use crate::columns::SparseVector;
use crate::fields::{Field, Ring};

#[cfg(test)]
mod tests;

/// A linear map between two fixed-dimension spaces, stored as one owned
/// [`SparseVector`] per column. Row and column counts are declared up
/// front; every column's indices stay below the row count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMatrix<R> {
    n_rows: usize,
    n_cols: usize,
    columns: Vec<SparseVector<R>>,
}

impl<R: Ring> ColumnMatrix<R> {
    /// The zero matrix of the given shape.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            columns: vec![SparseVector::new(); n_cols],
        }
    }

    /// The identity matrix of the given size.
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            columns: (0..n).map(|i| SparseVector::single(i, R::one())).collect(),
        }
    }

    /// Builds from owned columns.
    ///
    /// # Panics
    ///
    /// Panics if any column stores an index at or beyond `n_rows`.
    pub fn from_columns(n_rows: usize, columns: Vec<SparseVector<R>>) -> Self {
        for col in &columns {
            assert!(
                col.last().map_or(true, |(row, _)| *row < n_rows),
                "column entry exceeds declared row count {n_rows}"
            );
        }
        Self {
            n_rows,
            n_cols: columns.len(),
            columns,
        }
    }

    /// Builds from a dense row-major layout; zero entries are not stored.
    pub fn from_rows(rows: Vec<Vec<R>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == n_cols),
            "ragged rows in dense constructor"
        );
        let columns = (0..n_cols)
            .map(|j| SparseVector::from_entries(rows.iter().enumerate().map(|(i, row)| (i, row[j].clone()))))
            .collect();
        Self {
            n_rows,
            n_cols,
            columns,
        }
    }

    /// A random test matrix: every entry is occupied independently with
    /// probability `density`, with value the image of a uniform draw from
    /// `1..=max_val` (which may be zero in the ring - such entries are
    /// dropped). Pass a seeded generator for reproducibility.
    pub fn random(
        n_rows: usize,
        n_cols: usize,
        density: f64,
        max_val: i64,
        rng: &mut impl Rng,
    ) -> Self {
        let columns = (0..n_cols)
            .map(|_| {
                let mut col = SparseVector::new();
                for i in 0..n_rows {
                    if rng.gen::<f64>() < density {
                        let value = R::from_int(rng.gen_range(1..=max_val));
                        if !value.is_zero() {
                            col.push_unchecked(i, value);
                        }
                    }
                }
                col
            })
            .collect();
        Self {
            n_rows,
            n_cols,
            columns,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn col(&self, j: usize) -> &SparseVector<R> {
        &self.columns[j]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut SparseVector<R> {
        &mut self.columns[j]
    }

    /// Replaces column `j`.
    ///
    /// # Panics
    ///
    /// Panics if the new column's indices exceed the row count.
    pub fn set_col(&mut self, j: usize, column: SparseVector<R>) {
        assert!(
            column.last().map_or(true, |(row, _)| *row < self.n_rows),
            "column entry exceeds declared row count {}",
            self.n_rows
        );
        self.columns[j] = column;
    }

    /// Mutable access to two distinct columns at once, as the Schur update
    /// needs.
    pub fn two_cols_mut(&mut self, a: usize, b: usize) -> (&mut SparseVector<R>, &mut SparseVector<R>) {
        assert!(a != b, "two_cols_mut requires distinct columns");
        if a < b {
            let (head, tail) = self.columns.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.columns.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }

    /// The stored value at `(i, j)`, if any.
    pub fn entry(&self, i: usize, j: usize) -> Option<&R> {
        self.columns[j].value_at(i)
    }

    /// Exchanges two columns by ownership - O(1) regardless of density.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        self.columns.swap(a, b);
    }

    pub fn transpose(&self) -> Self {
        let mut columns = vec![SparseVector::new(); self.n_rows];
        for j in 0..self.n_cols {
            for (i, value) in self.col(j).iter() {
                columns[*i].push_unchecked(j, value.clone());
            }
        }
        Self {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            columns,
        }
    }

    /// Conjugation by the exchange matrix J: reverses both the row and the
    /// column order. An involution; converts between the EL/EU shape
    /// family and the hat family, and exchanges triangular orientations.
    pub fn conjugate(&self) -> Self {
        let columns = (0..self.n_cols)
            .rev()
            .map(|j| {
                let mut col = SparseVector::new();
                for (i, value) in self.col(j).iter().rev() {
                    col.push_unchecked(self.n_rows - 1 - i, value.clone());
                }
                col
            })
            .collect();
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            columns,
        }
    }

    /// Multiplies every entry in row `i`, across all columns, by
    /// `coeffs[i]`. Entries scaled by zero are removed.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one coefficient per row is supplied.
    pub fn row_scale(mut self, coeffs: &[R]) -> Self {
        assert_eq!(coeffs.len(), self.n_rows, "one scale factor per row");
        for col in &mut self.columns {
            *col = SparseVector::from_entries(
                col.iter()
                    .map(|(i, value)| (*i, coeffs[*i].clone() * value.clone())),
            );
        }
        self
    }

    // ======== Shape predicates ===================================
    //
    // All of these are computed from the stored entries on demand; nothing
    // caches them across mutations.

    /// Every column's entries sit at or above the diagonal.
    pub fn is_upper(&self) -> bool {
        (0..self.n_cols).all(|j| self.col(j).iter().all(|(i, _)| *i <= j))
    }

    /// Every column's entries sit at or below the diagonal.
    pub fn is_lower(&self) -> bool {
        (0..self.n_cols).all(|j| self.col(j).iter().all(|(i, _)| *i >= j))
    }

    /// Exactly one entry per row and per column, each the multiplicative
    /// identity - a permutation matrix.
    pub fn is_pivot(&self) -> bool {
        if self.n_rows != self.n_cols {
            return false;
        }
        let mut row_used = vec![false; self.n_rows];
        for col in &self.columns {
            if col.len() != 1 {
                return false;
            }
            let Some(&(row, ref value)) = col.first() else {
                return false;
            };
            if row_used[row] || !value.is_one() {
                return false;
            }
            row_used[row] = true;
        }
        true
    }

    /// Column echelon growing downward: pivot rows (each column's lowest
    /// stored index) strictly increase over the nonzero columns, and zero
    /// columns trail.
    pub fn is_el(&self) -> bool {
        let mut last_pivot = None;
        let mut seen_zero = false;
        for col in &self.columns {
            match col.first() {
                None => seen_zero = true,
                Some(&(row, _)) => {
                    if seen_zero || last_pivot.map_or(false, |p| p >= row) {
                        return false;
                    }
                    last_pivot = Some(row);
                }
            }
        }
        true
    }

    /// The transposed-ordering dual of [`is_el`](Self::is_el).
    pub fn is_eu(&self) -> bool {
        self.transpose().is_el()
    }

    /// The conjugated dual satisfied by the echelon factor of
    /// [`puel`](crate::factor::puel).
    pub fn is_el_hat(&self) -> bool {
        self.conjugate().is_eu()
    }

    /// The conjugated dual satisfied by the echelon factor of
    /// [`uelp`](crate::factor::uelp).
    pub fn is_eu_hat(&self) -> bool {
        self.conjugate().is_el()
    }
}

impl<'a, R: Ring> Mul<&'a ColumnMatrix<R>> for &'a ColumnMatrix<R> {
    type Output = ColumnMatrix<R>;

    /// Exact sparse product: each output column is the linear combination
    /// of left-hand columns weighted by the right-hand column's entries,
    /// with cancellations pruned.
    ///
    /// # Panics
    ///
    /// Panics on inner-dimension mismatch.
    fn mul(self, rhs: &'a ColumnMatrix<R>) -> ColumnMatrix<R> {
        assert_eq!(
            self.n_cols, rhs.n_rows,
            "product dimension mismatch: {}x{} * {}x{}",
            self.n_rows, self.n_cols, rhs.n_rows, rhs.n_cols
        );
        let columns = rhs
            .columns
            .iter()
            .map(|rhs_col| {
                let mut out = SparseVector::new();
                for (k, weight) in rhs_col.iter() {
                    out.axpy(weight, self.col(*k), 0, self.n_rows);
                }
                out
            })
            .collect();
        ColumnMatrix {
            n_rows: self.n_rows,
            n_cols: rhs.n_cols,
            columns,
        }
    }
}

/// Solves `U * x = y` by sparse back-substitution.
///
/// # Panics
///
/// Panics if `U` is not square, if `y` reaches past its dimension, or if a
/// diagonal entry needed along the way is zero (which an upper triangular
/// operator with invertible diagonal never has).
pub fn u_solve<F: Field>(u: &ColumnMatrix<F>, y: &SparseVector<F>) -> SparseVector<F> {
    assert_eq!(u.n_rows(), u.n_cols(), "triangular solve requires a square operator");
    assert!(
        y.last().map_or(true, |(row, _)| *row < u.n_rows()),
        "vector reaches past the operator's dimension"
    );
    let mut residual = y.clone();
    let mut solution = Vec::new();
    while let Some((row, value)) = residual.last().cloned() {
        let diag = u
            .entry(row, row)
            .expect("upper solve requires a nonzero diagonal")
            .clone();
        let x = value * diag.inv();
        // clears the trailing residual entry exactly
        residual.axpy(&-x.clone(), u.col(row), 0, row + 1);
        solution.push((row, x));
    }
    solution.reverse();
    SparseVector::from_entries(solution)
}

/// Solves `L * x = y` by sparse forward-substitution.
///
/// # Panics
///
/// As for [`u_solve`], with `L` lower triangular.
pub fn l_solve<F: Field>(l: &ColumnMatrix<F>, y: &SparseVector<F>) -> SparseVector<F> {
    assert_eq!(l.n_rows(), l.n_cols(), "triangular solve requires a square operator");
    assert!(
        y.last().map_or(true, |(row, _)| *row < l.n_rows()),
        "vector reaches past the operator's dimension"
    );
    let n = l.n_rows();
    let mut residual = y.clone();
    let mut solution = Vec::new();
    while let Some((row, value)) = residual.first().cloned() {
        let diag = l
            .entry(row, row)
            .expect("lower solve requires a nonzero diagonal")
            .clone();
        let x = value * diag.inv();
        residual.axpy(&-x.clone(), l.col(row), row, n);
        solution.push((row, x));
    }
    SparseVector::from_entries(solution)
}
