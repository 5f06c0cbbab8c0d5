//! Commutation of triangular basis changes across echelon matrices.
//!
//! Given an echelon factor `E` produced by one of the factorizations and a
//! triangular operator, these routines produce the equivalent operator on
//! the other side of `E` (`L̃·E = E·L` and its three duals) without
//! re-running elimination. Re-expressing a basis change through a
//! previously computed reduction this way is what makes incremental
//! persistent/zigzag updates cheap.
//!
//! All four operators require `E` to be an echelon factor as returned by
//! the factorization routines (every nonzero column a single pivot entry);
//! entries of the triangular operator at rows outside the echelon image do
//! not affect the identity and are truncated.

use crate::columns::SparseVector;
use crate::fields::Field;
use crate::matrices::ColumnMatrix;

// Rescales every pivot of an echelon factor to one, returning the per-row
// factors that recover the original (rows without a pivot scale by one).
// Only pivot values are ever inverted downstream, and those are non-zero
// by the echelon contract.
fn unit_pivot_scale<F: Field>(e: &mut ColumnMatrix<F>) -> Vec<F> {
    let mut scale = vec![F::one(); e.n_rows()];
    for j in 0..e.n_cols() {
        let Some((row, value)) = e.col_mut(j).first_value_mut() else {
            // zero columns trail in echelon form
            break;
        };
        scale[row] = value.clone();
        *value = F::one();
    }
    scale
}

/// Produces `L̃` with `L̃·E = E·L`, for `E` the EL-shaped factor of
/// [`leup`](crate::factor::leup) and `L` lower triangular on `E`'s domain.
///
/// Each column of `L` is rewritten through the map sending a pivot column
/// to its pivot row: entry `L[i, j]` lands at `(p_i, p_j)` scaled by
/// `s_{p_i} / s_{p_j}` for the pivot values `s`, and the rewritten column
/// sits at position `p_j`. Rows without a pivot keep their identity
/// column.
///
/// # Panics
///
/// Panics if `L` is not square or its size differs from `E`'s column
/// count.
pub fn el_l_commute<F: Field>(e: &ColumnMatrix<F>, l: &ColumnMatrix<F>) -> ColumnMatrix<F> {
    assert_eq!(l.n_rows(), l.n_cols(), "commuted operator must be square");
    assert_eq!(
        e.n_cols(),
        l.n_rows(),
        "operator size {} does not match echelon domain {}",
        l.n_rows(),
        e.n_cols()
    );

    let mut unit_e = e.clone();
    let scale = unit_pivot_scale(&mut unit_e);

    // pivot row of each column; None once the zero columns start
    let pivot_row: Vec<Option<usize>> = (0..unit_e.n_cols())
        .map(|j| unit_e.col(j).first().map(|&(row, _)| row))
        .collect();

    let mut result = ColumnMatrix::identity(e.n_rows());
    for j in 0..l.n_cols() {
        let Some(target) = pivot_row[j] else {
            break;
        };
        let target_scale_inv = scale[target].inv();
        let mut rewritten = SparseVector::new();
        for &(row, ref value) in l.col(j).iter() {
            let Some(image) = pivot_row.get(row).copied().flatten() else {
                // rows outside the echelon image cannot reach it; truncate
                break;
            };
            rewritten.push_unchecked(
                image,
                scale[image].clone() * value.clone() * target_scale_inv.clone(),
            );
        }
        result.set_col(target, rewritten);
    }
    result
}

/// Produces `L̃` with `E·L̃ = L·E`, for `E` the ELhat-shaped factor of
/// [`puel`](crate::factor::puel) and `L` lower triangular on `E`'s
/// codomain.
///
/// # Panics
///
/// Panics if `L` is not square or its size differs from `E`'s row count.
pub fn l_el_commute<F: Field>(l: &ColumnMatrix<F>, e: &ColumnMatrix<F>) -> ColumnMatrix<F> {
    assert_eq!(l.n_rows(), l.n_cols(), "commuted operator must be square");
    assert_eq!(
        e.n_rows(),
        l.n_cols(),
        "operator size {} does not match echelon codomain {}",
        l.n_cols(),
        e.n_rows()
    );
    el_l_commute(
        &e.transpose().conjugate(),
        &l.transpose().conjugate(),
    )
    .transpose()
    .conjugate()
}

/// Produces `Ũ` with `U·E = E·Ũ`, for `E` the EU-shaped factor of
/// [`pleu`](crate::factor::pleu) and `U` upper triangular on `E`'s
/// codomain.
///
/// # Panics
///
/// Panics if `U` is not square or its size differs from `E`'s row count.
pub fn u_eu_commute<F: Field>(u: &ColumnMatrix<F>, e: &ColumnMatrix<F>) -> ColumnMatrix<F> {
    assert_eq!(u.n_rows(), u.n_cols(), "commuted operator must be square");
    assert_eq!(
        e.n_rows(),
        u.n_cols(),
        "operator size {} does not match echelon codomain {}",
        u.n_cols(),
        e.n_rows()
    );
    el_l_commute(&e.transpose(), &u.transpose()).transpose()
}

/// Produces `Ũ` with `E·U = Ũ·E`, for `E` the EUhat-shaped factor of
/// [`uelp`](crate::factor::uelp) and `U` upper triangular on `E`'s domain.
///
/// # Panics
///
/// Panics if `U` is not square or its size differs from `E`'s column
/// count.
pub fn eu_u_commute<F: Field>(e: &ColumnMatrix<F>, u: &ColumnMatrix<F>) -> ColumnMatrix<F> {
    assert_eq!(u.n_rows(), u.n_cols(), "commuted operator must be square");
    assert_eq!(
        e.n_cols(),
        u.n_rows(),
        "operator size {} does not match echelon domain {}",
        u.n_rows(),
        e.n_cols()
    );
    l_el_commute(&u.transpose(), &e.transpose()).transpose()
}
