//! The four dual canonical factorizations, all built from a single
//! column-echelon reduction kernel.
//!
//! [`leup`] performs exact column-oriented Gaussian elimination with
//! incremental pivot bookkeeping; [`pleu`], [`uelp`] and [`puel`] are thin
//! wrappers that apply a transpose and/or conjugation symmetry around the
//! same kernel, so only one elimination ever needs to be proved correct.
//! [`lqu`] is the swap-free variant whose middle factor is a partial
//! permutation.

use rustc_hash::FxHashMap;

use crate::columns::SparseVector;
use crate::fields::Field;
use crate::matrices::ColumnMatrix;

/// An owned factorization bundle. Which ordered product reconstructs the
/// input depends on the routine that produced it: [`leup`] satisfies
/// `L·E·U·P = A`, [`pleu`] `P·L·E·U = A`, [`uelp`] `U·E·L·P = A`,
/// [`puel`] `P·U·E·L = A`, and [`lqu`] `L·E·U = A` with `P` the identity.
#[derive(Clone, Debug)]
pub struct Factorization<F> {
    pub l: ColumnMatrix<F>,
    pub e: ColumnMatrix<F>,
    pub u: ColumnMatrix<F>,
    pub p: ColumnMatrix<F>,
}

impl<F: Field> Factorization<F> {
    pub fn leup_prod(&self) -> ColumnMatrix<F> {
        &(&(&self.l * &self.e) * &self.u) * &self.p
    }

    pub fn pleu_prod(&self) -> ColumnMatrix<F> {
        &(&(&self.p * &self.l) * &self.e) * &self.u
    }

    pub fn uelp_prod(&self) -> ColumnMatrix<F> {
        &(&(&self.u * &self.e) * &self.l) * &self.p
    }

    pub fn puel_prod(&self) -> ColumnMatrix<F> {
        &(&(&self.p * &self.u) * &self.e) * &self.l
    }

    pub fn lqu_prod(&self) -> ColumnMatrix<F> {
        &(&self.l * &self.e) * &self.u
    }
}

// Pivot map: row index -> columns whose current lowest entry past the
// elimination front sits in that row. Local to one reduction, discarded
// afterwards.
type PivotMap = FxHashMap<usize, Vec<usize>>;

// Deferred elimination history: (pivot row, U row, inverse pivot value).
type History<F> = Vec<(usize, usize, F)>;

fn record_pivot<F: Field>(e: &ColumnMatrix<F>, pivots: &mut PivotMap, j: usize, from_row: usize) {
    if let Some(&(row, _)) = e.col(j).lower_bound(from_row) {
        pivots.entry(row).or_default().push(j);
    }
}

fn forget_pivot<F: Field>(e: &ColumnMatrix<F>, pivots: &mut PivotMap, j: usize, from_row: usize) {
    if let Some(&(row, _)) = e.col(j).lower_bound(from_row) {
        if let Some(bucket) = pivots.get_mut(&row) {
            if let Some(at) = bucket.iter().position(|&col| col == j) {
                bucket.remove(at);
            }
        }
    }
}

fn collect_pivots<F: Field>(e: &ColumnMatrix<F>) -> PivotMap {
    let mut pivots = PivotMap::default();
    for j in 0..e.n_cols() {
        record_pivot(e, &mut pivots, j, 0);
    }
    pivots
}

// The reduction kernel. On entry `f.e` holds a working copy of the input
// and the other three factors are identities; on exit `L·E·U·P` equals the
// input, with L lower unitriangular, E echelon (EL), U upper unitriangular
// and P a permutation.
fn leup_inplace<F: Field>(f: &mut Factorization<F>) {
    let m = f.e.n_rows();
    let n = f.e.n_cols();
    let mut pivots = collect_pivots(&f.e);
    let mut history: History<F> = Vec::new();

    let mut i = 0;
    let mut j = 0;
    while i < m && j < n {
        let Some(j2) = pivots.get(&i).map(|bucket| bucket[0]) else {
            // no pivot in this row; skip it
            i += 1;
            continue;
        };

        if j2 != j {
            forget_pivot(&f.e, &mut pivots, j, i);
            f.e.swap_cols(j, j2);
            record_pivot(&f.e, &mut pivots, j2, i);
            f.p.swap_cols(j, j2);
        }

        // materialize U's column for the column about to be fixed
        f.u.col_mut(j).apply_history(f.e.col(j), &history);

        let a0 = f
            .e
            .entry(i, j)
            .expect("pivot map points at a stored entry")
            .clone();
        let a0_inv = a0.inv();

        // Schur complement update of every other column sharing pivot row
        // i. The bucket head stands for the column now at position j and
        // is skipped; the remainder genuinely pivot in row i.
        let sharing = pivots.remove(&i).expect("bucket present for pivot row");
        for &jj in sharing.iter().skip(1) {
            let v = f
                .e
                .entry(i, jj)
                .expect("bucket member stores its pivot row")
                .clone();
            let c = -(v * a0_inv.clone());
            let (pivot_col, target) = f.e.two_cols_mut(j, jj);
            target.axpy(&c, pivot_col, i + 1, m);
            record_pivot(&f.e, &mut pivots, jj, i + 1);
        }

        // below-pivot multipliers become column i of L
        f.l.col_mut(i).axpy(&a0_inv, f.e.col(j), i + 1, m);
        history.push((i, j, a0_inv));

        // everything else in the column has been eliminated
        f.e.set_col(j, SparseVector::single(i, a0));
        i += 1;
        j += 1;
    }

    // remaining columns depend linearly on the fixed ones: flush their
    // deferred history into U, then clear them out of E
    while j < n {
        f.u.col_mut(j).apply_history(f.e.col(j), &history);
        f.e.col_mut(j).clear();
        j += 1;
    }

    f.p = f.p.transpose();
}

/// LEUP factorization: `L·E·U·P = A` with `L` lower unitriangular, `E`
/// EL-shaped, `U` upper unitriangular and `P` a permutation.
pub fn leup<F: Field>(a: &ColumnMatrix<F>) -> Factorization<F> {
    let mut f = Factorization {
        l: ColumnMatrix::identity(a.n_rows()),
        e: a.clone(),
        u: ColumnMatrix::identity(a.n_cols()),
        p: ColumnMatrix::identity(a.n_cols()),
    };
    leup_inplace(&mut f);
    f
}

/// PLEU factorization: `P·L·E·U = A` with `E` EU-shaped.
///
/// Transposing swaps the roles of upper and lower, so the kernel runs on
/// `Aᵀ` and the returned L and U trade places.
pub fn pleu<F: Field>(a: &ColumnMatrix<F>) -> Factorization<F> {
    let f = leup(&a.transpose());
    Factorization {
        l: f.u.transpose(),
        e: f.e.transpose(),
        u: f.l.transpose(),
        p: f.p.transpose(),
    }
}

/// UELP factorization: `U·E·L·P = A` with `E` EUhat-shaped.
///
/// Conjugation also reverses triangular orientation, so L and U trade
/// places on the way back out.
pub fn uelp<F: Field>(a: &ColumnMatrix<F>) -> Factorization<F> {
    let f = leup(&a.conjugate());
    Factorization {
        l: f.u.conjugate(),
        e: f.e.conjugate(),
        u: f.l.conjugate(),
        p: f.p.conjugate(),
    }
}

/// PUEL factorization: `P·U·E·L = A` with `E` ELhat-shaped.
///
/// Composes both symmetries; the two orientation reversals cancel, so L
/// and U keep their roles.
pub fn puel<F: Field>(a: &ColumnMatrix<F>) -> Factorization<F> {
    let f = leup(&a.conjugate().transpose());
    Factorization {
        l: f.l.transpose().conjugate(),
        e: f.e.transpose().conjugate(),
        u: f.u.transpose().conjugate(),
        p: f.p.transpose().conjugate(),
    }
}

/// LQU factorization: `L·E·U = A` with `L` lower triangular (carrying the
/// pivot values on its diagonal), `E` a unit-entry partial permutation and
/// `U` upper unitriangular. The returned `p` is the identity.
///
/// This is the swap-free sibling of [`leup`]: pivot columns stay where
/// they are, so no permutation factor arises. Within a pivot row the
/// leftmost candidate column must be chosen - that is what keeps `U`
/// upper triangular.
pub fn lqu<F: Field>(a: &ColumnMatrix<F>) -> Factorization<F> {
    let m = a.n_rows();
    let n = a.n_cols();
    let mut f = Factorization {
        l: ColumnMatrix::identity(m),
        e: a.clone(),
        u: ColumnMatrix::identity(n),
        p: ColumnMatrix::identity(n),
    };

    let mut pivots = collect_pivots(&f.e);
    let mut history: History<F> = Vec::new();
    let mut fixed = vec![false; n];

    for i in 0..m {
        let Some(bucket) = pivots.remove(&i) else {
            continue;
        };
        let j = *bucket.iter().min().expect("buckets are never empty");

        f.u.col_mut(j).apply_history(f.e.col(j), &history);

        let a0_inv = f
            .e
            .entry(i, j)
            .expect("pivot map points at a stored entry")
            .inv();

        for &jj in bucket.iter().filter(|&&jj| jj != j) {
            let v = f
                .e
                .entry(i, jj)
                .expect("bucket member stores its pivot row")
                .clone();
            let c = -(v * a0_inv.clone());
            let (pivot_col, target) = f.e.two_cols_mut(j, jj);
            target.axpy(&c, pivot_col, i + 1, m);
            record_pivot(&f.e, &mut pivots, jj, i + 1);
        }

        // the pivot column from its pivot row down, values included,
        // becomes column i of L; E keeps only a unit marker
        f.l.set_col(i, f.e.col(j).suffix(i));
        history.push((i, j, a0_inv));
        f.e.set_col(j, SparseVector::single(i, F::one()));
        fixed[j] = true;
    }

    for j in 0..n {
        if !fixed[j] {
            f.u.col_mut(j).apply_history(f.e.col(j), &history);
            f.e.col_mut(j).clear();
        }
    }

    f
}
