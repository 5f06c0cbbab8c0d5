// ======== Tests ==============================================

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::columns::SparseVector;
use crate::fields::{Field, Q64, QBig, Ring, Z2, Z3, Z5};
use crate::matrices::{l_solve, u_solve, ColumnMatrix};

#[test]
fn test_matrix_product() {
    // squaring a known integer matrix
    let a = ColumnMatrix::from_rows(vec![
        vec![2i64, 3, 4],
        vec![1, 2, 3],
        vec![8, 5, 2],
    ]);
    let expected = ColumnMatrix::from_rows(vec![
        vec![39i64, 32, 25],
        vec![28, 22, 16],
        vec![37, 44, 51],
    ]);
    assert_eq!(&a * &a, expected);
}

#[test]
fn test_product_prunes_cancellations() {
    // over Z2 the square of this matrix collapses to a single entry
    let a = ColumnMatrix::from_columns(
        2,
        vec![
            SparseVector::from_entries([(0, Z2::one())]),
            SparseVector::from_entries([(0, Z2::one()), (1, Z2::one())]),
        ],
    );
    let fourth = &(&a * &a) * &(&a * &a);
    assert_eq!(fourth, ColumnMatrix::identity(2));
}

#[test]
#[should_panic(expected = "product dimension mismatch")]
fn test_product_dimension_mismatch_panics() {
    let a = ColumnMatrix::<Q64>::new(3, 4);
    let b = ColumnMatrix::<Q64>::new(3, 4);
    let _ = &a * &b;
}

#[test]
fn test_shape_predicates() {
    let identity = ColumnMatrix::<Z5>::identity(5);
    assert!(identity.is_upper());
    assert!(identity.is_lower());
    assert!(identity.is_pivot());
    assert!(identity.is_el());
    assert!(identity.is_el_hat());
    assert!(identity.is_eu());
    assert!(identity.is_eu_hat());

    let upper = ColumnMatrix::from_rows(vec![
        vec![Q64::from_int(1), Q64::from_int(1)],
        vec![Q64::from_int(0), Q64::from_int(1)],
    ]);
    assert!(upper.is_upper());
    assert!(!upper.is_lower());

    let lower = upper.transpose();
    assert!(lower.is_lower());
    assert!(!lower.is_upper());

    // swapped identity columns: still a permutation, no longer triangular
    let mut swapped = ColumnMatrix::<Q64>::identity(3);
    swapped.swap_cols(0, 2);
    assert!(swapped.is_pivot());
    assert!(!swapped.is_upper());
    assert!(!swapped.is_el());
}

#[test]
fn test_echelon_predicates() {
    // pivots at rows 0 and 2, trailing zero column
    let el = ColumnMatrix::from_columns(
        4,
        vec![
            SparseVector::from_entries([(0, Q64::from_int(2))]),
            SparseVector::from_entries([(2, Q64::from_int(1))]),
            SparseVector::new(),
        ],
    );
    assert!(el.is_el());
    assert!(el.transpose().is_eu());
    assert!(el.conjugate().is_eu_hat());
    assert!(el.conjugate().transpose().is_el_hat());

    // pivot rows out of order
    let not_el = ColumnMatrix::from_columns(
        4,
        vec![
            SparseVector::from_entries([(2, Q64::from_int(1))]),
            SparseVector::from_entries([(0, Q64::from_int(2))]),
        ],
    );
    assert!(!not_el.is_el());

    // zero column before a nonzero one
    let gap = ColumnMatrix::from_columns(
        4,
        vec![
            SparseVector::new(),
            SparseVector::from_entries([(1, Q64::from_int(1))]),
        ],
    );
    assert!(!gap.is_el());
}

#[test]
fn test_transpose_and_conjugate_are_involutions() {
    let rng = &mut StdRng::seed_from_u64(17);
    let a = ColumnMatrix::<Z3>::random(6, 9, 0.3, 2, rng);
    assert_eq!(a.transpose().transpose(), a);
    assert_eq!(a.conjugate().conjugate(), a);
    // the two symmetries commute
    assert_eq!(
        a.transpose().conjugate(),
        a.conjugate().transpose()
    );
}

#[test]
fn test_conjugate_reverses_both_orders() {
    let a = ColumnMatrix::from_rows(vec![
        vec![1i64, 2, 0],
        vec![0, 0, 3],
    ]);
    let expected = ColumnMatrix::from_rows(vec![
        vec![3i64, 0, 0],
        vec![0, 2, 1],
    ]);
    assert_eq!(a.conjugate(), expected);
}

#[test]
fn test_row_scale() {
    let a = ColumnMatrix::from_rows(vec![
        vec![Q64::from_int(1), Q64::from_int(2)],
        vec![Q64::from_int(3), Q64::from_int(4)],
    ]);
    let scaled = a.row_scale(&[Q64::from_int(2), Q64::from_int(0)]);
    // row 1 scaled away entirely
    let expected = ColumnMatrix::from_rows(vec![
        vec![Q64::from_int(2), Q64::from_int(4)],
        vec![Q64::from_int(0), Q64::from_int(0)],
    ]);
    assert_eq!(scaled, expected);
}

#[test]
fn test_random_is_reproducible() {
    let a = ColumnMatrix::<Z5>::random(8, 8, 0.4, 4, &mut StdRng::seed_from_u64(3));
    let b = ColumnMatrix::<Z5>::random(8, 8, 0.4, 4, &mut StdRng::seed_from_u64(3));
    let c = ColumnMatrix::<Z5>::random(8, 8, 0.4, 4, &mut StdRng::seed_from_u64(4));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

fn check_identity_solves<F: Field>() {
    let identity = ColumnMatrix::<F>::identity(5);
    let y = SparseVector::from_entries([
        (0, F::from_int(-1)),
        (2, F::from_int(1)),
        (3, F::from_int(-1)),
    ]);
    assert_eq!(u_solve(&identity, &y), y);
    assert_eq!(l_solve(&identity, &y), y);
}

#[test]
fn test_identity_solves() {
    check_identity_solves::<Z2>();
    check_identity_solves::<Z3>();
    check_identity_solves::<Z5>();
    check_identity_solves::<Q64>();
    check_identity_solves::<QBig>();
}

#[test]
fn test_triangular_solves_roundtrip() {
    let rng = &mut StdRng::seed_from_u64(11);
    for _ in 0..4 {
        // unit triangular operators have the invertible diagonal the
        // solves require
        let l = {
            let mut l = ColumnMatrix::<Q64>::identity(7);
            let noise = ColumnMatrix::<Q64>::random(7, 7, 0.3, 5, rng);
            for j in 0..7 {
                for &(i, ref v) in noise.col(j).iter() {
                    if i > j {
                        l.col_mut(j).push_unchecked(i, v.clone());
                    }
                }
            }
            l
        };
        let u = l.transpose();
        let x = SparseVector::from_entries([(1, Q64::from_int(2)), (4, Q64::new(1, 3))]);

        let y = &l * &ColumnMatrix::from_columns(7, vec![x.clone()]);
        assert_eq!(l_solve(&l, y.col(0)), x);

        let y = &u * &ColumnMatrix::from_columns(7, vec![x.clone()]);
        assert_eq!(u_solve(&u, y.col(0)), x);
    }
}

#[test]
#[should_panic(expected = "requires a square operator")]
fn test_solve_requires_square() {
    let a = ColumnMatrix::<Q64>::new(3, 4);
    let _ = u_solve(&a, &SparseVector::new());
}

#[test]
#[should_panic(expected = "reaches past")]
fn test_solve_rejects_oversized_vector() {
    let identity = ColumnMatrix::<Q64>::identity(3);
    let y = SparseVector::single(5, Q64::from_int(1));
    let _ = l_solve(&identity, &y);
}
