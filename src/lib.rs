//! Exact sparse linear algebra for persistent and zigzag homology.
//!
//! Matrices are collections of owned sparse columns over a generic exact
//! coefficient [`Ring`](fields::Ring) or [`Field`](fields::Field) - no
//! floating point anywhere. The crate provides:
//!
//! * the four dual factorizations [`leup`](factor::leup),
//!   [`pleu`](factor::pleu), [`uelp`](factor::uelp), [`puel`](factor::puel)
//!   (plus the swap-free [`lqu`](factor::lqu)), all built from a single
//!   column-echelon reduction kernel via transpose/conjugation symmetries;
//! * the four commutation operators in [`commute`], which transport a
//!   triangular basis change across an echelon matrix without re-running
//!   elimination - the step that keeps incremental zigzag updates cheap.

pub mod columns;
pub mod commute;
pub mod factor;
pub mod fields;
pub mod matrices;
