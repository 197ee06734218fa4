//! Tolerant linear algebra kernel (symmetry, rank, minors, cofactors, real eigenpairs).
//!
//! Inputs are dynamic (`DMatrix<f64>`) so raw user matrices of any shape can be
//! validated before conversion to the fixed 3×3 conic representation.
//!
//! Rank policy
//! - Zero (after scrubbing) → 0; non-negligible determinant → full rank.
//! - Otherwise count eigenvalues that survive relative scrubbing (symmetric
//!   solver when possible, complex Schur eigenvalues by modulus otherwise).
//!   Determinant-only rank misreads near-singular input; eigen-only rank misreads
//!   well-conditioned input with large dynamic range.

use nalgebra::{DMatrix, DVector, Matrix3, SymmetricEigen, SVD};
use tracing::trace;

use crate::cfg::Tolerance;
use crate::error::{GeomError, Result};

// Same thresholds as `numpy.allclose`.
const SYM_RTOL: f64 = 1e-5;
const SYM_ATOL: f64 = 1e-8;

#[inline]
pub fn to_dyn(m: &Matrix3<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(3, 3, m.as_slice())
}

/// Elementwise closeness of `m` and `mᵀ`; non-square input is never symmetric.
pub fn is_symmetric(m: &DMatrix<f64>) -> bool {
    if !m.is_square() {
        return false;
    }
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (m[(i, j)], m[(j, i)]);
            if (a - b).abs() > SYM_ATOL + SYM_RTOL * b.abs() {
                return false;
            }
        }
    }
    true
}

/// Tolerant rank; 0 for non-square or negligible input.
pub fn rank(m: &DMatrix<f64>, tol: Tolerance) -> usize {
    if !m.is_square() || m.nrows() == 0 {
        return 0;
    }
    let n = m.nrows();
    let mut scrubbed = m.clone();
    tol.scrub_in_place(scrubbed.as_mut_slice());
    if tol.is_zero(scrubbed.norm()) {
        return 0;
    }
    if !tol.is_zero(m.determinant()) {
        return n;
    }
    let mut moduli: Vec<f64> = if is_symmetric(m) {
        SymmetricEigen::new(m.clone())
            .eigenvalues
            .iter()
            .map(|v| v.abs())
            .collect()
    } else {
        m.complex_eigenvalues()
            .iter()
            .map(|z| z.re.hypot(z.im))
            .collect()
    };
    tol.scrub_in_place(&mut moduli);
    let rk = moduli.iter().filter(|&&v| v != 0.0).count();
    trace!(n, rk, "rank via eigenvalues");
    rk
}

#[inline]
pub fn rank3(m: &Matrix3<f64>, tol: Tolerance) -> usize {
    rank(&to_dyn(m), tol)
}

fn require_square(m: &DMatrix<f64>) -> Result<usize> {
    if !m.is_square() || m.nrows() == 0 {
        return Err(GeomError::MatrixShape {
            expected: "non-empty square matrix",
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(m.nrows())
}

/// Determinant of `m` without row `row` and column `col`; negligible results snap to 0.
pub fn minor(m: &DMatrix<f64>, row: usize, col: usize, tol: Tolerance) -> Result<f64> {
    let n = require_square(m)?;
    if row >= n || col >= n {
        return Err(GeomError::MatrixShape {
            expected: "row and column inside the matrix",
            rows: n,
            cols: n,
        });
    }
    if n == 1 {
        return Ok(1.0);
    }
    let sub = m.clone().remove_row(row).remove_column(col);
    let d = sub.determinant();
    Ok(if tol.is_zero(d) { 0.0 } else { d })
}

/// Cofactor matrix `C[i][j] = (-1)^(i+j) · minor(m, i, j)`, relative-zero scrubbed.
pub fn cofactor(m: &DMatrix<f64>, tol: Tolerance) -> Result<DMatrix<f64>> {
    let n = require_square(m)?;
    let mut c = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
            c[(i, j)] = sign * minor(m, i, j, tol)?;
        }
    }
    tol.scrub_in_place(c.as_mut_slice());
    Ok(c)
}

/// [`cofactor`] for a fixed 3×3 matrix, built from [`adjugate3`].
pub fn cofactor3(m: &Matrix3<f64>, tol: Tolerance) -> Matrix3<f64> {
    let c = adjugate3(m)
        .transpose()
        .map(|x| if tol.is_zero(x) { 0.0 } else { x });
    tol.scrub_mat3(c)
}

/// Adjugate of a 3×3 matrix from column cross products, without snapping.
///
/// Rows are `c₁ × c₂`, `c₂ × c₀`, `c₀ × c₁`, so `adj(m) · m = det(m) · I`.
pub fn adjugate3(m: &Matrix3<f64>) -> Matrix3<f64> {
    let (c0, c1, c2) = (m.column(0), m.column(1), m.column(2));
    Matrix3::from_rows(&[
        c1.cross(&c2).transpose(),
        c2.cross(&c0).transpose(),
        c0.cross(&c1).transpose(),
    ])
}

/// Eigenpairs restricted to their real parts.
///
/// Eigenvalues with non-negligible modulus and non-negligible imaginary part are
/// reported as `0.0` with a zero eigenvector. Eigenvectors are unit columns of
/// the returned matrix, in the order of the eigenvalues.
pub fn real_eigen(m: &DMatrix<f64>, tol: Tolerance) -> Result<(DVector<f64>, DMatrix<f64>)> {
    let n = require_square(m)?;
    if is_symmetric(m) {
        let eig = SymmetricEigen::new(m.clone());
        return Ok((eig.eigenvalues, eig.eigenvectors));
    }
    let lambdas = m.complex_eigenvalues();
    let mut values = DVector::zeros(n);
    let mut vectors = DMatrix::zeros(n, n);
    for (k, z) in lambdas.iter().enumerate() {
        let modulus = z.re.hypot(z.im);
        if !tol.is_zero(modulus) && !tol.is_zero(z.im) {
            continue;
        }
        values[k] = z.re;
        if let Some(v) = null_vector(&(m - DMatrix::identity(n, n) * z.re)) {
            vectors.set_column(k, &v);
        }
    }
    Ok((values, vectors))
}

/// Right singular vector of the smallest singular value (unit norm).
fn null_vector(a: &DMatrix<f64>) -> Option<DVector<f64>> {
    let svd = SVD::new(a.clone(), false, true);
    let vt = svd.v_t?;
    let (k, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|x, y| x.1.partial_cmp(y.1).unwrap_or(std::cmp::Ordering::Equal))?;
    let v: DVector<f64> = vt.row(k).transpose();
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    Some(v / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    #[test]
    fn symmetric_check() {
        assert!(is_symmetric(&dmatrix![1.0, 2.0; 2.0, 3.0]));
        assert!(!is_symmetric(&dmatrix![1.0, 2.0; 2.5, 3.0]));
        assert!(!is_symmetric(&dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0]));
    }

    #[test]
    fn rank_matches_reference_cases() {
        let tol = Tolerance::default();
        let cases: Vec<(DMatrix<f64>, usize)> = vec![
            (DMatrix::zeros(3, 3), 0),
            (dmatrix![1.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 0.0], 1),
            (dmatrix![1.0, 0.0, 0.0; 0.0, 2.0, 0.0; 0.0, 0.0, 3.0], 3),
            (dmatrix![1.0, 2.0, 0.0; 2.0, 4.0, 0.0; 0.0, 0.0, 5.0], 2),
            (dmatrix![1.0, 2.0, 0.0; 1.0, 3.0, 0.0; 0.0, 0.0, 5.0], 3),
            (dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0; 7.0, 8.0, 9.0], 2),
            (dmatrix![0.0, 0.0, 1.0; 0.0, 0.0, 2.0; 0.0, 0.0, 3.0], 1),
        ];
        for (m, expected) in cases {
            assert_eq!(rank(&m, tol), expected, "rank of {m}");
        }
        assert_eq!(rank(&dmatrix![1.0, 2.0, 3.0], tol), 0);
    }

    #[test]
    fn rank_survives_large_dynamic_range() {
        // Ellipse with semi-axis 100: det = -1e-8 is below eps, eigenvalues are not.
        let tol = Tolerance::default();
        let m = dmatrix![1e-4, 0.0, 0.0; 0.0, 1e-4, 0.0; 0.0, 0.0, -1.0];
        assert_eq!(rank(&m, tol), 3);
    }

    #[test]
    fn minors_and_cofactor() {
        let tol = Tolerance::default();
        let m = dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0; 7.0, 8.0, 10.0];
        assert!((minor(&m, 0, 0, tol).unwrap() - 2.0).abs() < 1e-12);
        assert!((minor(&m, 1, 2, tol).unwrap() + 6.0).abs() < 1e-12);
        let c = cofactor(&m, tol).unwrap();
        // adj(m) = cᵀ and m · adj(m) = det(m) · I
        let prod = &m * c.transpose();
        let det = m.determinant();
        assert!((prod - DMatrix::identity(3, 3) * det).norm() < 1e-9);

        let bad = dmatrix![1.0, 2.0, 3.0];
        assert!(matches!(
            minor(&bad, 0, 0, tol),
            Err(GeomError::MatrixShape { rows: 1, cols: 3, .. })
        ));
        assert!(cofactor(&bad, tol).is_err());
    }

    #[test]
    fn adjugate_is_transposed_cofactor() {
        let tol = Tolerance::default();
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
        let adj = adjugate3(&m);
        assert!((adj - cofactor3(&m, tol).transpose()).norm() < 1e-12);
        assert!((adj * m - Matrix3::identity() * m.determinant()).norm() < 1e-12);

        let dynamic = cofactor(&to_dyn(&m), tol).unwrap();
        assert!((to_dyn(&cofactor3(&m, tol)) - dynamic).norm() < 1e-12);
        // negligible minors snap to zero on both paths
        let thin = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1e-3, 0.0, 0.0, 0.0, 1e-3);
        assert_eq!(cofactor3(&thin, tol)[(0, 0)], 0.0);
        assert_eq!(cofactor(&to_dyn(&thin), tol).unwrap()[(0, 0)], 0.0);
    }

    #[test]
    fn real_eigen_symmetric() {
        let tol = Tolerance::default();
        let m = dmatrix![2.0, 0.0, 0.0; 0.0, 3.0, 0.0; 0.0, 0.0, -1.0];
        let (vals, vecs) = real_eigen(&m, tol).unwrap();
        let mut sorted: Vec<f64> = vals.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((sorted[0] + 1.0).abs() < 1e-12);
        assert!((sorted[2] - 3.0).abs() < 1e-12);
        for k in 0..3 {
            let v = vecs.column(k);
            assert!((&m * v - v * vals[k]).norm() < 1e-9);
        }
    }

    #[test]
    fn real_eigen_drops_complex_pairs() {
        let tol = Tolerance::default();
        // 90° rotation about z: eigenvalues ±i and 1.
        let m = dmatrix![0.0, -1.0, 0.0; 1.0, 0.0, 0.0; 0.0, 0.0, 1.0];
        let (vals, vecs) = real_eigen(&m, tol).unwrap();
        let real: Vec<usize> = (0..3).filter(|&k| vals[k] != 0.0).collect();
        assert_eq!(real.len(), 1);
        let k = real[0];
        assert!((vals[k] - 1.0).abs() < 1e-9);
        assert!((vecs[(2, k)].abs() - 1.0).abs() < 1e-9);
        for j in (0..3).filter(|&j| j != k) {
            assert_eq!(vecs.column(j).norm(), 0.0);
        }
    }
}
