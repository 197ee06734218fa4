//! Degenerate factorization: recover the line pair `(l, m)` of a rank ≤ 2
//! symmetric matrix `M = (l mᵀ + m lᵀ) / 2`.
//!
//! Method
//! - For such `M`, `cofactor(M) = −¼ q qᵀ` with `q = l × m` (the double point).
//!   The largest diagonal entry `Cᵢᵢ` gives `p = C[i] / √|Cᵢᵢ| = ∓½ q`. It is
//!   used however small it is, since shallow crossings and close parallels have
//!   a tiny double point. Only rank-1 input (`q = 0`) takes `p = 0`.
//! - `M + [p]×` is then the rank-1 matrix `l mᵀ` (or `m lᵀ`): any non-zero row
//!   is proportional to one line and the matching column to the other.
//! - A positive `Cᵢᵢ` means the lines are complex conjugates (e.g. `x² + y² = 0`),
//!   which has no real factorization.
//!
//! The work is done on `M / ‖M‖` so the cofactor thresholds do not depend on the
//! overall scale; line 1 is rescaled at the end so `from_line_pair(l1, l2) = M`.

use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::cfg::Tolerance;
use crate::duality::skew_symmetric;
use crate::error::{GeomError, Result};
use crate::linalg::adjugate3;

/// Split `m` into two lines. Pre: `m` is symmetric and `rank` is its tolerant
/// rank, at most 2.
///
/// A negligible `m` yields two zero vectors.
pub(crate) fn split_degenerate(
    m: &Matrix3<f64>,
    rank: usize,
    tol: Tolerance,
) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let norm = m.norm();
    if tol.is_zero(norm) {
        return Ok((Vector3::zeros(), Vector3::zeros()));
    }
    let unit = m / norm;
    // symmetric input: cofactor = adjugate, kept exact for the square root below
    let c = adjugate3(&unit);

    let i = (0..3)
        .max_by(|&a, &b| c[(a, a)].abs().total_cmp(&c[(b, b)].abs()))
        .unwrap_or(0);
    let cii = c[(i, i)];
    let p = if rank < 2 || cii == 0.0 {
        Vector3::zeros()
    } else if cii > 0.0 {
        return Err(GeomError::matrix_value(
            "degenerate conic factors into complex lines",
        ));
    } else {
        c.row(i).transpose() / (-cii).sqrt()
    };
    let r = (unit + skew_symmetric(&p)) * 0.5;

    let (mut bi, mut bj, mut best) = (0, 0, 0.0_f64);
    for i in 0..3 {
        for j in 0..3 {
            if r[(i, j)].abs() > best {
                best = r[(i, j)].abs();
                (bi, bj) = (i, j);
            }
        }
    }
    if best == 0.0 {
        return Err(GeomError::matrix_value("degenerate factorization found no pivot"));
    }
    let pivot = r[(bi, bj)];
    let l1: Vector3<f64> = r.row(bi).transpose() / pivot;
    let l2: Vector3<f64> = r.column(bj) / pivot;
    debug!(pivot_row = bi, pivot_col = bj, ?p, "degenerate factorization");

    // unit = 2·pivot·(l2 l1ᵀ + l1 l2ᵀ)/2
    let k = 2.0 * pivot * norm;
    Ok((tol.scrub_vec3(l1 * k), tol.scrub_vec3(l2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conic::build::from_line_pair;
    use crate::conic::tolerant_rank;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn same_line(u: &Vector3<f64>, v: &Vector3<f64>) -> bool {
        (skew_symmetric(&(u / u.norm())) * (v / v.norm())).norm() < 1e-6
    }

    fn same_pair(got: (Vector3<f64>, Vector3<f64>), l: &Vector3<f64>, m: &Vector3<f64>) -> bool {
        (same_line(&got.0, l) && same_line(&got.1, m))
            || (same_line(&got.0, m) && same_line(&got.1, l))
    }

    fn random_line(rng: &mut StdRng) -> Vector3<f64> {
        Vector3::from_fn(|_, _| rng.gen_range(-3.0..3.0))
    }

    #[test]
    fn parallel_pair_is_recovered() {
        let tol = Tolerance::default();
        let (l, m) = (vector![1.0, 0.0, -1.0], vector![1.0, 0.0, -3.0]);
        let q = from_line_pair(&l, &m);
        let got = split_degenerate(&q, 2, tol).unwrap();
        assert!(same_pair(got, &l, &m));
        assert!((from_line_pair(&got.0, &got.1) - q).norm() < 1e-9);
    }

    #[test]
    fn coincident_pair_is_recovered() {
        let tol = Tolerance::default();
        let l = vector![2.0, -1.0, 4.0];
        let q = from_line_pair(&l, &l) * -3.0;
        let (a, b) = split_degenerate(&q, 1, tol).unwrap();
        assert!(same_line(&a, &l) && same_line(&b, &l));
        assert!((from_line_pair(&a, &b) - q).norm() < 1e-9);
    }

    #[test]
    fn complex_pair_is_rejected() {
        let tol = Tolerance::default();
        let q = Matrix3::from_diagonal(&vector![1.0, 1.0, 0.0]);
        assert!(matches!(
            split_degenerate(&q, 2, tol),
            Err(GeomError::MatrixValue { .. })
        ));
    }

    #[test]
    fn zero_matrix_gives_zero_lines() {
        let (a, b) = split_degenerate(&Matrix3::zeros(), 0, Tolerance::default()).unwrap();
        assert_eq!(a, Vector3::zeros());
        assert_eq!(b, Vector3::zeros());
    }

    #[test]
    fn small_double_points_are_recovered() {
        let tol = Tolerance::default();
        let shallow = (vector![0.0, 1.0, 0.0], vector![0.02, -1.0, 0.0]);
        let close = (vector![1.0, 0.0, -1.0], vector![1.0, 0.0, -1.04]);
        for (l, m) in [shallow, close] {
            let q = from_line_pair(&l, &m);
            assert_eq!(tolerant_rank(&q, tol), 2);
            let got = split_degenerate(&q, 2, tol).unwrap();
            assert!(same_pair(got, &l, &m), "l={l:?} m={m:?}");
            assert!((from_line_pair(&got.0, &got.1) - q).norm() < 1e-9);
        }
    }

    #[test]
    fn random_crossing_pairs_round_trip() {
        let tol = Tolerance::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut checked = 0;
        for _ in 0..200 {
            let (l, m) = (random_line(&mut rng), random_line(&mut rng));
            let q = from_line_pair(&l, &m);
            let rank = tolerant_rank(&q, tol);
            let got = split_degenerate(&q, rank, tol).unwrap();
            if rank < 2 {
                // numerically a double line
                continue;
            }
            assert!(same_pair(got, &l, &m), "l={l:?} m={m:?}");
            assert!((from_line_pair(&got.0, &got.1) - q).norm() < 1e-6 * q.norm().max(1.0));
            checked += 1;
        }
        assert!(checked > 150);
    }
}
