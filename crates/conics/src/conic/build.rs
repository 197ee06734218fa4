//! Matrix assembly for the conic constructors.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::cfg::Tolerance;

/// `(l mᵀ + m lᵀ) / 2`, so that `pᵀ M p = (l·p)(m·p)`.
#[inline]
pub(crate) fn from_line_pair(l: &Vector3<f64>, m: &Vector3<f64>) -> Matrix3<f64> {
    (l * m.transpose() + m * l.transpose()) * 0.5
}

/// Central conic with semi-axis `a` along `angle`, half focal distance `c`,
/// centered at `center`.
///
/// `b² = |a² − c²|`; ellipse for `a > c`, hyperbola for `a < c`.
/// Pre: `a > 0`, `c ≥ 0`, `a ≠ c`.
pub(crate) fn from_axes(
    a: f64,
    c: f64,
    center: Vector2<f64>,
    angle: f64,
    tol: Tolerance,
) -> Matrix3<f64> {
    let b2 = (a * a - c * c).abs();
    let minor = if a >= c { 1.0 / b2 } else { -1.0 / b2 };
    let axis_aligned = Matrix2::new(1.0 / (a * a), 0.0, 0.0, minor);
    let (s, co) = angle.sin_cos();
    let rot = Matrix2::new(co, -s, s, co);
    let abc = rot * axis_aligned * rot.transpose();
    let de = -(abc * center);
    let f = center.dot(&(abc * center)) - 1.0;
    let m = Matrix3::new(
        abc[(0, 0)],
        abc[(0, 1)],
        de.x,
        abc[(1, 0)],
        abc[(1, 1)],
        de.y,
        de.x,
        de.y,
        f,
    );
    tol.scrub_mat3(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use std::f64::consts::FRAC_PI_2;

    fn quad(m: &Matrix3<f64>, x: f64, y: f64) -> f64 {
        let p = vector![x, y, 1.0];
        p.dot(&(m * p))
    }

    #[test]
    fn line_pair_form_factors() {
        let (l, m) = (vector![1.0, 0.0, -1.0], vector![0.0, 1.0, -2.0]);
        let q = from_line_pair(&l, &m);
        assert_eq!(q, q.transpose());
        for (x, y) in [(1.0, 5.0), (-3.0, 2.0), (0.5, 0.25)] {
            assert!((quad(&q, x, y) - (x - 1.0) * (y - 2.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn rotated_shifted_ellipse_passes_through_vertices() {
        let tol = Tolerance::default();
        // a = 5, c = 3 → b = 4; major axis vertical, centered at (1, -2).
        let m = from_axes(5.0, 3.0, vector![1.0, -2.0], FRAC_PI_2, tol);
        for (x, y) in [(1.0, 3.0), (1.0, -7.0), (5.0, -2.0), (-3.0, -2.0)] {
            assert!(quad(&m, x, y).abs() < 1e-9, "({x}, {y})");
        }
        assert!(quad(&m, 1.0, -2.0) < 0.0);
    }

    #[test]
    fn hyperbola_has_opposite_signs() {
        let tol = Tolerance::default();
        // a = 3, c = 5 → b = 4: x²/9 − y²/16 = 1
        let m = from_axes(3.0, 5.0, vector![0.0, 0.0], 0.0, tol);
        assert!(quad(&m, 3.0, 0.0).abs() < 1e-12);
        assert!(quad(&m, 5.0, 16.0 / 3.0).abs() < 1e-9);
        assert!(m[(0, 0)] > 0.0 && m[(1, 1)] < 0.0);
    }
}
