//! Explicit geometry context: tolerances and the coordinate origin.
//!
//! - `Tolerance`: absolute zero test and relative scrubbing of near-zero entries.
//! - `Origin`: translated coordinate frame applied to points, lines and conics.
//! - `GeomCfg`: both of the above, passed by value into every constructor and
//!   operation that depends on them. Nothing here is global.
//!
//! Frame convention
//! - Objects keep their canonical (origin at `(0,0)`) form and a current form
//!   expressed in the frame whose origin sits at `(ox, oy)`.
//! - With `T = [[1,0,ox],[0,1,oy],[0,0,1]]`: points `p' = T⁻¹ p`, lines
//!   `l' = Tᵀ l`, conics `M' = Tᵀ M T`. Incidence `l·p = 0` and the quadratic
//!   form `pᵀ M p` are preserved when both operands are shifted together.

use nalgebra::{Matrix3, Vector3};

/// Tolerance thresholds.
///
/// - `eps_is_zero`: absolute threshold for scalar comparisons.
/// - `eps_rel_zero`: relative threshold used by [`Tolerance::scrub_in_place`],
///   scaled by the order of magnitude of the largest entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub eps_is_zero: f64,
    pub eps_rel_zero: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps_is_zero: 1e-4,
            eps_rel_zero: 1e-5,
        }
    }
}

impl Tolerance {
    #[inline]
    pub fn new(eps_is_zero: f64, eps_rel_zero: f64) -> Self {
        Self {
            eps_is_zero,
            eps_rel_zero,
        }
    }

    #[inline]
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() <= self.eps_is_zero
    }

    /// Zero every entry whose magnitude does not exceed
    /// `magnitude_rank(max|x|) * eps_rel_zero`.
    ///
    /// Slices of length ≤ 1 and all-zero slices are left untouched.
    pub fn scrub_in_place(&self, xs: &mut [f64]) {
        if xs.len() <= 1 {
            return;
        }
        let x_max = xs.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        if x_max == 0.0 || !x_max.is_finite() {
            return;
        }
        let threshold = magnitude_rank(x_max) * self.eps_rel_zero;
        for x in xs.iter_mut() {
            if x.abs() <= threshold {
                *x = 0.0;
            }
        }
    }

    #[inline]
    pub fn scrub_mat3(&self, mut m: Matrix3<f64>) -> Matrix3<f64> {
        self.scrub_in_place(m.as_mut_slice());
        m
    }

    #[inline]
    pub fn scrub_vec3(&self, mut v: Vector3<f64>) -> Vector3<f64> {
        self.scrub_in_place(v.as_mut_slice());
        v
    }
}

/// Power of ten that brackets `x_max` (e.g. `99 → 100`, `100 → 100`,
/// `5 → 10`, `1 → 1`, `0.05 → 0.1`).
///
/// Non-positive or non-finite input maps to `1`.
pub fn magnitude_rank(x_max: f64) -> f64 {
    if !x_max.is_finite() || x_max <= 0.0 {
        return 1.0;
    }
    let mut x = x_max;
    let mut p: i32 = 1;
    if x > 1.0 {
        while (x / 10.0).floor() != 0.0 {
            x = (x / 10.0).floor();
            p += 1;
        }
    } else {
        while x.floor() == 0.0 {
            x *= 10.0;
            p -= 1;
        }
    }
    if x == 1.0 {
        p -= 1;
    }
    10f64.powi(p)
}

/// Origin of the current coordinate frame, in canonical coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Origin {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_reset(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// `T` with `canonical = T · current` for points.
    #[inline]
    fn translation(&self) -> Matrix3<f64> {
        Matrix3::new(1.0, 0.0, self.x, 0.0, 1.0, self.y, 0.0, 0.0, 1.0)
    }

    #[inline]
    fn inverse_translation(&self) -> Matrix3<f64> {
        Matrix3::new(1.0, 0.0, -self.x, 0.0, 1.0, -self.y, 0.0, 0.0, 1.0)
    }

    /// Canonical point → current frame. Ideal points keep their direction.
    #[inline]
    pub fn shift_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(p.x - self.x * p.z, p.y - self.y * p.z, p.z)
    }

    #[inline]
    pub fn unshift_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(p.x + self.x * p.z, p.y + self.y * p.z, p.z)
    }

    /// Canonical line → current frame: substitute `x → x + ox`, `y → y + oy`.
    #[inline]
    pub fn shift_line(&self, l: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(l.x, l.y, l.z + l.x * self.x + l.y * self.y)
    }

    #[inline]
    pub fn unshift_line(&self, l: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(l.x, l.y, l.z - l.x * self.x - l.y * self.y)
    }

    #[inline]
    pub fn shift_conic(&self, m: &Matrix3<f64>) -> Matrix3<f64> {
        let t = self.translation();
        t.transpose() * m * t
    }

    #[inline]
    pub fn unshift_conic(&self, m: &Matrix3<f64>) -> Matrix3<f64> {
        let t = self.inverse_translation();
        t.transpose() * m * t
    }
}

/// Geometry context shared by a family of objects.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeomCfg {
    pub tol: Tolerance,
    pub origin: Origin,
}

impl GeomCfg {
    #[inline]
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    #[inline]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{matrix, vector};

    #[test]
    fn magnitude_rank_brackets() {
        assert_eq!(magnitude_rank(99.0), 100.0);
        assert_eq!(magnitude_rank(100.0), 100.0);
        assert_eq!(magnitude_rank(5.0), 10.0);
        assert_eq!(magnitude_rank(1.0), 1.0);
        assert!((magnitude_rank(0.05) - 0.1).abs() < 1e-15);
        assert_eq!(magnitude_rank(0.0), 1.0);
    }

    #[test]
    fn scrub_relative_to_largest_entry() {
        let tol = Tolerance::default();
        let mut xs = [100000.0, 0.5, -0.5, 2.0];
        tol.scrub_in_place(&mut xs);
        assert_eq!(xs, [100000.0, 0.0, 0.0, 2.0]);

        let m = tol.scrub_mat3(matrix![1e-1, 5e-7, 0.0; 5e-7, 1e-5, 0.0; 0.0, 0.0, 0.0]);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(1, 1)], 1e-5);

        // single entries pass through untouched
        let mut one = [1e-12];
        tol.scrub_in_place(&mut one);
        assert_eq!(one[0], 1e-12);
    }

    #[test]
    fn is_zero_is_inclusive() {
        let tol = Tolerance::new(1e-3, 1e-5);
        assert!(tol.is_zero(1e-3));
        assert!(tol.is_zero(-5e-4));
        assert!(!tol.is_zero(2e-3));
    }

    #[test]
    fn shifts_preserve_incidence() {
        let o = Origin::new(2.0, -3.0);
        let p = vector![1.0_f64, 4.0, 1.0];
        let l = vector![2.0_f64, 1.0, -6.0]; // 2x + y - 6 = 0 passes through (1,4)
        assert!(l.dot(&p).abs() < 1e-12);
        let (ps, ls) = (o.shift_point(&p), o.shift_line(&l));
        assert!(ls.dot(&ps).abs() < 1e-12);
        assert_eq!(o.unshift_point(&ps), p);
        assert_eq!(o.unshift_line(&ls), l);

        let m = Matrix3::from_diagonal(&vector![1.0, 1.0, -1.0]);
        let q = vector![0.0, 1.0, 1.0];
        let ms = o.shift_conic(&m);
        let qs = o.shift_point(&q);
        assert!(qs.dot(&(ms * qs)).abs() < 1e-12);
        assert!((o.unshift_conic(&ms) - m).norm() < 1e-12);
    }

    #[test]
    fn builders_set_context() {
        let tol = Tolerance::new(1e-8, 1e-9);
        let cfg = GeomCfg::default()
            .with_tolerance(tol)
            .with_origin(Origin::new(1.0, 0.0));
        assert_eq!(cfg.tol, tol);
        assert!(!cfg.origin.is_reset());
        assert!(GeomCfg::default().origin.is_reset());
    }

    #[test]
    fn ideal_points_keep_direction() {
        let o = Origin::new(5.0, 5.0);
        let d = vector![1.0, -1.0, 0.0];
        assert_eq!(o.shift_point(&d), d);
    }
}
