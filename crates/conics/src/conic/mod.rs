//! Conic sections `[x y 1] · M · [x y 1]ᵀ = 0` with `M` symmetric 3×3.
//!
//! Representation
//! - `canonical` is `M` in the un-shifted frame, `matrix` is `Tᵀ M T` for the
//!   origin of the last update (see `cfg`).
//! - Rank is computed once, on `M / ‖M‖`, and cached.
//! - Degenerate conics (rank ≤ 2) always carry their line pair and `M` is
//!   assembled from it, so the two never disagree. Raw degenerate matrices are
//!   factored first (see `factor`).
//!
//! Construction precedence is carried by [`ConicParams`].

mod build;
mod factor;


use std::f64::consts::PI;
use std::fmt;

use nalgebra::{DMatrix, Matrix3, Vector2, Vector3};
use tracing::debug;

use crate::cfg::{GeomCfg, Origin, Tolerance};
use crate::contour::ContourSampler;
use crate::duality::skew_symmetric;
use crate::error::{GeomError, Result};
use crate::linalg;
use crate::primitives::{Line, Point};

/// Conic construction parameters.
///
/// The first populated branch wins:
/// 1. `degenerate`: the conic is the line pair;
/// 2. `foci` with semi-axis `a`: center, `c` and `angle` are derived from the foci;
/// 3. `a`, `c`, `center`, `angle`;
/// 4. the defaults, i.e. the unit circle at the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ConicParams {
    pub name: String,
    /// Semi-axis along `angle` (semi-major for ellipses, semi-transverse for hyperbolas).
    pub a: f64,
    /// Half the focal distance.
    pub c: f64,
    /// `None` is the canonical origin.
    pub center: Option<Point>,
    /// Counter-clockwise, radians.
    pub angle: f64,
    pub foci: Option<(Point, Point)>,
    pub degenerate: Option<(Line, Line)>,
}

impl Default for ConicParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            a: 1.0,
            c: 0.0,
            center: None,
            angle: 0.0,
            foci: None,
            degenerate: None,
        }
    }
}

/// Parameters after precedence and validation.
enum Resolved<'a> {
    Lines(&'a Line, &'a Line),
    Axes {
        a: f64,
        c: f64,
        center: Vector2<f64>,
        angle: f64,
    },
}

impl ConicParams {
    pub fn axes(a: f64, c: f64) -> Self {
        Self {
            a,
            c,
            ..Self::default()
        }
    }

    pub fn with_foci(f1: Point, f2: Point, a: f64) -> Self {
        Self {
            a,
            foci: Some((f1, f2)),
            ..Self::default()
        }
    }

    pub fn line_pair(l1: Line, l2: Line) -> Self {
        Self {
            degenerate: Some((l1, l2)),
            ..Self::default()
        }
    }

    pub fn centered_at(mut self, center: Point) -> Self {
        self.center = Some(center);
        self
    }

    pub fn rotated(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks the branch that [`Conic::new`] would take.
    pub fn validate(&self, tol: Tolerance) -> Result<()> {
        self.resolve(tol).map(|_| ())
    }

    fn resolve(&self, tol: Tolerance) -> Result<Resolved<'_>> {
        if let Some((l1, l2)) = &self.degenerate {
            if l1.at_infinity(tol) || l2.at_infinity(tol) {
                return Err(GeomError::precondition(
                    "degenerate conic from a line at infinity",
                ));
            }
            return Ok(Resolved::Lines(l1, l2));
        }

        let (c, center, angle) = match &self.foci {
            Some((f1, f2)) => {
                if f1.at_infinity(tol) || f2.at_infinity(tol) {
                    return Err(GeomError::precondition("focus at infinity"));
                }
                let (u, v) = (f1.canonical().xy(), f2.canonical().xy());
                let c = (v - u).norm() / 2.0;
                let angle = if tol.is_zero(c) {
                    0.0
                } else {
                    let axis = skew_symmetric(f1.canonical()) * f2.canonical();
                    Line::from_canonical(axis, Origin::default()).angle()
                };
                (c, (u + v) / 2.0, angle)
            }
            None => {
                let center = match &self.center {
                    Some(p) if p.at_infinity(tol) => {
                        return Err(GeomError::precondition("center at infinity"));
                    }
                    Some(p) => p.canonical().xy(),
                    None => Vector2::zeros(),
                };
                (self.c, center, self.angle)
            }
        };

        let a = self.a;
        if !(a > 0.0) {
            return Err(GeomError::precondition(format!("a must be positive, got {a}")));
        }
        if !(c >= 0.0) {
            return Err(GeomError::precondition(format!("c must be non-negative, got {c}")));
        }
        if (a - c).abs() <= tol.eps_rel_zero * a {
            return Err(GeomError::precondition(format!(
                "a = c = {a} leaves no minor axis"
            )));
        }
        Ok(Resolved::Axes {
            a,
            c,
            center,
            angle,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conic {
    name: String,
    matrix: Matrix3<f64>,
    canonical: Matrix3<f64>,
    rank: usize,
    lines: Option<(Line, Line)>,
}

/// Rank of `m / ‖m‖`.
fn tolerant_rank(m: &Matrix3<f64>, tol: Tolerance) -> usize {
    let n = m.norm();
    if n == 0.0 || !n.is_finite() {
        return 0;
    }
    linalg::rank3(&(m / n), tol)
}

impl Conic {
    pub fn new(params: &ConicParams, cfg: GeomCfg) -> Result<Self> {
        let conic = match params.resolve(cfg.tol)? {
            Resolved::Lines(l1, l2) => {
                debug!(name = %params.name, "conic from line pair");
                Self::from_valid_lines(l1.clone(), l2.clone(), cfg)
            }
            Resolved::Axes {
                a,
                c,
                center,
                angle,
            } => {
                let branch = if params.foci.is_some() { "foci" } else { "axes" };
                debug!(name = %params.name, branch, a, c, angle, "conic from axes");
                Self::from_parts(build::from_axes(a, c, center, angle, cfg.tol), None, cfg)
            }
        };
        Ok(conic.with_name(params.name.clone()))
    }

    /// `x² + y² − 1 = 0`.
    pub fn unit_circle(cfg: GeomCfg) -> Self {
        let m = build::from_axes(1.0, 0.0, Vector2::zeros(), 0.0, cfg.tol);
        Self::from_parts(m, None, cfg)
    }

    pub fn from_lines(l1: &Line, l2: &Line, cfg: GeomCfg) -> Result<Self> {
        Self::new(&ConicParams::line_pair(l1.clone(), l2.clone()), cfg)
    }

    /// Conic from a raw matrix given in canonical coordinates.
    ///
    /// Checks, in order: 3×3 shape, non-zero after scrubbing, symmetry. Rank-3
    /// input is wrapped as is; degenerate input is factored into its line pair.
    pub fn from_matrix(m: &DMatrix<f64>, cfg: GeomCfg) -> Result<Self> {
        let tol = cfg.tol;
        if m.nrows() != 3 || m.ncols() != 3 {
            return Err(GeomError::MatrixShape {
                expected: "3x3",
                rows: m.nrows(),
                cols: m.ncols(),
            });
        }
        let canonical = tol.scrub_mat3(Matrix3::from_column_slice(m.as_slice()));
        if canonical.iter().all(|&x| x == 0.0) {
            return Err(GeomError::matrix_value("matrix is zero"));
        }
        if !linalg::is_symmetric(m) {
            return Err(GeomError::matrix_value("matrix is not symmetric"));
        }
        let rank = tolerant_rank(&canonical, tol);
        if rank == 3 {
            return Ok(Self::from_parts(canonical, None, cfg));
        }
        let (u, v) = factor::split_degenerate(&canonical, rank, tol)?;
        debug!(rank, "raw matrix is degenerate");
        Self::new(
            &ConicParams::line_pair(
                Line::from_canonical(u, cfg.origin),
                Line::from_canonical(v, cfg.origin),
            ),
            cfg,
        )
    }

    fn from_valid_lines(l1: Line, l2: Line, cfg: GeomCfg) -> Self {
        let m = build::from_line_pair(l1.canonical(), l2.canonical());
        Self::from_parts(m, Some((l1, l2)), cfg)
    }

    fn from_parts(canonical: Matrix3<f64>, lines: Option<(Line, Line)>, cfg: GeomCfg) -> Self {
        let lines = lines.map(|(mut l1, mut l2)| {
            l1.update_origin(cfg.origin);
            l2.update_origin(cfg.origin);
            (l1, l2)
        });
        Self {
            name: String::new(),
            matrix: cfg.origin.shift_conic(&canonical),
            rank: tolerant_rank(&canonical, cfg.tol),
            canonical,
            lines,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `M` in the current frame.
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    #[inline]
    pub fn canonical(&self) -> &Matrix3<f64> {
        &self.canonical
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn is_fullrank(&self) -> bool {
        self.rank == 3
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.rank < 3
    }

    /// Constituent lines of a degenerate conic.
    pub fn lines(&self) -> Option<(&Line, &Line)> {
        self.lines.as_ref().map(|(l1, l2)| (l1, l2))
    }

    pub fn update_origin(&mut self, origin: Origin) {
        self.matrix = origin.shift_conic(&self.canonical);
        if let Some((l1, l2)) = self.lines.as_mut() {
            l1.update_origin(origin);
            l2.update_origin(origin);
        }
    }

    /// Polar line of `point`: `M · p`.
    pub fn polar(&self, point: &Point, cfg: GeomCfg) -> Line {
        Line::from_current(self.matrix * point.coords(), cfg.origin)
    }

    /// Pole of `line`: `M⁻¹ · l`.
    ///
    /// Degenerate conics have no unique pole; they yield the zero vector, which
    /// reads as an ideal point.
    pub fn pole(&self, line: &Line, cfg: GeomCfg) -> Point {
        let v = if self.is_fullrank() {
            self.matrix
                .try_inverse()
                .map_or_else(Vector3::zeros, |inv| inv * line.coeffs())
        } else {
            Vector3::zeros()
        };
        Point::from_current(v, cfg.origin)
    }

    /// `pᵀ M p ≈ 0`, i.e. the point lies on its own polar.
    ///
    /// The raw quadratic form is tested, with `p` scaled to `w = 1` (ideal
    /// points to unit length). The residual is not divided by `‖M‖`.
    pub fn contains(&self, point: &Point, tol: Tolerance) -> bool {
        let p = point.coords();
        let p = if p.z != 0.0 { p / p.z } else { p.normalize() };
        tol.is_zero(p.dot(&(self.matrix * p)))
    }

    /// Matrices equal up to a nonzero scalar, elementwise within tolerance.
    pub fn approx_eq(&self, other: &Conic, tol: Tolerance) -> bool {
        let (n1, n2) = (self.canonical.norm(), other.canonical.norm());
        if n1 == 0.0 || n2 == 0.0 {
            return n1 == n2;
        }
        let (u, v) = (self.canonical / n1, other.canonical / n2);
        let mut k = 0;
        for i in 1..9 {
            if u[i].abs() > u[k].abs() {
                k = i;
            }
        }
        if tol.is_zero(v[k]) {
            return false;
        }
        let scale = u[k] / v[k];
        u.iter().zip(v.iter()).all(|(a, b)| tol.is_zero(a - scale * b))
    }

    /// Linear pencil member `M₁ + M₂`; degeneracy is derived from the sum.
    pub fn pencil(&self, other: &Conic, cfg: GeomCfg) -> Result<Conic> {
        Conic::from_matrix(&linalg::to_dyn(&(self.canonical + other.canonical)), cfg)
    }

    /// `k · M`. For a degenerate conic the first line is scaled and `M` rebuilt.
    pub fn scale(&self, k: f64, cfg: GeomCfg) -> Result<Conic> {
        if k == 0.0 || !k.is_finite() {
            return Err(GeomError::matrix_value(format!(
                "scale factor must be finite and nonzero, got {k}"
            )));
        }
        let scaled = match &self.lines {
            Some((l1, l2)) => Self::from_valid_lines(l1.scaled(k), l2.clone(), cfg),
            None => Self::from_parts(self.canonical * k, None, cfg),
        };
        Ok(scaled.with_name(self.name.clone()))
    }

    /// Enclosed area: `0` for a double line, `∞` for line pairs, hyperbolas and
    /// imaginary ellipses, `π·|det M| / det(A)^{3/2}` for real ellipses (`A` is the
    /// quadratic part). The last form is invariant under scaling of `M` and
    /// equals `π / √(−det M)` for the normalized matrices built from axes.
    ///
    /// It is not the same as the plain `det M < 0 ⇒ π / √(−det M)` rule for
    /// `scale(k)` results: `−1 · unit circle` has area `π` here, not `∞`.
    pub fn area(&self) -> f64 {
        match self.rank {
            0 | 1 => 0.0,
            2 => f64::INFINITY,
            _ => {
                let m = &self.canonical;
                let det_a = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
                let det = m.determinant();
                let trace_a = m[(0, 0)] + m[(1, 1)];
                if det_a > 0.0 && det * trace_a < 0.0 {
                    PI * det.abs() / det_a.powf(1.5)
                } else {
                    f64::INFINITY
                }
            }
        }
    }

    /// Polylines of the zero set over the grid `xs × ys` (`ys` defaults to `xs`),
    /// in current coordinates.
    ///
    /// Degenerate conics sample each of their lines; others evaluate the quadratic
    /// form on the grid and hand it to `sampler`.
    pub fn sequence<S: ContourSampler + ?Sized>(
        &self,
        xs: &[f64],
        ys: Option<&[f64]>,
        sampler: &S,
        cfg: GeomCfg,
    ) -> Vec<Vec<Point>> {
        let ys = ys.unwrap_or(xs);
        if let Some((l1, l2)) = &self.lines {
            return [l1, l2]
                .into_iter()
                .map(|l| l.sequence(xs, Some(ys), cfg))
                .filter(|pts| !pts.is_empty())
                .collect();
        }
        let m = &self.matrix;
        let field = DMatrix::from_fn(ys.len(), xs.len(), |j, i| {
            let p = Vector3::new(xs[i], ys[j], 1.0);
            p.dot(&(m * p))
        });
        sampler
            .trace(xs, ys, &field, 0.0)
            .polylines()
            .into_iter()
            .map(|pl| {
                pl.into_iter()
                    .map(|(x, y)| Point::from_current(Vector3::new(x, y, 1.0), cfg.origin))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Conic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [x y 1] * M * [x y 1]' = 0, M = [", self.name)?;
        for i in 0..3 {
            if i > 0 {
                write!(f, "; ")?;
            }
            let r = self.matrix.row(i);
            write!(f, "{:.4e} {:.4e} {:.4e}", r[0], r[1], r[2])?;
        }
        write!(f, "]")?;
        if self.is_degenerate() {
            write!(f, " -> degenerate (rank {})", self.rank)?;
        }
        Ok(())
    }
}
