//! Duality algebra over the closed operand union `{Point, Line}`.
//!
//! Dispatch table for `cross` (ordered kind pair → result):
//! - Point × Point → Line through both points.
//! - Line × Line → intersection Point (ideal when parallel).
//! - Point × Line, Line × Point → Line through the point, perpendicular to the line.
//!
//! The mixed case is `skew(p) · diag(1,1,0) · l`: the projection turns `l` into
//! the ideal point in the direction of its normal, and the join of `p` with that
//! ideal point is the perpendicular through `p`.
//!
//! All vectors here are in the current frame of the operands; results are wrapped
//! back with the caller's origin so their canonical form stays exact.

use nalgebra::{Matrix3, Vector2, Vector3};

use crate::cfg::{GeomCfg, Tolerance};
use crate::error::{GeomError, Result};
use crate::primitives::{Line, Point};

/// Operand of the duality algebra.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Point(Point),
    Line(Line),
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Point(_) => "Point",
            Entity::Line(_) => "Line",
        }
    }

    /// Homogeneous vector in the current frame.
    pub fn vector(&self) -> &Vector3<f64> {
        match self {
            Entity::Point(p) => p.coords(),
            Entity::Line(l) => l.coeffs(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Point(p) => p.name(),
            Entity::Line(l) => l.name(),
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Entity::Point(p) => Some(p),
            Entity::Line(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Entity::Line(l) => Some(l),
            Entity::Point(_) => None,
        }
    }

    #[inline]
    pub fn skew(&self) -> Matrix3<f64> {
        skew_symmetric(self.vector())
    }
}

impl From<Point> for Entity {
    fn from(p: Point) -> Self {
        Entity::Point(p)
    }
}

impl From<Line> for Entity {
    fn from(l: Line) -> Self {
        Entity::Line(l)
    }
}

/// `[v]×` such that `[v]× · x = v × x`.
#[inline]
pub fn skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// `diag(1, 1, 0)`: drops the homogeneous component of a line.
#[inline]
fn to_origin() -> Matrix3<f64> {
    Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, 0.0))
}

pub fn cross(a: &Entity, b: &Entity, cfg: GeomCfg) -> Entity {
    match (a, b) {
        (Entity::Point(p), Entity::Point(q)) => Entity::Line(join(p, q, cfg)),
        (Entity::Line(l), Entity::Line(m)) => Entity::Point(meet(l, m, cfg)),
        (Entity::Point(p), Entity::Line(l)) | (Entity::Line(l), Entity::Point(p)) => {
            Entity::Line(perpendicular(p, l, cfg))
        }
    }
}

pub fn join(p: &Point, q: &Point, cfg: GeomCfg) -> Line {
    Line::from_current(skew_symmetric(p.coords()) * q.coords(), cfg.origin)
}

/// Intersection of two lines.
///
/// Tolerantly parallel lines get their leading coefficients snapped equal first,
/// so the result is an exact ideal point instead of a far-away finite one.
pub fn meet(l: &Line, m: &Line, cfg: GeomCfg) -> Point {
    let tol = cfg.tol;
    let u = l.coeffs();
    let v = if are_parallel(l, m, tol) && !l.at_infinity(tol) && !m.at_infinity(tol) {
        align_leading(u, m.coeffs())
    } else {
        *m.coeffs()
    };
    Point::from_current(skew_symmetric(u) * v, cfg.origin)
}

pub fn perpendicular(p: &Point, l: &Line, cfg: GeomCfg) -> Line {
    Line::from_current(
        skew_symmetric(p.coords()) * to_origin() * l.coeffs(),
        cfg.origin,
    )
}

/// Inner product; defined only for a Point/Line pair in either order.
pub fn dot(a: &Entity, b: &Entity) -> Result<f64> {
    match (a, b) {
        (Entity::Point(p), Entity::Line(l)) | (Entity::Line(l), Entity::Point(p)) => {
            Ok(p.coords().dot(l.coeffs()))
        }
        _ => Err(GeomError::ArgumentCombination {
            op: "dot",
            left: a.kind(),
            right: b.kind(),
        }),
    }
}

/// Unit normal `(a, b)/‖(a, b)‖`, or `(a, b)` unchanged for the ideal line.
#[inline]
fn unit_normal(l: &Vector3<f64>) -> Vector2<f64> {
    let n = l.xy();
    let norm = n.norm();
    if norm > 0.0 {
        n / norm
    } else {
        n
    }
}

/// `a₁b₂ − a₂b₁ ≈ 0` on unit normals (sine of the angle between the lines).
///
/// The raw coefficients are not used, so the result does not change when
/// either line is rescaled.
pub fn are_parallel(l1: &Line, l2: &Line, tol: Tolerance) -> bool {
    let (n1, n2) = (unit_normal(l1.coeffs()), unit_normal(l2.coeffs()));
    tol.is_zero(n1.x * n2.y - n2.x * n1.y)
}

/// `a₁a₂ + b₁b₂ ≈ 0` on unit normals (cosine of the angle), not on the raw
/// coefficients.
pub fn are_orthogonal(l1: &Line, l2: &Line, tol: Tolerance) -> bool {
    let (n1, n2) = (unit_normal(l1.coeffs()), unit_normal(l2.coeffs()));
    tol.is_zero(n1.dot(&n2))
}

/// Rescale `v` so its leading coefficients equal those of `u`.
///
/// Pre: `u` and `v` are parallel and neither is the ideal line.
fn align_leading(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let i = if v.x.abs() >= v.y.abs() { 0 } else { 1 };
    let mut out = v * (u[i] / v[i]);
    out.x = u.x;
    out.y = u.y;
    out
}

/// Projective coincidence: `û × v̂ ≈ 0` for the unit-norm representatives.
pub(crate) fn coincident(u: &Vector3<f64>, v: &Vector3<f64>, tol: Tolerance) -> bool {
    let (nu, nv) = (u.norm(), v.norm());
    if nu == 0.0 || nv == 0.0 {
        return nu == 0.0 && nv == 0.0;
    }
    let w = skew_symmetric(&(u / nu)) * (v / nv);
    w.iter().all(|&x| tol.is_zero(x))
}

/// `l·p` with `l` scaled to a unit normal and `p` normalized (`w = 1`, or unit
/// norm for ideal points). For finite points this is the signed distance.
pub(crate) fn incidence(l: &Vector3<f64>, p: &Vector3<f64>) -> f64 {
    let ln = {
        let n = l.xy().norm();
        let n = if n > 0.0 { n } else { l.norm() };
        if n > 0.0 {
            l / n
        } else {
            *l
        }
    };
    let pn = if p.z != 0.0 {
        p / p.z
    } else {
        let n = p.norm();
        if n > 0.0 {
            p / n
        } else {
            *p
        }
    };
    ln.dot(&pn)
}

/// Euclidean distance for every operand pair. Anything involving an ideal
/// element is infinitely far, except two ideal lines (distance 0).
pub fn distance(a: &Entity, b: &Entity, cfg: GeomCfg) -> f64 {
    match (a, b) {
        (Entity::Point(p), Entity::Point(q)) => point_point_distance(p, q, cfg.tol),
        (Entity::Line(l), Entity::Line(m)) => line_line_distance(l, m, cfg.tol),
        (Entity::Point(p), Entity::Line(l)) | (Entity::Line(l), Entity::Point(p)) => {
            line_point_distance(l, p, cfg)
        }
    }
}

pub(crate) fn point_point_distance(p: &Point, q: &Point, tol: Tolerance) -> f64 {
    if p.at_infinity(tol) || q.at_infinity(tol) {
        return f64::INFINITY;
    }
    (p.x() - q.x()).hypot(p.y() - q.y())
}

/// Foot of the perpendicular through `p`, then point-to-point distance.
pub(crate) fn line_point_distance(l: &Line, p: &Point, cfg: GeomCfg) -> f64 {
    if l.at_infinity(cfg.tol) || p.at_infinity(cfg.tol) {
        return f64::INFINITY;
    }
    let perp = perpendicular(p, l, cfg);
    let foot = meet(l, &perp, cfg);
    point_point_distance(&foot, p, cfg.tol)
}

pub(crate) fn line_line_distance(l: &Line, m: &Line, tol: Tolerance) -> f64 {
    match (l.at_infinity(tol), m.at_infinity(tol)) {
        (true, true) => return 0.0,
        (true, false) | (false, true) => return f64::INFINITY,
        _ => {}
    }
    if !are_parallel(l, m, tol) {
        return 0.0;
    }
    let u = l.coeffs();
    let v = align_leading(u, m.coeffs());
    (u - v).norm() / u.xy().norm()
}
