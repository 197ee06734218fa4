use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use nalgebra::Vector3;

use super::Point;
use crate::cfg::{GeomCfg, Origin, Tolerance};
use crate::duality;
use crate::error::{GeomError, Result};

/// Line `a·x + b·y + c = 0`, stored as `(a, b, c)`.
///
/// Invariants:
/// - No renormalization; equality is up to a nonzero scalar (see [`Line::approx_eq`]).
/// - `coeffs` is always `origin.shift_line(canonical)` for the origin of the last update.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    name: String,
    coeffs: Vector3<f64>,
    canonical: Vector3<f64>,
}

impl Line {
    /// Build from `(a, b, c)` given in canonical coordinates.
    pub fn new(coeffs: &[f64], cfg: GeomCfg) -> Result<Self> {
        match *coeffs {
            [a, b, c] => Ok(Self::from_canonical(Vector3::new(a, b, c), cfg.origin)),
            _ => Err(GeomError::Arity {
                kind: "Line",
                expected: "3",
                got: coeffs.len(),
            }),
        }
    }

    pub(crate) fn from_canonical(canonical: Vector3<f64>, origin: Origin) -> Self {
        Self {
            name: String::new(),
            coeffs: origin.shift_line(&canonical),
            canonical,
        }
    }

    pub(crate) fn from_current(coeffs: Vector3<f64>, origin: Origin) -> Self {
        Self {
            name: String::new(),
            canonical: origin.unshift_line(&coeffs),
            coeffs,
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

    /// Coefficients in the current frame.
    #[inline]
    pub fn coeffs(&self) -> &Vector3<f64> {
        &self.coeffs
    }

    #[inline]
    pub fn canonical(&self) -> &Vector3<f64> {
        &self.canonical
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.coeffs.x
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.coeffs.y
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.coeffs.z
    }

    /// The ideal line: both leading coefficients vanish.
    #[inline]
    pub fn at_infinity(&self, tol: Tolerance) -> bool {
        tol.is_zero(self.coeffs.x) && tol.is_zero(self.coeffs.y)
    }

    pub fn update_origin(&mut self, origin: Origin) {
        self.coeffs = origin.shift_line(&self.canonical);
    }

    /// Same line with every coefficient multiplied by `k` (name kept).
    pub(crate) fn scaled(&self, k: f64) -> Self {
        Self {
            name: self.name.clone(),
            coeffs: self.coeffs * k,
            canonical: self.canonical * k,
        }
    }

    /// Coincident lines (equal up to a nonzero scalar).
    pub fn approx_eq(&self, other: &Line, tol: Tolerance) -> bool {
        duality::coincident(&self.coeffs, &other.coeffs, tol)
    }

    #[inline]
    pub fn is_parallel(&self, other: &Line, tol: Tolerance) -> bool {
        duality::are_parallel(self, other, tol)
    }

    #[inline]
    pub fn is_perpendicular(&self, other: &Line, tol: Tolerance) -> bool {
        duality::are_orthogonal(self, other, tol)
    }

    /// Lines meeting in exactly one finite point.
    #[inline]
    pub fn is_concurrent(&self, other: &Line, tol: Tolerance) -> bool {
        !duality::are_parallel(self, other, tol)
    }

    /// Incidence test on the line scaled to a unit normal.
    pub fn contains(&self, point: &Point, tol: Tolerance) -> bool {
        tol.is_zero(duality::incidence(&self.coeffs, point.coords()))
    }

    /// Intersection point (ideal if parallel).
    pub fn meet(&self, other: &Line, cfg: GeomCfg) -> Point {
        duality::meet(self, other, cfg)
    }

    /// Line through `point` perpendicular to `self`.
    pub fn perpendicular_through(&self, point: &Point, cfg: GeomCfg) -> Line {
        duality::perpendicular(point, self, cfg)
    }

    /// Inclination in radians, in `(-π/2, π/2]` (counter-clockwise from +x).
    pub fn angle(&self) -> f64 {
        let theta = (-self.coeffs.x).atan2(self.coeffs.y);
        if theta > FRAC_PI_2 {
            theta - PI
        } else if theta <= -FRAC_PI_2 {
            theta + PI
        } else {
            theta
        }
    }

    pub fn distance(&self, other: &Line, tol: Tolerance) -> f64 {
        duality::line_line_distance(self, other, tol)
    }

    pub fn distance_to_point(&self, point: &Point, cfg: GeomCfg) -> f64 {
        duality::line_point_distance(self, point, cfg)
    }

    /// Points of the line over `xs` (or over `ys` for vertical lines; `ys`
    /// defaults to `xs`). The ideal line yields no points.
    pub fn sequence(&self, xs: &[f64], ys: Option<&[f64]>, cfg: GeomCfg) -> Vec<Point> {
        let (a, b, c) = (self.a(), self.b(), self.c());
        let tol = cfg.tol;
        if !tol.is_zero(b) {
            xs.iter()
                .map(|&x| Point::from_current(Vector3::new(x, -(a * x + c) / b, 1.0), cfg.origin))
                .collect()
        } else if !tol.is_zero(a) {
            let x0 = -c / a;
            ys.unwrap_or(xs)
                .iter()
                .map(|&y| Point::from_current(Vector3::new(x0, y, 1.0), cfg.origin))
                .collect()
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ( x, y ) | [{:.4e} {:.4e} {:.4e}] * [ x y 1 ]' = 0",
            self.name, self.coeffs.x, self.coeffs.y, self.coeffs.z
        )?;
        if self.coeffs.x == 0.0 && self.coeffs.y == 0.0 {
            write!(f, " -> line at infinity")?;
        }
        Ok(())
    }
}
