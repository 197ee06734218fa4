use std::fmt;

use nalgebra::Vector3;

use super::Line;
use crate::cfg::{GeomCfg, Origin, Tolerance};
use crate::duality;
use crate::error::{GeomError, Result};

/// Point `(x, y, w)` of the real projective plane.
///
/// Invariants:
/// - `w ≠ 0` ⇒ normalized to `w = 1`; `w = 0` is an ideal point and is kept as is.
/// - `canonical` is the form in the un-shifted frame; `coords` is always
///   `origin.shift_point(canonical)` for the origin of the last update.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    name: String,
    coords: Vector3<f64>,
    canonical: Vector3<f64>,
}

#[inline]
fn normalize(v: Vector3<f64>) -> Vector3<f64> {
    if v.z != 0.0 {
        v / v.z
    } else {
        v
    }
}

impl Point {
    /// Build from a 2-tuple `(x, y)` or a homogeneous 3-tuple `(x, y, w)` given
    /// in canonical coordinates.
    pub fn new(coords: &[f64], cfg: GeomCfg) -> Result<Self> {
        let v = match *coords {
            [x, y] => Vector3::new(x, y, 1.0),
            [x, y, w] => Vector3::new(x, y, w),
            _ => {
                return Err(GeomError::Arity {
                    kind: "Point",
                    expected: "2 or 3",
                    got: coords.len(),
                })
            }
        };
        Ok(Self::from_canonical(v, cfg.origin))
    }

    /// Finite point from canonical Euclidean coordinates.
    #[inline]
    pub fn xy(x: f64, y: f64, cfg: GeomCfg) -> Self {
        Self::from_canonical(Vector3::new(x, y, 1.0), cfg.origin)
    }

    pub(crate) fn from_canonical(v: Vector3<f64>, origin: Origin) -> Self {
        let canonical = normalize(v);
        Self {
            name: String::new(),
            coords: origin.shift_point(&canonical),
            canonical,
        }
    }

    /// Wrap a vector already expressed in the current frame.
    pub(crate) fn from_current(v: Vector3<f64>, origin: Origin) -> Self {
        let coords = normalize(v);
        Self {
            name: String::new(),
            canonical: origin.unshift_point(&coords),
            coords,
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

    /// Homogeneous coordinates in the current frame.
    #[inline]
    pub fn coords(&self) -> &Vector3<f64> {
        &self.coords
    }

    #[inline]
    pub fn canonical(&self) -> &Vector3<f64> {
        &self.canonical
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.coords.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.coords.y
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.coords.z
    }

    #[inline]
    pub fn at_infinity(&self, tol: Tolerance) -> bool {
        tol.is_zero(self.coords.z)
    }

    /// Recompute the current form from the canonical one.
    pub fn update_origin(&mut self, origin: Origin) {
        self.coords = origin.shift_point(&self.canonical);
    }

    /// Coincidence in the projective sense (`self × other ≈ 0` on unit vectors).
    pub fn approx_eq(&self, other: &Point, tol: Tolerance) -> bool {
        duality::coincident(&self.coords, &other.coords, tol)
    }

    pub fn distance(&self, other: &Point, tol: Tolerance) -> f64 {
        duality::point_point_distance(self, other, tol)
    }

    pub fn distance_to_line(&self, line: &Line, cfg: GeomCfg) -> f64 {
        duality::line_point_distance(line, self, cfg)
    }

    #[inline]
    pub fn lies_on(&self, line: &Line, tol: Tolerance) -> bool {
        line.contains(self, tol)
    }

    /// Line through `self` and `other`.
    pub fn join(&self, other: &Point, cfg: GeomCfg) -> Line {
        duality::join(self, other, cfg)
    }

    /// Line through `self` perpendicular to `line`.
    pub fn perpendicular(&self, line: &Line, cfg: GeomCfg) -> Line {
        duality::perpendicular(self, line, cfg)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{:.4e} {:.4e} {:.4e}]",
            self.name, self.coords.x, self.coords.y, self.coords.z
        )?;
        if self.coords.z == 0.0 {
            write!(f, " -> point at infinity")?;
        }
        Ok(())
    }
}
