//! Projective plane geometry: points, lines and conics in homogeneous coordinates.
//!
//! Layout
//! - `cfg`: explicit context (tolerances, coordinate origin). Nothing is global.
//! - `linalg`: tolerant kernel (rank, minors, cofactors, real eigenpairs).
//! - `primitives`: `Point` and `Line`.
//! - `duality`: cross/dot/distance over the `{Point, Line}` union.
//! - `conic`: conics, pole/polar, pencils, degenerate factorization.
//! - `contour`: level-set tracing used to sample conics.
//! - `scene`: a context together with the shapes expressed in it.
//!
//! Every fallible operation returns [`error::Result`]; degenerate geometry
//! (parallel lines, ideal points, rank-deficient conics) is a valid state, not an error.

pub mod cfg;
pub mod conic;
pub mod contour;
pub mod duality;
pub mod error;
pub mod linalg;
pub mod primitives;
pub mod scene;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{GeomCfg, Origin, Tolerance};
pub use error::{GeomError, Result};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{GeomCfg, Origin, Tolerance};
    pub use crate::conic::{Conic, ConicParams};
    pub use crate::contour::{ContourSampler, MarchingSquares, PathCode, Trace};
    pub use crate::duality::{cross, distance, dot, Entity};
    pub use crate::error::{GeomError, Result};
    pub use crate::primitives::{Line, Point};
    pub use crate::scene::{Scene, Shape};
    pub use nalgebra::{Matrix3 as Mat3, Vector3 as Vec3};
}
