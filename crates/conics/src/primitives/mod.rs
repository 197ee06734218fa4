//! Geometric primitives: homogeneous `Point` and `Line` value types.
//!
//! Both keep a canonical (un-shifted) vector next to the current one, so
//! `update_origin` is idempotent and reversible. Coordinates are read-only from
//! outside; only names and the origin-driven current form ever change.

mod line;
mod point;

pub use line::Line;
pub use point::Point;
