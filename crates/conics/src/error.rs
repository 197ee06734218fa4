//! Error type shared by every constructor and operation.
//!
//! All variants are permanent: the algebra is local and deterministic, so a
//! failing call only succeeds again with different input. Floating-point edge
//! cases (parallel lines, ideal points, rank-deficient conics) are valid states
//! and never reported here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeomError {
    /// Wrong number of components passed to a `Point` or `Line` constructor.
    #[error("size mismatch: {kind} takes a tuple of length {expected}, got {got}")]
    Arity {
        kind: &'static str,
        expected: &'static str,
        got: usize,
    },
    /// Operand kind outside the set an operation is defined over.
    #[error("operand type error: `{kind}` cannot be used as argument of `{op}`")]
    OperandType { op: &'static str, kind: &'static str },
    /// Kind pair rejected by a binary operation (e.g. `dot(Point, Point)`).
    #[error("arguments error: cannot pass {left} and {right} to `{op}`")]
    ArgumentCombination {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    /// Conic construction input that cannot describe a conic.
    #[error("conic precondition violated: {reason}")]
    GeometricPrecondition { reason: String },
    #[error("matrix shape error: expected {expected}, got {rows}x{cols}")]
    MatrixShape {
        expected: &'static str,
        rows: usize,
        cols: usize,
    },
    #[error("matrix value error: {reason}")]
    MatrixValue { reason: String },
}

impl GeomError {
    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        Self::GeometricPrecondition {
            reason: reason.into(),
        }
    }

    pub(crate) fn matrix_value(reason: impl Into<String>) -> Self {
        Self::MatrixValue {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeomError>;
