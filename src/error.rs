use thiserror::Error;

use crate::opcode::OpCode;

/// Errors raised by factorization, density evaluation, recording and
/// derivative extraction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// A Cholesky pivot was non-positive (or NaN): the matrix is not
    /// symmetric positive definite.
    #[error("matrix is not positive definite (pivot {pivot} is non-positive)")]
    NonPositiveDefinite {
        /// Column of the failing pivot, in factorization order.
        pivot: usize,
    },

    /// A recorded intermediate is NaN or infinite.
    #[error("non-finite intermediate at tape entry {index} ({opcode:?})")]
    NonFiniteIntermediate { index: usize, opcode: OpCode },

    /// Shapes disagree (k, N or q across X, mu and G; input length of a tape query).
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// An observation or mean entry failed the finiteness predicate.
    #[error("non-finite value in {what} at flat index {index}")]
    NonFiniteInput { what: &'static str, index: usize },

    /// `Recording::begin` was called while this thread already records a tape.
    #[error("a tape recording is already active on this thread")]
    RecordingActive,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
