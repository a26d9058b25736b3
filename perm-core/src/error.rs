/// Errors raised by permutation checks, permuted views and permuting copies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermError {
    /// The sequence is not a bijection on `0..len`.
    #[error("invalid permutation: {0:?}")]
    InvalidPermutation(Vec<usize>),

    /// Lengths or extents disagree.
    ///
    /// `axis` is `None` when a permutation length does not match the rank or
    /// sequence it is applied to, and `Some(k)` when a destination extent
    /// along axis `k` differs from the (permuted) source extent.
    #[error("dimension mismatch{}: expected {expected}, found {found}", at_axis(.axis))]
    DimensionMismatch {
        axis: Option<usize>,
        expected: usize,
        found: usize,
    },

    /// Reduction target is neither the source extent nor 1 along some axis.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// The operation has no meaning on a permuted view.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow or out-of-buffer access while computing an offset.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,
}

fn at_axis(axis: &Option<usize>) -> String {
    axis.map(|k| format!(" at axis {k}")).unwrap_or_default()
}

impl PermError {
    /// Rank or sequence-length mismatch.
    pub fn rank_mismatch(expected: usize, found: usize) -> Self {
        PermError::DimensionMismatch {
            axis: None,
            expected,
            found,
        }
    }
}

/// Convenience alias for `Result<T, PermError>`.
pub type Result<T> = std::result::Result<T, PermError>;
