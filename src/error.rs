/// Reasons a compact solution fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("solution is {got} bytes, expected {expected}")]
    InvalidLength { got: usize, expected: usize },
    #[error("index out of range for the parameter set")]
    IndexOutOfRange,
    #[error("index tuple violates the tree ordering")]
    OutOfOrder,
    #[error("duplicate indices in tuple")]
    DuplicateIndices,
    #[error("missing partial collision at round {0}")]
    CollisionMissing(usize),
    #[error("full-width xor is non-zero")]
    NonZeroRoot,
}

/// Fatal solver-side failures.
///
/// Anything that surfaces as `Err` from a solve maps to the `INTERNAL_ERROR`
/// status code (-1); clean completion and cancellation are `Ok` statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("collision table allocation failed")]
    ResourceExhausted,
    #[error("internal solver error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable integer status code for callers that want the C-style taxonomy.
    pub const fn code(&self) -> i32 {
        -1
    }
}
