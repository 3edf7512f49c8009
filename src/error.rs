use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("master secret and salt cannot be empty")]
    EmptyInput,

    /// The digit-only subsequence of the digest is shorter than the mode
    /// needs. Deterministic for the given inputs: only a different salt or
    /// master secret resolves it.
    #[error("could not find {required} digits in the hash (found {found}); try a different salt")]
    InsufficientDigits { required: usize, found: usize },

    #[error("unexpected error during derivation: {0}")]
    Unexpected(String),
}

impl DerivationError {
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InsufficientDigits { .. })
    }
}
