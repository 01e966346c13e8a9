use thiserror::Error;

/// Rejected construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("max_turns must be >= 1, got {max_turns}")]
    InvalidMaxTurns { max_turns: i64 },
}

/// A backend reply that does not satisfy the generation contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation backend returned no results")]
    EmptyResult,
}
