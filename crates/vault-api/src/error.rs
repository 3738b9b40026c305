use thiserror::Error;

/// Errors for the few situations the contracts treat as exceptional.
///
/// Expected outcomes (missing node, insufficient funds, unknown account) are
/// reported through `bool`, `Option` or [`EconomyResponse`](crate::EconomyResponse)
/// and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Player identity could not be resolved: {0}")]
    UnresolvedPlayer(String),

    #[error("No active implementation registered for service: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
