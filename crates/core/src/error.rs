use crate::types::TransactionId;

/// Domain error taxonomy for every marketplace operation.
///
/// All variants carry a human-readable reason, surface synchronously to
/// the immediate caller, and are never retried automatically. No
/// variant is fatal to the marketplace itself: a failed call leaves the
/// shared state exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// The referenced id was never allocated. Deleted tracks do NOT
    /// produce this: existence checks are allocation-based.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: u64 },

    /// The caller lacks the identity or role the operation requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The `start` argument of a listing is past the allocated range.
    #[error("Listing range invalid: {0}")]
    OutOfRange(String),

    /// The `end` argument of a listing exceeds the hard pagination
    /// ceiling, regardless of how many tracks exist.
    #[error("Pagination limit exceeded: {0}")]
    PaginationLimitExceeded(String),

    /// Settlement amount does not equal the price snapshotted at
    /// request time. Partial payments are not representable.
    #[error("Supplied amount {supplied} does not match the agreed price {expected}")]
    AmountMismatch { expected: u64, supplied: u64 },

    /// The transaction was already settled; settlement is terminal.
    #[error("Transaction {0} has already been settled")]
    AlreadySettled(TransactionId),

    /// The external value-transfer rail declined or timed out. Safe to
    /// retry: no settlement state was mutated.
    #[error("Funds transfer failed: {0}")]
    TransferFailed(String),
}
