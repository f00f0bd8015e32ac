//! Shared id aliases.

/// Catalog track id. Allocated sequentially from 0, never reused.
pub type TrackId = u64;

/// Purchase transaction id. Allocated sequentially from 0, never reused.
pub type TransactionId = u64;
