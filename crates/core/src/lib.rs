//! Domain layer for the trackshop marketplace: the track catalog, the
//! purchase-transaction ledger, and the identity/role rules that gate
//! them.
//!
//! Everything here is pure in-memory logic with no IO and no locking.
//! The `trackshop-market` facade adds the mutual-exclusion domain, the
//! funds-transfer collaborator, and event publication on top.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod types;
