//! Marketplace facade over the trackshop domain layer.
//!
//! Wires the catalog and ledger behind a single lock, applies the role
//! guards, drives the external funds-transfer rail during settlement,
//! and publishes an event per successful mutation.

pub mod config;
pub mod marketplace;
pub mod transfer;

pub use config::MarketConfig;
pub use marketplace::Marketplace;
pub use transfer::{FundsTransfer, LoggingTransfer, TransferError};
