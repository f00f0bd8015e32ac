//! The value-transfer rail, modeled as an external collaborator.
//!
//! Settlement needs exactly one capability from the outside world:
//! "move this amount from the customer to the producer, and tell me
//! whether it worked". Deployments plug in a real rail; tests plug in
//! doubles.

use async_trait::async_trait;
use trackshop_core::identity::ActorId;

/// Failure reported by the transfer rail.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The rail refused or could not complete the movement.
    #[error("transfer declined: {0}")]
    Declined(String),
}

/// One-shot funds movement. Implementations must either fully apply or
/// fully fail; the marketplace never retries on its own.
#[async_trait]
pub trait FundsTransfer: Send + Sync {
    async fn transfer(&self, from: ActorId, to: ActorId, amount: u64)
        -> Result<(), TransferError>;
}

/// Rail for local development: approves every movement and logs it.
#[derive(Debug, Default)]
pub struct LoggingTransfer;

#[async_trait]
impl FundsTransfer for LoggingTransfer {
    async fn transfer(
        &self,
        from: ActorId,
        to: ActorId,
        amount: u64,
    ) -> Result<(), TransferError> {
        tracing::info!(%from, %to, amount, "Funds transferred");
        Ok(())
    }
}
