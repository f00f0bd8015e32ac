//! The marketplace facade: one entry point per operation, with the
//! caller's identity resolved by an external auth layer and passed in.
//!
//! All catalog and ledger state lives behind a single
//! `tokio::sync::Mutex`, one mutual-exclusion domain over the combined
//! state: every mutation is atomic and linearizable, and a concurrent
//! caller never observes a partially applied operation. Id counters
//! increment inside the same critical section as the insert they
//! accompany. The external funds transfer runs inside that critical
//! section too, bounded by the configured timeout, and is attempted
//! before any settlement field is touched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use trackshop_core::catalog::{Catalog, Track};
use trackshop_core::error::MarketError;
use trackshop_core::identity::{require_role, ActorId, Role};
use trackshop_core::ledger::{Ledger, Transaction};
use trackshop_core::types::{TrackId, TransactionId};
use trackshop_events::{EventBus, MarketEvent, MarketEventKind};

use crate::config::MarketConfig;
use crate::transfer::FundsTransfer;

/// Combined authoritative state.
struct MarketState {
    catalog: Catalog,
    ledger: Ledger,
}

/// Single-producer marketplace.
///
/// Constructed once at system start; the producer identity can never be
/// reassigned afterwards. Cheap to share as `Arc<Marketplace>`.
pub struct Marketplace {
    /// Fixed at construction, read-only thereafter.
    producer: ActorId,
    transfer_timeout: Duration,
    transfer: Arc<dyn FundsTransfer>,
    events: Arc<EventBus>,
    state: Mutex<MarketState>,
}

impl Marketplace {
    pub fn new(
        config: &MarketConfig,
        transfer: Arc<dyn FundsTransfer>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            producer: config.producer_id,
            transfer_timeout: Duration::from_secs(config.transfer_timeout_secs),
            transfer,
            events,
            state: Mutex::new(MarketState {
                catalog: Catalog::new(),
                ledger: Ledger::new(),
            }),
        }
    }

    /// The configured producer identity.
    pub fn producer(&self) -> ActorId {
        self.producer
    }

    // -----------------------------------------------------------------
    // Catalog operations
    // -----------------------------------------------------------------

    /// Add a track. Producer only.
    pub async fn add_track(
        &self,
        caller: ActorId,
        title: impl Into<String>,
        artist: impl Into<String>,
        price: u64,
    ) -> Result<Track, MarketError> {
        require_role(caller, self.producer, Role::Producer)?;
        let mut state = self.state.lock().await;
        let track = state.catalog.add(title.into(), artist.into(), price);
        tracing::info!(track_id = track.id, price, "Track added to catalog");
        self.events.publish(MarketEvent::new(MarketEventKind::TrackAdded {
            track_id: track.id,
        }));
        Ok(track)
    }

    /// Replace every field of an allocated track. Producer only.
    pub async fn update_track(
        &self,
        caller: ActorId,
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        price: u64,
    ) -> Result<Track, MarketError> {
        require_role(caller, self.producer, Role::Producer)?;
        let mut state = self.state.lock().await;
        let track = state.catalog.update(id, title.into(), artist.into(), price)?;
        tracing::info!(track_id = id, price, "Track updated");
        self.events
            .publish(MarketEvent::new(MarketEventKind::TrackUpdated { track_id: id }));
        Ok(track)
    }

    /// Vacate an allocated track slot. Producer only.
    pub async fn delete_track(&self, caller: ActorId, id: TrackId) -> Result<(), MarketError> {
        require_role(caller, self.producer, Role::Producer)?;
        let mut state = self.state.lock().await;
        state.catalog.delete(id)?;
        tracing::info!(track_id = id, "Track deleted");
        self.events
            .publish(MarketEvent::new(MarketEventKind::TrackDeleted { track_id: id }));
        Ok(())
    }

    /// Point lookup, open to any caller. Never fails; absent ids yield
    /// the vacant value.
    pub async fn track(&self, id: TrackId) -> Track {
        self.state.lock().await.catalog.get(id)
    }

    /// Bounded-range listing, open to any caller.
    pub async fn tracks(&self, start: u64, end: u64) -> Result<Vec<Track>, MarketError> {
        self.state.lock().await.catalog.list(start, end)
    }

    // -----------------------------------------------------------------
    // Ledger operations
    // -----------------------------------------------------------------

    /// Open a purchase request against an allocated track and return
    /// the new transaction id.
    ///
    /// The current slot price is snapshotted into the transaction, so
    /// later catalog edits leave it unchanged; a deleted track
    /// snapshots the vacant price of 0.
    pub async fn send_purchase_request(
        &self,
        caller: ActorId,
        track_id: TrackId,
    ) -> Result<TransactionId, MarketError> {
        let mut state = self.state.lock().await;
        if track_id >= state.catalog.allocated() {
            return Err(MarketError::NotFound {
                entity: "track",
                id: track_id,
            });
        }
        require_role(caller, self.producer, Role::Customer)?;
        let price = state.catalog.get(track_id).price;
        let transaction = state.ledger.request(caller, track_id, price);
        tracing::info!(
            transaction_id = transaction.id,
            track_id,
            price,
            customer = %caller,
            "Purchase requested",
        );
        self.events
            .publish(MarketEvent::new(MarketEventKind::PurchaseRequested {
                transaction_id: transaction.id,
                track_id,
                customer: caller,
            }));
        Ok(transaction.id)
    }

    /// Approve a purchase request. Producer only; re-approval is a
    /// no-op that still succeeds.
    pub async fn approve_purchase_request(
        &self,
        caller: ActorId,
        id: TransactionId,
    ) -> Result<(), MarketError> {
        require_role(caller, self.producer, Role::Producer)?;
        let mut state = self.state.lock().await;
        state.ledger.approve(id)?;
        tracing::info!(transaction_id = id, "Purchase request approved");
        self.events
            .publish(MarketEvent::new(MarketEventKind::PurchaseApproved {
                transaction_id: id,
            }));
        Ok(())
    }

    /// Settle a purchase: verify the caller and amount, move the funds
    /// over the external rail, then record the payment.
    ///
    /// The transfer is attempted before any field is mutated; a decline
    /// or timeout surfaces as `TransferFailed` and leaves the
    /// transaction exactly as it was, so the customer can retry.
    pub async fn finish_purchase_request(
        &self,
        caller: ActorId,
        id: TransactionId,
        amount: u64,
    ) -> Result<(), MarketError> {
        let mut state = self.state.lock().await;
        state.ledger.validate_settlement(caller, id, amount)?;

        let attempt = timeout(
            self.transfer_timeout,
            self.transfer.transfer(caller, self.producer, amount),
        )
        .await;
        match attempt {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(transaction_id = id, error = %err, "Funds transfer declined");
                return Err(MarketError::TransferFailed(err.to_string()));
            }
            Err(_) => {
                tracing::warn!(
                    transaction_id = id,
                    timeout_secs = self.transfer_timeout.as_secs(),
                    "Funds transfer timed out",
                );
                return Err(MarketError::TransferFailed(format!(
                    "transfer timed out after {}s",
                    self.transfer_timeout.as_secs()
                )));
            }
        }

        state.ledger.record_settlement(id, amount);
        tracing::info!(transaction_id = id, amount, "Purchase settled");
        self.events
            .publish(MarketEvent::new(MarketEventKind::PurchaseSettled {
                transaction_id: id,
                amount,
            }));
        Ok(())
    }

    /// Read a transaction. `None` if the id was never allocated.
    pub async fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.state.lock().await.ledger.get(id)
    }
}
