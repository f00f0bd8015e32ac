//! Purchase transaction ledger: an append-only log of every purchase
//! attempt and its progress through the request/approve/settle state
//! machine.
//!
//! Transitions: Requested --approve--> Approved (re-approval is a
//! no-op); Requested or Approved --settle--> Settled (terminal). A
//! failed settlement leaves every field untouched so the customer can
//! retry. Transactions are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::identity::ActorId;
use crate::types::{TrackId, TransactionId};

/// One purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The requesting customer. Only this identity may settle.
    pub customer: ActorId,
    /// Weak reference: the track may be deleted later without
    /// invalidating the transaction, because the price was snapshotted.
    pub track_id: TrackId,
    /// Amount actually received. 0 until settled, then equal to
    /// `price`; partial payments are not representable.
    pub payment: u64,
    /// Price snapshot taken at request time. Later catalog edits do not
    /// alter it.
    pub price: u64,
    pub approved: bool,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

/// In-memory authoritative transaction log.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Slot `i` holds the transaction with id `i`.
    transactions: Vec<Transaction>,
    /// Next id to allocate. Monotonic, never reused.
    next_id: TransactionId,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids allocated so far.
    pub fn allocated(&self) -> u64 {
        self.next_id
    }

    fn check_allocated(&self, id: TransactionId) -> Result<(), MarketError> {
        if id < self.next_id {
            Ok(())
        } else {
            Err(MarketError::NotFound {
                entity: "transaction",
                id,
            })
        }
    }

    /// Append a Requested transaction with the given price snapshot and
    /// return it.
    ///
    /// Identity and track-existence rules are enforced by the facade
    /// before this is called; a deleted track legitimately snapshots
    /// the vacant price of 0.
    pub fn request(
        &mut self,
        customer: ActorId,
        track_id: TrackId,
        price_snapshot: u64,
    ) -> Transaction {
        let transaction = Transaction {
            id: self.next_id,
            customer,
            track_id,
            payment: 0,
            price: price_snapshot,
            approved: false,
            settled: false,
            created_at: Utc::now(),
        };
        self.transactions.push(transaction.clone());
        self.next_id += 1;
        transaction
    }

    /// Mark a transaction approved. Re-approving an already-approved
    /// transaction succeeds with no additional effect.
    pub fn approve(&mut self, id: TransactionId) -> Result<(), MarketError> {
        self.check_allocated(id)?;
        self.transactions[id as usize].approved = true;
        Ok(())
    }

    /// Check phase of settlement. Mutates nothing.
    ///
    /// Check order: unknown id, wrong caller, already settled, wrong
    /// amount. A caller other than the requesting customer always gets
    /// `Forbidden`, even when the transaction is already settled; the
    /// customer itself gets `AlreadySettled` on a repeat. Approval is
    /// not a precondition: a merely-requested transaction may be
    /// settled directly.
    pub fn validate_settlement(
        &self,
        caller: ActorId,
        id: TransactionId,
        amount: u64,
    ) -> Result<(), MarketError> {
        self.check_allocated(id)?;
        let transaction = &self.transactions[id as usize];
        if caller != transaction.customer {
            return Err(MarketError::Forbidden(
                "only the requesting customer may settle this transaction".to_string(),
            ));
        }
        if transaction.settled {
            return Err(MarketError::AlreadySettled(id));
        }
        if amount != transaction.price {
            return Err(MarketError::AmountMismatch {
                expected: transaction.price,
                supplied: amount,
            });
        }
        Ok(())
    }

    /// Commit phase of settlement, called only after the external funds
    /// transfer succeeded. The caller must have run
    /// [`validate_settlement`](Self::validate_settlement) within the
    /// same critical section; the id must be allocated.
    pub fn record_settlement(&mut self, id: TransactionId, amount: u64) {
        let transaction = &mut self.transactions[id as usize];
        transaction.payment = amount;
        transaction.settled = true;
    }

    /// Point lookup. `None` if the id was never allocated.
    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.get(id as usize).cloned()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn customer() -> ActorId {
        ActorId::generate()
    }

    #[test]
    fn request_appends_with_sequential_ids_and_requested_state() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let first = ledger.request(buyer, 4, 100);
        let second = ledger.request(buyer, 4, 100);
        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert_eq!(first.customer, buyer);
        assert_eq!(first.track_id, 4);
        assert_eq!(first.payment, 0);
        assert_eq!(first.price, 100);
        assert!(!first.approved);
        assert!(!first.settled);
        assert_eq!(ledger.allocated(), 2);
    }

    #[test]
    fn approve_is_idempotent() {
        let mut ledger = Ledger::new();
        let id = ledger.request(customer(), 0, 50).id;
        ledger.approve(id).unwrap();
        ledger.approve(id).unwrap();
        assert!(ledger.get(id).unwrap().approved);
    }

    #[test]
    fn approve_unknown_id_fails_not_found() {
        let mut ledger = Ledger::new();
        assert_matches!(
            ledger.approve(0),
            Err(MarketError::NotFound {
                entity: "transaction",
                id: 0
            })
        );
    }

    #[test]
    fn settlement_validation_passes_without_approval() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 0, 100).id;
        assert!(ledger.validate_settlement(buyer, id, 100).is_ok());
    }

    #[test]
    fn settlement_validation_rejects_unknown_id() {
        let ledger = Ledger::new();
        assert_matches!(
            ledger.validate_settlement(customer(), 3, 100),
            Err(MarketError::NotFound {
                entity: "transaction",
                id: 3
            })
        );
    }

    #[test]
    fn settlement_validation_rejects_wrong_caller() {
        let mut ledger = Ledger::new();
        let id = ledger.request(customer(), 0, 100).id;
        let stranger = customer();
        assert_matches!(
            ledger.validate_settlement(stranger, id, 100),
            Err(MarketError::Forbidden(_))
        );
    }

    #[test]
    fn settlement_validation_rejects_wrong_amount() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 0, 100).id;
        assert_matches!(
            ledger.validate_settlement(buyer, id, 99),
            Err(MarketError::AmountMismatch {
                expected: 100,
                supplied: 99
            })
        );
        // Nothing was mutated by the failed validation.
        assert!(!ledger.get(id).unwrap().settled);
        assert_eq!(ledger.get(id).unwrap().payment, 0);
    }

    #[test]
    fn record_settlement_sets_payment_and_terminal_state() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 0, 100).id;
        ledger.record_settlement(id, 100);
        let settled = ledger.get(id).unwrap();
        assert_eq!(settled.payment, 100);
        assert!(settled.settled);
    }

    #[test]
    fn settled_transaction_rejects_its_customer_with_already_settled() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 0, 100).id;
        ledger.record_settlement(id, 100);
        // Even a wrong amount does not mask the terminal state.
        assert_matches!(
            ledger.validate_settlement(buyer, id, 1),
            Err(MarketError::AlreadySettled(0))
        );
    }

    #[test]
    fn settled_transaction_still_rejects_strangers_with_forbidden() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 0, 100).id;
        ledger.record_settlement(id, 100);
        assert_matches!(
            ledger.validate_settlement(customer(), id, 100),
            Err(MarketError::Forbidden(_))
        );
    }

    #[test]
    fn zero_price_snapshot_settles_with_zero_amount() {
        let mut ledger = Ledger::new();
        let buyer = customer();
        let id = ledger.request(buyer, 9, 0).id;
        assert!(ledger.validate_settlement(buyer, id, 0).is_ok());
        assert_matches!(
            ledger.validate_settlement(buyer, id, 1),
            Err(MarketError::AmountMismatch { expected: 0, .. })
        );
    }
}
