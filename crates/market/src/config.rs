use std::str::FromStr;

use trackshop_core::identity::ActorId;

/// Marketplace configuration.
///
/// The producer identity is fixed here at system start and is read-only
/// for the life of the process; there is no way to reassign it later.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// The single privileged identity.
    pub producer_id: ActorId,
    /// Upper bound on one external funds-transfer attempt, in seconds
    /// (default: `30`). A timeout surfaces as a transfer failure with
    /// no settlement state mutated.
    pub transfer_timeout_secs: u64,
    /// Event bus buffer capacity (default: `256`).
    pub event_capacity: usize,
}

impl MarketConfig {
    /// Configuration with defaults for everything except the producer.
    pub fn new(producer_id: ActorId) -> Self {
        Self {
            producer_id,
            transfer_timeout_secs: 30,
            event_capacity: 256,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `PRODUCER_ID`           | (required) |
    /// | `TRANSFER_TIMEOUT_SECS` | `30`       |
    /// | `EVENT_CAPACITY`        | `256`      |
    pub fn from_env() -> Self {
        let producer_id = std::env::var("PRODUCER_ID").expect("PRODUCER_ID must be set");
        let producer_id =
            ActorId::from_str(&producer_id).expect("PRODUCER_ID must be a valid UUID");

        let transfer_timeout_secs: u64 = std::env::var("TRANSFER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("TRANSFER_TIMEOUT_SECS must be a valid u64");

        let event_capacity: usize = std::env::var("EVENT_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("EVENT_CAPACITY must be a valid usize");

        Self {
            producer_id,
            transfer_timeout_secs,
            event_capacity,
        }
    }
}
