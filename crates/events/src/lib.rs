//! In-process event bus and the typed events the marketplace publishes
//! after each successful mutation.

pub mod bus;

pub use bus::{EventBus, MarketEvent, MarketEventKind};
