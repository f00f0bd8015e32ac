//! Actor identity handles and the role guard.
//!
//! The marketplace never authenticates anyone itself: an external
//! session/auth layer resolves "who is calling" and passes an
//! [`ActorId`] into every facade operation. This module only decides
//! whether that caller holds the role an operation requires.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MarketError;

/// Opaque identity handle for one actor (the producer or a customer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Mint a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

/// The two roles the marketplace distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The single privileged identity that manages the catalog and
    /// approves purchase requests.
    Producer,
    /// Any identity other than the producer.
    Customer,
}

/// Guard clause run at the top of each gated facade operation.
///
/// `Producer` requires the caller to be the configured producer.
/// `Customer` requires the caller to be anyone else: the producer may
/// not purchase from itself.
pub fn require_role(
    caller: ActorId,
    producer: ActorId,
    required: Role,
) -> Result<(), MarketError> {
    match required {
        Role::Producer if caller == producer => Ok(()),
        Role::Producer => Err(MarketError::Forbidden(
            "only the producer may perform this operation".to_string(),
        )),
        Role::Customer if caller != producer => Ok(()),
        Role::Customer => Err(MarketError::Forbidden(
            "the producer cannot act as a customer".to_string(),
        )),
    }
}
