//! Error types

use alloy_primitives::Address;
use serde::Serialize;
use thiserror::Error;

use crate::types::Pair;

/// Resolution failures surfaced to callers
///
/// Cloneable because a single producer failure fans out to every coalesced
/// waiter; serializable so error-tagged results can cross the host boundary.
#[derive(Debug, Clone, Error, Serialize)]
pub enum ResolveError {
    #[error("Pair not found for {asset}/{quote} with bin {bin_step}")]
    PairNotFound {
        asset: Address,
        quote: Address,
        bin_step: u32,
    },

    #[error("Failed to fetch reserves for pool {pool}: {reason}")]
    ReserveFetchFailed { pool: Address, reason: String },

    #[error("Fixed-point arithmetic fault: {0}")]
    ArithmeticFault(String),

    /// Raw transport failure. Resolver stages fold this into
    /// [`ResolveError::PairNotFound`] or [`ResolveError::ReserveFetchFailed`]
    /// before it reaches a result object.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ResolveError {
    pub fn pair_not_found(pair: &Pair) -> Self {
        ResolveError::PairNotFound {
            asset: pair.asset,
            quote: pair.quote,
            bin_step: pair.bin_step,
        }
    }

    pub fn reserve_fetch_failed(pool: Address, reason: impl Into<String>) -> Self {
        ResolveError::ReserveFetchFailed {
            pool,
            reason: reason.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResolveError::ReserveFetchFailed { .. } | ResolveError::Rpc(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
