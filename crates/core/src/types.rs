//! Core type definitions

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ResolveError;

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Avalanche,
    Arbitrum,
    Bsc,
}

impl ChainId {
    pub const ALL: [ChainId; 3] = [ChainId::Avalanche, ChainId::Arbitrum, ChainId::Bsc];

    pub fn chain_id(&self) -> u64 {
        match self {
            ChainId::Avalanche => 43114,
            ChainId::Arbitrum => 42161,
            ChainId::Bsc => 56,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Avalanche => "avalanche",
            ChainId::Arbitrum => "arbitrum",
            ChainId::Bsc => "bsc",
        }
    }

    /// Maps a numeric chain id back to the enum. Boundary layers use this to
    /// validate caller-supplied ids.
    pub fn from_id(id: u64) -> Option<ChainId> {
        match id {
            43114 => Some(ChainId::Avalanche),
            42161 => Some(ChainId::Arbitrum),
            56 => Some(ChainId::Bsc),
            _ => None,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Protocol generations of the exchange
///
/// V1 pools are constant-product pairs; V2 and V2.1 pools discretize price
/// into bins and share one fixed-point math core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
    #[serde(rename = "v2_1")]
    V21,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::V1, Generation::V2, Generation::V21];

    pub fn name(&self) -> &'static str {
        match self {
            Generation::V1 => "v1",
            Generation::V2 => "v2",
            Generation::V21 => "v2_1",
        }
    }

    /// Whether pools of this generation expose an active bin and per-bin
    /// liquidity. V1 pairs have neither.
    pub fn uses_bins(&self) -> bool {
        !matches!(self, Generation::V1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A logical trading-pair request, not yet resolved to a pool
///
/// `asset` and `quote` keep the caller's orientation; resolution works on the
/// canonically sorted pair and maps back only in the final price fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub asset: Address,
    pub quote: Address,
    /// Bin step in basis points; zero for V1 pairs.
    pub bin_step: u32,
}

impl Pair {
    pub fn new(asset: Address, quote: Address, bin_step: u32) -> Self {
        Self { asset, quote, bin_step }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} bin {}", self.asset, self.quote, self.bin_step)
    }
}

/// Outcome of the address-resolution stage
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPair {
    pub pair: Pair,
    /// Pool address; zero when resolution failed.
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolveError>,
}

impl ResolvedPair {
    pub fn found(pair: Pair, address: Address) -> Self {
        Self { pair, address, error: None }
    }

    pub fn failed(pair: Pair, error: ResolveError) -> Self {
        Self { pair, address: Address::ZERO, error: Some(error) }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Point-in-time view of a pool's reserves and active bin
///
/// Stored values keep canonical (token0, token1) order. For V1 pools the
/// nearby-liquidity fields repeat the reserves themselves; bin generations
/// fill them with the eleven-bin sample sums.
#[derive(Debug, Clone, Serialize)]
pub struct ReserveSnapshot {
    pub pool: Address,
    pub block_number: u64,
    /// Wall-clock capture time, milliseconds since the epoch.
    pub timestamp_ms: u64,
    pub active_bin: u32,
    pub reserve0: U256,
    pub reserve1: U256,
    pub token0: Address,
    pub token1: Address,
    pub nearby_liquidity0: U256,
    pub nearby_liquidity1: U256,
}

/// Final price result mapped back to the caller's (asset, quote) orientation
///
/// Reserves stay in canonical token order next to the `token0`/`token1`
/// identities; only `price` and `inverse` are oriented to the request.
#[derive(Debug, Clone, Serialize)]
pub struct PairPrice {
    pub chain: ChainId,
    pub generation: Generation,
    pub asset: Address,
    pub quote: Address,
    pub bin_step: u32,
    pub pool: Address,
    pub block_number: u64,
    pub timestamp_ms: u64,
    pub token0: Address,
    pub token1: Address,
    /// Decimal-scaled reserve of token0.
    pub reserve0: f64,
    /// Decimal-scaled reserve of token1.
    pub reserve1: f64,
    /// One unit of `asset` priced in `quote`.
    pub price: f64,
    /// One unit of `quote` priced in `asset`.
    pub inverse: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolveError>,
}

impl PairPrice {
    /// Error-tagged result echoing the request; every numeric field zeroed.
    pub fn failed(
        chain: ChainId,
        generation: Generation,
        resolved: &ResolvedPair,
        timestamp_ms: u64,
        error: ResolveError,
    ) -> Self {
        Self {
            chain,
            generation,
            asset: resolved.pair.asset,
            quote: resolved.pair.quote,
            bin_step: resolved.pair.bin_step,
            pool: resolved.address,
            block_number: 0,
            timestamp_ms,
            token0: Address::ZERO,
            token1: Address::ZERO,
            reserve0: 0.0,
            reserve1: 0.0,
            price: 0.0,
            inverse: 0.0,
            warning: None,
            error: Some(error),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}
