//! Resolver state cache
//!
//! Pool addresses are immutable once discovered and live for the process
//! lifetime. Reserve snapshots carry a short TTL checked at read time; a
//! stale entry reads as a miss but stays in place until the next successful
//! refresh overwrites it. Each resolver instance owns its cache outright, so
//! the three protocol generations never see each other's pools.

use std::time::{Duration, Instant};

use alloy_primitives::Address;
use dashmap::DashMap;
use serde::Serialize;

use dexquote_core::{ChainId, ReserveSnapshot};

/// Reserve snapshots older than this read as cache misses.
pub const DEFAULT_RESERVE_TTL: Duration = Duration::from_millis(500);

/// Cache key for one pool lookup: chain, canonically ordered tokens, bin
/// step. The chain belongs in the key because deterministic factory
/// deployments can put the same pool address on two chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub chain: ChainId,
    pub token0: Address,
    pub token1: Address,
    pub bin_step: u32,
}

impl PairKey {
    /// Builds the key with canonical token ordering, so both request
    /// orientations land on the same entry.
    pub fn new(chain: ChainId, token_a: Address, token_b: Address, bin_step: u32) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            chain,
            token0,
            token1,
            bin_step,
        }
    }
}

/// Canonical token ordering shared by cache keys and on-chain lookups.
///
/// Byte-wise address order, the same order pool factories sort by.
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone)]
struct ReserveEntry {
    snapshot: ReserveSnapshot,
    fetched_at: Instant,
}

/// Cache occupancy counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub pool_entries: usize,
    pub reserve_entries: usize,
    pub bin_entries: usize,
}

/// In-memory state owned by one resolver instance
#[derive(Debug)]
pub struct StateCache {
    pools: DashMap<PairKey, Address>,
    last_bins: DashMap<(ChainId, Address), u32>,
    reserves: DashMap<(ChainId, Address), ReserveEntry>,
    reserve_ttl: Duration,
}

impl StateCache {
    pub fn new(reserve_ttl: Duration) -> Self {
        Self {
            pools: DashMap::new(),
            last_bins: DashMap::new(),
            reserves: DashMap::new(),
            reserve_ttl,
        }
    }

    pub fn pool_address(&self, key: &PairKey) -> Option<Address> {
        self.pools.get(key).map(|entry| *entry)
    }

    pub fn set_pool_address(&self, key: PairKey, address: Address) {
        self.pools.insert(key, address);
    }

    /// Last active bin observed for a pool, used to center the
    /// liquidity-depth sample.
    pub fn last_known_bin(&self, chain: ChainId, pool: Address) -> Option<u32> {
        self.last_bins.get(&(chain, pool)).map(|entry| *entry)
    }

    pub fn set_last_known_bin(&self, chain: ChainId, pool: Address, bin: u32) {
        self.last_bins.insert((chain, pool), bin);
    }

    /// Returns the snapshot only while it is fresh.
    pub fn fresh_reserves(&self, chain: ChainId, pool: Address) -> Option<ReserveSnapshot> {
        let entry = self.reserves.get(&(chain, pool))?;
        if entry.fetched_at.elapsed() < self.reserve_ttl {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    pub fn set_reserves(&self, chain: ChainId, snapshot: ReserveSnapshot) {
        self.reserves.insert(
            (chain, snapshot.pool),
            ReserveEntry {
                snapshot,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn reserve_ttl(&self) -> Duration {
        self.reserve_ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pool_entries: self.pools.len(),
            reserve_entries: self.reserves.len(),
            bin_entries: self.last_bins.len(),
        }
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVE_TTL)
    }
}
