//! Chain access layer
//!
//! One [`PoolReader`] per pool generation, all normalizing their contract
//! calls to the same shapes so the resolver never branches on generation
//! internals. Readers do pure I/O: no caching, no coalescing, no math.

mod v1;
mod v2;
mod v21;

pub use v1::V1PoolReader;
pub use v2::V2PoolReader;
pub use v21::V21PoolReader;

use std::collections::HashMap;
use std::sync::Arc;

use alloy::providers::{ProviderBuilder, RootProvider};
use alloy::sol;
use alloy::transports::http::{Client, Http};
use alloy_primitives::{address, Address, U256};
use url::Url;

use dexquote_core::{ChainId, EngineConfig, Generation, ResolveError, Result};

/// Concrete provider type for plain HTTP transports.
pub type HttpProvider = RootProvider<Http<Client>>;

sol! {
    /// Bin-pool factory lookup, shared by the v2 and v2.1 deployments.
    /// The selector only depends on the argument types, which both
    /// factory revisions agree on.
    #[sol(rpc)]
    interface ILBFactory {
        struct LBPairInformation {
            uint16 binStep;
            address LBPair;
            bool createdByOwner;
            bool ignoredForRouting;
        }

        function getLBPairInformation(address tokenX, address tokenY, uint256 binStep)
            external
            view
            returns (LBPairInformation memory lbPairInformation);
    }
}

/// Factory deployment for a generation on a chain.
///
/// The v2.1 factory is deployed at the same address everywhere; the older
/// generations were deployed per chain.
pub fn factory_address(generation: Generation, chain: ChainId) -> Address {
    match (generation, chain) {
        (Generation::V1, ChainId::Avalanche) => {
            address!("9ad6c38be94206ca50bb0d90783181662f0cfa10")
        }
        (Generation::V1, ChainId::Arbitrum) => {
            address!("ae4ec9901c3076d0ddbe76a520f9e90a6227acb7")
        }
        (Generation::V1, ChainId::Bsc) => address!("4f8bdc85e3eec5b9de67097c3f59b6db025d9986"),
        (Generation::V2, ChainId::Avalanche) => {
            address!("6e77932a92582f504ff6c4bdbcef7da6c198aeef")
        }
        (Generation::V2, ChainId::Arbitrum) => {
            address!("1886d09c9ade0c5db822d85d21678db67b6c2982")
        }
        (Generation::V2, ChainId::Bsc) => address!("43646a8e839b2f2766392c1bf8f60f6e587b6960"),
        (Generation::V21, _) => address!("8e42f2f4101563bf679975178e880fd87d3efd4e"),
    }
}

/// One shared HTTP provider per configured chain.
///
/// Cloning is cheap; the inner map is behind an `Arc` so the three
/// generation readers reuse the same connections.
#[derive(Clone)]
pub struct ChainClients {
    providers: Arc<HashMap<ChainId, HttpProvider>>,
}

impl ChainClients {
    /// Build providers for every endpoint in the config.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut providers = HashMap::new();
        for rpc in &config.rpcs {
            let url: Url = rpc.http_url.parse().map_err(|e| {
                ResolveError::InvalidConfig(format!("rpc url for {}: {e}", rpc.chain))
            })?;
            providers.insert(rpc.chain, ProviderBuilder::new().on_http(url));
        }
        Ok(Self {
            providers: Arc::new(providers),
        })
    }

    pub fn provider(&self, chain: ChainId) -> Result<&HttpProvider> {
        self.providers
            .get(&chain)
            .ok_or_else(|| ResolveError::InvalidConfig(format!("no rpc endpoint for {chain}")))
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.providers.keys().copied()
    }
}

/// Outcome of a factory lookup.
#[derive(Debug, Clone, Copy)]
pub struct PoolDiscovery {
    pub pool: Address,
    /// Active bin observed during discovery; `None` for constant-product
    /// pools, which have no bins.
    pub active_bin: Option<u32>,
}

/// Reserve state of one pool, normalized across generations.
#[derive(Debug, Clone)]
pub struct ReserveReading {
    pub block_number: u64,
    /// Zero for constant-product pools.
    pub active_bin: u32,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Token identities reported by the pool itself. Constant-product
    /// pairs are addressed by canonical token order, so they report none.
    pub tokens: Option<(Address, Address)>,
}

/// Generation-specific contract reads.
///
/// A zero pool address from [`find_pool`](PoolReader::find_pool) means the
/// factory has no pool at that key; it is not an error at this layer.
#[async_trait::async_trait]
pub trait PoolReader: Send + Sync {
    async fn find_pool(
        &self,
        chain: ChainId,
        token0: Address,
        token1: Address,
        bin_step: u32,
    ) -> Result<PoolDiscovery>;

    async fn read_reserves(&self, chain: ChainId, pool: Address) -> Result<ReserveReading>;

    /// Liquidity parked in a single bin, split by token side.
    async fn read_bin_liquidity(
        &self,
        chain: ChainId,
        pool: Address,
        bin: u32,
    ) -> Result<(U256, U256)>;
}

/// Fold any transport or contract failure into the internal RPC variant.
pub(crate) fn rpc_err(err: impl std::fmt::Display) -> ResolveError {
    ResolveError::Rpc(err.to_string())
}
