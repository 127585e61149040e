//! Engine front door
//!
//! Owns one resolver per pool generation, all sharing the same HTTP
//! providers. Callers pick a chain and generation per request; everything
//! else (discovery, caching, coalescing, pricing) happens behind
//! [`PriceResolver`].

use std::sync::Arc;

use tracing::info;

use dexquote_core::{ChainId, EngineConfig, Generation, Pair, PairPrice, Result};

use crate::chain::{ChainClients, V1PoolReader, V21PoolReader, V2PoolReader};
use crate::resolver::{PriceResolver, ResolverStats, SeedPair};

pub struct PriceService {
    clients: ChainClients,
    v1: PriceResolver,
    v2: PriceResolver,
    v21: PriceResolver,
}

impl PriceService {
    /// Builds providers from the config and wires up the three resolvers.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let clients = ChainClients::from_config(config)?;
        let ttl = config.reserve_ttl();
        let v1 = PriceResolver::new(
            Generation::V1,
            Arc::new(V1PoolReader::new(clients.clone())),
            ttl,
        );
        let v2 = PriceResolver::new(
            Generation::V2,
            Arc::new(V2PoolReader::new(clients.clone())),
            ttl,
        );
        let v21 = PriceResolver::new(
            Generation::V21,
            Arc::new(V21PoolReader::new(clients.clone())),
            ttl,
        );
        info!(
            "Price service ready: {} chains, reserve ttl {}ms",
            clients.chains().count(),
            ttl.as_millis()
        );
        Ok(Self { clients, v1, v2, v21 })
    }

    pub fn resolver(&self, generation: Generation) -> &PriceResolver {
        match generation {
            Generation::V1 => &self.v1,
            Generation::V2 => &self.v2,
            Generation::V21 => &self.v21,
        }
    }

    /// Chains with a configured endpoint.
    pub fn chains(&self) -> Vec<ChainId> {
        self.clients.chains().collect()
    }

    /// Resolves and prices a batch of pairs on one chain.
    pub async fn fetch_prices(
        &self,
        chain: ChainId,
        generation: Generation,
        pairs: &[Pair],
    ) -> Vec<PairPrice> {
        self.resolver(generation).resolve_many(chain, pairs).await
    }

    /// Installs known pools for one generation, skipping discovery.
    pub fn seed_pairs(&self, chain: ChainId, generation: Generation, seeds: &[SeedPair]) {
        self.resolver(generation).seed_pairs(chain, seeds);
    }

    pub fn stats(&self) -> Vec<ResolverStats> {
        vec![self.v1.stats(), self.v2.stats(), self.v21.stats()]
    }
}
