//! Constant-product pair reads

use alloy::providers::Provider;
use alloy::sol;
use alloy_primitives::{Address, U256};

use dexquote_core::{ChainId, Generation, Result};

use super::{factory_address, rpc_err, ChainClients, PoolDiscovery, PoolReader, ReserveReading};

sol! {
    #[sol(rpc)]
    interface IV1Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    #[sol(rpc)]
    interface IV1Pair {
        function getReserves()
            external
            view
            returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

/// Reader for constant-product pairs.
///
/// These pools ignore the bin step entirely; one pair exists per token
/// couple and its identity follows canonical token order.
pub struct V1PoolReader {
    clients: ChainClients,
}

impl V1PoolReader {
    pub fn new(clients: ChainClients) -> Self {
        Self { clients }
    }
}

#[async_trait::async_trait]
impl PoolReader for V1PoolReader {
    async fn find_pool(
        &self,
        chain: ChainId,
        token0: Address,
        token1: Address,
        _bin_step: u32,
    ) -> Result<PoolDiscovery> {
        let provider = self.clients.provider(chain)?.clone();
        let factory = IV1Factory::new(factory_address(Generation::V1, chain), provider);
        let found = factory
            .getPair(token0, token1)
            .call()
            .await
            .map_err(rpc_err)?;

        Ok(PoolDiscovery {
            pool: found.pair,
            active_bin: None,
        })
    }

    async fn read_reserves(&self, chain: ChainId, pool: Address) -> Result<ReserveReading> {
        let provider = self.clients.provider(chain)?.clone();
        let pair = IV1Pair::new(pool, provider.clone());

        let (reserves, block_number) = tokio::try_join!(
            async { pair.getReserves().call().await.map_err(rpc_err) },
            async { provider.get_block_number().await.map_err(rpc_err) },
        )?;

        Ok(ReserveReading {
            block_number,
            active_bin: 0,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
            tokens: None,
        })
    }

    async fn read_bin_liquidity(
        &self,
        _chain: ChainId,
        pool: Address,
        _bin: u32,
    ) -> Result<(U256, U256)> {
        Err(rpc_err(format!("pool {pool} has no bins")))
    }
}
