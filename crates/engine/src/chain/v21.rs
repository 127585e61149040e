//! Second-revision bin pool reads

use alloy::providers::Provider;
use alloy::sol;
use alloy_primitives::{Address, U256};

use dexquote_core::{ChainId, Generation, Result};

use super::{
    factory_address, rpc_err, ChainClients, ILBFactory, PoolDiscovery, PoolReader, ReserveReading,
};

sol! {
    #[sol(rpc)]
    interface ILBPairV21 {
        function getActiveId() external view returns (uint24 activeId);

        function getReserves() external view returns (uint128 reserveX, uint128 reserveY);

        function getTokenX() external view returns (address tokenX);
        function getTokenY() external view returns (address tokenY);

        function getBin(uint24 id) external view returns (uint128 binReserveX, uint128 binReserveY);
    }
}

/// Reader for the second bin-pool revision.
///
/// Same factory lookup as the first revision; the pair surface renamed
/// its getters and narrowed reserves to 128 bits.
pub struct V21PoolReader {
    clients: ChainClients,
}

impl V21PoolReader {
    pub fn new(clients: ChainClients) -> Self {
        Self { clients }
    }
}

#[async_trait::async_trait]
impl PoolReader for V21PoolReader {
    async fn find_pool(
        &self,
        chain: ChainId,
        token0: Address,
        token1: Address,
        bin_step: u32,
    ) -> Result<PoolDiscovery> {
        let provider = self.clients.provider(chain)?.clone();
        let factory = ILBFactory::new(factory_address(Generation::V21, chain), provider.clone());
        let info = factory
            .getLBPairInformation(token0, token1, U256::from(bin_step))
            .call()
            .await
            .map_err(rpc_err)?
            .lbPairInformation;

        if info.LBPair.is_zero() {
            return Ok(PoolDiscovery {
                pool: Address::ZERO,
                active_bin: None,
            });
        }

        // Seed the bin window for the first reserve read
        let pair = ILBPairV21::new(info.LBPair, provider);
        let state = pair.getActiveId().call().await.map_err(rpc_err)?;

        Ok(PoolDiscovery {
            pool: info.LBPair,
            active_bin: Some(state.activeId),
        })
    }

    async fn read_reserves(&self, chain: ChainId, pool: Address) -> Result<ReserveReading> {
        let provider = self.clients.provider(chain)?.clone();
        let pair = ILBPairV21::new(pool, provider.clone());

        let (reserves, active, token_x, token_y, block_number) = tokio::try_join!(
            async { pair.getReserves().call().await.map_err(rpc_err) },
            async { pair.getActiveId().call().await.map_err(rpc_err) },
            async { pair.getTokenX().call().await.map_err(rpc_err) },
            async { pair.getTokenY().call().await.map_err(rpc_err) },
            async { provider.get_block_number().await.map_err(rpc_err) },
        )?;

        Ok(ReserveReading {
            block_number,
            active_bin: active.activeId,
            reserve0: U256::from(reserves.reserveX),
            reserve1: U256::from(reserves.reserveY),
            tokens: Some((token_x.tokenX, token_y.tokenY)),
        })
    }

    async fn read_bin_liquidity(
        &self,
        chain: ChainId,
        pool: Address,
        bin: u32,
    ) -> Result<(U256, U256)> {
        let provider = self.clients.provider(chain)?.clone();
        let pair = ILBPairV21::new(pool, provider);
        let state = pair.getBin(bin).call().await.map_err(rpc_err)?;
        Ok((
            U256::from(state.binReserveX),
            U256::from(state.binReserveY),
        ))
    }
}
