//! First-revision bin pool reads

use alloy::providers::Provider;
use alloy::sol;
use alloy_primitives::{Address, U256};

use dexquote_core::{ChainId, Generation, Result};

use super::{
    factory_address, rpc_err, ChainClients, ILBFactory, PoolDiscovery, PoolReader, ReserveReading,
};

sol! {
    #[sol(rpc)]
    interface ILBPairV2 {
        function getReservesAndId()
            external
            view
            returns (uint256 reserveX, uint256 reserveY, uint256 activeId);

        function tokenX() external view returns (address);
        function tokenY() external view returns (address);

        function getBin(uint24 id) external view returns (uint256 reserveX, uint256 reserveY);
    }
}

/// Reader for the first bin-pool revision.
pub struct V2PoolReader {
    clients: ChainClients,
}

impl V2PoolReader {
    pub fn new(clients: ChainClients) -> Self {
        Self { clients }
    }
}

#[async_trait::async_trait]
impl PoolReader for V2PoolReader {
    async fn find_pool(
        &self,
        chain: ChainId,
        token0: Address,
        token1: Address,
        bin_step: u32,
    ) -> Result<PoolDiscovery> {
        let provider = self.clients.provider(chain)?.clone();
        let factory = ILBFactory::new(factory_address(Generation::V2, chain), provider.clone());
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
        let pair = ILBPairV2::new(info.LBPair, provider);
        let state = pair.getReservesAndId().call().await.map_err(rpc_err)?;

        Ok(PoolDiscovery {
            pool: info.LBPair,
            active_bin: Some(state.activeId.to::<u32>()),
        })
    }

    async fn read_reserves(&self, chain: ChainId, pool: Address) -> Result<ReserveReading> {
        let provider = self.clients.provider(chain)?.clone();
        let pair = ILBPairV2::new(pool, provider.clone());

        let (state, token_x, token_y, block_number) = tokio::try_join!(
            async { pair.getReservesAndId().call().await.map_err(rpc_err) },
            async { pair.tokenX().call().await.map_err(rpc_err) },
            async { pair.tokenY().call().await.map_err(rpc_err) },
            async { provider.get_block_number().await.map_err(rpc_err) },
        )?;

        Ok(ReserveReading {
            block_number,
            active_bin: state.activeId.to::<u32>(),
            reserve0: state.reserveX,
            reserve1: state.reserveY,
            tokens: Some((token_x._0, token_y._0)),
        })
    }

    async fn read_bin_liquidity(
        &self,
        chain: ChainId,
        pool: Address,
        bin: u32,
    ) -> Result<(U256, U256)> {
        let provider = self.clients.provider(chain)?.clone();
        let pair = ILBPairV2::new(pool, provider);
        let state = pair.getBin(bin).call().await.map_err(rpc_err)?;
        Ok((state.reserveX, state.reserveY))
    }
}
