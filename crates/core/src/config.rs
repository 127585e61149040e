//! Configuration types
//!
//! Plain typed structs the host fills in; this crate performs no environment
//! or file loading of its own.

use serde::{Deserialize, Serialize};

use crate::ChainId;

/// RPC endpoint configuration for one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub chain: ChainId,
    pub http_url: String,
}

impl RpcConfig {
    pub fn new(chain: ChainId, http_url: impl Into<String>) -> Self {
        Self {
            chain,
            http_url: http_url.into(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub rpcs: Vec<RpcConfig>,
    /// Reserve snapshots older than this are treated as cache misses.
    pub reserve_ttl_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rpcs: vec![],
            reserve_ttl_ms: 500, // Reserves older than 500ms are stale
        }
    }
}

impl EngineConfig {
    pub fn reserve_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.reserve_ttl_ms)
    }

    pub fn rpc_for(&self, chain: ChainId) -> Option<&RpcConfig> {
        self.rpcs.iter().find(|rpc| rpc.chain == chain)
    }
}
