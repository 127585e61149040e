//! Token decimal classification
//!
//! Raw on-chain reserve integers are scaled by token decimals. The engine
//! only distinguishes three classes: 6-decimal USD stables, 8-decimal
//! bitcoin wrappers, and the 18-decimal default for everything else.

use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ChainId;

pub const DEFAULT_DECIMALS: u8 = 18;

/// 6-decimal tokens per chain (USD stables)
static SIX_DECIMAL_TOKENS: LazyLock<HashMap<ChainId, Vec<Address>>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        ChainId::Avalanche,
        vec![
            "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E".parse().unwrap(), // USDC
            "0xa7d7079b0fead91f3e65f86e8915cb59c1a4c664".parse().unwrap(), // USDC.e
            "0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7".parse().unwrap(), // USDT
            "0xc7198437980c041c805a1edcba50c1ce5db95118".parse().unwrap(), // USDT.e
        ],
    );
    m.insert(
        ChainId::Arbitrum,
        vec![
            "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".parse().unwrap(), // USDC
            "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8".parse().unwrap(), // USDC.e
            "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9".parse().unwrap(), // USDT
        ],
    );
    m.insert(
        ChainId::Bsc,
        vec![
            "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d".parse().unwrap(), // USDC
            "0x55d398326f99059ff775485246999027b3197955".parse().unwrap(), // USDT
        ],
    );
    m
});

/// 8-decimal tokens per chain (bitcoin wrappers)
static EIGHT_DECIMAL_TOKENS: LazyLock<HashMap<ChainId, Vec<Address>>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        ChainId::Avalanche,
        vec![
            "0x152b9d0fdc40c096757f570a51e494bd4b943e50".parse().unwrap(), // BTC.b
            "0x50b7545627a5162f82a992c33b87adc75187b218".parse().unwrap(), // WBTC.e
        ],
    );
    m.insert(
        ChainId::Arbitrum,
        vec![
            "0x2297aebd383787a160dd0d9f71508148769342e3".parse().unwrap(), // BTC.b
            "0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f".parse().unwrap(), // WBTC
        ],
    );
    m.insert(
        ChainId::Bsc,
        vec![
            "0x7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c".parse().unwrap(), // BTCB
            "0x2297aebd383787a160dd0d9f71508148769342e3".parse().unwrap(), // BTC.b
        ],
    );
    m
});

/// Wrapped-ether deployments known to the liquidity threshold rule
static WRAPPED_ETHER: LazyLock<HashMap<ChainId, Address>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        ChainId::Arbitrum,
        "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".parse().unwrap(), // WETH
    );
    m
});

/// Decimal precision for a token address: 6, 8, or 18.
pub fn decimals_of(chain: ChainId, token: Address) -> u8 {
    if EIGHT_DECIMAL_TOKENS
        .get(&chain)
        .is_some_and(|tokens| tokens.contains(&token))
    {
        return 8;
    }
    if SIX_DECIMAL_TOKENS
        .get(&chain)
        .is_some_and(|tokens| tokens.contains(&token))
    {
        return 6;
    }
    DEFAULT_DECIMALS
}

pub fn wrapped_ether(chain: ChainId) -> Option<Address> {
    WRAPPED_ETHER.get(&chain).copied()
}

pub fn is_wrapped_ether(chain: ChainId, token: Address) -> bool {
    wrapped_ether(chain) == Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_decimals() {
        let usdc: Address = "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".parse().unwrap();
        assert_eq!(decimals_of(ChainId::Arbitrum, usdc), 6);
        // Same token address means nothing on another chain
        assert_eq!(decimals_of(ChainId::Bsc, usdc), 18);
    }

    #[test]
    fn test_btc_decimals() {
        let btc_b: Address = "0x2297aebd383787a160dd0d9f71508148769342e3".parse().unwrap();
        assert_eq!(decimals_of(ChainId::Arbitrum, btc_b), 8);
        // BTC.b is bridged to BSC at the same address
        assert_eq!(decimals_of(ChainId::Bsc, btc_b), 8);
    }

    #[test]
    fn test_default_decimals() {
        let joe: Address = "0x371c7ec6D8039ff7933a2AA28EB827Ffe1F52f07".parse().unwrap();
        assert_eq!(decimals_of(ChainId::Arbitrum, joe), 18);
    }

    #[test]
    fn test_wrapped_ether_is_arbitrum_only() {
        let weth: Address = "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".parse().unwrap();
        assert!(is_wrapped_ether(ChainId::Arbitrum, weth));
        assert!(!is_wrapped_ether(ChainId::Avalanche, weth));
        assert_eq!(wrapped_ether(ChainId::Bsc), None);
    }
}
