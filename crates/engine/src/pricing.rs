//! Pure price computation
//!
//! Turns one reserve snapshot into an oriented price result. Everything in
//! this module is synchronous; the resolver feeds it cached or freshly
//! fetched snapshots and ships the result to the caller unchanged.

use alloy_primitives::{address, Address, U256};
use tracing::debug;

use dexquote_core::tokens::{decimals_of, is_wrapped_ether};
use dexquote_core::{ChainId, Generation, Pair, PairPrice, ReserveSnapshot, Result};

use crate::math;

/// Pools deployed with their bin price flipped relative to their token
/// order; the decoded price is inverted before orientation mapping.
pub const INVERTED_PRICE_POOLS: [Address; 2] = [
    address!("22300140ab7f5e20d48c2e4d826bd95a13458baa"),
    address!("df34e7548af638cc37b8923ef1139ea98644735a"),
];

/// Warning attached when the sampled bin window is thin on either side.
pub const LOW_LIQUIDITY_WARNING: &str = "Low liquidity around active bin";

/// Fractional digits used when decoding a Q128.128 bin price.
///
/// Equal-decimal pairs read the scaled integer as-is; mixed pairs shift
/// the read so the quote comes out in natural units, with the bitcoin
/// wrappers (8 decimals) on their own step.
pub fn scale_for(decimals0: u8, decimals1: u8) -> u8 {
    if decimals0 == decimals1 {
        18
    } else if decimals0 == 8 || decimals1 == 8 {
        28
    } else {
        30
    }
}

/// Computes the oriented price result for one snapshot.
///
/// `price` is one unit of `pair.asset` in `pair.quote`; `inverse` is the
/// opposite direction. Reserves stay in canonical token order. Arithmetic
/// faults tag the result instead of dropping it, keeping the reserve
/// fields that were already read.
pub fn compute_pair_price(
    chain: ChainId,
    generation: Generation,
    pair: &Pair,
    snapshot: &ReserveSnapshot,
) -> PairPrice {
    let decimals0 = decimals_of(chain, snapshot.token0);
    let decimals1 = decimals_of(chain, snapshot.token1);

    let mut result = PairPrice {
        chain,
        generation,
        asset: pair.asset,
        quote: pair.quote,
        bin_step: pair.bin_step,
        pool: snapshot.pool,
        block_number: snapshot.block_number,
        timestamp_ms: snapshot.timestamp_ms,
        token0: snapshot.token0,
        token1: snapshot.token1,
        reserve0: math::to_f64(snapshot.reserve0, decimals0),
        reserve1: math::to_f64(snapshot.reserve1, decimals1),
        price: 0.0,
        inverse: 0.0,
        warning: None,
        error: None,
    };

    let directions = if generation.uses_bins() {
        bin_directions(
            snapshot.pool,
            pair.bin_step,
            snapshot.active_bin,
            scale_for(decimals0, decimals1),
        )
    } else {
        spot_directions(snapshot.reserve0, snapshot.reserve1, decimals0, decimals1)
    };

    match directions {
        Ok((x_to_y, y_to_x)) => {
            if pair.asset == snapshot.token0 {
                result.price = x_to_y;
                result.inverse = y_to_x;
            } else {
                result.price = y_to_x;
                result.inverse = x_to_y;
            }
            if generation.uses_bins() {
                result.warning = liquidity_warning(chain, snapshot, decimals0, decimals1);
            }
        }
        Err(err) => {
            debug!("Price computation failed for pool {}: {}", snapshot.pool, err);
            result.error = Some(err);
        }
    }

    result
}

fn invert(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        1.0 / value
    }
}

/// Canonical (x_to_y, y_to_x) directions for a bin pool.
fn bin_directions(
    pool: Address,
    bin_step: u32,
    active_bin: u32,
    scale: u8,
) -> Result<(f64, f64)> {
    let raw = math::price_of_bin(active_bin, bin_step)?;
    let mut y_to_x = math::to_f64(math::to_scaled_integer(raw), scale);
    if INVERTED_PRICE_POOLS.contains(&pool) {
        y_to_x = invert(y_to_x);
    }
    Ok((invert(y_to_x), y_to_x))
}

/// Canonical directions for a constant-product pair.
fn spot_directions(
    reserve0: U256,
    reserve1: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<(f64, f64)> {
    let x_to_y = math::reserve_ratio(reserve0, reserve1, decimals0, decimals1)?;
    Ok((x_to_y, invert(x_to_y)))
}

fn liquidity_warning(
    chain: ChainId,
    snapshot: &ReserveSnapshot,
    decimals0: u8,
    decimals1: u8,
) -> Option<String> {
    let low0 = side_is_low(chain, snapshot.token0, decimals0, snapshot.nearby_liquidity0);
    let low1 = side_is_low(chain, snapshot.token1, decimals1, snapshot.nearby_liquidity1);
    (low0 || low1).then(|| LOW_LIQUIDITY_WARNING.to_string())
}

/// Thinness check for one side of the sampled window; the bitcoin and
/// wrapped-ether classes carry price divisors, everything else compares
/// straight against ten units.
fn side_is_low(chain: ChainId, token: Address, decimals: u8, liquidity: U256) -> bool {
    let amount = math::to_f64(liquidity, decimals);
    if decimals == 8 {
        amount / 30_000.0 < 10.0
    } else if is_wrapped_ether(chain, token) {
        amount / 1_800.0 < 10.0
    } else {
        amount < 10.0
    }
}
