//! Q128.128 fixed-point math
//!
//! Bit-exact port of the exchange contract's unsigned 256-bit arithmetic:
//! binary exponentiation with deliberate mod-2^256 wrapping multiplies, and
//! a 512-bit-intermediate decimal conversion that cannot lose precision to
//! overflow. Everything here is pure and non-suspending.

use alloy_primitives::U256;

use dexquote_core::{ResolveError, Result};

/// 2^128, the Q128.128 representation of 1.0
pub const SCALE: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Active bin id sitting at the zero price offset (2^23)
pub const REFERENCE_BIN: u32 = 1 << 23;

/// 10^18, applied before decimal formatting
const E18: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Largest base usable without inversion (2^128 - 1)
const U128_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);

const BASIS_POINTS: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Exponent magnitude guard for [`pow`]
const MAX_POW_EXPONENT: i64 = 1 << 20;

/// Raises a Q128.128 base to an integer exponent.
///
/// Walks the low 20 bits of the exponent, squaring a working term every
/// round and folding it into the accumulator on set bits; both operations
/// are a wrapping (mod 2^256) multiply followed by a 128-bit right shift.
/// Bases above [`U128_MAX`] are inverted into the sub-1.0 domain first and
/// the accumulator re-inverted at the end, which keeps every intermediate
/// below 2^128.
///
/// Negative and out-of-range exponents fault instead of producing a wrong
/// price; the contract never emits them for a well-formed bin id.
pub fn pow(base: U256, exponent: i64) -> Result<U256> {
    if exponent == 0 {
        return Ok(SCALE);
    }
    if exponent < 0 {
        return Err(ResolveError::ArithmeticFault(format!(
            "negative exponent {exponent} in fixed-point pow"
        )));
    }
    if exponent >= MAX_POW_EXPONENT {
        return Err(ResolveError::ArithmeticFault(format!(
            "exponent {exponent} exceeds the 2^20 pow range"
        )));
    }

    let mut invert = false;
    let mut squared = base;
    if base > U128_MAX {
        squared = U256::MAX / base;
        invert = true;
    }

    let mut result = SCALE;
    for bit in 0..20 {
        if exponent & (1i64 << bit) != 0 {
            result = result.wrapping_mul(squared) >> 128;
        }
        squared = squared.wrapping_mul(squared) >> 128;
    }

    if invert {
        if result.is_zero() {
            return Err(ResolveError::ArithmeticFault(format!(
                "pow underflow at exponent {exponent}"
            )));
        }
        result = U256::MAX / result;
    }
    Ok(result)
}

/// Q128.128 price of a bin: (1 + binStep / 10000) ^ (activeBin - 2^23).
pub fn price_of_bin(active_bin: u32, bin_step: u32) -> Result<U256> {
    let base = SCALE + ((U256::from(bin_step) << 128) / BASIS_POINTS);
    let exponent = i64::from(active_bin) - i64::from(REFERENCE_BIN);
    pow(base, exponent)
}

/// Converts a Q128.128 value to an integer scaled by 10^18.
///
/// The full 512-bit product of `value * 10^18` is carried as two 256-bit
/// limbs: the wrapping low product plus a carry limb recovered through a
/// multiplication modulo 2^256 - 1. Recombining after the 128-bit shift
/// keeps every fractional bit that a naive fixed-width multiply would drop.
pub fn to_scaled_integer(value: U256) -> U256 {
    let prod0 = value.wrapping_mul(E18);
    let mm = value.mul_mod(E18, U256::MAX);
    let mut prod1 = mm.wrapping_sub(prod0);
    if mm < prod0 {
        prod1 = prod1.wrapping_sub(U256::from(1));
    }
    (prod1 << 128) | (prod0 >> 128)
}

/// Formats an integer with `decimals` fractional digits.
///
/// Output matches the reference formatter: always a decimal point, trailing
/// zeros trimmed down to a single fractional digit ("1.0", "0.00105").
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let mut frac = (value % divisor).to_string();
    while frac.len() < decimals as usize {
        frac.insert(0, '0');
    }
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }
    format!("{whole}.{frac}")
}

/// Decimal-scaled float view of an integer amount.
///
/// Formatting then parsing keeps the rounding identical to the reference
/// implementation; both sides round the exact decimal string to nearest.
pub fn to_f64(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals).parse().unwrap_or(0.0)
}

/// Constant-product spot price at 18 fractional digits.
///
/// reserve1 / reserve0 with the decimal difference folded into whichever
/// side needs scaling up. Zero reserve0 faults rather than dividing by zero.
pub fn reserve_ratio(reserve0: U256, reserve1: U256, decimals0: u8, decimals1: u8) -> Result<f64> {
    if reserve0.is_zero() {
        return Err(ResolveError::ArithmeticFault(
            "zero reserve0 in spot ratio".to_string(),
        ));
    }
    let raw = if decimals0 > decimals1 {
        let adjust = U256::from(10).pow(U256::from(decimals0 - decimals1));
        reserve1 * adjust * E18 / reserve0
    } else {
        let adjust = U256::from(10).pow(U256::from(decimals1 - decimals0));
        reserve1 * E18 / (reserve0 * adjust)
    };
    Ok(to_f64(raw, 18))
}
