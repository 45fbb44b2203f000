//! Fee arithmetic.
//!
//! Rates are fixed-point fractions of [`PERCENTAGE_100`]. `amount * rate` is
//! formed in 256 bits, so any i128 amount is safe; the quotient never exceeds
//! `amount` because `rate < PERCENTAGE_100`.

use soroban_sdk::{Env, I256};

/// One percent.
pub const PRECISION: i128 = 10i128.pow(25);

/// 100%, the fee-rate denominator.
pub const PERCENTAGE_100: i128 = 10i128.pow(27);

/// Rate prescribed by `set_fee_rate`: strictly between 0 and 100%.
pub fn is_valid_rate(rate: i128) -> bool {
    rate > 0 && rate < PERCENTAGE_100
}

/// Rate accepted at deployment. Zero means no fee is configured.
pub fn is_valid_initial_rate(rate: i128) -> bool {
    rate == 0 || is_valid_rate(rate)
}

/// `amount * rate / PERCENTAGE_100`, truncated toward zero.
pub fn calculate_fee(env: &Env, amount: i128, rate: i128) -> i128 {
    if amount <= 0 || rate <= 0 {
        return 0;
    }
    let fee = I256::from_i128(env, amount)
        .mul(&I256::from_i128(env, rate))
        .div(&I256::from_i128(env, PERCENTAGE_100));
    // fee <= amount, so it always fits back into i128
    fee.to_i128().unwrap_or(amount)
}
