//! Pro-rata reward arithmetic.

use soroban_sdk::{Env, I256};

/// `stake * pool / total_staked`, truncated toward zero.
///
/// The sum over all stakers never exceeds `pool`; whatever truncation leaves
/// behind stays in the contract.
pub fn pro_rata(env: &Env, stake: i128, pool: i128, total_staked: i128) -> i128 {
    if stake <= 0 || pool <= 0 || total_staked <= 0 {
        return 0;
    }
    let share = I256::from_i128(env, stake)
        .mul(&I256::from_i128(env, pool))
        .div(&I256::from_i128(env, total_staked));
    // stake <= total_staked, so share <= pool
    share.to_i128().unwrap_or(pool)
}
