/*!
 * Type Definitions for the Time-to-Hold IDO Contract
 *
 * One contract instance runs one campaign: accounts stake `stake_token`
 * during the staking window and, once the IDO has ended, receive their stake
 * back together with a pro-rata share of `total_reward_tokens`.
 */

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, String, Symbol};

use crate::schedule::Schedule;

/// Campaign parameters, written once by `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Token accounts stake
    pub stake_token: Address,

    /// Token distributed to stakers (the IDO token)
    pub reward_token: Address,

    /// Size of the reward pool, fixed for the lifetime of the campaign
    pub total_reward_tokens: i128,

    /// Stored checkpoints of the campaign
    pub schedule: Schedule,

    /// Link to the project description
    pub metadata: String,
}

/// Storage keys.
///
/// The campaign config and running totals live in instance storage, per
/// account stakes in persistent storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    TotalStaked,
    /// Denominator frozen by the first claim
    TotalStakedAtEnd,
    Stake(Address),
}

/// Failure conditions of the IDO contract.
///
/// # Error Code Ranges
/// - 1-2: Initialization
/// - 3-5: Validation
/// - 6-9: Phase and position state
/// - 10-12: Custody
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,

    /// Stake or reward amount is zero or negative
    InvalidAmount = 3,
    /// Stake and reward token are the same
    SameTokens = 4,
    /// Checkpoints are zero or out of order
    InvalidSchedule = 5,

    /// Staking and unstaking are only possible in `[start, end_stake)`
    NotInStakePeriod = 6,
    /// The caller has no stake to withdraw
    NothingToUnstake = 7,
    /// Claiming is only possible from `end_reward` on
    PeriodNotEnded = 8,
    /// The caller has no stake to claim against, or already claimed
    NothingToClaim = 9,

    InsufficientBalance = 10,
    InsufficientAllowance = 11,
    TokenTransferFailed = 12,
}

/// Topics: (POOL_INITIALIZED,). Data: (stake_token, reward_token, total_reward_tokens)
pub const POOL_INITIALIZED: Symbol = symbol_short!("ido_init");

/// Topics: (STAKED, staker). Data: (amount, total_staked)
pub const STAKED: Symbol = symbol_short!("staked");

/// Topics: (UNSTAKED, staker). Data: (amount, total_staked)
pub const UNSTAKED: Symbol = symbol_short!("unstaked");

/// Topics: (CLAIMED, staker). Data: (stake, reward)
pub const CLAIMED: Symbol = symbol_short!("claimed");
