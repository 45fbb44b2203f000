/*!
 * Time-to-Hold IDO Smart Contract
 *
 * A fixed-window staking pool that hands out a fixed amount of IDO tokens in
 * proportion to how much each account kept staked when the staking window
 * closed.
 *
 * Campaign timeline:
 * 1. PreStart - nothing can happen yet
 * 2. Staking - accounts `stake` and may `unstake` their whole position
 * 3. Locked - stakes are frozen until the IDO ends
 * 4. Claimable - each staker calls `claim` once and receives its stake back
 *    plus `stake * total_reward_tokens / total_staked_at_end`
 *
 * The denominator is frozen by the first claim. No stake can change after
 * `end_stake`, so the frozen value is the total at window close and every
 * claimant is paid against the same figure whatever the claim order.
 * Truncation dust is left in the contract.
 */

#![no_std]

mod custody;
mod schedule;
mod reward;
mod types;

#[cfg(test)]
mod test;

use soroban_sdk::{contract, contractimpl, Address, Env, String};

pub use schedule::{Phase, Schedule};
pub use types::{DataKey, Error, PoolConfig, CLAIMED, POOL_INITIALIZED, STAKED, UNSTAKED};

#[contract]
pub struct TimeToHoldIdo;

#[contractimpl]
impl TimeToHoldIdo {
    /// Configures the campaign. Can only be called once; the factory calls it
    /// in the same transaction that deploys the pool. A pool deployed by hand
    /// must be initialized in its deployment transaction, since the first
    /// caller decides the campaign.
    ///
    /// Each checkpoint is stored as the supplied value minus one second.
    /// The reward pool itself is funded by a separate transfer of
    /// `reward_token` to this contract.
    ///
    /// # Errors
    /// - AlreadyInitialized: If called twice
    /// - InvalidAmount: If `total_reward_tokens` is not positive
    /// - SameTokens: If stake and reward token coincide
    /// - InvalidSchedule: Unless `0 < start <= end_stake <= end_reward`
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        stake_token: Address,
        reward_token: Address,
        total_reward_tokens: i128,
        start: u64,
        end_stake: u64,
        end_reward: u64,
        metadata: String,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(Error::AlreadyInitialized);
        }
        if total_reward_tokens <= 0 {
            return Err(Error::InvalidAmount);
        }
        if stake_token == reward_token {
            return Err(Error::SameTokens);
        }
        let schedule = Schedule::from_inputs(start, end_stake, end_reward)?;

        let config = PoolConfig {
            stake_token: stake_token.clone(),
            reward_token: reward_token.clone(),
            total_reward_tokens,
            schedule,
            metadata,
        };
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::TotalStaked, &0i128);

        env.events().publish(
            (POOL_INITIALIZED,),
            (stake_token, reward_token, total_reward_tokens),
        );

        Ok(())
    }

    fn _config(env: &Env) -> Result<PoolConfig, Error> {
        env.storage().instance().get(&DataKey::Config).ok_or(Error::NotInitialized)
    }

    fn _phase(env: &Env, config: &PoolConfig) -> Phase {
        config.schedule.phase(env.ledger().timestamp())
    }

    fn _total_staked(env: &Env) -> i128 {
        env.storage().instance().get(&DataKey::TotalStaked).unwrap_or(0)
    }

    fn _stake_of(env: &Env, account: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Stake(account.clone()))
            .unwrap_or(0)
    }

    fn _clear_stake(env: &Env, account: &Address, stake: i128) {
        env.storage().persistent().remove(&DataKey::Stake(account.clone()));
        env.storage()
            .instance()
            .set(&DataKey::TotalStaked, &(Self::_total_staked(env) - stake));
    }

    /// Adds `amount` of the stake token to the caller's position.
    ///
    /// # Errors
    /// - NotInitialized
    /// - NotInStakePeriod: Outside `[start, end_stake)`
    /// - InvalidAmount: If `amount` is not positive
    /// - InsufficientBalance / InsufficientAllowance / TokenTransferFailed
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), Error> {
        staker.require_auth();

        let config = Self::_config(&env)?;
        if Self::_phase(&env, &config) != Phase::Staking {
            return Err(Error::NotInStakePeriod);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        custody::pull(&env, &config.stake_token, &staker, &env.current_contract_address(), amount)?;

        let staked = Self::_stake_of(&env, &staker) + amount;
        let total_staked = Self::_total_staked(&env) + amount;
        env.storage().persistent().set(&DataKey::Stake(staker.clone()), &staked);
        env.storage().instance().set(&DataKey::TotalStaked, &total_staked);

        env.events().publish((STAKED, staker), (amount, total_staked));

        Ok(())
    }

    /// Withdraws the caller's whole stake while the staking window is open.
    ///
    /// # Errors
    /// - NotInitialized
    /// - NotInStakePeriod: Outside `[start, end_stake)`
    /// - NothingToUnstake: If the caller has no stake
    /// - TokenTransferFailed
    pub fn unstake(env: Env, staker: Address) -> Result<(), Error> {
        staker.require_auth();

        let config = Self::_config(&env)?;
        if Self::_phase(&env, &config) != Phase::Staking {
            return Err(Error::NotInStakePeriod);
        }
        let stake = Self::_stake_of(&env, &staker);
        if stake == 0 {
            return Err(Error::NothingToUnstake);
        }

        Self::_clear_stake(&env, &staker, stake);
        custody::push(&env, &config.stake_token, &staker, stake)?;

        env.events()
            .publish((UNSTAKED, staker), (stake, Self::_total_staked(&env)));

        Ok(())
    }

    /// Returns the caller's stake and pays its share of the reward pool.
    ///
    /// # Errors
    /// - NotInitialized
    /// - PeriodNotEnded: Before `end_reward`
    /// - NothingToClaim: If the caller has no stake or already claimed
    /// - TokenTransferFailed: If the pool is underfunded
    pub fn claim(env: Env, staker: Address) -> Result<i128, Error> {
        staker.require_auth();

        let config = Self::_config(&env)?;
        if Self::_phase(&env, &config) != Phase::Claimable {
            return Err(Error::PeriodNotEnded);
        }
        let stake = Self::_stake_of(&env, &staker);
        if stake == 0 {
            return Err(Error::NothingToClaim);
        }

        let total_at_end: i128 = match env.storage().instance().get(&DataKey::TotalStakedAtEnd) {
            Some(total) => total,
            None => {
                let total = Self::_total_staked(&env);
                env.storage().instance().set(&DataKey::TotalStakedAtEnd, &total);
                total
            }
        };
        let reward = reward::pro_rata(&env, stake, config.total_reward_tokens, total_at_end);

        Self::_clear_stake(&env, &staker, stake);
        custody::push(&env, &config.stake_token, &staker, stake)?;
        if reward > 0 {
            custody::push(&env, &config.reward_token, &staker, reward)?;
        }

        env.events().publish((CLAIMED, staker), (stake, reward));

        Ok(reward)
    }

    // ================================================================================================
    // QUERY FUNCTIONS (GETTERS)
    // ================================================================================================

    pub fn phase(env: Env) -> Result<Phase, Error> {
        let config = Self::_config(&env)?;
        Ok(Self::_phase(&env, &config))
    }

    /// Reward `account` would receive from `claim`, against the frozen
    /// denominator once it exists and the live total before that.
    pub fn pending_reward(env: Env, account: Address) -> Result<i128, Error> {
        let config = Self::_config(&env)?;
        let total = env
            .storage()
            .instance()
            .get(&DataKey::TotalStakedAtEnd)
            .unwrap_or_else(|| Self::_total_staked(&env));
        let stake = Self::_stake_of(&env, &account);
        Ok(reward::pro_rata(&env, stake, config.total_reward_tokens, total))
    }

    pub fn staked_tokens(env: Env, account: Address) -> i128 {
        Self::_stake_of(&env, &account)
    }

    pub fn total_staked(env: Env) -> i128 {
        Self::_total_staked(&env)
    }

    pub fn total_staked_at_end(env: Env) -> Option<i128> {
        env.storage().instance().get(&DataKey::TotalStakedAtEnd)
    }

    pub fn stake_token(env: Env) -> Result<Address, Error> {
        Ok(Self::_config(&env)?.stake_token)
    }

    pub fn reward_token(env: Env) -> Result<Address, Error> {
        Ok(Self::_config(&env)?.reward_token)
    }

    pub fn total_reward_tokens(env: Env) -> Result<i128, Error> {
        Ok(Self::_config(&env)?.total_reward_tokens)
    }

    pub fn start_timestamp(env: Env) -> Result<u64, Error> {
        Ok(Self::_config(&env)?.schedule.start)
    }

    pub fn end_stake_timestamp(env: Env) -> Result<u64, Error> {
        Ok(Self::_config(&env)?.schedule.end_stake)
    }

    pub fn end_reward_timestamp(env: Env) -> Result<u64, Error> {
        Ok(Self::_config(&env)?.schedule.end_reward)
    }

    pub fn project_description_link(env: Env) -> Result<String, Error> {
        Ok(Self::_config(&env)?.metadata)
    }
}
