/*!
 * IDO Factory Smart Contract
 *
 * Deploys one time-to-hold pool per campaign. Every pool stakes the factory's
 * `stake_token`; the campaign creator supplies the IDO token and seeds the
 * reward pool in the same call.
 *
 * Business Flow of `deploy_time_to_hold`:
 * 1. Validates the amount, schedule and the deployer's funds
 * 2. Deploys a fresh pool from the stored WASM hash
 * 3. Initializes the pool with the campaign parameters
 * 4. Moves `amount` of the IDO token from the deployer straight into the pool
 */

#![no_std]


use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, log, symbol_short, token,
    Address, BytesN, Env, String, Symbol,
};

/// Storage keys.
///
/// Factory config and the pool counter live in instance storage, one
/// persistent entry per deployed pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    StakeToken,
    PoolWasmHash,
    PoolCount,
    Pool(u32),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Seed amount is zero or negative
    InvalidAmount = 3,
    /// IDO token is the stake token
    SameTokens = 4,
    /// Checkpoints are zero or out of order
    InvalidSchedule = 5,
    InsufficientBalance = 6,
    InsufficientAllowance = 7,
    TokenTransferFailed = 8,
}

/// Topics: (IDO_DEPLOYED, deployer). Data: (pool, ido_token, amount)
pub const IDO_DEPLOYED: Symbol = symbol_short!("ido_dep");

/// The part of the pool contract the factory drives.
///
/// A failing `initialize` aborts the whole deployment.
#[allow(dead_code)]
#[contractclient(name = "PoolClient")]
pub trait PoolInterface {
    #[allow(clippy::too_many_arguments)]
    fn initialize(
        env: Env,
        stake_token: Address,
        reward_token: Address,
        total_reward_tokens: i128,
        start: u64,
        end_stake: u64,
        end_reward: u64,
        metadata: String,
    );
}

#[contract]
pub struct IdoFactory;

#[contractimpl]
impl IdoFactory {
    /// One-time setup.
    ///
    /// # Arguments
    /// * `stake_token` - Token every deployed pool stakes
    /// * `pool_wasm_hash` - Hash of the uploaded time-to-hold WASM
    pub fn initialize(env: Env, stake_token: Address, pool_wasm_hash: BytesN<32>) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::StakeToken) {
            return Err(Error::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::StakeToken, &stake_token);
        env.storage().instance().set(&DataKey::PoolWasmHash, &pool_wasm_hash);
        env.storage().instance().set(&DataKey::PoolCount, &0u32);
        Ok(())
    }

    /// Deploys, initializes and funds a new pool.
    ///
    /// # Arguments
    /// * `deployer` - Campaign creator paying the reward pool (must sign and
    ///   have approved `amount` of `ido_token` to the factory)
    /// * `ido_token` - Reward token of the campaign
    /// * `amount` - Size of the reward pool
    /// * `start`, `end_stake`, `end_reward` - Campaign checkpoints as passed
    ///   to the pool's `initialize`
    /// * `metadata` - Link to the project description
    ///
    /// # Returns
    /// Address of the new pool
    ///
    /// # Errors
    /// - NotInitialized, InvalidAmount, SameTokens, InvalidSchedule,
    ///   InsufficientBalance, InsufficientAllowance, TokenTransferFailed
    #[allow(clippy::too_many_arguments)]
    pub fn deploy_time_to_hold(
        env: Env,
        deployer: Address,
        ido_token: Address,
        amount: i128,
        start: u64,
        end_stake: u64,
        end_reward: u64,
        metadata: String,
    ) -> Result<Address, Error> {
        deployer.require_auth();

        let stake_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::StakeToken)
            .ok_or(Error::NotInitialized)?;
        let wasm_hash: BytesN<32> = env
            .storage()
            .instance()
            .get(&DataKey::PoolWasmHash)
            .ok_or(Error::NotInitialized)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if ido_token == stake_token {
            return Err(Error::SameTokens);
        }
        if start == 0 || start > end_stake || end_stake > end_reward {
            return Err(Error::InvalidSchedule);
        }

        let ido = token::Client::new(&env, &ido_token);
        let factory = env.current_contract_address();
        let balance = ido.balance(&deployer);
        if balance < amount {
            log!(&env, "Insufficient balance. Required: {}, Available: {}", amount, balance);
            return Err(Error::InsufficientBalance);
        }
        let allowance = ido.allowance(&deployer, &factory);
        if allowance < amount {
            log!(&env, "Insufficient allowance. Required: {}, Available: {}", amount, allowance);
            return Err(Error::InsufficientAllowance);
        }

        let index: u32 = env.storage().instance().get(&DataKey::PoolCount).unwrap_or(0);
        let pool = env
            .deployer()
            .with_current_contract(Self::_salt(&env, index))
            .deploy_v2(wasm_hash, ());

        PoolClient::new(&env, &pool).initialize(
            &stake_token,
            &ido_token,
            &amount,
            &start,
            &end_stake,
            &end_reward,
            &metadata,
        );

        if !matches!(ido.try_transfer_from(&factory, &deployer, &pool, &amount), Ok(Ok(()))) {
            log!(&env, "Failed to seed pool with {}", amount);
            return Err(Error::TokenTransferFailed);
        }

        env.storage().persistent().set(&DataKey::Pool(index), &pool);
        env.storage().instance().set(&DataKey::PoolCount, &(index + 1));

        env.events()
            .publish((IDO_DEPLOYED, deployer), (pool.clone(), ido_token, amount));

        Ok(pool)
    }

    fn _salt(env: &Env, index: u32) -> BytesN<32> {
        let mut salt = [0u8; 32];
        salt[28..].copy_from_slice(&index.to_be_bytes());
        BytesN::from_array(env, &salt)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, Error> {
        env.storage().instance().get(&DataKey::StakeToken).ok_or(Error::NotInitialized)
    }

    pub fn get_pool_count(env: Env) -> u32 {
        env.storage().instance().get(&DataKey::PoolCount).unwrap_or(0)
    }

    pub fn get_pool(env: Env, index: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Pool(index))
    }
}
