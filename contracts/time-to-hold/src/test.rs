#![cfg(test)]

use super::*;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

const IDO_TOKEN_AMOUNT: i128 = 1_000_000_000_000_000_000_000;
const INITIAL_BALANCE: i128 = 10_000_000_000_000_000_000;
const AMOUNT_FIRST: i128 = 5_000_000_000_000_000_000;
const AMOUNT_SECOND: i128 = 10_000_000_000_000_000_000;

const NOW: u64 = 10_000;
const START: u64 = NOW + 1_000;
const END_STAKE: u64 = NOW + 3_000;
const END_REWARD: u64 = NOW + 5_000;

struct Setup<'a> {
    env: Env,
    client: TimeToHoldIdoClient<'a>,
    contract_id: Address,
    stake_token: token::Client<'a>,
    ido_token: token::Client<'a>,
    stakers: [Address; 3],
}

fn create_token<'a>(env: &Env, issuer: &Address) -> (token::Client<'a>, token::StellarAssetClient<'a>) {
    let sac = env.register_stellar_asset_contract_v2(issuer.clone());
    (
        token::Client::new(env, &sac.address()),
        token::StellarAssetClient::new(env, &sac.address()),
    )
}

/// Three funded stakers, a pool of `pool_size` IDO tokens, ledger time `NOW`.
fn setup_test_env<'a>(pool_size: i128) -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(NOW);

    let contract_id = env.register(TimeToHoldIdo, ());
    let client = TimeToHoldIdoClient::new(&env, &contract_id);

    let issuer = Address::generate(&env);
    let (stake_token, stake_admin) = create_token(&env, &issuer);
    let (ido_token, ido_admin) = create_token(&env, &issuer);

    let stakers = [
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
    ];
    for staker in stakers.iter() {
        stake_admin.mint(staker, &INITIAL_BALANCE);
        stake_token.approve(staker, &contract_id, &INITIAL_BALANCE, &1_000);
    }

    client.initialize(
        &stake_token.address,
        &ido_token.address,
        &pool_size,
        &START,
        &END_STAKE,
        &END_REWARD,
        &String::from_str(&env, "https://example.com/project"),
    );
    ido_admin.mint(&contract_id, &pool_size);

    Setup {
        env,
        client,
        contract_id,
        stake_token,
        ido_token,
        stakers,
    }
}

fn jump_to(s: &Setup, timestamp: u64) {
    s.env.ledger().set_timestamp(timestamp);
}

fn start_staking(s: &Setup) {
    jump_to(s, s.client.start_timestamp());
}

fn end_ido(s: &Setup) {
    jump_to(s, s.client.end_reward_timestamp());
}

// ================================================================================================
// INITIALIZATION
// ================================================================================================

#[test]
fn test_initialize() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);

    assert_eq!(s.client.stake_token(), s.stake_token.address);
    assert_eq!(s.client.reward_token(), s.ido_token.address);
    assert_eq!(s.client.total_staked(), 0);
    assert_eq!(s.client.total_reward_tokens(), IDO_TOKEN_AMOUNT);
    assert_eq!(s.client.start_timestamp(), START - 1);
    assert_eq!(s.client.end_stake_timestamp(), END_STAKE - 1);
    assert_eq!(s.client.end_reward_timestamp(), END_REWARD - 1);
    assert_eq!(
        s.client.project_description_link(),
        String::from_str(&s.env, "https://example.com/project")
    );
    assert_eq!(s.client.total_staked_at_end(), None);
    assert_eq!(s.client.phase(), Phase::PreStart);
}

#[test]
fn test_initialize_already_initialized() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let result = s.client.try_initialize(
        &s.stake_token.address,
        &s.ido_token.address,
        &1,
        &(START + 10),
        &(END_STAKE + 10),
        &(END_REWARD + 10),
        &String::from_str(&s.env, "other"),
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    assert_eq!(s.client.total_reward_tokens(), IDO_TOKEN_AMOUNT);
    assert_eq!(s.client.start_timestamp(), START - 1);
}

#[test]
fn test_initialize_validation() {
    let env = Env::default();
    let contract_id = env.register(TimeToHoldIdo, ());
    let client = TimeToHoldIdoClient::new(&env, &contract_id);
    let stake = Address::generate(&env);
    let reward = Address::generate(&env);
    let link = String::from_str(&env, "");

    assert_eq!(
        client.try_initialize(&stake, &reward, &0, &1, &2, &3, &link),
        Err(Ok(Error::InvalidAmount))
    );
    assert_eq!(
        client.try_initialize(&stake, &stake, &10, &1, &2, &3, &link),
        Err(Ok(Error::SameTokens))
    );
    assert_eq!(
        client.try_initialize(&stake, &reward, &10, &3, &2, &4, &link),
        Err(Ok(Error::InvalidSchedule))
    );
    assert_eq!(
        client.try_initialize(&stake, &reward, &10, &1, &5, &4, &link),
        Err(Ok(Error::InvalidSchedule))
    );
    assert_eq!(
        client.try_initialize(&stake, &reward, &10, &0, &5, &6, &link),
        Err(Ok(Error::InvalidSchedule))
    );

    client.initialize(&stake, &reward, &10, &1, &5, &6, &link);
    assert_eq!(client.start_timestamp(), 0);
}

#[test]
fn test_calls_before_initialize() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(TimeToHoldIdo, ());
    let client = TimeToHoldIdoClient::new(&env, &contract_id);
    let user = Address::generate(&env);

    assert_eq!(client.try_stake(&user, &10), Err(Ok(Error::NotInitialized)));
    assert_eq!(client.try_unstake(&user), Err(Ok(Error::NotInitialized)));
    assert_eq!(client.try_claim(&user), Err(Ok(Error::NotInitialized)));
    assert_eq!(client.try_phase(), Err(Ok(Error::NotInitialized)));
}

// ================================================================================================
// STAKE
// ================================================================================================

#[test]
fn test_stake() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let [first, second, _] = &s.stakers;
    start_staking(&s);
    assert_eq!(s.client.phase(), Phase::Staking);

    s.client.stake(first, &AMOUNT_FIRST);
    s.client.stake(second, &AMOUNT_SECOND);

    assert_eq!(s.client.staked_tokens(first), AMOUNT_FIRST);
    assert_eq!(s.client.staked_tokens(second), AMOUNT_SECOND);
    assert_eq!(s.stake_token.balance(first), INITIAL_BALANCE - AMOUNT_FIRST);
    assert_eq!(s.stake_token.balance(second), INITIAL_BALANCE - AMOUNT_SECOND);
    assert_eq!(s.stake_token.balance(&s.contract_id), AMOUNT_FIRST + AMOUNT_SECOND);
    assert_eq!(s.client.total_staked(), AMOUNT_FIRST + AMOUNT_SECOND);

    // Stakes accumulate
    s.client.stake(first, &1);
    assert_eq!(s.client.staked_tokens(first), AMOUNT_FIRST + 1);
}

#[test]
fn test_stake_zero_amount() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    start_staking(&s);
    assert_eq!(
        s.client.try_stake(&s.stakers[0], &0),
        Err(Ok(Error::InvalidAmount))
    );
}

#[test]
fn test_stake_window_boundaries() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];

    jump_to(&s, s.client.start_timestamp() - 1);
    assert_eq!(s.client.try_stake(first, &500), Err(Ok(Error::NotInStakePeriod)));

    jump_to(&s, s.client.end_stake_timestamp() - 1);
    s.client.stake(first, &500);

    jump_to(&s, s.client.end_stake_timestamp());
    assert_eq!(s.client.phase(), Phase::Locked);
    assert_eq!(s.client.try_stake(first, &500), Err(Ok(Error::NotInStakePeriod)));

    end_ido(&s);
    assert_eq!(s.client.try_stake(first, &500), Err(Ok(Error::NotInStakePeriod)));
    assert_eq!(s.client.total_staked(), 500);
}

#[test]
fn test_stake_insufficient_allowance() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];
    start_staking(&s);

    s.stake_token.approve(first, &s.contract_id, &10, &1_000);
    assert_eq!(s.client.try_stake(first, &11), Err(Ok(Error::InsufficientAllowance)));
    assert_eq!(
        s.client.try_stake(first, &(INITIAL_BALANCE + 1)),
        Err(Ok(Error::InsufficientBalance))
    );
    assert_eq!(s.client.total_staked(), 0);
}

// ================================================================================================
// UNSTAKE
// ================================================================================================

#[test]
fn test_unstake() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let [first, second, _] = &s.stakers;
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);
    s.client.stake(second, &AMOUNT_SECOND);

    s.client.unstake(first);

    assert_eq!(s.client.staked_tokens(first), 0);
    assert_eq!(s.client.staked_tokens(second), AMOUNT_SECOND);
    assert_eq!(s.client.total_staked(), AMOUNT_SECOND);
    assert_eq!(s.stake_token.balance(first), INITIAL_BALANCE);
    assert_eq!(s.ido_token.balance(first), 0);
}

#[test]
fn test_unstake_twice() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);

    s.client.unstake(first);
    assert_eq!(s.client.try_unstake(first), Err(Ok(Error::NothingToUnstake)));
}

#[test]
fn test_unstake_after_stake_period() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);

    jump_to(&s, s.client.end_stake_timestamp());
    assert_eq!(s.client.try_unstake(first), Err(Ok(Error::NotInStakePeriod)));

    end_ido(&s);
    assert_eq!(s.client.try_unstake(first), Err(Ok(Error::NotInStakePeriod)));
    assert_eq!(s.client.staked_tokens(first), AMOUNT_FIRST);
}

// ================================================================================================
// CLAIM
// ================================================================================================

#[test]
fn test_claim() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let [first, second, _] = &s.stakers;
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);
    s.client.stake(second, &AMOUNT_SECOND);

    end_ido(&s);
    assert_eq!(s.client.phase(), Phase::Claimable);

    let total = AMOUNT_FIRST + AMOUNT_SECOND;
    // 1/3 and 2/3 of the pool, truncated
    let expected_first = 333_333_333_333_333_333_333;
    let expected_second = 666_666_666_666_666_666_666;
    assert_eq!(s.client.pending_reward(first), expected_first);

    assert_eq!(s.client.claim(first), expected_first);
    assert_eq!(s.client.staked_tokens(first), 0);
    assert_eq!(s.stake_token.balance(first), INITIAL_BALANCE);
    assert_eq!(s.ido_token.balance(first), expected_first);
    assert_eq!(s.client.total_staked_at_end(), Some(total));

    assert_eq!(s.client.claim(second), expected_second);
    assert_eq!(s.client.staked_tokens(second), 0);
    assert_eq!(s.stake_token.balance(second), INITIAL_BALANCE);
    assert_eq!(s.ido_token.balance(second), expected_second);

    assert_eq!(s.client.total_staked(), 0);
    assert_eq!(s.client.total_staked_at_end(), Some(total));
}

#[test]
fn test_claim_twice() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);

    end_ido(&s);
    s.client.claim(first);
    assert_eq!(s.client.try_claim(first), Err(Ok(Error::NothingToClaim)));
    assert_eq!(s.ido_token.balance(first), IDO_TOKEN_AMOUNT);
}

#[test]
fn test_claim_without_stake() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    end_ido(&s);
    assert_eq!(
        s.client.try_claim(&s.stakers[2]),
        Err(Ok(Error::NothingToClaim))
    );
}

#[test]
fn test_claim_before_end() {
    let s = setup_test_env(IDO_TOKEN_AMOUNT);
    let first = &s.stakers[0];
    start_staking(&s);
    s.client.stake(first, &AMOUNT_FIRST);

    assert_eq!(s.client.try_claim(first), Err(Ok(Error::PeriodNotEnded)));

    jump_to(&s, s.client.end_reward_timestamp() - 1);
    assert_eq!(s.client.phase(), Phase::Locked);
    assert_eq!(s.client.try_claim(first), Err(Ok(Error::PeriodNotEnded)));

    // end_reward itself is claimable
    jump_to(&s, s.client.end_reward_timestamp());
    s.client.claim(first);
}

#[test]
fn test_claim_underfunded_pool_rolls_back() {
    let pool = 200;
    let s = setup_test_env(pool);
    let first = &s.stakers[0];
    start_staking(&s);
    s.client.stake(first, &10);

    // Drain the reward pool behind the contract's back
    let sink = Address::generate(&s.env);
    s.ido_token.transfer(&s.contract_id, &sink, &pool);

    end_ido(&s);
    assert_eq!(s.client.try_claim(first), Err(Ok(Error::TokenTransferFailed)));
    assert_eq!(s.client.staked_tokens(first), 10);
    assert_eq!(s.client.total_staked(), 10);
    assert_eq!(s.client.total_staked_at_end(), None);
    assert_eq!(s.stake_token.balance(first), INITIAL_BALANCE - 10);
}

// ================================================================================================
// CALCULATIONS
// ================================================================================================

fn run_scenario(stakes: [i128; 3], claim_order: [usize; 3]) -> [i128; 3] {
    let s = setup_test_env(200);
    start_staking(&s);
    for (staker, amount) in s.stakers.iter().zip(stakes) {
        s.client.stake(staker, &amount);
    }

    end_ido(&s);
    for index in claim_order {
        s.client.claim(&s.stakers[index]);
    }

    let rewards = [
        s.ido_token.balance(&s.stakers[0]),
        s.ido_token.balance(&s.stakers[1]),
        s.ido_token.balance(&s.stakers[2]),
    ];
    assert_eq!(
        s.ido_token.balance(&s.contract_id),
        200 - rewards.iter().sum::<i128>()
    );
    assert_eq!(s.stake_token.balance(&s.contract_id), 0);
    rewards
}

#[test]
fn test_reward_for_stakes_33_66_1() {
    assert_eq!(run_scenario([33, 66, 1], [0, 1, 2]), [66, 132, 2]);
}

#[test]
fn test_reward_for_stakes_49_50_1() {
    assert_eq!(run_scenario([49, 50, 1], [0, 1, 2]), [98, 100, 2]);
}

#[test]
fn test_reward_for_stakes_49_49_2() {
    assert_eq!(run_scenario([49, 49, 2], [2, 1, 0]), [98, 98, 4]);
}

#[test]
fn test_reward_is_order_independent() {
    let stakes = [7, 13, 29];
    let expected = run_scenario(stakes, [0, 1, 2]);
    assert_eq!(run_scenario(stakes, [2, 0, 1]), expected);
    assert_eq!(run_scenario(stakes, [1, 2, 0]), expected);

    // 7 * 200 / 49 = 28, 13 * 200 / 49 = 53, 29 * 200 / 49 = 118
    assert_eq!(expected, [28, 53, 118]);
    assert!(expected.iter().sum::<i128>() <= 200);
}
