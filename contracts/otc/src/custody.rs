//! Token movements in and out of escrow.

use soroban_sdk::{log, token, Address, Env};

use crate::types::Error;

/// Moves `amount` of `token` from `from` to `to`, spending the allowance
/// `from` granted to this contract.
///
/// Balance and allowance are checked first so that callers get a precise
/// error instead of a generic transfer failure.
pub fn pull(env: &Env, token: &Address, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
    let client = token::Client::new(env, token);
    let spender = env.current_contract_address();

    let balance = client.balance(from);
    if balance < amount {
        log!(env, "Insufficient balance. Required: {}, Available: {}", amount, balance);
        return Err(Error::InsufficientBalance);
    }

    let allowance = client.allowance(from, &spender);
    if allowance < amount {
        log!(env, "Insufficient allowance. Required: {}, Available: {}", amount, allowance);
        return Err(Error::InsufficientAllowance);
    }

    match client.try_transfer_from(&spender, from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "Token transfer_from failed for amount: {}", amount);
            Err(Error::TokenTransferFailed)
        }
    }
}

/// Pays `amount` of `token` out of the contract's own balance.
pub fn push(env: &Env, token: &Address, to: &Address, amount: i128) -> Result<(), Error> {
    let client = token::Client::new(env, token);
    match client.try_transfer(&env.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "Token transfer failed for amount: {}", amount);
            Err(Error::TokenTransferFailed)
        }
    }
}
