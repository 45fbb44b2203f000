//! Client side of the token whitelist oracle.

use soroban_sdk::{contractclient, Address, Env};

/// Capability a whitelist contract exposes to the OTC engine.
#[allow(dead_code)]
#[contractclient(name = "WhitelistClient")]
pub trait WhitelistInterface {
    /// Whether `token` may be escrowed or paid with.
    fn is_tradeable(env: Env, token: Address) -> bool;

    /// Whether `token` is a USD stable coin.
    fn is_stable(env: Env, token: Address) -> bool;
}

/// A pair is eligible when the oracle reports both sides as tradeable.
pub fn pair_is_tradeable(env: &Env, whitelist: &Address, token_in: &Address, token_out: &Address) -> bool {
    let client = WhitelistClient::new(env, whitelist);
    client.is_tradeable(token_in) && client.is_tradeable(token_out)
}
