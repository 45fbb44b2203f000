/*!
 * Token Whitelist Contract
 *
 * Admin-maintained registry of which tokens may be traded on the OTC
 * contract and which tokens are USD stable coins. Tokens that were never
 * listed read as `false` on both lists.
 */

#![no_std]


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, Address, Env, Symbol,
    Vec,
};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    /// Tokens allowed in OTC trades
    OtcWhitelist(Address),
    /// Tokens recognised as USD stable coins
    UsdStable(Address),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Batch call with a different number of tokens and flags
    LengthMismatch = 3,
}

/// Topics: (WL_OTC_CHANGED, token). Data: listed
pub const WL_OTC_CHANGED: Symbol = symbol_short!("wl_otc");

/// Topics: (WL_USD_CHANGED, token). Data: listed
pub const WL_USD_CHANGED: Symbol = symbol_short!("wl_usd");

#[contract]
pub struct TokenWhitelist;

#[contractimpl]
impl TokenWhitelist {
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        env.storage().persistent().set(&DataKey::Admin, &admin);
        Ok(())
    }

    fn _require_admin(env: &Env) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();
        Ok(())
    }

    /// Adds `token` to, or removes it from, the OTC whitelist.
    pub fn change_otc_whitelist(env: Env, token: Address, listed: bool) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        Self::_set_flag(&env, DataKey::OtcWhitelist(token.clone()), listed);
        env.events().publish((WL_OTC_CHANGED, token), listed);
        Ok(())
    }

    /// Adds `token` to, or removes it from, the USD stable list.
    pub fn change_usd_stables(env: Env, token: Address, listed: bool) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        Self::_set_flag(&env, DataKey::UsdStable(token.clone()), listed);
        env.events().publish((WL_USD_CHANGED, token), listed);
        Ok(())
    }

    /// Applies `listed[i]` to `tokens[i]` on the OTC whitelist.
    pub fn batch_change_otc_whitelist(
        env: Env,
        tokens: Vec<Address>,
        listed: Vec<bool>,
    ) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        Self::_require_same_length(&env, &tokens, &listed)?;
        for (token, flag) in tokens.iter().zip(listed.iter()) {
            Self::_set_flag(&env, DataKey::OtcWhitelist(token.clone()), flag);
            env.events().publish((WL_OTC_CHANGED, token), flag);
        }
        Ok(())
    }

    /// Applies `stable[i]` to `tokens[i]` on the USD stable list.
    pub fn batch_change_usd_stables(
        env: Env,
        tokens: Vec<Address>,
        stable: Vec<bool>,
    ) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        Self::_require_same_length(&env, &tokens, &stable)?;
        for (token, flag) in tokens.iter().zip(stable.iter()) {
            Self::_set_flag(&env, DataKey::UsdStable(token.clone()), flag);
            env.events().publish((WL_USD_CHANGED, token), flag);
        }
        Ok(())
    }

    fn _require_same_length(env: &Env, tokens: &Vec<Address>, flags: &Vec<bool>) -> Result<(), Error> {
        if tokens.len() != flags.len() {
            log!(env, "Length mismatch. Tokens: {}, Flags: {}", tokens.len(), flags.len());
            return Err(Error::LengthMismatch);
        }
        Ok(())
    }

    /// Hands the admin role over. Both admins must sign.
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        new_admin.require_auth();
        env.storage().persistent().set(&DataKey::Admin, &new_admin);
        Ok(())
    }

    // Delisted tokens are removed rather than stored as false
    fn _set_flag(env: &Env, key: DataKey, listed: bool) {
        if listed {
            env.storage().persistent().set(&key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }
    }

    pub fn is_tradeable(env: Env, token: Address) -> bool {
        env.storage().persistent().has(&DataKey::OtcWhitelist(token))
    }

    pub fn is_stable(env: Env, token: Address) -> bool {
        env.storage().persistent().has(&DataKey::UsdStable(token))
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        env.storage().persistent().get(&DataKey::Admin).ok_or(Error::NotInitialized)
    }
}
