/*!
 * OTC Escrow Smart Contract
 *
 * This contract escrows bilateral token swaps. A creator locks `amount_in` of
 * `token_in` and names the `amount_out` of `token_out` it wants in exchange.
 * Any eligible buyer can settle the trade by paying `amount_out`, of which a
 * protocol fee goes to the treasury.
 * Key features:
 * - Open, directed (single buyer) and time-boxed trades
 * - Fixed-point fee rate with a 256-bit intermediate product
 * - Optional token whitelist gating which tokens may be traded
 * - Pausable trading; reclaiming one's own escrow is never blocked
 *
 * Business Logic:
 * 1. Creator calls `create_trade`, escrowing `amount_in`
 * 2. Buyer calls `buy`: pays `amount_out`, creator receives `amount_out - fee`,
 *    treasury receives `fee`, buyer receives the escrow
 * 3. Or the creator calls `reject_trade` and gets the escrow back
 *
 * Every paying entry point records the new trade status before moving tokens.
 */

#![no_std]

mod custody;
mod fee;
mod types;
mod whitelist;


use soroban_sdk::{contract, contractimpl, log, Address, Env};

pub use fee::{PERCENTAGE_100, PRECISION};
pub use types::{
    DataKey, Error, Trade, TradeStatus, TradeWindow, ADMIN_UPDATED, FEE_UPDATED, PAUSE_CHANGED,
    TRADE_BOUGHT, TRADE_CREATED, TRADE_REJECTED, TREASURY_UPDATED,
};

#[contract]
pub struct OtcContract;

#[contractimpl]
impl OtcContract {
    // ================================================================================================
    // INITIALIZATION
    // ================================================================================================

    /// Initializes the contract with its privileged operator and fee settings.
    /// Can only be called once.
    ///
    /// # Arguments
    /// * `admin` - Operator allowed to change fees, treasury, whitelist and pause state
    /// * `fee_rate` - Fee as a fraction of `PERCENTAGE_100`; 0 disables fees
    /// * `treasury` - Address receiving fees
    /// * `whitelist` - Optional whitelist oracle; `None` allows any token
    ///
    /// # Errors
    /// - AlreadyInitialized: If called twice
    /// - InvalidFeeRate: If `fee_rate` is negative or not below 100%
    /// - InvalidTreasury: If `treasury` is this contract
    pub fn initialize(
        env: Env,
        admin: Address,
        fee_rate: i128,
        treasury: Address,
        whitelist: Option<Address>,
    ) -> Result<(), Error> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        if !fee::is_valid_initial_rate(fee_rate) {
            return Err(Error::InvalidFeeRate);
        }
        Self::_validate_treasury(&env, &treasury)?;

        env.storage().persistent().set(&DataKey::Admin, &admin);
        env.storage().persistent().set(&DataKey::FeeRate, &fee_rate);
        env.storage().persistent().set(&DataKey::Treasury, &treasury);
        if let Some(whitelist) = whitelist {
            env.storage().persistent().set(&DataKey::Whitelist, &whitelist);
        }

        env.storage().instance().set(&DataKey::NextTradeId, &0u64);
        env.storage().instance().set(&DataKey::Paused, &false);

        Ok(())
    }

    // ================================================================================================
    // INTERNAL HELPERS
    // ================================================================================================

    fn _admin(env: &Env) -> Result<Address, Error> {
        env.storage().persistent().get(&DataKey::Admin).ok_or(Error::NotInitialized)
    }

    /// Requires the stored admin to have signed the invocation.
    fn _require_admin(env: &Env) -> Result<Address, Error> {
        let admin = Self::_admin(env)?;
        admin.require_auth();
        Ok(admin)
    }

    fn _require_not_paused(env: &Env) -> Result<(), Error> {
        if !env.storage().persistent().has(&DataKey::Admin) {
            return Err(Error::NotInitialized);
        }
        if env.storage().instance().get(&DataKey::Paused).unwrap_or(false) {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    /// Fees paid to the contract itself would be indistinguishable from escrow.
    fn _validate_treasury(env: &Env, treasury: &Address) -> Result<(), Error> {
        if *treasury == env.current_contract_address() {
            return Err(Error::InvalidTreasury);
        }
        Ok(())
    }

    fn _load_trade(env: &Env, trade_id: u64) -> Result<Trade, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Trade(trade_id))
            .ok_or(Error::TradeNotFound)
    }

    fn _save_trade(env: &Env, trade_id: u64, trade: &Trade) {
        env.storage().persistent().set(&DataKey::Trade(trade_id), trade);
    }

    fn _require_open(trade: &Trade) -> Result<(), Error> {
        match trade.status {
            TradeStatus::Open => Ok(()),
            TradeStatus::Completed => Err(Error::TradeAlreadyCompleted),
            TradeStatus::Rejected => Err(Error::TradeAlreadyRejected),
        }
    }

    fn _validate_window(env: &Env, window: &TradeWindow) -> Result<(), Error> {
        let now = env.ledger().timestamp();
        if window.start <= now || window.end <= window.start {
            log!(env, "Invalid window. Now: {}, Start: {}, End: {}", now, window.start, window.end);
            return Err(Error::InvalidTimeWindow);
        }
        Ok(())
    }

    fn _fee_rate(env: &Env) -> i128 {
        env.storage().persistent().get(&DataKey::FeeRate).unwrap_or(0)
    }

    // ================================================================================================
    // TRADING FUNCTIONS
    // ================================================================================================

    /// Creates a trade and escrows `amount_in` of `token_in` from the creator.
    ///
    /// # Business Flow
    /// 1. Validates tokens, amounts, directed buyer and window
    /// 2. Checks the whitelist oracle when one is configured
    /// 3. Pulls `amount_in` into escrow (requires a prior `approve`)
    /// 4. Stores the trade under the next sequential id
    ///
    /// # Arguments
    /// * `creator` - Address funding the escrow (must sign)
    /// * `token_in` - Token escrowed by the creator
    /// * `token_out` - Token the buyer must pay with
    /// * `amount_in` - Escrowed quantity
    /// * `amount_out` - Price, fee included
    /// * `buyer` - Optional directed buyer
    /// * `window` - Optional validity window, both bounds in the future
    ///
    /// # Returns
    /// The id of the new trade
    ///
    /// # Errors
    /// - ContractPaused, SameTokens, InvalidAmount, TokenNotWhitelisted,
    ///   InvalidBuyer, InvalidTimeWindow, InsufficientBalance,
    ///   InsufficientAllowance, TokenTransferFailed
    #[allow(clippy::too_many_arguments)]
    pub fn create_trade(
        env: Env,
        creator: Address,
        token_in: Address,
        token_out: Address,
        amount_in: i128,
        amount_out: i128,
        buyer: Option<Address>,
        window: Option<TradeWindow>,
    ) -> Result<u64, Error> {
        Self::_require_not_paused(&env)?;
        creator.require_auth();

        if token_in == token_out {
            return Err(Error::SameTokens);
        }
        if amount_in <= 0 || amount_out <= 0 {
            return Err(Error::InvalidAmount);
        }

        if let Some(whitelist) = env.storage().persistent().get::<_, Address>(&DataKey::Whitelist) {
            if !whitelist::pair_is_tradeable(&env, &whitelist, &token_in, &token_out) {
                return Err(Error::TokenNotWhitelisted);
            }
        }

        if buyer.as_ref() == Some(&creator) {
            return Err(Error::InvalidBuyer);
        }
        let (window_start, window_end) = match &window {
            Some(window) => {
                Self::_validate_window(&env, window)?;
                (window.start, window.end)
            }
            None => (0, 0),
        };

        // Lock the creator's tokens in escrow
        let escrow = env.current_contract_address();
        custody::pull(&env, &token_in, &creator, &escrow, amount_in)?;

        let trade_id: u64 = env.storage().instance().get(&DataKey::NextTradeId).unwrap_or(0);
        let trade = Trade {
            creator: creator.clone(),
            buyer,
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in,
            amount_out,
            window_start,
            window_end,
            status: TradeStatus::Open,
        };
        Self::_save_trade(&env, trade_id, &trade);
        env.storage().instance().set(&DataKey::NextTradeId, &(trade_id + 1));

        env.events().publish(
            (TRADE_CREATED, creator),
            (trade_id, token_in, token_out, amount_in, amount_out),
        );

        Ok(trade_id)
    }

    /// Settles an open trade.
    ///
    /// The buyer pays `amount_out` of `token_out` into the contract, which
    /// forwards `amount_out - fee` to the creator and `fee` to the treasury,
    /// then releases the escrowed `amount_in` to the buyer. The fee rounds
    /// down. If any of the transfers fails the whole call fails and the trade
    /// stays open.
    ///
    /// # Arguments
    /// * `buyer` - Address paying for the trade (must sign)
    /// * `trade_id` - Trade to settle
    ///
    /// # Errors
    /// - ContractPaused: If trading is paused
    /// - TradeNotFound: If no trade has this id
    /// - TradeAlreadyCompleted / TradeAlreadyRejected: If the trade is closed
    /// - TradeNotStarted / TradeExpired: If now is outside `[start, end)`
    /// - NotDesignatedBuyer: If the trade is directed to someone else
    /// - CreatorCannotBuy: If the buyer is the creator
    /// - InsufficientBalance / InsufficientAllowance / TokenTransferFailed
    pub fn buy(env: Env, buyer: Address, trade_id: u64) -> Result<(), Error> {
        Self::_require_not_paused(&env)?;
        buyer.require_auth();

        let mut trade = Self::_load_trade(&env, trade_id)?;
        Self::_require_open(&trade)?;

        if let Some(window) = trade.window() {
            let now = env.ledger().timestamp();
            if now < window.start {
                return Err(Error::TradeNotStarted);
            }
            if now >= window.end {
                return Err(Error::TradeExpired);
            }
        }
        if let Some(directed) = &trade.buyer {
            if *directed != buyer {
                return Err(Error::NotDesignatedBuyer);
            }
        }
        if buyer == trade.creator {
            return Err(Error::CreatorCannotBuy);
        }

        let treasury: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)?;
        let fee = fee::calculate_fee(&env, trade.amount_out, Self::_fee_rate(&env));

        // Close the trade before any tokens leave the contract
        trade.status = TradeStatus::Completed;
        trade.buyer = Some(buyer.clone());
        Self::_save_trade(&env, trade_id, &trade);

        let escrow = env.current_contract_address();
        custody::pull(&env, &trade.token_out, &buyer, &escrow, trade.amount_out)?;
        custody::push(&env, &trade.token_out, &trade.creator, trade.amount_out - fee)?;
        if fee > 0 {
            custody::push(&env, &trade.token_out, &treasury, fee)?;
        }
        custody::push(&env, &trade.token_in, &buyer, trade.amount_in)?;

        env.events().publish((TRADE_BOUGHT, buyer), (trade_id, fee));

        Ok(())
    }

    /// Cancels an open trade and returns the escrow to its creator.
    /// Works while the contract is paused.
    ///
    /// # Arguments
    /// * `creator` - The trade's creator (must sign)
    /// * `trade_id` - Trade to reject
    ///
    /// # Errors
    /// - TradeNotFound: If no trade has this id
    /// - NotCreator: If `creator` did not create the trade
    /// - TradeAlreadyCompleted / TradeAlreadyRejected: If the trade is closed
    /// - TokenTransferFailed: If the refund fails
    pub fn reject_trade(env: Env, creator: Address, trade_id: u64) -> Result<(), Error> {
        creator.require_auth();

        let mut trade = Self::_load_trade(&env, trade_id)?;
        if trade.creator != creator {
            return Err(Error::NotCreator);
        }
        Self::_require_open(&trade)?;

        trade.status = TradeStatus::Rejected;
        Self::_save_trade(&env, trade_id, &trade);

        custody::push(&env, &trade.token_in, &creator, trade.amount_in)?;

        env.events().publish((TRADE_REJECTED, creator), (trade_id,));

        Ok(())
    }

    // ================================================================================================
    // ADMINISTRATIVE FUNCTIONS
    // ================================================================================================

    /// Updates the fee rate. Must be strictly between 0 and `PERCENTAGE_100`.
    ///
    /// # Errors
    /// - NotInitialized: If the contract has no admin yet
    /// - InvalidFeeRate: If the rate is 0, negative or at least 100%
    pub fn set_fee_rate(env: Env, new_fee_rate: i128) -> Result<(), Error> {
        let admin = Self::_require_admin(&env)?;
        if !fee::is_valid_rate(new_fee_rate) {
            return Err(Error::InvalidFeeRate);
        }
        env.storage().persistent().set(&DataKey::FeeRate, &new_fee_rate);
        env.events().publish((FEE_UPDATED, admin), new_fee_rate);
        Ok(())
    }

    /// Updates the treasury address.
    ///
    /// # Errors
    /// - InvalidTreasury: If `new_treasury` is this contract
    pub fn set_treasury(env: Env, new_treasury: Address) -> Result<(), Error> {
        let admin = Self::_require_admin(&env)?;
        Self::_validate_treasury(&env, &new_treasury)?;
        env.storage().persistent().set(&DataKey::Treasury, &new_treasury);
        env.events().publish((TREASURY_UPDATED, admin), new_treasury);
        Ok(())
    }

    /// Attaches or detaches the whitelist oracle. Existing trades are unaffected.
    pub fn set_whitelist(env: Env, whitelist: Option<Address>) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        match whitelist {
            Some(whitelist) => env.storage().persistent().set(&DataKey::Whitelist, &whitelist),
            None => env.storage().persistent().remove(&DataKey::Whitelist),
        }
        Ok(())
    }

    /// Transfers the admin role. Both the current and the new admin must sign.
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        Self::_require_admin(&env)?;
        new_admin.require_auth();
        env.storage().persistent().set(&DataKey::Admin, &new_admin);
        env.events().publish((ADMIN_UPDATED, env.current_contract_address()), new_admin);
        Ok(())
    }

    /// Halts `create_trade` and `buy`. `reject_trade` stays available.
    pub fn pause(env: Env) -> Result<(), Error> {
        let admin = Self::_require_admin(&env)?;
        env.storage().instance().set(&DataKey::Paused, &true);
        env.events().publish((PAUSE_CHANGED, admin), (true,));
        Ok(())
    }

    /// Resumes trading after a pause.
    pub fn unpause(env: Env) -> Result<(), Error> {
        let admin = Self::_require_admin(&env)?;
        env.storage().instance().set(&DataKey::Paused, &false);
        env.events().publish((PAUSE_CHANGED, admin), (false,));
        Ok(())
    }

    // ================================================================================================
    // QUERY FUNCTIONS (GETTERS)
    // ================================================================================================

    pub fn get_trade(env: Env, trade_id: u64) -> Option<Trade> {
        env.storage().persistent().get(&DataKey::Trade(trade_id))
    }

    pub fn get_next_trade_id(env: Env) -> u64 {
        env.storage().instance().get(&DataKey::NextTradeId).unwrap_or(0)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        Self::_admin(&env)
    }

    pub fn get_fee_rate(env: Env) -> i128 {
        Self::_fee_rate(&env)
    }

    pub fn get_treasury(env: Env) -> Result<Address, Error> {
        env.storage().persistent().get(&DataKey::Treasury).ok_or(Error::NotInitialized)
    }

    pub fn get_whitelist(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Whitelist)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&DataKey::Paused).unwrap_or(false)
    }

    /// Fee a buyer would pay on `amount_out` at the current rate.
    pub fn calculate_fee(env: Env, amount_out: i128) -> i128 {
        fee::calculate_fee(&env, amount_out, Self::_fee_rate(&env))
    }
}
