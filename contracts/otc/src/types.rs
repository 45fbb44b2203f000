/*!
 * Type Definitions for the OTC Escrow Contract
 *
 * Data structures, storage keys, errors and event topics shared by the
 * trade escrow engine. Trades are bilateral and creator-defined: the creator
 * escrows `amount_in` of `token_in` and names the `amount_out` of `token_out`
 * it wants back.
 */

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, Symbol};

// ================================================================================================
// CORE DATA STRUCTURES
// ================================================================================================

/// Validity window of a time-boxed trade, as passed to `create_trade`.
///
/// A trade with a window can only be bought while `start <= now < end`.
/// Both bounds are ledger timestamps in seconds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeWindow {
    /// First timestamp at which the trade can be bought
    pub start: u64,

    /// First timestamp at which the trade can no longer be bought
    pub end: u64,
}

/// A single escrowed swap offer.
///
/// Created by `create_trade`, which moves `amount_in` of `token_in` from the
/// creator into the contract. Only `status` and `buyer` change after
/// creation, both on settlement.
///
/// # Variants
/// - Open trade: `buyer` is `None` and both window bounds are 0
/// - Directed trade: `buyer` names the only address allowed to buy
/// - Time-boxed trade: `window_start`/`window_end` restrict when the trade
///   can be bought
///
/// Variants combine freely.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trade {
    /// Address that funded the escrow and receives `amount_out - fee`
    pub creator: Address,

    /// Directed buyer, or `None` when any address may buy.
    /// Holds the settling buyer once the trade is completed.
    pub buyer: Option<Address>,

    /// Token escrowed by the creator
    pub token_in: Address,

    /// Token the buyer pays with
    pub token_out: Address,

    /// Escrowed quantity of `token_in`, released to the buyer on settlement
    pub amount_in: i128,

    /// Quantity of `token_out` the buyer pays, fee included
    pub amount_out: i128,

    /// First timestamp at which the trade can be bought, 0 without a window
    pub window_start: u64,

    /// First timestamp at which the trade can no longer be bought, 0 without a window
    pub window_end: u64,

    /// Lifecycle state
    pub status: TradeStatus,
}

impl Trade {
    /// The validity window, if the trade was created with one.
    pub fn window(&self) -> Option<TradeWindow> {
        if self.window_end == 0 {
            return None;
        }
        Some(TradeWindow {
            start: self.window_start,
            end: self.window_end,
        })
    }
}

// ================================================================================================
// ENUMERATIONS
// ================================================================================================

/// Lifecycle of a trade.
///
/// # State Transition Rules
/// - Open → Completed (`buy`)
/// - Open → Rejected (`reject_trade`)
///
/// Completed and Rejected are terminal.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TradeStatus {
    /// `amount_in` is held in escrow and the trade can be bought or rejected
    Open,

    /// A buyer settled the trade; escrow was released to the buyer
    Completed,

    /// The creator reclaimed the escrow
    Rejected,
}

/// Storage keys.
///
/// Configuration and trades live in persistent storage, the trade counter and
/// pause flag in instance storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    FeeRate,
    Treasury,
    Whitelist,
    Paused,
    NextTradeId,
    Trade(u64),
}

// ================================================================================================
// ERROR DEFINITIONS
// ================================================================================================

/// Failure conditions of the OTC contract.
///
/// # Error Code Ranges
/// - 1-2: Initialization
/// - 3-9: Input validation
/// - 10-12: Authorization
/// - 13-17: Trade state
/// - 18-20: Custody
/// - 21: Administrative
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ========== Initialization (1-2) ==========
    /// `initialize` has not been called yet
    NotInitialized = 1,

    /// `initialize` was already called
    AlreadyInitialized = 2,

    // ========== Validation (3-9) ==========
    /// `token_in` and `token_out` are the same token
    SameTokens = 3,

    /// An amount is zero or negative
    InvalidAmount = 4,

    /// The configured whitelist does not list one of the tokens as tradeable
    TokenNotWhitelisted = 5,

    /// The directed buyer is the creator itself
    InvalidBuyer = 6,

    /// The window is not `now < start < end`
    InvalidTimeWindow = 7,

    /// Fee rate outside the accepted range
    InvalidFeeRate = 8,

    /// Treasury address cannot receive fees
    InvalidTreasury = 9,

    // ========== Authorization (10-12) ==========
    /// Caller is not the trade creator
    NotCreator = 10,

    /// Trade is directed to another buyer
    NotDesignatedBuyer = 11,

    /// The creator tried to buy its own trade
    CreatorCannotBuy = 12,

    // ========== Trade state (13-17) ==========
    /// No trade with this id
    TradeNotFound = 13,

    /// The trade was already bought
    TradeAlreadyCompleted = 14,

    /// The trade was already rejected by its creator
    TradeAlreadyRejected = 15,

    /// The trade window has not opened yet
    TradeNotStarted = 16,

    /// The trade window has closed
    TradeExpired = 17,

    // ========== Custody (18-20) ==========
    /// The payer does not hold enough tokens
    InsufficientBalance = 18,

    /// The payer has not approved enough tokens to the contract
    InsufficientAllowance = 19,

    /// The token contract rejected a transfer
    TokenTransferFailed = 20,

    // ========== Administrative (21) ==========
    /// Trading is paused
    ContractPaused = 21,
}

// ================================================================================================
// EVENT CONSTANTS
// ================================================================================================

/// Emitted by `create_trade`
/// Topics: (TRADE_CREATED, creator). Data: (trade_id, token_in, token_out, amount_in, amount_out)
pub const TRADE_CREATED: Symbol = symbol_short!("trd_crt");

/// Emitted by `buy`
/// Topics: (TRADE_BOUGHT, buyer). Data: (trade_id, fee)
pub const TRADE_BOUGHT: Symbol = symbol_short!("trd_buy");

/// Emitted by `reject_trade`
/// Topics: (TRADE_REJECTED, creator). Data: (trade_id,)
pub const TRADE_REJECTED: Symbol = symbol_short!("trd_rej");

/// Emitted by `set_fee_rate`
pub const FEE_UPDATED: Symbol = symbol_short!("fee_upd");

/// Emitted by `set_treasury`
pub const TREASURY_UPDATED: Symbol = symbol_short!("trs_upd");

/// Emitted by `set_admin`
pub const ADMIN_UPDATED: Symbol = symbol_short!("adm_upd");

/// Emitted by `pause` and `unpause`. Data: (paused,)
pub const PAUSE_CHANGED: Symbol = symbol_short!("paused");
