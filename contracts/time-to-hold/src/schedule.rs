//! Campaign phases as a pure function of ledger time.
//!
//! Checkpoints are stored one second before the values supplied to
//! `initialize`. Over the stored values every interval is closed at the start
//! and open at the end:
//!
//! ```text
//! PreStart  : now <  start
//! Staking   : start      <= now < end_stake
//! Locked    : end_stake  <= now < end_reward
//! Claimable : end_reward <= now
//! ```

use soroban_sdk::contracttype;

use crate::types::Error;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    pub start: u64,
    pub end_stake: u64,
    pub end_reward: u64,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    PreStart,
    Staking,
    Locked,
    Claimable,
}

impl Schedule {
    /// Validates `0 < start <= end_stake <= end_reward` and applies the
    /// one-second shift.
    pub fn from_inputs(start: u64, end_stake: u64, end_reward: u64) -> Result<Self, Error> {
        if start == 0 || start > end_stake || end_stake > end_reward {
            return Err(Error::InvalidSchedule);
        }
        Ok(Schedule {
            start: start - 1,
            end_stake: end_stake - 1,
            end_reward: end_reward - 1,
        })
    }

    pub fn phase(&self, now: u64) -> Phase {
        if now < self.start {
            Phase::PreStart
        } else if now < self.end_stake {
            Phase::Staking
        } else if now < self.end_reward {
            Phase::Locked
        } else {
            Phase::Claimable
        }
    }
}
