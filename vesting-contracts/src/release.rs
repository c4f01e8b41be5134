//! Release ledger: how much each beneficiary has been paid.
//!
//! On every claim the vested amount is recomputed from the beneficiary's lock
//! and the schedule clock, the amount already released is subtracted, and the
//! remainder is paid out of custody. The ledger is written before the token
//! transfer and restored if the transfer fails, so a record never disagrees
//! with what was actually paid.
//!
//! # Invariants
//!
//! - `released(b)` never decreases
//! - `released(b) <= locked(b) * percentage_at(now) / 100` at all times
//! - one `released` event per successful release, carrying the paid amount

use soroban_sdk::{contracttype, log, symbol_short, Address, Env, Symbol, Vec};

use crate::errors::VestingError;
use crate::lock::{LockRegistry, MAX_BATCH_SIZE};
use crate::math;
use crate::payments::{custody_balance, transfer_from_custody};
use crate::reentrancy::with_release_guard;
use crate::schedule::{ScheduleStorage, FULL_PERCENT};

const RELEASED_KEY: Symbol = symbol_short!("released");
const TOTAL_RELEASED_KEY: Symbol = symbol_short!("tot_rel");

/// Where a beneficiary stands in its vesting lifecycle.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VestingStatus {
    /// No lock registered
    Unregistered,
    /// Lock registered, nothing vested yet
    Locked,
    /// Partially vested
    Vesting,
    /// Everything vested, some still unreleased
    FullyVested,
    /// Everything vested and paid out
    FullyReleased,
}

pub struct ReleaseStorage;

impl ReleaseStorage {
    fn key(beneficiary: &Address) -> (Symbol, Address) {
        (RELEASED_KEY, beneficiary.clone())
    }

    pub fn get(env: &Env, beneficiary: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&Self::key(beneficiary))
            .unwrap_or(0)
    }

    fn store(env: &Env, beneficiary: &Address, amount: i128) {
        env.storage()
            .persistent()
            .set(&Self::key(beneficiary), &amount);
    }

    pub fn total_released(env: &Env) -> i128 {
        env.storage()
            .instance()
            .get(&TOTAL_RELEASED_KEY)
            .unwrap_or(0)
    }

    fn set_total_released(env: &Env, total: i128) {
        env.storage().instance().set(&TOTAL_RELEASED_KEY, &total);
    }
}

pub struct ReleaseLedger;

impl ReleaseLedger {
    pub(crate) fn init_totals(env: &Env) {
        ReleaseStorage::set_total_released(env, 0);
    }

    /// Amount of `beneficiary`'s lock vested at the current ledger time.
    pub fn vested_amount(env: &Env, beneficiary: &Address) -> Result<i128, VestingError> {
        let schedule = ScheduleStorage::require(env)?;
        let percent = schedule.percentage_at(env.ledger().timestamp())?;
        let locked = LockRegistry::locked_balance(env, beneficiary);
        math::div(
            math::mul(locked, i128::from(percent))?,
            i128::from(FULL_PERCENT),
        )
    }

    /// Vested but not yet released amount.
    ///
    /// # Returns
    /// * `Err(VestingError::LedgerInvariantBroken)` if more was released than has vested
    pub fn releasable_amount(env: &Env, beneficiary: &Address) -> Result<i128, VestingError> {
        let vested = Self::vested_amount(env, beneficiary)?;
        let released = ReleaseStorage::get(env, beneficiary);
        if released > vested {
            return Err(VestingError::LedgerInvariantBroken);
        }
        math::sub(vested, released)
    }

    pub fn released(env: &Env, beneficiary: &Address) -> i128 {
        ReleaseStorage::get(env, beneficiary)
    }

    pub fn total_released(env: &Env) -> i128 {
        ReleaseStorage::total_released(env)
    }

    /// Pay `beneficiary` everything vested and not yet released.
    ///
    /// Anyone may trigger a release; the tokens always go to the beneficiary.
    ///
    /// # Returns
    /// * `Ok(amount)` paid out
    /// * `Err(VestingError::NothingDue)` if nothing is releasable
    /// * `Err(VestingError::InsufficientCustody)` if custody no longer covers the payout
    /// * `Err(VestingError::TransferFailed)` if the token contract rejected the transfer
    /// * `Err(VestingError::OperationNotAllowed)` on a nested release
    pub fn release(env: &Env, beneficiary: &Address) -> Result<i128, VestingError> {
        with_release_guard(env, || Self::release_unguarded(env, beneficiary))
    }

    /// Release for every listed beneficiary with something due.
    ///
    /// Beneficiaries with nothing releasable are skipped. Returns the total paid.
    pub fn release_many(env: &Env, beneficiaries: &Vec<Address>) -> Result<i128, VestingError> {
        if beneficiaries.is_empty() {
            return Err(VestingError::BatchEmpty);
        }
        if beneficiaries.len() > MAX_BATCH_SIZE {
            return Err(VestingError::BatchTooLarge);
        }

        with_release_guard(env, || {
            let mut total: i128 = 0;
            for beneficiary in beneficiaries.iter() {
                match Self::release_unguarded(env, &beneficiary) {
                    Ok(amount) => total = math::add(total, amount)?,
                    Err(VestingError::NothingDue) => continue,
                    Err(err) => return Err(err),
                }
            }
            if total == 0 {
                return Err(VestingError::NothingDue);
            }
            Ok(total)
        })
    }

    pub fn status(env: &Env, beneficiary: &Address) -> Result<VestingStatus, VestingError> {
        let locked = LockRegistry::locked_balance(env, beneficiary);
        if locked == 0 {
            return Ok(VestingStatus::Unregistered);
        }
        let schedule = ScheduleStorage::require(env)?;
        let percent = schedule.percentage_at(env.ledger().timestamp())?;
        let status = if percent == 0 {
            VestingStatus::Locked
        } else if percent < FULL_PERCENT {
            VestingStatus::Vesting
        } else if ReleaseStorage::get(env, beneficiary) >= locked {
            VestingStatus::FullyReleased
        } else {
            VestingStatus::FullyVested
        };
        Ok(status)
    }

    fn release_unguarded(env: &Env, beneficiary: &Address) -> Result<i128, VestingError> {
        let unreleased = Self::releasable_amount(env, beneficiary)?;
        if unreleased == 0 {
            return Err(VestingError::NothingDue);
        }
        if custody_balance(env)? < unreleased {
            return Err(VestingError::InsufficientCustody);
        }

        let previous = ReleaseStorage::get(env, beneficiary);
        let previous_total = ReleaseStorage::total_released(env);
        ReleaseStorage::store(env, beneficiary, math::add(previous, unreleased)?);
        ReleaseStorage::set_total_released(env, math::add(previous_total, unreleased)?);

        if let Err(err) = transfer_from_custody(env, beneficiary, unreleased) {
            ReleaseStorage::store(env, beneficiary, previous);
            ReleaseStorage::set_total_released(env, previous_total);
            return Err(err);
        }

        log!(env, "tokens released", beneficiary, unreleased);
        emit_tokens_released(env, beneficiary, unreleased);
        Ok(unreleased)
    }
}

/// `TokensReleased(beneficiary, amount)`
fn emit_tokens_released(env: &Env, beneficiary: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("released"), beneficiary.clone()),
        amount,
    );
}
