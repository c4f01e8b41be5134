//! Lock registry: each beneficiary's total allocation.
//!
//! An allocation is registered exactly once, by the administrator, before the
//! schedule starts. The running total of all allocations is bounded by the
//! token balance the contract holds at registration time. That bound is a
//! point-in-time check; release re-checks custody before paying out.

use soroban_sdk::{log, symbol_short, Address, Env, Map, Symbol, Vec};

use crate::admin::AdminStorage;
use crate::errors::VestingError;
use crate::math;
use crate::payments::custody_balance;
use crate::schedule::{ScheduleStorage, FULL_PERCENT};

const LOCK_KEY: Symbol = symbol_short!("lock");
const TOTAL_LOCKED_KEY: Symbol = symbol_short!("tot_lock");

/// Maximum beneficiaries handled by a single batch call.
pub const MAX_BATCH_SIZE: u32 = 50;

pub struct LockStorage;

impl LockStorage {
    fn key(beneficiary: &Address) -> (Symbol, Address) {
        (LOCK_KEY, beneficiary.clone())
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

    pub fn total_locked(env: &Env) -> i128 {
        env.storage()
            .instance()
            .get(&TOTAL_LOCKED_KEY)
            .unwrap_or(0)
    }

    fn set_total_locked(env: &Env, total: i128) {
        env.storage().instance().set(&TOTAL_LOCKED_KEY, &total);
    }
}

pub struct LockRegistry;

impl LockRegistry {
    pub(crate) fn init_totals(env: &Env) {
        LockStorage::set_total_locked(env, 0);
    }

    /// Register `beneficiary`'s allocation.
    ///
    /// # Returns
    /// * `Err(VestingError::Unauthorized)` if `admin` is not the administrator
    /// * `Err(VestingError::ScheduleStarted)` if the schedule has already started
    /// * `Err(VestingError::InvalidAmount)` if `amount` is not positive
    /// * `Err(VestingError::Overflow)` if `amount` is too large to ever vest
    /// * `Err(VestingError::AlreadyRegistered)` if the beneficiary already has a lock
    /// * `Err(VestingError::InsufficientCustody)` if the new total exceeds the custodied balance
    ///
    /// Nothing is written unless every check passes.
    pub fn register(
        env: &Env,
        admin: &Address,
        beneficiary: &Address,
        amount: i128,
    ) -> Result<(), VestingError> {
        AdminStorage::require_admin(env, admin)?;
        Self::require_before_start(env)?;
        Self::validate_entry(env, beneficiary, amount)?;

        let new_total = math::add(LockStorage::total_locked(env), amount)?;
        Self::require_custody(env, new_total)?;

        Self::write_entry(env, beneficiary, amount);
        LockStorage::set_total_locked(env, new_total);
        Ok(())
    }

    /// Register several allocations at once, all or nothing.
    pub fn register_many(
        env: &Env,
        admin: &Address,
        beneficiaries: &Vec<Address>,
        amounts: &Vec<i128>,
    ) -> Result<i128, VestingError> {
        AdminStorage::require_admin(env, admin)?;
        Self::require_before_start(env)?;

        if beneficiaries.is_empty() {
            return Err(VestingError::BatchEmpty);
        }
        if beneficiaries.len() > MAX_BATCH_SIZE {
            return Err(VestingError::BatchTooLarge);
        }
        if beneficiaries.len() != amounts.len() {
            return Err(VestingError::BatchLengthMismatch);
        }

        let mut seen: Map<Address, bool> = Map::new(env);
        let mut batch_total: i128 = 0;
        for (beneficiary, amount) in beneficiaries.iter().zip(amounts.iter()) {
            Self::validate_entry(env, &beneficiary, amount)?;
            if seen.contains_key(beneficiary.clone()) {
                return Err(VestingError::AlreadyRegistered);
            }
            seen.set(beneficiary, true);
            batch_total = math::add(batch_total, amount)?;
        }

        let new_total = math::add(LockStorage::total_locked(env), batch_total)?;
        Self::require_custody(env, new_total)?;

        for (beneficiary, amount) in beneficiaries.iter().zip(amounts.iter()) {
            Self::write_entry(env, &beneficiary, amount);
        }
        LockStorage::set_total_locked(env, new_total);
        Ok(batch_total)
    }

    pub fn locked_balance(env: &Env, beneficiary: &Address) -> i128 {
        LockStorage::get(env, beneficiary)
    }

    pub fn total_locked(env: &Env) -> i128 {
        LockStorage::total_locked(env)
    }

    fn require_before_start(env: &Env) -> Result<(), VestingError> {
        let schedule = ScheduleStorage::require(env)?;
        if schedule.has_started(env.ledger().timestamp()) {
            return Err(VestingError::ScheduleStarted);
        }
        Ok(())
    }

    fn validate_entry(env: &Env, beneficiary: &Address, amount: i128) -> Result<(), VestingError> {
        if amount <= 0 {
            return Err(VestingError::InvalidAmount);
        }
        // Vested amounts are computed as amount * percent, which must fit.
        math::mul(amount, i128::from(FULL_PERCENT))?;
        if LockStorage::get(env, beneficiary) != 0 {
            return Err(VestingError::AlreadyRegistered);
        }
        Ok(())
    }

    fn require_custody(env: &Env, new_total: i128) -> Result<(), VestingError> {
        if new_total > custody_balance(env)? {
            return Err(VestingError::InsufficientCustody);
        }
        Ok(())
    }

    fn write_entry(env: &Env, beneficiary: &Address, amount: i128) {
        LockStorage::store(env, beneficiary, amount);
        log!(env, "lock registered", beneficiary, amount);
        env.events().publish(
            (symbol_short!("locked"), beneficiary.clone()),
            amount,
        );
    }
}
