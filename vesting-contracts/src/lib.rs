#![no_std]
use soroban_sdk::{contract, contractimpl, Address, Env, Vec};

#[cfg(test)]
extern crate std;

mod admin;
mod errors;
pub mod init;
mod lock;
mod math;
mod payments;
mod reentrancy;
pub mod release;
pub mod schedule;
#[cfg(test)]
mod test_release;

use admin::AdminStorage;
pub use errors::VestingError;
use init::{InitializationParams, VestingInitializer};
use lock::LockRegistry;
use payments::TokenStorage;
use release::{ReleaseLedger, VestingStatus};
use schedule::{ScheduleStorage, VestingSchedule};

#[contract]
pub struct TokenVestingContract;

#[contractimpl]
impl TokenVestingContract {
    // ============================================================================
    // Initialization and Admin
    // ============================================================================

    /// Initialize the contract with its administrator, token and schedule (one-time setup)
    pub fn initialize(env: Env, params: InitializationParams) -> Result<(), VestingError> {
        VestingInitializer::initialize(&env, &params)
    }

    pub fn get_admin(env: Env) -> Option<Address> {
        AdminStorage::get_admin(&env)
    }

    /// Hand the administrator role to `new_admin` (current admin only)
    pub fn transfer_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), VestingError> {
        AdminStorage::transfer_admin(&env, &current_admin, &new_admin)
    }

    pub fn get_token(env: Env) -> Option<Address> {
        TokenStorage::get(&env)
    }

    // ============================================================================
    // Schedule
    // ============================================================================

    /// Unix timestamp at which vesting starts
    pub fn start(env: Env) -> Result<u64, VestingError> {
        Ok(ScheduleStorage::require(&env)?.start)
    }

    pub fn get_schedule(env: Env) -> Result<VestingSchedule, VestingError> {
        ScheduleStorage::require(&env)
    }

    /// Cumulative vested percentage at an arbitrary timestamp
    pub fn percentage_at(env: Env, timestamp: u64) -> Result<u32, VestingError> {
        ScheduleStorage::require(&env)?.percentage_at(timestamp)
    }

    pub fn current_percentage(env: Env) -> Result<u32, VestingError> {
        let now = env.ledger().timestamp();
        ScheduleStorage::require(&env)?.percentage_at(now)
    }

    // ============================================================================
    // Lock Registry
    // ============================================================================

    /// Register a beneficiary's allocation (admin only, before start, exactly once)
    pub fn lock(
        env: Env,
        admin: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<(), VestingError> {
        LockRegistry::register(&env, &admin, &beneficiary, amount)
    }

    /// Register several allocations in one call; either all succeed or none do
    pub fn lock_many(
        env: Env,
        admin: Address,
        beneficiaries: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<i128, VestingError> {
        LockRegistry::register_many(&env, &admin, &beneficiaries, &amounts)
    }

    pub fn locked_balance(env: Env, beneficiary: Address) -> i128 {
        LockRegistry::locked_balance(&env, &beneficiary)
    }

    pub fn total_locked(env: Env) -> i128 {
        LockRegistry::total_locked(&env)
    }

    // ============================================================================
    // Release Ledger
    // ============================================================================

    /// Pay the beneficiary everything vested and not yet released. Callable by anyone.
    pub fn release(env: Env, beneficiary: Address) -> Result<i128, VestingError> {
        VestingInitializer::require_initialized(&env)?;
        ReleaseLedger::release(&env, &beneficiary)
    }

    /// Release for each listed beneficiary that has something due
    pub fn release_many(env: Env, beneficiaries: Vec<Address>) -> Result<i128, VestingError> {
        VestingInitializer::require_initialized(&env)?;
        ReleaseLedger::release_many(&env, &beneficiaries)
    }

    pub fn released(env: Env, beneficiary: Address) -> i128 {
        ReleaseLedger::released(&env, &beneficiary)
    }

    pub fn releasable_amount(env: Env, beneficiary: Address) -> Result<i128, VestingError> {
        ReleaseLedger::releasable_amount(&env, &beneficiary)
    }

    pub fn vested_amount(env: Env, beneficiary: Address) -> Result<i128, VestingError> {
        ReleaseLedger::vested_amount(&env, &beneficiary)
    }

    pub fn vesting_status(env: Env, beneficiary: Address) -> Result<VestingStatus, VestingError> {
        ReleaseLedger::status(&env, &beneficiary)
    }

    pub fn total_released(env: Env) -> i128 {
        ReleaseLedger::total_released(&env)
    }
}
