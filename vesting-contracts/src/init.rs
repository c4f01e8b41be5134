//! Contract initialization for the vesting contract.
//!
//! # Security Model
//!
//! - **One-time initialization**: the contract can only be initialized once
//! - **Admin authorization**: initialization requires the administrator's signature
//! - **Validated before write**: every parameter is checked before any state is stored
//!
//! # Initialization Flow
//!
//! 1. Call `initialize()` with the administrator, token and schedule
//! 2. The schedule is validated against the current ledger time
//! 3. Administrator, token, schedule and zeroed totals are stored
//! 4. An `init` event is emitted
//!
//! There is no post-initialization configuration: the schedule is fixed for
//! the lifetime of the contract.

use crate::admin::AdminStorage;
use crate::errors::VestingError;
use crate::lock::LockRegistry;
use crate::payments::TokenStorage;
use crate::release::ReleaseLedger;
use crate::schedule::{ScheduleStorage, VestingSchedule};
use soroban_sdk::{contracttype, log, symbol_short, Address, Env};

const DAY_SECONDS: u64 = 24 * 60 * 60;

/// Default cliff length, also the step length (30 days)
pub const DEFAULT_CLIFF_DURATION: u64 = 30 * DAY_SECONDS;

/// Default total duration: the cliff plus six 15% steps reaches 100%
pub const DEFAULT_TOTAL_DURATION: u64 = 6 * DEFAULT_CLIFF_DURATION;

/// Initialization parameters for the contract
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializationParams {
    /// Administrator allowed to register locks
    pub admin: Address,
    /// Token released by the contract
    pub token: Address,
    /// Unix timestamp at which vesting starts (must be in the future)
    pub start: u64,
    /// Cliff length in seconds; each later step lasts as long
    pub cliff_duration: u64,
    /// Seconds from `start` until everything is vested
    pub total_duration: u64,
}

impl InitializationParams {
    /// Parameters using the deployment's default cliff and duration.
    pub fn with_defaults(admin: Address, token: Address, start: u64) -> Self {
        Self {
            admin,
            token,
            start,
            cliff_duration: DEFAULT_CLIFF_DURATION,
            total_duration: DEFAULT_TOTAL_DURATION,
        }
    }

    fn schedule(&self) -> VestingSchedule {
        VestingSchedule {
            start: self.start,
            cliff_duration: self.cliff_duration,
            total_duration: self.total_duration,
        }
    }
}

pub struct VestingInitializer;

impl VestingInitializer {
    /// Initialize the contract.
    ///
    /// # Returns
    /// * `Err(VestingError::AlreadyInitialized)` if already initialized
    /// * `Err(VestingError::InvalidTimestamp)` if `start` is not in the future
    /// * `Err(VestingError::InvalidSchedule)` if the cliff is zero or longer than the total
    /// * `Err(VestingError::Overflow)` if `start + total_duration` does not fit in a timestamp
    pub fn initialize(env: &Env, params: &InitializationParams) -> Result<(), VestingError> {
        params.admin.require_auth();

        if Self::is_initialized(env) {
            return Err(VestingError::AlreadyInitialized);
        }

        let schedule = params.schedule();
        Self::validate_schedule(env, &schedule)?;

        AdminStorage::initialize(env, &params.admin)?;
        TokenStorage::store(env, &params.token);
        ScheduleStorage::store(env, &schedule);
        LockRegistry::init_totals(env);
        ReleaseLedger::init_totals(env);

        log!(env, "vesting initialized", params.start, params.cliff_duration, params.total_duration);
        env.events().publish(
            (symbol_short!("init"),),
            (
                params.admin.clone(),
                params.token.clone(),
                params.start,
                params.cliff_duration,
                params.total_duration,
            ),
        );

        Ok(())
    }

    pub fn is_initialized(env: &Env) -> bool {
        ScheduleStorage::get(env).is_some()
    }

    pub fn require_initialized(env: &Env) -> Result<(), VestingError> {
        if !Self::is_initialized(env) {
            return Err(VestingError::NotInitialized);
        }
        Ok(())
    }

    fn validate_schedule(env: &Env, schedule: &VestingSchedule) -> Result<(), VestingError> {
        if schedule.start <= env.ledger().timestamp() {
            return Err(VestingError::InvalidTimestamp);
        }
        if schedule.cliff_duration == 0 || schedule.total_duration < schedule.cliff_duration {
            return Err(VestingError::InvalidSchedule);
        }
        schedule.end()?;
        Ok(())
    }
}
