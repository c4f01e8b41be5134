//! Vesting schedule clock.
//!
//! Maps a ledger timestamp to the cumulative vested percentage:
//!
//! ```text
//! percent
//!   100 |                                   +--------
//!    85 |                             +-----+
//!   ... |                       ...
//!    25 |           +-----------+
//!    10 |     +-----+
//!     0 +-----+-----+-----------+-----  ...  +-------> time
//!           start  +cliff     +2*cliff      +total
//! ```
//!
//! The step period equals the cliff period. Within a step nothing accrues:
//! the curve is a staircase, not a ramp.

use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::errors::VestingError;
use crate::math;

/// Percentage unlocked as soon as the schedule starts.
pub const FIRST_CLIFF_PERCENT: u32 = 10;
/// Percentage added at the end of every step period after the cliff.
pub const STEP_PERCENT: u32 = 15;
pub const FULL_PERCENT: u32 = 100;

const SCHEDULE_KEY: Symbol = symbol_short!("schedule");

/// Vesting schedule stored on-chain. Immutable once the contract is initialized.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingSchedule {
    /// Unix timestamp at which the first percentage unlocks
    pub start: u64,
    /// Length of the cliff, also the length of every subsequent step (seconds)
    pub cliff_duration: u64,
    /// Seconds after `start` at which everything is vested
    pub total_duration: u64,
}

impl VestingSchedule {
    pub fn cliff_end(&self) -> Result<u64, VestingError> {
        math::add_u64(self.start, self.cliff_duration)
    }

    pub fn end(&self) -> Result<u64, VestingError> {
        math::add_u64(self.start, self.total_duration)
    }

    pub fn has_started(&self, now: u64) -> bool {
        now >= self.start
    }

    /// Cumulative vested percentage in `[0, 100]` at `now`.
    ///
    /// Cases are evaluated in order:
    /// 1. before `start`: 0
    /// 2. before the cliff ends: [`FIRST_CLIFF_PERCENT`]
    /// 3. at or after `start + total_duration`: [`FULL_PERCENT`]
    /// 4. otherwise `FIRST_CLIFF_PERCENT + STEP_PERCENT * (completed_steps + 1)`,
    ///    capped at [`FULL_PERCENT`]
    pub fn percentage_at(&self, now: u64) -> Result<u32, VestingError> {
        if now < self.start {
            return Ok(0);
        }
        let cliff_end = self.cliff_end()?;
        if now < cliff_end {
            return Ok(FIRST_CLIFF_PERCENT);
        }
        if now >= self.end()? {
            return Ok(FULL_PERCENT);
        }

        let since_cliff = math::sub_u64(now, cliff_end)?;
        let completed_steps = math::div_u64(since_cliff, self.cliff_duration)?;
        // Anything past the cap is clamped anyway; keep the multiplication small.
        let steps = completed_steps.min(u64::from(FULL_PERCENT / STEP_PERCENT)) as u32 + 1;
        let percent = FIRST_CLIFF_PERCENT + STEP_PERCENT * steps;
        Ok(percent.min(FULL_PERCENT))
    }
}

pub struct ScheduleStorage;

impl ScheduleStorage {
    pub fn store(env: &Env, schedule: &VestingSchedule) {
        env.storage().instance().set(&SCHEDULE_KEY, schedule);
    }

    pub fn get(env: &Env) -> Option<VestingSchedule> {
        env.storage().instance().get(&SCHEDULE_KEY)
    }

    pub fn require(env: &Env) -> Result<VestingSchedule, VestingError> {
        Self::get(env).ok_or(VestingError::NotInitialized)
    }
}
