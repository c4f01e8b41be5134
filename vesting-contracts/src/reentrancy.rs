//! Reentrancy guard for release flows.
//!
//! The Soroban host already refuses to let a contract re-enter itself during a
//! cross-contract call. The release path additionally records the ledger's
//! running `total_released` while a payout is in flight. A nested release in
//! the same invocation finds that record and is rejected, and when the payout
//! completes the ledger must have moved by exactly the amount paid.

use crate::errors::VestingError;
use crate::math;
use crate::release::ReleaseStorage;
use soroban_sdk::{symbol_short, Env, Symbol};

const RELEASE_LOCK_KEY: Symbol = symbol_short!("rel_lock");

/// Runs a payout with the release guard held.
///
/// `f` returns the amount it paid out. The guard snapshots `total_released`
/// on entry and, once `f` succeeds, checks the ledger advanced by exactly
/// that amount. The snapshot is dropped on every exit path.
///
/// # Returns
/// * `Ok(paid)` from `f`
/// * `Err(VestingError::OperationNotAllowed)` if a payout is already in flight
/// * `Err(VestingError::LedgerInvariantBroken)` if the ledger disagrees with `paid`
pub fn with_release_guard<F>(env: &Env, f: F) -> Result<i128, VestingError>
where
    F: FnOnce() -> Result<i128, VestingError>,
{
    if is_locked(env) {
        return Err(VestingError::OperationNotAllowed);
    }
    let total_before = ReleaseStorage::total_released(env);
    env.storage().instance().set(&RELEASE_LOCK_KEY, &total_before);

    let result = f().and_then(|paid| {
        if ReleaseStorage::total_released(env) != math::add(total_before, paid)? {
            return Err(VestingError::LedgerInvariantBroken);
        }
        Ok(paid)
    });

    env.storage().instance().remove(&RELEASE_LOCK_KEY);
    result
}

/// Whether a payout is currently in flight.
pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().has(&RELEASE_LOCK_KEY)
}
