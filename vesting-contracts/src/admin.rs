//! Administrator role for the vesting contract.
//!
//! # Security Model
//!
//! - Single administrator address, set once during initialization
//! - Only the administrator may register locks
//! - The administrator can hand the role to another address
//! - The gate is an explicit check against the caller passed in, performed
//!   before any other state is read or written
//!
//! # Storage Design
//!
//! Uses instance storage for the administrator address.

use crate::errors::VestingError;
use soroban_sdk::{log, symbol_short, Address, Env, Symbol};

/// Storage key for the administrator address
pub const ADMIN_KEY: Symbol = symbol_short!("admin");

pub struct AdminStorage;

impl AdminStorage {
    /// Store the administrator address. Only called from initialization.
    pub fn initialize(env: &Env, admin: &Address) -> Result<(), VestingError> {
        if env.storage().instance().has(&ADMIN_KEY) {
            return Err(VestingError::AlreadyInitialized);
        }
        env.storage().instance().set(&ADMIN_KEY, admin);
        Ok(())
    }

    /// Transfer the administrator role to a new address
    ///
    /// # Security
    /// - Requires authorization from the current administrator
    /// - Verifies caller is actually the current administrator
    /// - Emits an `adm_trf` event for the audit trail
    pub fn transfer_admin(
        env: &Env,
        current_admin: &Address,
        new_admin: &Address,
    ) -> Result<(), VestingError> {
        Self::require_admin(env, current_admin)?;

        env.storage().instance().set(&ADMIN_KEY, new_admin);
        log!(env, "admin transferred", current_admin, new_admin);
        emit_admin_transferred(env, current_admin, new_admin);

        Ok(())
    }

    pub fn get_admin(env: &Env) -> Option<Address> {
        env.storage().instance().get(&ADMIN_KEY)
    }

    pub fn is_admin(env: &Env, address: &Address) -> bool {
        if let Some(admin) = Self::get_admin(env) {
            admin == *address
        } else {
            false
        }
    }

    /// Access gate for administrator-only operations.
    ///
    /// Requires `address` to have authorized the invocation and to be the
    /// stored administrator.
    ///
    /// # Returns
    /// * `Err(VestingError::NotInitialized)` if no administrator is set
    /// * `Err(VestingError::Unauthorized)` if `address` is not the administrator
    pub fn require_admin(env: &Env, address: &Address) -> Result<(), VestingError> {
        address.require_auth();
        if Self::get_admin(env).is_none() {
            return Err(VestingError::NotInitialized);
        }
        if !Self::is_admin(env, address) {
            return Err(VestingError::Unauthorized);
        }
        Ok(())
    }
}

fn emit_admin_transferred(env: &Env, old_admin: &Address, new_admin: &Address) {
    env.events().publish(
        (symbol_short!("adm_trf"),),
        (
            old_admin.clone(),
            new_admin.clone(),
            env.ledger().timestamp(),
        ),
    );
}
