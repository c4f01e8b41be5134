//! Token custody for the vesting contract.
//!
//! The contract holds the vesting pool in its own token balance. This module is
//! the only place that talks to the token contract: it reads the custodied
//! balance and pays beneficiaries out of it.

use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

use crate::errors::VestingError;

const TOKEN_KEY: Symbol = symbol_short!("token");

pub struct TokenStorage;

impl TokenStorage {
    pub fn store(env: &Env, token: &Address) {
        env.storage().instance().set(&TOKEN_KEY, token);
    }

    pub fn get(env: &Env) -> Option<Address> {
        env.storage().instance().get(&TOKEN_KEY)
    }

    pub fn require(env: &Env) -> Result<Address, VestingError> {
        Self::get(env).ok_or(VestingError::NotInitialized)
    }
}

/// Token balance currently held by the contract.
pub fn custody_balance(env: &Env) -> Result<i128, VestingError> {
    let token = TokenStorage::require(env)?;
    let client = token::Client::new(env, &token);
    Ok(client.balance(&env.current_contract_address()))
}

/// Pay `amount` out of custody to `to`.
///
/// The token contract either moves the full amount or fails without effect;
/// a failure is surfaced as `TransferFailed` instead of trapping the caller.
pub fn transfer_from_custody(env: &Env, to: &Address, amount: i128) -> Result<(), VestingError> {
    if amount <= 0 {
        return Err(VestingError::InvalidAmount);
    }
    let token = TokenStorage::require(env)?;
    let client = token::Client::new(env, &token);
    let contract = env.current_contract_address();
    match client.try_transfer(&contract, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(VestingError::TransferFailed),
    }
}
