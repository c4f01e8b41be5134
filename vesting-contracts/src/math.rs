//! Checked arithmetic for token amounts and ledger timestamps.
//!
//! # Overflow Safety
//!
//! - Every operation uses `checked_*` and surfaces failure as a typed error
//! - Nothing wraps or saturates silently
//! - Division truncates toward zero, which is floor for the non-negative
//!   operands used throughout the contract

use crate::errors::VestingError;

pub fn add(a: i128, b: i128) -> Result<i128, VestingError> {
    a.checked_add(b).ok_or(VestingError::Overflow)
}

pub fn sub(a: i128, b: i128) -> Result<i128, VestingError> {
    a.checked_sub(b).ok_or(VestingError::Overflow)
}

pub fn mul(a: i128, b: i128) -> Result<i128, VestingError> {
    a.checked_mul(b).ok_or(VestingError::Overflow)
}

pub fn div(a: i128, b: i128) -> Result<i128, VestingError> {
    if b == 0 {
        return Err(VestingError::DivideByZero);
    }
    a.checked_div(b).ok_or(VestingError::Overflow)
}

pub fn add_u64(a: u64, b: u64) -> Result<u64, VestingError> {
    a.checked_add(b).ok_or(VestingError::Overflow)
}

pub fn sub_u64(a: u64, b: u64) -> Result<u64, VestingError> {
    a.checked_sub(b).ok_or(VestingError::Overflow)
}

pub fn div_u64(a: u64, b: u64) -> Result<u64, VestingError> {
    a.checked_div(b).ok_or(VestingError::DivideByZero)
}
