//! Release ledger tests: the stepped payout curve, idempotent claims, custody
//! checks at release time, transfer rollback and the `released` event.

use crate::errors::VestingError;
use crate::reentrancy::{is_locked, with_release_guard};
use crate::release::{ReleaseLedger, VestingStatus};
use crate::test_support::{setup, setup_with_mock_token, CLIFF, MINUTE, START, TOTAL};
use soroban_sdk::testutils::{Address as _, Events, Ledger};
use soroban_sdk::xdr::{ContractEventBody, Int128Parts, ScSymbol, ScVal};
use soroban_sdk::{vec, Address, Env, Vec};

// ============================================================================
// Stepped payout
// ============================================================================

#[test]
fn test_nothing_releasable_before_start() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START - 1);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 0);
    assert_eq!(ctx.client.vested_amount(&beneficiary), 0);
    assert_eq!(
        ctx.client.try_release(&beneficiary),
        Err(Ok(VestingError::NothingDue))
    );
}

#[test]
fn test_first_cliff_percent_from_start() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 100);
    assert_eq!(ctx.client.vesting_status(&beneficiary), VestingStatus::Vesting);
}

#[test]
fn test_release_walks_the_staircase() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    // (time, expected cumulative vested)
    let checkpoints = [
        (START + MINUTE, 100i128),
        (START + 3 * MINUTE + 1, 250),
        (START + 6 * MINUTE, 400),
        (START + 18 * MINUTE, 1_000),
    ];

    let mut paid = 0i128;
    for (now, vested) in checkpoints {
        ctx.set_time(now);
        assert_eq!(ctx.client.vested_amount(&beneficiary), vested);
        assert_eq!(ctx.client.releasable_amount(&beneficiary), vested - paid);

        let amount = ctx.client.release(&beneficiary);
        assert_eq!(amount, vested - paid);
        paid = vested;

        assert_eq!(ctx.client.releasable_amount(&beneficiary), 0);
        assert_eq!(ctx.client.released(&beneficiary), vested);
        assert_eq!(ctx.token_client.balance(&beneficiary), vested);
    }

    assert_eq!(ctx.client.total_released(), 1_000);
    assert_eq!(ctx.client.vesting_status(&beneficiary), VestingStatus::FullyReleased);
}

#[test]
fn test_no_accrual_within_a_step() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START + 6 * MINUTE);
    ctx.client.release(&beneficiary);

    ctx.set_time(START + 9 * MINUTE - 1);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 0);
    assert_eq!(
        ctx.client.try_release(&beneficiary),
        Err(Ok(VestingError::NothingDue))
    );

    ctx.set_time(START + 9 * MINUTE);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 150);
}

#[test]
fn test_single_release_after_end_pays_everything() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START + TOTAL + 1_000);
    assert_eq!(ctx.client.vesting_status(&beneficiary), VestingStatus::FullyVested);
    assert_eq!(ctx.client.release(&beneficiary), 1_000);
    assert_eq!(ctx.client.vesting_status(&beneficiary), VestingStatus::FullyReleased);
}

#[test]
fn test_vested_amount_rounds_down() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(999);

    ctx.set_time(START);
    // 999 * 10 / 100 = 99.9
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 99);

    ctx.set_time(START + CLIFF);
    // 999 * 25 / 100 = 249.75
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 249);

    ctx.set_time(START + TOTAL);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 999);
}

#[test]
fn test_release_twice_without_time_passing() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START + 4 * MINUTE);
    assert_eq!(ctx.client.release(&beneficiary), 250);

    let second = ctx.client.try_release(&beneficiary);
    assert_eq!(second, Err(Ok(VestingError::NothingDue)));
    assert_eq!(ctx.client.released(&beneficiary), 250);
    assert_eq!(ctx.token_client.balance(&beneficiary), 250);
}

#[test]
fn test_release_for_unregistered_beneficiary() {
    let ctx = setup();
    let stranger = Address::generate(&ctx.env);

    ctx.set_time(START + TOTAL);
    assert_eq!(
        ctx.client.try_release(&stranger),
        Err(Ok(VestingError::NothingDue))
    );
}

#[test]
fn test_beneficiaries_are_independent() {
    let ctx = setup();
    let a = ctx.locked_beneficiary(1_000);
    let b = ctx.locked_beneficiary(2_000);

    ctx.set_time(START + CLIFF);
    assert_eq!(ctx.client.release(&a), 250);
    assert_eq!(ctx.client.releasable_amount(&b), 500);
    assert_eq!(ctx.client.released(&b), 0);
    assert_eq!(ctx.client.total_released(), 250);
}

#[test]
fn test_anyone_can_trigger_release_without_auth() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START + CLIFF);
    ctx.env.mock_auths(&[]);

    assert_eq!(ctx.client.release(&beneficiary), 250);
    assert_eq!(ctx.token_client.balance(&beneficiary), 250);
}

// ============================================================================
// Batch release
// ============================================================================

#[test]
fn test_release_many_skips_nothing_due() {
    let ctx = setup();
    let a = ctx.locked_beneficiary(1_000);
    let b = ctx.locked_beneficiary(2_000);
    let stranger = Address::generate(&ctx.env);

    ctx.set_time(START + CLIFF);
    ctx.client.release(&a);

    let total = ctx
        .client
        .release_many(&vec![&ctx.env, a.clone(), b.clone(), stranger.clone()]);
    assert_eq!(total, 500);
    assert_eq!(ctx.client.released(&a), 250);
    assert_eq!(ctx.client.released(&b), 500);
    assert_eq!(ctx.client.total_released(), 750);

    let again = ctx.client.try_release_many(&vec![&ctx.env, a, b]);
    assert_eq!(again, Err(Ok(VestingError::NothingDue)));
}

#[test]
fn test_release_many_empty_batch() {
    let ctx = setup();
    let result = ctx.client.try_release_many(&Vec::new(&ctx.env));
    assert_eq!(result, Err(Ok(VestingError::BatchEmpty)));
}

// ============================================================================
// Events
// ============================================================================

fn released_event_amounts(env: &Env) -> std::vec::Vec<ScVal> {
    let topic = ScVal::Symbol(ScSymbol("released".try_into().unwrap()));
    let mut amounts = std::vec::Vec::new();
    for event in env.events().all().events() {
        if let ContractEventBody::V0(body) = &event.body {
            if body.topics.first() == Some(&topic) {
                amounts.push(body.data.clone());
            }
        }
    }
    amounts
}

#[test]
fn test_release_emits_tokens_released_event() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);

    ctx.set_time(START + 6 * MINUTE);
    ctx.client.release(&beneficiary);

    let amounts = released_event_amounts(&ctx.env);
    assert_eq!(amounts.len(), 1);
    assert_eq!(amounts[0], ScVal::I128(Int128Parts { hi: 0, lo: 400 }));
}

// ============================================================================
// Custody and transfer failures
// ============================================================================

#[test]
fn test_release_with_depleted_custody_fails() {
    let ctx = setup_with_mock_token(1_000);
    let beneficiary = Address::generate(&ctx.env);
    ctx.client.lock(&ctx.admin, &beneficiary, &1_000);

    // Custody drains through some path outside the contract.
    ctx.token.set_balance(&ctx.contract_id, &100);
    ctx.env.ledger().set_timestamp(START + CLIFF);

    let result = ctx.client.try_release(&beneficiary);
    assert_eq!(result, Err(Ok(VestingError::InsufficientCustody)));
    assert_eq!(ctx.client.released(&beneficiary), 0);
    assert_eq!(ctx.client.releasable_amount(&beneficiary), 250);

    // Topping custody back up makes the claim payable again.
    ctx.token.set_balance(&ctx.contract_id, &1_000);
    assert_eq!(ctx.client.release(&beneficiary), 250);
}

#[test]
fn test_failed_transfer_leaves_ledger_untouched() {
    let ctx = setup_with_mock_token(1_000);
    let beneficiary = Address::generate(&ctx.env);
    ctx.client.lock(&ctx.admin, &beneficiary, &1_000);

    ctx.env.ledger().set_timestamp(START + CLIFF);
    ctx.token.set_failing(&true);

    let result = ctx.client.try_release(&beneficiary);
    assert_eq!(result, Err(Ok(VestingError::TransferFailed)));
    assert_eq!(ctx.client.released(&beneficiary), 0);
    assert_eq!(ctx.client.total_released(), 0);
    assert_eq!(ctx.token.balance(&beneficiary), 0);
    assert_eq!(ctx.token.balance(&ctx.contract_id), 1_000);

    ctx.token.set_failing(&false);
    assert_eq!(ctx.client.release(&beneficiary), 250);
    assert_eq!(ctx.token.balance(&beneficiary), 250);
}

#[test]
fn test_release_guard_cleared_after_failed_transfer() {
    let ctx = setup_with_mock_token(1_000);
    let beneficiary = Address::generate(&ctx.env);
    ctx.client.lock(&ctx.admin, &beneficiary, &1_000);
    ctx.env.ledger().set_timestamp(START + CLIFF);
    ctx.token.set_failing(&true);

    // Inside one contract frame nothing is rolled back by the host.
    ctx.env.as_contract(&ctx.contract_id, || {
        let result = ReleaseLedger::release(&ctx.env, &beneficiary);
        assert_eq!(result, Err(VestingError::TransferFailed));
        assert!(!is_locked(&ctx.env));
        assert_eq!(ReleaseLedger::released(&ctx.env, &beneficiary), 0);
        assert_eq!(ReleaseLedger::total_released(&ctx.env), 0);
    });

    ctx.token.set_failing(&false);
    ctx.env.as_contract(&ctx.contract_id, || {
        assert_eq!(ReleaseLedger::release(&ctx.env, &beneficiary), Ok(250));
        assert!(!is_locked(&ctx.env));
    });
    assert_eq!(ctx.token.balance(&beneficiary), 250);
}

#[test]
fn test_release_guard_held_only_during_payout() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);
    ctx.set_time(START + CLIFF);

    ctx.env.as_contract(&ctx.contract_id, || {
        assert!(!is_locked(&ctx.env));
        let paid = with_release_guard(&ctx.env, || {
            assert!(is_locked(&ctx.env));
            ReleaseLedger::release_many(&ctx.env, &vec![&ctx.env, beneficiary.clone()])
        });
        assert_eq!(paid, Err(VestingError::OperationNotAllowed));
        assert!(!is_locked(&ctx.env));

        // Back-to-back releases in the same frame: the second sees a free guard.
        assert_eq!(ReleaseLedger::release(&ctx.env, &beneficiary), Ok(250));
        assert_eq!(
            ReleaseLedger::release(&ctx.env, &beneficiary),
            Err(VestingError::NothingDue)
        );
        assert!(!is_locked(&ctx.env));
    });
}

#[test]
fn test_release_guard_rejects_unrecorded_payout() {
    let ctx = setup();
    ctx.env.as_contract(&ctx.contract_id, || {
        // Claims a payout the ledger never recorded.
        let result = with_release_guard(&ctx.env, || Ok(5));
        assert_eq!(result, Err(VestingError::LedgerInvariantBroken));
        assert!(!is_locked(&ctx.env));

        assert_eq!(with_release_guard(&ctx.env, || Ok(0)), Ok(0));
    });
}

#[test]
fn test_nested_release_is_rejected() {
    let ctx = setup();
    let beneficiary = ctx.locked_beneficiary(1_000);
    ctx.set_time(START + CLIFF);

    ctx.env.as_contract(&ctx.contract_id, || {
        let nested = with_release_guard(&ctx.env, || {
            ReleaseLedger::release(&ctx.env, &beneficiary)
        });
        assert_eq!(nested, Err(VestingError::OperationNotAllowed));
        assert_eq!(ReleaseLedger::released(&ctx.env, &beneficiary), 0);
    });
}
