//! Loan lifecycle tests — issue, ceiling, repayment, and the
//! query-time overdue penalty.

use economy_core::{
    clock::SimClock, config::EconomyConfig, engine::EconomyEngine, error::EconomyError,
    types::PlayerId,
};

fn build() -> EconomyEngine {
    EconomyEngine::new(EconomyConfig::default(), 42, SimClock::at_epoch())
}

fn player(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

/// The reference loan: 1000 at 10% for 30 days owes 1100.
#[test]
fn loan_credits_principal_and_owes_with_interest() {
    let engine = build();
    let alice = player(1);

    let status = engine.request_loan(alice, 1000).unwrap();

    assert_eq!(engine.balance(alice), 1000);
    assert_eq!(status.principal, 1000);
    assert_eq!(status.remaining_owed, 1100);
    assert_eq!(status.remaining_days, 30);
    assert!(!status.overdue);
}

/// At most one loan per player at any time.
#[test]
fn second_loan_is_rejected() {
    let engine = build();
    let alice = player(1);
    engine.request_loan(alice, 500).unwrap();

    assert!(matches!(
        engine.request_loan(alice, 100),
        Err(EconomyError::LoanAlreadyActive)
    ));
}

#[test]
fn loan_ceiling_is_enforced() {
    let engine = build();
    let alice = player(1);

    assert!(matches!(
        engine.request_loan(alice, 10_001),
        Err(EconomyError::LoanLimitExceeded { limit: 10_000 })
    ));
    assert!(engine.loan_status(alice).is_none());
    assert_eq!(engine.balance(alice), 0);
}

/// Repaying the exact remainder removes the loan; the debit equals
/// what was owed.
#[test]
fn full_repayment_removes_the_loan() {
    let engine = build();
    let alice = player(1);
    engine.initialize_player(alice); // 100
    engine.request_loan(alice, 1000).unwrap(); // 1100 liquid, owes 1100

    let paid = engine.repay_loan(alice, 1100).unwrap();

    assert_eq!(paid, 1100);
    assert_eq!(engine.balance(alice), 0);
    assert!(engine.loan_status(alice).is_none());
}

/// Overpaying is capped at the owed amount; no coins are burned.
#[test]
fn repayment_is_capped_at_the_owed_amount() {
    let engine = build();
    let alice = player(1);
    engine.credit(alice, 5000).unwrap();
    engine.request_loan(alice, 1000).unwrap(); // 6000 liquid, owes 1100

    let paid = engine.repay_loan(alice, 9999).unwrap();

    assert_eq!(paid, 1100);
    assert_eq!(engine.balance(alice), 4900);
    assert!(engine.loan_status(alice).is_none());
}

#[test]
fn partial_repayments_accumulate() {
    let engine = build();
    let alice = player(1);
    engine.request_loan(alice, 1000).unwrap();

    engine.repay_loan(alice, 400).unwrap();
    let status = engine.loan_status(alice).unwrap();
    assert_eq!(status.remaining_owed, 700);
    assert_eq!(status.total_repaid, 400);

    engine.repay_loan(alice, 600).unwrap();
    engine.credit(alice, 100).unwrap();
    engine.repay_loan(alice, 100).unwrap();
    assert!(engine.loan_status(alice).is_none());
}

#[test]
fn repay_without_a_loan_fails() {
    let engine = build();
    let alice = player(1);
    engine.credit(alice, 100).unwrap();

    assert!(matches!(
        engine.repay_loan(alice, 50),
        Err(EconomyError::NoActiveLoan)
    ));
}

/// Past the due date the reported owed amount grows by 0.1% of the
/// principal per day, but only in the report. The stored debt is
/// unchanged, so repaying it still clears the loan.
#[test]
fn overdue_penalty_is_computed_not_stored() {
    let engine = build();
    let alice = player(1);
    engine.request_loan(alice, 1000).unwrap();

    engine.advance_days(35); // 5 days past the 30-day term

    let status = engine.loan_status(alice).unwrap();
    assert!(status.overdue);
    assert_eq!(status.overdue_days, 5);
    assert_eq!(status.remaining_owed, 1100 + 5); // floor(1000 × 0.001 × 5)
    assert_eq!(status.remaining_days, 0);

    // The penalty was never folded into the stored debt.
    engine.credit(alice, 100).unwrap();
    let paid = engine.repay_loan(alice, 2000).unwrap();
    assert_eq!(paid, 1100);
    assert!(engine.loan_status(alice).is_none());
}

/// Loan issuance feeds the aggregate counters.
#[test]
fn loans_feed_the_stats() {
    let engine = build();
    engine.request_loan(player(1), 1000).unwrap();
    engine.request_loan(player(2), 2000).unwrap();

    let stats = engine.stats();
    assert_eq!(stats.total_loans_issued, 2);
    assert_eq!(stats.total_loan_value, 3000);
    assert_eq!(stats.average_loan_amount(), 1500.0);
}
