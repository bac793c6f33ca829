//! Daily reward tests — once per calendar day, resettable by the
//! host's daily sweep, and gated by configuration.

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

#[test]
fn claim_succeeds_once_per_day() {
    let engine = build();
    let alice = player(1);

    assert_eq!(engine.claim_daily_reward(alice).unwrap(), 50);
    assert_eq!(engine.balance(alice), 50);

    assert!(matches!(
        engine.claim_daily_reward(alice),
        Err(EconomyError::AlreadyClaimed)
    ));
    assert_eq!(engine.balance(alice), 50);
}

/// A new calendar day re-enables the claim even without a reset sweep.
#[test]
fn new_day_reenables_the_claim() {
    let engine = build();
    let alice = player(1);
    engine.claim_daily_reward(alice).unwrap();

    engine.advance_days(1);

    assert_eq!(engine.claim_daily_reward(alice).unwrap(), 50);
    assert_eq!(engine.balance(alice), 100);
}

/// The host's reset sweep clears the claimed flag for every account.
#[test]
fn reset_sweep_clears_claims() {
    let engine = build();
    let alice = player(1);
    let bob = player(2);
    engine.claim_daily_reward(alice).unwrap();
    engine.claim_daily_reward(bob).unwrap();

    engine.reset_daily_claims();

    assert!(engine.claim_daily_reward(alice).is_ok());
    assert!(engine.claim_daily_reward(bob).is_ok());
}

/// Claims fail outright while the feature is disabled.
#[test]
fn disabled_rewards_always_fail() {
    let config = EconomyConfig {
        daily_rewards_enabled: false,
        ..EconomyConfig::default()
    };
    let engine = EconomyEngine::new(config, 42, SimClock::at_epoch());
    let alice = player(1);

    assert!(matches!(
        engine.claim_daily_reward(alice),
        Err(EconomyError::RewardsDisabled)
    ));
    assert_eq!(engine.balance(alice), 0);
    assert!(engine.history(alice).is_empty());
}
