//! Price evolution tests — clamping, the price floor, bounded history,
//! day rollover and seed determinism.

use economy_core::{
    clock::SimClock,
    config::EconomyConfig,
    engine::EconomyEngine,
    rng::{RngSlot, StreamRng},
    stock::Stock,
};

fn build(seed: u64) -> EconomyEngine {
    EconomyEngine::build(EconomyConfig::default(), seed, SimClock::at_epoch())
}

/// One stochastic step never moves a price more than ±20% (modulo the
/// final rounding to whole coins).
#[test]
fn single_steps_stay_within_the_swing_clamp() {
    let cfg = EconomyConfig::default();
    let mut clock = SimClock::at_epoch();
    let mut rng = StreamRng::new(7, RngSlot::PriceWalk as u64);
    let mut stock = Stock::new(
        "CLMP".into(),
        "Clamp Test".into(),
        "technology".into(),
        1000,
        10_000,
        0.15, // hot stock; raw gaussians frequently exceed the clamp
        clock.now(),
    );

    for _ in 0..300 {
        let before = stock.current_price;
        clock.advance_hours(1);
        stock.update_price(&mut rng, &cfg, clock.now());
        let after = stock.current_price as f64;
        let lo = before as f64 * 0.8 - 0.5;
        let hi = before as f64 * 1.2 + 0.5;
        assert!(
            after >= lo && after <= hi,
            "price moved {before} -> {after}, outside [{lo}, {hi}]"
        );
    }
}

/// Prices bottom out at 1 coin, both on the walk and on sell pressure.
#[test]
fn price_never_falls_below_one() {
    let cfg = EconomyConfig::default();
    let mut clock = SimClock::at_epoch();
    let mut rng = StreamRng::new(13, RngSlot::PriceWalk as u64);
    let mut stock = Stock::new(
        "PENY".into(),
        "Penny Holdings".into(),
        "mining".into(),
        1,
        1000,
        0.20,
        clock.now(),
    );

    for _ in 0..200 {
        clock.advance_hours(1);
        stock.update_price(&mut rng, &cfg, clock.now());
    }
    assert!(stock.history.iter().all(|s| s.price >= 1));

    // Sell pressure on a 1-coin stock keeps the floor.
    stock.apply_trade_impact(-1, 10, cfg.price_history_cap, clock.now());
    assert_eq!(stock.current_price, 1);
}

/// The sample ring keeps the most recent 1000 entries.
#[test]
fn history_is_bounded() {
    let cfg = EconomyConfig::default();
    let mut clock = SimClock::at_epoch();
    let mut rng = StreamRng::new(21, RngSlot::PriceWalk as u64);
    let mut stock = Stock::new(
        "RING".into(),
        "Ring Buffer Co".into(),
        "technology".into(),
        100,
        1000,
        0.05,
        clock.now(),
    );

    for _ in 0..1100 {
        clock.advance_hours(1);
        stock.update_price(&mut rng, &cfg, clock.now());
    }
    assert_eq!(stock.history.len(), cfg.price_history_cap);
}

/// Crossing a calendar day resets the open/high/low band to the first
/// price of the new day; further samples only widen it.
#[test]
fn day_rollover_resets_the_intraday_band() {
    let cfg = EconomyConfig::default();
    let mut clock = SimClock::at_epoch();
    let mut stock = Stock::new(
        "DAYS".into(),
        "Daybreak Ltd".into(),
        "energy".into(),
        100,
        1000,
        0.05,
        clock.now(),
    );

    clock.advance_hours(1);
    stock.set_price_with_volume(120, 10, cfg.price_history_cap, clock.now());
    assert_eq!(stock.high_price, 120);
    assert_eq!(stock.low_price, 100);

    clock.advance_days(1);
    stock.set_price_with_volume(110, 10, cfg.price_history_cap, clock.now());
    assert_eq!(stock.open_price, 110);
    assert_eq!(stock.high_price, 110);
    assert_eq!(stock.low_price, 110);

    clock.advance_hours(1);
    stock.set_price_with_volume(90, 10, cfg.price_history_cap, clock.now());
    assert_eq!(stock.open_price, 110);
    assert_eq!(stock.low_price, 90);
}

/// The moving average covers the last N samples and falls back to the
/// current price when history is short.
#[test]
fn moving_average_tracks_recent_samples() {
    let cfg = EconomyConfig::default();
    let mut clock = SimClock::at_epoch();
    let mut stock = Stock::new(
        "AVGS".into(),
        "Average Co".into(),
        "technology".into(),
        100,
        1000,
        0.05,
        clock.now(),
    );
    for price in [110, 120, 130] {
        clock.advance_hours(1);
        stock.set_price_with_volume(price, 10, cfg.price_history_cap, clock.now());
    }

    // Samples are 100, 110, 120, 130.
    assert_eq!(stock.moving_average(4), 115);
    assert_eq!(stock.moving_average(2), 125);
    assert_eq!(stock.moving_average(100), stock.current_price);
}

/// Same seed, same tick sequence, same prices everywhere. Determinism
/// is what makes the walk testable and runs replayable.
#[test]
fn same_seed_walks_identically() {
    let a = build(0xDEAD_BEEF);
    let b = build(0xDEAD_BEEF);

    for _ in 0..30 {
        a.advance_hours(6);
        a.update_all_prices();
        b.advance_hours(6);
        b.update_all_prices();
    }

    for stock_a in a.market().all_stocks() {
        let stock_b = b.quote(&stock_a.symbol).unwrap();
        assert_eq!(
            stock_a.current_price, stock_b.current_price,
            "{} diverged between identical runs",
            stock_a.symbol
        );
        assert_eq!(stock_a.history.len(), stock_b.history.len());
    }
}

/// Different seeds must be observably different.
#[test]
fn different_seeds_diverge() {
    let a = build(1);
    let b = build(2);

    for _ in 0..10 {
        a.advance_hours(6);
        a.update_all_prices();
        b.advance_hours(6);
        b.update_all_prices();
    }

    let diverged = a
        .market()
        .all_stocks()
        .iter()
        .any(|s| b.quote(&s.symbol).unwrap().current_price != s.current_price);
    assert!(diverged, "two seeds produced identical markets");
}
