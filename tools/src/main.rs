//! econ-runner: headless driver for the economy engine.
//!
//! Usage:
//!   econ-runner --seed 12345 --days 90 --players 8 --db economy.db
//!   econ-runner --ipc-mode
//!
//! In normal mode the runner simulates a population of players
//! trading, banking and auctioning for the given number of days, then
//! prints a summary and (if --db was given) shelves a snapshot.
//! In IPC mode it reads line-delimited JSON commands from stdin and
//! writes one JSON reply per line, so an external host can drive the
//! engine directly.

use anyhow::Result;
use economy_core::{
    clock::SimClock,
    command::PlayerCommand,
    config::EconomyConfig,
    engine::EconomyEngine,
    store::SnapshotStore,
    types::PlayerId,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    AdvanceHours { hours: i64 },
    RunSweeps,
    Command {
        #[serde(flatten)]
        cmd: PlayerCommand,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 90u64);
    let players = parse_arg(&args, "--players", 8usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].clone());

    let store = match &db {
        Some(path) => {
            let store = SnapshotStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    // Resume from the latest shelved snapshot when one loads cleanly;
    // anything corrupt or missing means a fresh engine.
    let engine = match store.as_ref().map(|s| s.load_latest()) {
        Some(Ok(Some(snapshot))) => {
            log::info!("resuming from snapshot saved at {}", snapshot.saved_at);
            EconomyEngine::from_snapshot(EconomyConfig::default(), seed, snapshot)
        }
        Some(Err(err)) => {
            log::warn!("snapshot load failed ({err}), starting fresh");
            EconomyEngine::build(EconomyConfig::default(), seed, SimClock::at_epoch())
        }
        _ => EconomyEngine::build(EconomyConfig::default(), seed, SimClock::at_epoch()),
    };

    if ipc_mode {
        run_ipc_loop(&engine)?;
    } else {
        println!("econ-runner");
        println!("  seed:    {seed}");
        println!("  days:    {days}");
        println!("  players: {players}");
        println!();
        run_population(&engine, seed, days, players);
        print_summary(&engine, players, seed);
    }

    if let Some(store) = &store {
        store.save_snapshot(&engine.export_state())?;
        log::info!("snapshot shelved to {}", db.as_deref().unwrap_or("?"));
    }

    Ok(())
}

/// Deterministic player ids so repeated runs line up.
fn player_id(seed: u64, index: usize) -> PlayerId {
    PlayerId::from_u128(((seed as u128) << 32) | index as u128)
}

fn run_population(engine: &EconomyEngine, seed: u64, days: u64, players: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<PlayerId> = (0..players).map(|i| player_id(seed, i)).collect();
    let symbols: Vec<String> = engine
        .market()
        .all_stocks()
        .into_iter()
        .map(|s| s.symbol)
        .collect();

    for &id in &ids {
        engine.initialize_player(id);
    }

    for day in 1..=days {
        engine.reset_daily_claims();

        for &id in &ids {
            if rng.gen_bool(0.8) {
                let _ = engine.claim_daily_reward(id);
            }
            // Banking: park or pull some coins.
            if rng.gen_bool(0.3) {
                let balance = engine.balance(id);
                if balance > 20 {
                    let _ = engine.deposit(id, balance / 4);
                }
            } else if rng.gen_bool(0.2) {
                let savings = engine.savings(id);
                if savings > 0 {
                    let _ = engine.withdraw(id, savings / 2);
                }
            }
            // The occasional loan, repaid when flush.
            if rng.gen_bool(0.05) && engine.loan_status(id).is_none() {
                let _ = engine.request_loan(id, rng.gen_range(100..2000));
            } else if let Some(loan) = engine.loan_status(id) {
                let balance = engine.balance(id);
                if balance > loan.remaining_owed {
                    let _ = engine.repay_loan(id, loan.remaining_owed);
                }
            }
            // Trading.
            if !symbols.is_empty() && rng.gen_bool(0.5) {
                let symbol = &symbols[rng.gen_range(0..symbols.len())];
                if rng.gen_bool(0.6) {
                    let _ = engine.buy_stock(id, symbol, rng.gen_range(1..10));
                } else {
                    let _ = engine.sell_stock(id, symbol, rng.gen_range(1..10));
                }
            }
            // Transfers between neighbors.
            if players > 1 && rng.gen_bool(0.25) {
                let other = ids[rng.gen_range(0..ids.len())];
                let _ = engine.transfer(id, other, rng.gen_range(1..50), "gift");
            }
        }

        // A rolling auction every few days, with competing bids.
        if day % 5 == 0 && players > 2 {
            let seller = ids[rng.gen_range(0..ids.len())];
            if let Ok(auction_id) =
                engine.open_auction(seller, "rare artifact", rng.gen_range(10..100), 24)
            {
                for _ in 0..3 {
                    let bidder = ids[rng.gen_range(0..ids.len())];
                    if let Some(auction) = engine.auction(auction_id) {
                        let _ = engine.place_bid(
                            auction_id,
                            bidder,
                            auction.minimum_bid() + rng.gen_range(0..25),
                        );
                    }
                }
            }
        }

        // Four price ticks per simulated day, then the daily sweeps.
        for _ in 0..4 {
            engine.advance_hours(6);
            engine.update_all_prices();
        }
        engine.apply_interest();
        if day % 7 == 0 {
            engine.distribute_dividends();
        }
        engine.sweep_expired_auctions();
    }
}

fn print_summary(engine: &EconomyEngine, players: usize, seed: u64) {
    let stats = engine.stats();
    let summary = engine.market().summary();

    println!("── end of run ────────────────────────────");
    println!("  transfers:      {}", stats.total_transactions);
    println!("  gross value:    {}", stats.total_transaction_value);
    println!("  tax collected:  {}", stats.total_tax_collected);
    println!("  loans issued:   {}", stats.total_loans_issued);
    println!("  interest paid:  {}", stats.total_interest_paid);
    println!("  auctions done:  {}", stats.total_auctions_completed);
    println!();
    println!(
        "  market: {} listed, {} up / {} down / {} flat, index {}",
        summary.listed, summary.advancers, summary.decliners, summary.unchanged, summary.index
    );
    println!("  market cap: {}", summary.total_market_cap);

    println!();
    println!("  top gainers:");
    for stock in engine.market().top_gainers(3) {
        println!(
            "    {:<6} {:>6} ({:+.2}%)",
            stock.symbol,
            stock.current_price,
            stock.price_change_percent()
        );
    }

    println!();
    println!("  players:");
    for index in 0..players {
        let id = player_id(seed, index);
        println!(
            "    #{index}: {} liquid, {} saved, portfolio {}",
            engine.balance(id),
            engine.savings(id),
            engine.market().portfolio_value(id)
        );
    }
}

fn run_ipc_loop(engine: &EconomyEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(err) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": err.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match command {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(serde_json::json!({
                "now": engine.now().to_rfc3339(),
                "stats": engine.stats(),
                "market": engine.market().summary(),
                "active_auctions": engine.active_auctions().len(),
            })),
            IpcCommand::AdvanceHours { hours } => {
                let now = engine.advance_hours(hours);
                Ok(serde_json::json!({ "now": now.to_rfc3339() }))
            }
            IpcCommand::RunSweeps => {
                engine.run_daily_sweeps();
                Ok(serde_json::json!({ "ok": true }))
            }
            IpcCommand::Command { cmd } => engine.execute(cmd),
        };

        let line = match reply {
            Ok(value) => serde_json::json!({ "ok": value }),
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
