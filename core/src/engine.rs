//! The economy engine — the owning facade over the ledger, the stock
//! market and the auction house.
//!
//! SWEEP ORDER (fixed, documented, never reordered — the host invokes
//! `run_daily_sweeps` once per simulated day, or the individual sweeps
//! on its own cadence):
//!   1. reset_daily_claims
//!   2. apply_interest
//!   3. update_all_prices
//!   4. distribute_dividends
//!   5. sweep_expired_auctions
//!
//! RULES:
//!   - The engine owns no threads and performs no scheduling; the host
//!     advances the clock and fires the sweeps.
//!   - Every operation stamps its records from the engine clock.
//!   - Snapshots replace the entire state; there is no partial merge.

use crate::{
    auction::{Auction, AuctionEngine, SettlementOutcome},
    clock::SimClock,
    command::PlayerCommand,
    config::EconomyConfig,
    error::EconomyResult,
    ledger::{LedgerEngine, LoanStatus},
    market::{StockMarketEngine, TradeReceipt},
    money::{EconomyStats, Transaction},
    rng::RngBank,
    snapshot::EconomySnapshot,
    stock::Stock,
    types::{AuctionId, Coins, PlayerId},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct EconomyEngine {
    config: Arc<EconomyConfig>,
    seed: u64,
    clock: Mutex<SimClock>,
    ledger: LedgerEngine,
    market: StockMarketEngine,
    auctions: AuctionEngine,
}

impl EconomyEngine {
    /// An engine with an empty exchange. Use `build` for the standard
    /// catalog.
    pub fn new(config: EconomyConfig, seed: u64, clock: SimClock) -> Self {
        let config = Arc::new(config);
        let rng_bank = RngBank::new(seed);
        let now = clock.now();
        Self {
            ledger: LedgerEngine::new(config.clone(), now),
            market: StockMarketEngine::new(config.clone(), &rng_bank),
            auctions: AuctionEngine::new(),
            clock: Mutex::new(clock),
            config,
            seed,
        }
    }

    /// Build a fully stocked engine: default listings installed.
    pub fn build(config: EconomyConfig, seed: u64, clock: SimClock) -> Self {
        let engine = Self::new(config, seed, clock);
        let now = engine.now();
        engine.market.install_default_listings(now);
        engine
    }

    /// Rebuild an engine from a snapshot (full replacement).
    pub fn from_snapshot(config: EconomyConfig, seed: u64, snapshot: EconomySnapshot) -> Self {
        let engine = Self::new(config, seed, snapshot.clock.clone());
        engine.import_state(snapshot);
        engine
    }

    // ── Clock ──────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.lock().now()
    }

    pub fn advance_hours(&self, hours: i64) -> DateTime<Utc> {
        self.clock.lock().advance_hours(hours)
    }

    pub fn advance_days(&self, days: i64) -> DateTime<Utc> {
        self.clock.lock().advance_days(days)
    }

    pub fn set_time(&self, now: DateTime<Utc>) {
        self.clock.lock().set(now);
    }

    // ── Component access ───────────────────────────────────────

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    pub fn market(&self) -> &StockMarketEngine {
        &self.market
    }

    pub fn auctions(&self) -> &AuctionEngine {
        &self.auctions
    }

    // ── Ledger surface ─────────────────────────────────────────

    pub fn balance(&self, player: PlayerId) -> Coins {
        self.ledger.balance(player)
    }

    pub fn savings(&self, player: PlayerId) -> Coins {
        self.ledger.savings(player)
    }

    pub fn initialize_player(&self, player: PlayerId) -> bool {
        self.ledger.initialize_player(player, self.now())
    }

    pub fn credit(&self, player: PlayerId, amount: Coins) -> EconomyResult<()> {
        self.ledger.credit(player, amount, self.now())
    }

    pub fn debit(&self, player: PlayerId, amount: Coins) -> EconomyResult<()> {
        self.ledger.debit(player, amount, self.now())
    }

    /// Returns the tax withheld from the receiver's side.
    pub fn transfer(
        &self,
        from: PlayerId,
        to: PlayerId,
        amount: Coins,
        memo: &str,
    ) -> EconomyResult<Coins> {
        self.ledger.transfer(from, to, amount, memo, self.now())
    }

    pub fn deposit(&self, player: PlayerId, amount: Coins) -> EconomyResult<()> {
        self.ledger.deposit(player, amount, self.now())
    }

    pub fn withdraw(&self, player: PlayerId, amount: Coins) -> EconomyResult<()> {
        self.ledger.withdraw(player, amount, self.now())
    }

    pub fn request_loan(&self, player: PlayerId, amount: Coins) -> EconomyResult<LoanStatus> {
        self.ledger.request_loan(player, amount, self.now())
    }

    /// Returns the amount actually debited (capped at the owed total).
    pub fn repay_loan(&self, player: PlayerId, amount: Coins) -> EconomyResult<Coins> {
        self.ledger.repay_loan(player, amount, self.now())
    }

    pub fn loan_status(&self, player: PlayerId) -> Option<LoanStatus> {
        self.ledger.loan_of(player, self.now())
    }

    pub fn claim_daily_reward(&self, player: PlayerId) -> EconomyResult<Coins> {
        self.ledger.claim_daily_reward(player, self.now())
    }

    pub fn history(&self, player: PlayerId) -> Vec<Transaction> {
        self.ledger.history(player)
    }

    pub fn stats(&self) -> EconomyStats {
        self.ledger.stats()
    }

    // ── Market surface ─────────────────────────────────────────

    pub fn buy_stock(
        &self,
        player: PlayerId,
        symbol: &str,
        shares: i64,
    ) -> EconomyResult<TradeReceipt> {
        self.market.buy(&self.ledger, player, symbol, shares, self.now())
    }

    pub fn sell_stock(
        &self,
        player: PlayerId,
        symbol: &str,
        shares: i64,
    ) -> EconomyResult<TradeReceipt> {
        self.market.sell(&self.ledger, player, symbol, shares, self.now())
    }

    pub fn collect_dividends(&self, player: PlayerId) -> EconomyResult<Coins> {
        self.market.collect_dividends(&self.ledger, player, self.now())
    }

    pub fn quote(&self, symbol: &str) -> Option<Stock> {
        self.market.stock(symbol)
    }

    // ── Auction surface ────────────────────────────────────────

    pub fn open_auction(
        &self,
        seller: PlayerId,
        item: &str,
        starting_bid: Coins,
        duration_hours: i64,
    ) -> EconomyResult<AuctionId> {
        self.auctions
            .open(seller, item, starting_bid, duration_hours, self.now())
    }

    pub fn place_bid(&self, id: AuctionId, bidder: PlayerId, amount: Coins) -> EconomyResult<()> {
        self.auctions.bid(id, bidder, amount, self.now())
    }

    pub fn settle_auction(&self, id: AuctionId) -> EconomyResult<SettlementOutcome> {
        self.auctions.settle(&self.ledger, id, self.now())
    }

    pub fn auction(&self, id: AuctionId) -> Option<Auction> {
        self.auctions.auction(id)
    }

    pub fn active_auctions(&self) -> Vec<Auction> {
        self.auctions.active_auctions(self.now())
    }

    // ── Sweeps (host-invoked) ──────────────────────────────────

    pub fn apply_interest(&self) -> usize {
        self.ledger.apply_interest(self.now())
    }

    pub fn update_all_prices(&self) {
        self.market.update_all_prices(self.now());
    }

    pub fn distribute_dividends(&self) -> Coins {
        self.market.distribute_dividends(&self.ledger, self.now())
    }

    pub fn reset_daily_claims(&self) {
        self.ledger.reset_daily_claims();
    }

    pub fn sweep_expired_auctions(&self) -> Vec<(AuctionId, SettlementOutcome)> {
        self.auctions.sweep_expired(&self.ledger, self.now())
    }

    /// Convenience for hosts on a one-day cadence: every sweep, in the
    /// documented order.
    pub fn run_daily_sweeps(&self) {
        self.reset_daily_claims();
        self.apply_interest();
        self.update_all_prices();
        self.distribute_dividends();
        self.sweep_expired_auctions();
    }

    // ── Persistence contract ───────────────────────────────────

    pub fn export_state(&self) -> EconomySnapshot {
        let (players, stats, txn_seq) = self.ledger.export_tables();
        let (stocks, portfolios, market_open, trade_seq) = self.market.export_tables();
        let (auctions, next_auction_id) = self.auctions.export_tables();
        EconomySnapshot {
            saved_at: self.now(),
            clock: self.clock.lock().clone(),
            players,
            stats,
            txn_seq,
            stocks,
            portfolios,
            market_open,
            trade_seq,
            auctions,
            next_auction_id,
        }
    }

    /// Replace the entire engine state with the snapshot's tables.
    pub fn import_state(&self, snapshot: EconomySnapshot) {
        self.ledger
            .import_tables(snapshot.players, snapshot.stats, snapshot.txn_seq);
        self.market.import_tables(
            snapshot.stocks,
            snapshot.portfolios,
            snapshot.market_open,
            snapshot.trade_seq,
        );
        self.auctions
            .import_tables(snapshot.auctions, snapshot.next_auction_id);
        *self.clock.lock() = snapshot.clock;
    }

    // ── Command dispatch ───────────────────────────────────────

    /// Execute one host command and render the reply as JSON.
    pub fn execute(&self, command: PlayerCommand) -> EconomyResult<Value> {
        match command {
            PlayerCommand::Balance { player } => Ok(json!({
                "balance": self.balance(player),
                "savings": self.savings(player),
            })),
            PlayerCommand::InitializePlayer { player } => Ok(json!({
                "initialized": self.initialize_player(player),
                "balance": self.balance(player),
            })),
            PlayerCommand::Transfer { from, to, amount, memo } => {
                let tax = self.transfer(from, to, amount, &memo)?;
                Ok(json!({ "sent": amount, "tax": tax }))
            }
            PlayerCommand::Deposit { player, amount } => {
                self.deposit(player, amount)?;
                Ok(json!({ "savings": self.savings(player) }))
            }
            PlayerCommand::Withdraw { player, amount } => {
                self.withdraw(player, amount)?;
                Ok(json!({ "balance": self.balance(player) }))
            }
            PlayerCommand::RequestLoan { player, amount } => {
                let status = self.request_loan(player, amount)?;
                Ok(serde_json::to_value(status)?)
            }
            PlayerCommand::RepayLoan { player, amount } => {
                let paid = self.repay_loan(player, amount)?;
                Ok(json!({
                    "paid": paid,
                    "remaining": self.loan_status(player).map(|l| l.remaining_owed),
                }))
            }
            PlayerCommand::LoanStatus { player } => {
                Ok(serde_json::to_value(self.loan_status(player))?)
            }
            PlayerCommand::ClaimDaily { player } => {
                let reward = self.claim_daily_reward(player)?;
                Ok(json!({ "reward": reward }))
            }
            PlayerCommand::History { player } => Ok(serde_json::to_value(self.history(player))?),
            PlayerCommand::Stats => Ok(serde_json::to_value(self.stats())?),

            PlayerCommand::BuyStock { player, symbol, shares } => {
                let receipt = self.buy_stock(player, &symbol, shares)?;
                Ok(serde_json::to_value(receipt)?)
            }
            PlayerCommand::SellStock { player, symbol, shares } => {
                let receipt = self.sell_stock(player, &symbol, shares)?;
                Ok(serde_json::to_value(receipt)?)
            }
            PlayerCommand::Quote { symbol } => Ok(serde_json::to_value(self.quote(&symbol))?),
            PlayerCommand::SearchStocks { keyword } => {
                Ok(serde_json::to_value(self.market.search(&keyword))?)
            }
            PlayerCommand::TopGainers { limit } => {
                Ok(serde_json::to_value(self.market.top_gainers(limit))?)
            }
            PlayerCommand::TopLosers { limit } => {
                Ok(serde_json::to_value(self.market.top_losers(limit))?)
            }
            PlayerCommand::MarketSummary => Ok(serde_json::to_value(self.market.summary())?),
            PlayerCommand::PortfolioView { player } => Ok(json!({
                "holdings": self.market.holding_details(player),
                "value": self.market.portfolio_value(player),
                "profit_loss": self.market.profit_loss(player),
                "return_rate": self.market.return_rate(player),
                "diversification": self.market.diversification(player),
            })),
            PlayerCommand::CollectDividends { player } => {
                let paid = self.collect_dividends(player)?;
                Ok(json!({ "dividends": paid }))
            }

            PlayerCommand::OpenAuction { seller, item, starting_bid, duration_hours } => {
                let id = self.open_auction(seller, &item, starting_bid, duration_hours)?;
                Ok(json!({ "auction_id": id }))
            }
            PlayerCommand::Bid { auction_id, bidder, amount } => {
                self.place_bid(auction_id, bidder, amount)?;
                Ok(json!({ "auction_id": auction_id, "current_bid": amount }))
            }
            PlayerCommand::AuctionInfo { auction_id } => {
                Ok(serde_json::to_value(self.auction(auction_id))?)
            }
            PlayerCommand::ActiveAuctions => Ok(serde_json::to_value(self.active_auctions())?),
        }
    }
}
