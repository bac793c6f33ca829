//! The stock market engine — trading, fees, portfolios, dividends and
//! market-wide queries.
//!
//! RULES:
//!   - Every coin moves through the `LedgerEngine`; this engine only
//!     owns stocks and portfolios.
//!   - Lock order is stock before portfolio. Valuation and dividend
//!     paths snapshot prices first so they never hold a portfolio lock
//!     while reaching for a stock.
//!   - Trading requires the market to be open; the price walk and
//!     dividend distribution run regardless of the open flag.

use crate::{
    config::EconomyConfig,
    error::{EconomyError, EconomyResult},
    ledger::LedgerEngine,
    money::TransactionKind,
    rng::{RngBank, RngSlot, StreamRng},
    stock::Stock,
    types::{canonical_symbol, Coins, PlayerId},
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// ── Portfolio model ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    Buy,
    Sell,
    Dividend,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Dividend => "dividend",
        }
    }
}

/// One entry in a portfolio's append-only trade log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTrade {
    pub id: String,
    pub symbol: String,
    pub kind: TradeKind,
    pub shares: i64,
    pub price_per_share: Coins,
    pub total: Coins,
    pub at: DateTime<Utc>,
}

/// A position in one stock: share count plus weighted-average cost
/// basis (tracked as the total cost of the open position).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Holding {
    pub shares: i64,
    pub total_cost: Coins,
}

impl Holding {
    pub fn add(&mut self, shares: i64, price_per_share: Coins) {
        self.shares += shares;
        self.total_cost += shares * price_per_share;
    }

    /// Remove shares, reducing the recorded cost basis proportionally.
    pub fn remove(&mut self, shares_out: i64) {
        if shares_out >= self.shares {
            self.shares = 0;
            self.total_cost = 0;
        } else {
            let cost_per_share = self.total_cost as f64 / self.shares as f64;
            self.shares -= shares_out;
            self.total_cost = (self.shares as f64 * cost_per_share) as Coins;
        }
    }

    pub fn average_price(&self) -> Coins {
        if self.shares > 0 {
            self.total_cost / self.shares
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub holdings: HashMap<String, Holding>,
    pub trades: Vec<StockTrade>,
    pub total_invested: Coins,
    pub total_dividends: Coins,
}

impl Portfolio {
    fn record_buy(&mut self, symbol: &str, shares: i64, price: Coins, trade: StockTrade) {
        self.holdings.entry(symbol.to_string()).or_default().add(shares, price);
        self.total_invested += shares * price;
        self.trades.push(trade);
    }

    fn record_sell(&mut self, symbol: &str, shares: i64, trade: StockTrade) {
        if let Some(holding) = self.holdings.get_mut(symbol) {
            holding.remove(shares);
            if holding.shares == 0 {
                self.holdings.remove(symbol);
            }
        }
        self.trades.push(trade);
    }

    fn record_dividend(&mut self, amount: Coins, trade: StockTrade) {
        self.total_dividends += amount;
        self.trades.push(trade);
    }

    pub fn total_cost(&self) -> Coins {
        self.holdings.values().map(|h| h.total_cost).sum()
    }
}

// ── Query/result carriers ──────────────────────────────────────

/// What a completed trade cost (buy: `net` = gross + fees debited) or
/// returned (sell: `net` = gross − fees credited).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub symbol: String,
    pub shares: i64,
    pub price_per_share: Coins,
    pub gross: Coins,
    pub fees: Coins,
    pub net: Coins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingDetail {
    pub symbol: String,
    pub company: String,
    pub shares: i64,
    pub average_price: Coins,
    pub current_price: Coins,
    pub total_cost: Coins,
    pub current_value: Coins,
    pub profit_loss: Coins,
    pub return_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSummary {
    pub listed: usize,
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
    pub index: Coins,
    pub total_market_cap: Coins,
}

// ── Engine ─────────────────────────────────────────────────────

pub struct StockMarketEngine {
    config: Arc<EconomyConfig>,
    stocks: RwLock<HashMap<String, Arc<Mutex<Stock>>>>,
    portfolios: RwLock<HashMap<PlayerId, Arc<Mutex<Portfolio>>>>,
    open: AtomicBool,
    rng: Mutex<StreamRng>,
    trade_seq: AtomicU64,
}

impl StockMarketEngine {
    pub fn new(config: Arc<EconomyConfig>, rng_bank: &RngBank) -> Self {
        Self {
            config,
            stocks: RwLock::new(HashMap::new()),
            portfolios: RwLock::new(HashMap::new()),
            open: AtomicBool::new(true),
            rng: Mutex::new(rng_bank.stream(RngSlot::PriceWalk)),
            trade_seq: AtomicU64::new(0),
        }
    }

    // ── Listings ───────────────────────────────────────────────

    pub fn list_stock(
        &self,
        symbol: &str,
        company: &str,
        industry: &str,
        initial_price: Coins,
        total_shares: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        let sym = canonical_symbol(symbol);
        let mut stocks = self.stocks.write();
        if stocks.contains_key(&sym) {
            return Err(EconomyError::SymbolAlreadyListed { symbol: sym });
        }
        let stock = Stock::new(
            sym.clone(),
            company.to_string(),
            industry.to_string(),
            initial_price,
            total_shares,
            self.config.default_volatility,
            now,
        );
        log::info!("listed {sym} ({company}) at {initial_price}");
        stocks.insert(sym, Arc::new(Mutex::new(stock)));
        Ok(())
    }

    /// Seed the exchange with the stock catalog the original world
    /// ships: 21 companies across 7 industries.
    pub fn install_default_listings(&self, now: DateTime<Utc>) {
        const LISTINGS: &[(&str, &str, &str, Coins, i64)] = &[
            ("NOVA", "Nova Systems", "technology", 150, 10_000),
            ("QNTM", "Quantum Circuits", "technology", 80, 15_000),
            ("ORBT", "Orbit Software", "technology", 200, 8_000),
            ("DIAM", "Diamond Extraction", "mining", 300, 5_000),
            ("FERR", "Ferrous Group", "mining", 50, 25_000),
            ("AURM", "Aurum Mining", "mining", 180, 12_000),
            ("CMNT", "Cement Works", "construction", 25, 40_000),
            ("TMBR", "Timberline Materials", "construction", 35, 30_000),
            ("MASN", "Masonry Engineering", "construction", 40, 28_000),
            ("GRAN", "Granary Farms", "agriculture", 20, 50_000),
            ("ORCH", "Orchard Foods", "agriculture", 15, 60_000),
            ("TUBR", "Tuber Holdings", "agriculture", 18, 55_000),
            ("RAIL", "Railway Freight", "transport", 120, 15_000),
            ("HARB", "Harbor Shipping", "transport", 90, 18_000),
            ("CRRI", "Courier Express", "transport", 60, 22_000),
            ("COAL", "Coalfield Energy", "energy", 45, 35_000),
            ("GEOT", "Geothermal Power", "energy", 75, 20_000),
            ("WIND", "Windward Power", "energy", 55, 25_000),
            ("TUNE", "Tune Entertainment", "entertainment", 85, 16_000),
            ("PRSS", "Printing Press Media", "entertainment", 110, 12_000),
            ("ARTS", "Arts Collective", "entertainment", 95, 14_000),
        ];
        for (symbol, company, industry, price, shares) in LISTINGS {
            // Only fails on duplicates, which the constant table has none of.
            let _ = self.list_stock(symbol, company, industry, *price, *shares, now);
        }
        log::info!("default listings installed ({} symbols)", LISTINGS.len());
    }

    fn stock_entry(&self, symbol: &str) -> EconomyResult<Arc<Mutex<Stock>>> {
        let sym = canonical_symbol(symbol);
        self.stocks
            .read()
            .get(&sym)
            .cloned()
            .ok_or(EconomyError::UnknownSymbol { symbol: sym })
    }

    fn portfolio_entry(&self, player: PlayerId) -> Arc<Mutex<Portfolio>> {
        if let Some(entry) = self.portfolios.read().get(&player) {
            return entry.clone();
        }
        self.portfolios.write().entry(player).or_default().clone()
    }

    fn next_trade(
        &self,
        symbol: String,
        kind: TradeKind,
        shares: i64,
        price_per_share: Coins,
        total: Coins,
        at: DateTime<Utc>,
    ) -> StockTrade {
        let seq = self.trade_seq.fetch_add(1, Ordering::Relaxed) + 1;
        StockTrade {
            id: format!("STK-{seq:08}"),
            symbol,
            kind,
            shares,
            price_per_share,
            total,
            at,
        }
    }

    /// Commission on every trade, plus stamp tax on sales only.
    fn trading_fees(&self, amount: Coins, sell: bool) -> Coins {
        let commission = (amount / self.config.commission_divisor).max(1);
        let stamp_tax = if sell {
            amount / self.config.stamp_tax_divisor
        } else {
            0
        };
        commission + stamp_tax
    }

    // ── Trading ────────────────────────────────────────────────

    pub fn buy(
        &self,
        ledger: &LedgerEngine,
        player: PlayerId,
        symbol: &str,
        shares: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<TradeReceipt> {
        if !self.is_open() {
            return Err(EconomyError::MarketClosed);
        }
        if shares <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.stock_entry(symbol)?;
        let mut stock = entry.lock();
        if !stock.active {
            return Err(EconomyError::UnknownSymbol {
                symbol: stock.symbol.clone(),
            });
        }

        let price = stock.current_price;
        let gross = shares * price;
        let fees = self.trading_fees(gross, false);
        let total = gross + fees;

        if !stock.take_shares(shares) {
            return Err(EconomyError::SharesUnavailable {
                available: stock.available_shares,
            });
        }
        let description = format!("buy {shares} {} @ {price}", stock.symbol);
        if let Err(err) =
            ledger.debit_as(player, total, TransactionKind::StockBuy, &description, now)
        {
            // Put the reserved shares back; nothing else has happened yet.
            stock.return_shares(shares);
            return Err(err);
        }

        let symbol = stock.symbol.clone();
        let trade = self.next_trade(symbol.clone(), TradeKind::Buy, shares, price, gross, now);
        self.portfolio_entry(player)
            .lock()
            .record_buy(&symbol, shares, price, trade);

        stock.apply_trade_impact(1, shares, self.config.price_history_cap, now);
        log::debug!("{player} bought {shares} {symbol} for {total} ({fees} fees)");

        Ok(TradeReceipt {
            symbol,
            shares,
            price_per_share: price,
            gross,
            fees,
            net: total,
        })
    }

    pub fn sell(
        &self,
        ledger: &LedgerEngine,
        player: PlayerId,
        symbol: &str,
        shares: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<TradeReceipt> {
        if !self.is_open() {
            return Err(EconomyError::MarketClosed);
        }
        if shares <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.stock_entry(symbol)?;
        let mut stock = entry.lock();
        if !stock.active {
            return Err(EconomyError::UnknownSymbol {
                symbol: stock.symbol.clone(),
            });
        }

        let price = stock.current_price;
        let gross = shares * price;
        let fees = self.trading_fees(gross, true);
        let net = gross - fees;
        let symbol = stock.symbol.clone();

        {
            let pf_entry = self.portfolio_entry(player);
            let mut portfolio = pf_entry.lock();
            let held = portfolio.holdings.get(&symbol).map(|h| h.shares).unwrap_or(0);
            if held < shares {
                return Err(EconomyError::InsufficientHoldings);
            }
            let trade = self.next_trade(symbol.clone(), TradeKind::Sell, shares, price, gross, now);
            portfolio.record_sell(&symbol, shares, trade);
        }

        if net > 0 {
            let description = format!("sell {shares} {symbol} @ {price}");
            ledger.credit_as(player, net, TransactionKind::StockSell, &description, now)?;
        }

        stock.return_shares(shares);
        stock.apply_trade_impact(-1, shares, self.config.price_history_cap, now);
        log::debug!("{player} sold {shares} {symbol} for {net} net ({fees} fees)");

        Ok(TradeReceipt {
            symbol,
            shares,
            price_per_share: price,
            gross,
            fees,
            net,
        })
    }

    // ── Dividends ──────────────────────────────────────────────

    /// Pay out dividends on every holding of one player. The yield is
    /// derived from each stock's volatility; the payout goes through
    /// the ledger and is recorded in the portfolio's trade log.
    pub fn collect_dividends(
        &self,
        ledger: &LedgerEngine,
        player: PlayerId,
        now: DateTime<Utc>,
    ) -> EconomyResult<Coins> {
        let prices = self.price_and_yield_table();
        let pf_entry = self.portfolio_entry(player);
        let mut portfolio = pf_entry.lock();

        let mut total: Coins = 0;
        let holdings: Vec<(String, i64)> = portfolio
            .holdings
            .iter()
            .map(|(sym, h)| (sym.clone(), h.shares))
            .collect();
        for (symbol, shares) in holdings {
            let Some((price, dividend_yield)) = prices.get(&symbol) else {
                continue;
            };
            let dividend = ((shares * price) as f64 * dividend_yield) as Coins;
            if dividend <= 0 {
                continue;
            }
            let trade = self.next_trade(symbol, TradeKind::Dividend, 0, *price, dividend, now);
            portfolio.record_dividend(dividend, trade);
            total += dividend;
        }
        drop(portfolio);

        if total > 0 {
            ledger.credit_as(player, total, TransactionKind::Dividend, "stock dividends", now)?;
        }
        Ok(total)
    }

    /// Sweep: dividends for every portfolio. Runs whether or not the
    /// market is open.
    pub fn distribute_dividends(&self, ledger: &LedgerEngine, now: DateTime<Utc>) -> Coins {
        let mut players: Vec<PlayerId> = self.portfolios.read().keys().copied().collect();
        players.sort();
        let mut total: Coins = 0;
        for player in players {
            match self.collect_dividends(ledger, player, now) {
                Ok(paid) => total += paid,
                Err(err) => log::warn!("dividend payout to {player} failed: {err}"),
            }
        }
        log::info!("dividend sweep paid {total} coins");
        total
    }

    /// Snapshot of (price, yield) per listed stock, used so valuation
    /// paths never hold a portfolio lock while locking a stock.
    fn price_and_yield_table(&self) -> HashMap<String, (Coins, f64)> {
        self.stocks
            .read()
            .iter()
            .map(|(sym, entry)| {
                let stock = entry.lock();
                (sym.clone(), (stock.current_price, stock.dividend_yield()))
            })
            .collect()
    }

    // ── Price evolution ────────────────────────────────────────

    /// Sweep: one stochastic step for every active stock. Runs whether
    /// or not the market is open. Stocks are visited in symbol order so
    /// the same seed always deals the same draws to the same stocks.
    pub fn update_all_prices(&self, now: DateTime<Utc>) {
        let mut entries: Vec<(String, Arc<Mutex<Stock>>)> = self
            .stocks
            .read()
            .iter()
            .map(|(sym, entry)| (sym.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut rng = self.rng.lock();
        for (_, entry) in entries {
            entry.lock().update_price(&mut rng, &self.config, now);
        }
    }

    // ── Market state ───────────────────────────────────────────

    pub fn open_market(&self) {
        self.open.store(true, Ordering::Relaxed);
        log::info!("market opened");
    }

    pub fn close_market(&self) {
        self.open.store(false, Ordering::Relaxed);
        log::info!("market closed");
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn stock(&self, symbol: &str) -> Option<Stock> {
        let sym = canonical_symbol(symbol);
        self.stocks.read().get(&sym).map(|entry| entry.lock().clone())
    }

    fn active_stocks(&self) -> Vec<Stock> {
        self.stocks
            .read()
            .values()
            .map(|entry| entry.lock().clone())
            .filter(|s| s.active)
            .collect()
    }

    pub fn all_stocks(&self) -> Vec<Stock> {
        let mut stocks = self.active_stocks();
        stocks.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        stocks
    }

    /// Sorted by percent change descending; ties break on symbol.
    pub fn top_gainers(&self, limit: usize) -> Vec<Stock> {
        let mut stocks = self.active_stocks();
        stocks.sort_by(|a, b| {
            b.price_change_percent()
                .partial_cmp(&a.price_change_percent())
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        stocks.truncate(limit);
        stocks
    }

    /// Sorted by percent change ascending; ties break on symbol.
    pub fn top_losers(&self, limit: usize) -> Vec<Stock> {
        let mut stocks = self.active_stocks();
        stocks.sort_by(|a, b| {
            a.price_change_percent()
                .partial_cmp(&b.price_change_percent())
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        stocks.truncate(limit);
        stocks
    }

    /// Case-insensitive substring match over symbol, company name and
    /// industry tag.
    pub fn search(&self, keyword: &str) -> Vec<Stock> {
        let needle = keyword.to_lowercase();
        let mut found: Vec<Stock> = self
            .active_stocks()
            .into_iter()
            .filter(|s| {
                s.symbol.to_lowercase().contains(&needle)
                    || s.company.to_lowercase().contains(&needle)
                    || s.industry.to_lowercase().contains(&needle)
            })
            .collect();
        found.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        found
    }

    pub fn stocks_by_industry(&self, industry: &str) -> Vec<Stock> {
        let needle = industry.to_lowercase();
        let mut found: Vec<Stock> = self
            .active_stocks()
            .into_iter()
            .filter(|s| s.industry.to_lowercase() == needle)
            .collect();
        found.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        found
    }

    pub fn industries(&self) -> Vec<String> {
        let mut industries: Vec<String> = self
            .active_stocks()
            .into_iter()
            .map(|s| s.industry)
            .collect();
        industries.sort();
        industries.dedup();
        industries
    }

    /// Mean of `price × 100` across all listed stocks; 1000 for an
    /// empty exchange.
    pub fn market_index(&self) -> Coins {
        let stocks = self.stocks.read();
        if stocks.is_empty() {
            return 1000;
        }
        let total: Coins = stocks.values().map(|e| e.lock().current_price * 100).sum();
        total / stocks.len() as Coins
    }

    pub fn total_market_cap(&self) -> Coins {
        self.stocks.read().values().map(|e| e.lock().market_cap).sum()
    }

    pub fn summary(&self) -> MarketSummary {
        let stocks = self.active_stocks();
        let mut advancers = 0;
        let mut decliners = 0;
        let mut unchanged = 0;
        for stock in &stocks {
            match stock.price_change().cmp(&0) {
                CmpOrdering::Greater => advancers += 1,
                CmpOrdering::Less => decliners += 1,
                CmpOrdering::Equal => unchanged += 1,
            }
        }
        MarketSummary {
            listed: stocks.len(),
            advancers,
            decliners,
            unchanged,
            index: self.market_index(),
            total_market_cap: self.total_market_cap(),
        }
    }

    // ── Portfolio queries ──────────────────────────────────────

    pub fn portfolio_of(&self, player: PlayerId) -> Portfolio {
        self.portfolio_entry(player).lock().clone()
    }

    /// Mark-to-market value of a player's holdings.
    pub fn portfolio_value(&self, player: PlayerId) -> Coins {
        let prices = self.price_and_yield_table();
        let pf_entry = self.portfolio_entry(player);
        let portfolio = pf_entry.lock();
        portfolio
            .holdings
            .iter()
            .filter_map(|(sym, holding)| {
                prices.get(sym).map(|(price, _)| holding.shares * price)
            })
            .sum()
    }

    pub fn profit_loss(&self, player: PlayerId) -> Coins {
        let value = self.portfolio_value(player);
        let cost = self.portfolio_entry(player).lock().total_cost();
        value - cost
    }

    pub fn return_rate(&self, player: PlayerId) -> f64 {
        let cost = self.portfolio_entry(player).lock().total_cost();
        if cost == 0 {
            return 0.0;
        }
        (self.profit_loss(player) as f64 / cost as f64) * 100.0
    }

    pub fn holding_details(&self, player: PlayerId) -> Vec<HoldingDetail> {
        let stocks: HashMap<String, (String, Coins)> = self
            .stocks
            .read()
            .iter()
            .map(|(sym, entry)| {
                let stock = entry.lock();
                (sym.clone(), (stock.company.clone(), stock.current_price))
            })
            .collect();
        let pf_entry = self.portfolio_entry(player);
        let portfolio = pf_entry.lock();

        let mut details: Vec<HoldingDetail> = portfolio
            .holdings
            .iter()
            .filter_map(|(symbol, holding)| {
                let (company, price) = stocks.get(symbol)?;
                let current_value = holding.shares * price;
                let profit_loss = current_value - holding.total_cost;
                let return_rate = if holding.total_cost > 0 {
                    (profit_loss as f64 / holding.total_cost as f64) * 100.0
                } else {
                    0.0
                };
                Some(HoldingDetail {
                    symbol: symbol.clone(),
                    company: company.clone(),
                    shares: holding.shares,
                    average_price: holding.average_price(),
                    current_price: *price,
                    total_cost: holding.total_cost,
                    current_value,
                    profit_loss,
                    return_rate,
                })
            })
            .collect();
        details.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        details
    }

    /// Most recent trades first.
    pub fn trade_history(&self, player: PlayerId, limit: usize) -> Vec<StockTrade> {
        let pf_entry = self.portfolio_entry(player);
        let portfolio = pf_entry.lock();
        portfolio.trades.iter().rev().take(limit).cloned().collect()
    }

    /// Concentration measure: 1 − Herfindahl index over position
    /// weights. Higher is more diversified.
    pub fn diversification(&self, player: PlayerId) -> f64 {
        let prices = self.price_and_yield_table();
        let pf_entry = self.portfolio_entry(player);
        let portfolio = pf_entry.lock();
        let total: Coins = portfolio
            .holdings
            .iter()
            .filter_map(|(sym, h)| prices.get(sym).map(|(p, _)| h.shares * p))
            .sum();
        if total == 0 {
            return 0.0;
        }
        let hhi: f64 = portfolio
            .holdings
            .iter()
            .filter_map(|(sym, h)| {
                let (price, _) = prices.get(sym)?;
                let weight = (h.shares * price) as f64 / total as f64;
                Some(weight * weight)
            })
            .sum();
        1.0 - hhi
    }

    // ── Snapshot support ───────────────────────────────────────

    pub(crate) fn export_tables(
        &self,
    ) -> (HashMap<String, Stock>, HashMap<PlayerId, Portfolio>, bool, u64) {
        let stocks = self
            .stocks
            .read()
            .iter()
            .map(|(sym, entry)| (sym.clone(), entry.lock().clone()))
            .collect();
        let portfolios = self
            .portfolios
            .read()
            .iter()
            .map(|(id, entry)| (*id, entry.lock().clone()))
            .collect();
        (
            stocks,
            portfolios,
            self.is_open(),
            self.trade_seq.load(Ordering::Relaxed),
        )
    }

    pub(crate) fn import_tables(
        &self,
        stocks: HashMap<String, Stock>,
        portfolios: HashMap<PlayerId, Portfolio>,
        open: bool,
        trade_seq: u64,
    ) {
        let mut table = self.stocks.write();
        table.clear();
        for (sym, stock) in stocks {
            table.insert(sym, Arc::new(Mutex::new(stock)));
        }
        drop(table);
        let mut table = self.portfolios.write();
        table.clear();
        for (id, portfolio) in portfolios {
            table.insert(id, Arc::new(Mutex::new(portfolio)));
        }
        drop(table);
        self.open.store(open, Ordering::Relaxed);
        self.trade_seq.store(trade_seq, Ordering::Relaxed);
    }
}
