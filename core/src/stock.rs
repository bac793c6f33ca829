//! Stock model and price evolution.
//!
//! A stock's price moves two ways:
//!   1. The stochastic walk (`update_price`), invoked once per tick per
//!      active stock by the host's sweep: gaussian draw scaled by the
//!      stock's volatility, plus a momentum term from recent samples,
//!      clamped to a configured swing.
//!   2. Trade pressure (`apply_trade_impact`): ±1 per executed trade,
//!      outside the walk.
//!
//! Prices never fall below 1 coin. History is a bounded ring of the
//! most recent samples; open/high/low reset when the calendar day of
//! the last sample differs from the current one.

use crate::{config::EconomyConfig, rng::StreamRng, types::Coins};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub price: Coins,
    pub volume: i64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub company: String,
    pub industry: String,
    pub current_price: Coins,
    pub open_price: Coins,
    pub high_price: Coins,
    pub low_price: Coins,
    pub previous_close: Coins,
    pub total_shares: i64,
    pub available_shares: i64,
    pub market_cap: Coins,
    pub volatility: f64,
    pub history: VecDeque<PriceSample>,
    pub last_update: DateTime<Utc>,
    pub active: bool,
}

impl Stock {
    pub fn new(
        symbol: String,
        company: String,
        industry: String,
        initial_price: Coins,
        total_shares: i64,
        volatility: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let price = initial_price.max(1);
        let mut stock = Self {
            symbol,
            company,
            industry,
            current_price: price,
            open_price: price,
            high_price: price,
            low_price: price,
            previous_close: price,
            total_shares,
            available_shares: total_shares,
            market_cap: price * total_shares,
            volatility: volatility.clamp(0.001, 1.0),
            history: VecDeque::new(),
            last_update: now,
            active: true,
        };
        stock.record_sample(price, 0, usize::MAX, now);
        stock
    }

    /// One stochastic step. Invoked per simulated tick by the sweep.
    pub fn update_price(&mut self, rng: &mut StreamRng, cfg: &EconomyConfig, now: DateTime<Utc>) {
        if !self.active {
            return;
        }
        let mut change = rng.gaussian() * self.volatility;
        change += self.trend_factor();
        change = change.clamp(-cfg.max_price_swing, cfg.max_price_swing);

        let new_price = ((self.current_price as f64) * (1.0 + change)).round() as Coins;
        let volume = (rng.gaussian() * 1000.0).abs() as i64 + 100;
        self.set_price_with_volume(new_price.max(1), volume, cfg.price_history_cap, now);
    }

    /// Write a new price, maintaining previous close, the intraday
    /// open/high/low band, the bounded history and the market cap.
    pub fn set_price_with_volume(
        &mut self,
        new_price: Coins,
        volume: i64,
        history_cap: usize,
        now: DateTime<Utc>,
    ) {
        self.previous_close = self.current_price;
        self.current_price = new_price;

        if self.is_new_trading_day(now) {
            self.open_price = new_price;
            self.high_price = new_price;
            self.low_price = new_price;
        } else {
            self.high_price = self.high_price.max(new_price);
            self.low_price = self.low_price.min(new_price);
        }

        self.record_sample(new_price, volume, history_cap, now);
        self.market_cap = new_price * self.total_shares;
        self.last_update = now;
    }

    /// Market impact of one executed trade: ±1 on top of the walk,
    /// floored at 1.
    pub fn apply_trade_impact(
        &mut self,
        delta: Coins,
        volume: i64,
        history_cap: usize,
        now: DateTime<Utc>,
    ) {
        let new_price = (self.current_price + delta).max(1);
        self.set_price_with_volume(new_price, volume, history_cap, now);
    }

    fn record_sample(&mut self, price: Coins, volume: i64, cap: usize, at: DateTime<Utc>) {
        self.history.push_back(PriceSample { price, volume, at });
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }

    /// Momentum: the mean sample-to-sample fractional change over the
    /// last 10 samples, scaled down to 10%.
    fn trend_factor(&self) -> f64 {
        if self.history.len() < 10 {
            return 0.0;
        }
        let recent: Vec<&PriceSample> = self.history.iter().skip(self.history.len() - 10).collect();
        let mut total_change = 0.0;
        for pair in recent.windows(2) {
            let prev = pair[0].price as f64;
            total_change += (pair[1].price - pair[0].price) as f64 / prev;
        }
        (total_change / recent.len() as f64) * 0.1
    }

    fn is_new_trading_day(&self, now: DateTime<Utc>) -> bool {
        match self.history.back() {
            Some(last) => last.at.date_naive() != now.date_naive(),
            None => true,
        }
    }

    // ── Derived figures ────────────────────────────────────────

    pub fn price_change(&self) -> Coins {
        self.current_price - self.previous_close
    }

    pub fn price_change_percent(&self) -> f64 {
        if self.previous_close == 0 {
            return 0.0;
        }
        (self.price_change() as f64 / self.previous_close as f64) * 100.0
    }

    /// Yield falls as volatility rises; floored at 1%.
    pub fn dividend_yield(&self) -> f64 {
        (0.05 - self.volatility * 10.0).max(0.01)
    }

    /// Simplified P/E against an assumed earnings of 5% of market cap.
    pub fn pe_ratio(&self) -> f64 {
        let assumed_earnings = self.market_cap / 20;
        if assumed_earnings > 0 {
            self.market_cap as f64 / assumed_earnings as f64
        } else {
            0.0
        }
    }

    /// Mean of the last `samples` recorded prices; the current price
    /// when not enough history exists yet.
    pub fn moving_average(&self, samples: usize) -> Coins {
        if samples == 0 || self.history.len() < samples {
            return self.current_price;
        }
        let sum: Coins = self
            .history
            .iter()
            .skip(self.history.len() - samples)
            .map(|s| s.price)
            .sum();
        sum / samples as Coins
    }

    // ── Share inventory ────────────────────────────────────────

    pub fn take_shares(&mut self, shares: i64) -> bool {
        if shares > 0 && shares <= self.available_shares {
            self.available_shares -= shares;
            return true;
        }
        false
    }

    pub fn return_shares(&mut self, shares: i64) {
        if shares > 0 {
            self.available_shares = (self.available_shares + shares).min(self.total_shares);
        }
    }
}
