//! Static engine configuration.
//!
//! The host supplies one `EconomyConfig` at engine construction. The
//! engine never reloads it; changing parameters means building a new
//! engine (usually from a snapshot of the old one).

use crate::types::Coins;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Coins granted once when a player is first initialized.
    pub starting_balance: Coins,
    /// Daily interest on bank savings, applied by the host's sweep.
    pub bank_interest_rate: f64,
    /// Fraction of every transfer withheld as tax (0..=1).
    pub transaction_tax_rate: f64,
    /// Ceiling for a single loan's principal.
    pub max_loan_amount: Coins,
    /// Flat interest applied to a loan at issue time.
    pub loan_interest_rate: f64,
    /// Days until an issued loan falls due.
    pub loan_term_days: i64,
    pub daily_reward_amount: Coins,
    pub daily_rewards_enabled: bool,
    /// Most recent ledger transactions kept per player (FIFO eviction).
    pub history_cap: usize,
    /// Most recent price samples kept per stock.
    pub price_history_cap: usize,
    /// Hard clamp on a single stochastic price step, as a fraction.
    pub max_price_swing: f64,
    /// Commission = max(1, amount / commission_divisor).
    pub commission_divisor: Coins,
    /// Stamp tax on sales = proceeds / stamp_tax_divisor.
    pub stamp_tax_divisor: Coins,
    /// Volatility assigned to newly listed stocks.
    pub default_volatility: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance:     100,
            bank_interest_rate:   0.01,
            transaction_tax_rate: 0.05,
            max_loan_amount:      10_000,
            loan_interest_rate:   0.10,
            loan_term_days:       30,
            daily_reward_amount:  50,
            daily_rewards_enabled: true,
            history_cap:          100,
            price_history_cap:    1000,
            max_price_swing:      0.20,
            commission_divisor:   1000,
            stamp_tax_divisor:    2000,
            default_volatility:   0.05,
        }
    }
}

impl EconomyConfig {
    /// Load from a JSON file. Unspecified fields keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(serde_json::from_str(&content)?)
    }
}
