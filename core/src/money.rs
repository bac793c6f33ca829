//! Ledger primitives: accounts, bank accounts, loans, transaction
//! records, and the process-wide aggregate counters.
//!
//! These are plain data carriers. Every invariant that spans more than
//! one of them (transfer conservation, single-active-loan, history
//! caps) is enforced by the `LedgerEngine`, which owns the tables.

use crate::types::{Coins, PlayerId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Transaction kinds ──────────────────────────────────────────

/// Closed set of ledger entry tags. The display label and the
/// income/expense sign live here, off the hot ledger path; the engine
/// itself only ever matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
    TransferIn,
    TransferOut,
    BankDeposit,
    BankWithdrawal,
    Interest,
    Loan,
    LoanRepayment,
    AuctionWin,
    AuctionSale,
    AuctionRefund,
    StockBuy,
    StockSell,
    Dividend,
    Initial,
    DailyReward,
    AdminGive,
    AdminTake,
    Tax,
    Fine,
    Bonus,
    Refund,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Credit         => "credit",
            Self::Debit          => "debit",
            Self::TransferIn     => "transfer in",
            Self::TransferOut    => "transfer out",
            Self::BankDeposit    => "bank deposit",
            Self::BankWithdrawal => "bank withdrawal",
            Self::Interest       => "interest",
            Self::Loan           => "loan",
            Self::LoanRepayment  => "loan repayment",
            Self::AuctionWin     => "auction won",
            Self::AuctionSale    => "auction sale",
            Self::AuctionRefund  => "auction refund",
            Self::StockBuy       => "stock purchase",
            Self::StockSell      => "stock sale",
            Self::Dividend       => "dividend",
            Self::Initial        => "starting funds",
            Self::DailyReward    => "daily reward",
            Self::AdminGive      => "admin grant",
            Self::AdminTake      => "admin deduction",
            Self::Tax            => "tax",
            Self::Fine           => "fine",
            Self::Bonus          => "bonus",
            Self::Refund         => "refund",
        }
    }

    /// Whether entries of this kind add coins to the liquid balance.
    /// Bank deposits are expenses from the wallet's point of view —
    /// the ledger logs on the moving side only.
    pub fn is_income(&self) -> bool {
        match self {
            Self::Credit
            | Self::TransferIn
            | Self::BankWithdrawal
            | Self::Interest
            | Self::Loan
            | Self::AuctionSale
            | Self::AuctionRefund
            | Self::StockSell
            | Self::Dividend
            | Self::Initial
            | Self::DailyReward
            | Self::AdminGive
            | Self::Bonus
            | Self::Refund => true,
            Self::Debit
            | Self::TransferOut
            | Self::BankDeposit
            | Self::LoanRepayment
            | Self::AuctionWin
            | Self::StockBuy
            | Self::AdminTake
            | Self::Tax
            | Self::Fine => false,
        }
    }
}

// ── Transaction ────────────────────────────────────────────────

/// Immutable record of one ledger movement. `amount` is signed:
/// positive for income, negative for expense, per the kind's sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: Coins,
    pub description: String,
    pub at: DateTime<Utc>,
}

impl Transaction {
    /// Build a record from an unsigned magnitude; the sign is taken
    /// from the kind.
    pub fn new(
        seq: u64,
        kind: TransactionKind,
        magnitude: Coins,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let amount = if kind.is_income() { magnitude } else { -magnitude };
        Self {
            id: format!("TXN-{seq:08}"),
            kind,
            amount,
            description: description.into(),
            at,
        }
    }
}

// ── Account ────────────────────────────────────────────────────

/// A player's liquid (non-savings) currency. Created lazily on first
/// reference, never destroyed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    pub balance: Coins,
    pub total_earned: Coins,
    pub total_spent: Coins,
    pub last_claim: Option<NaiveDate>,
    pub daily_claimed: bool,
}

impl Account {
    pub fn credit(&mut self, amount: Coins) {
        if amount > 0 {
            self.balance += amount;
            self.total_earned += amount;
        }
    }

    pub fn debit(&mut self, amount: Coins) -> bool {
        if amount > 0 && self.balance >= amount {
            self.balance -= amount;
            self.total_spent += amount;
            return true;
        }
        false
    }

    pub fn has_claimed_today(&self, today: NaiveDate) -> bool {
        self.daily_claimed && self.last_claim == Some(today)
    }

    pub fn mark_claimed(&mut self, today: NaiveDate) {
        self.daily_claimed = true;
        self.last_claim = Some(today);
    }

    pub fn net_worth(&self) -> Coins {
        self.total_earned - self.total_spent
    }
}

// ── BankAccount ────────────────────────────────────────────────

/// A player's savings. Lifecycle is independent of the liquid account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankAccount {
    pub savings: Coins,
    pub total_deposits: Coins,
    pub total_withdrawals: Coins,
    pub total_interest_earned: Coins,
    pub last_interest_at: Option<DateTime<Utc>>,
}

impl BankAccount {
    pub fn deposit(&mut self, amount: Coins) {
        if amount > 0 {
            self.savings += amount;
            self.total_deposits += amount;
        }
    }

    pub fn withdraw(&mut self, amount: Coins) -> bool {
        if amount > 0 && self.savings >= amount {
            self.savings -= amount;
            self.total_withdrawals += amount;
            return true;
        }
        false
    }

    pub fn add_interest(&mut self, interest: Coins, at: DateTime<Utc>) {
        if interest > 0 {
            self.savings += interest;
            self.total_interest_earned += interest;
            self.last_interest_at = Some(at);
        }
    }

    /// Lifetime interest earned relative to lifetime deposits.
    pub fn annual_return_rate(&self) -> f64 {
        if self.total_deposits == 0 {
            return 0.0;
        }
        self.total_interest_earned as f64 / self.total_deposits as f64
    }
}

// ── Loan ───────────────────────────────────────────────────────

/// A collateral-free loan. At most one is active per player; a fully
/// repaid loan is removed from the active set by the ledger.
///
/// `remaining` stores owed principal+interest net of repayments. The
/// overdue penalty is NOT folded in: it is derived at query time from
/// the days past due, so it never compounds into the stored amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub borrower: PlayerId,
    pub principal: Coins,
    pub interest_rate: f64,
    pub remaining: Coins,
    pub total_repaid: Coins,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub overdue: bool,
}

impl Loan {
    pub fn issue(
        borrower: PlayerId,
        principal: Coins,
        interest_rate: f64,
        term_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let owed = (principal as f64 * (1.0 + interest_rate)) as Coins;
        Self {
            borrower,
            principal,
            interest_rate,
            remaining: owed,
            total_repaid: 0,
            issued_at: now,
            due_at: now + chrono::Duration::days(term_days),
            overdue: false,
        }
    }

    /// Reduce owed by `amount`, capped at what remains.
    pub fn repay(&mut self, amount: Coins) -> Coins {
        let paid = amount.min(self.remaining).max(0);
        self.remaining -= paid;
        self.total_repaid += paid;
        paid
    }

    pub fn is_fully_repaid(&self) -> bool {
        self.remaining <= 0
    }

    pub fn check_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if now > self.due_at && !self.is_fully_repaid() {
            self.overdue = true;
        }
        self.overdue
    }

    pub fn overdue_days(&self, now: DateTime<Utc>) -> i64 {
        if now > self.due_at && !self.is_fully_repaid() {
            (now - self.due_at).num_days()
        } else {
            0
        }
    }

    /// Penalty of 0.1% of the principal per overdue day. Derived only;
    /// never written back into `remaining`.
    pub fn overdue_penalty(&self, now: DateTime<Utc>) -> Coins {
        let days = self.overdue_days(now);
        if days > 0 {
            (self.principal as f64 * 0.001 * days as f64) as Coins
        } else {
            0
        }
    }

    /// What the borrower would have to pay right now to close the loan.
    pub fn remaining_owed(&self, now: DateTime<Utc>) -> Coins {
        self.remaining + self.overdue_penalty(now)
    }

    pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
        if self.is_fully_repaid() {
            return 0;
        }
        (self.due_at - now).num_days().max(0)
    }
}

// ── EconomyStats ───────────────────────────────────────────────

/// Process-wide aggregate counters, updated incrementally on every
/// relevant mutation and never recomputed from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyStats {
    pub total_transactions: u64,
    pub total_transaction_value: Coins,
    pub total_tax_collected: Coins,
    pub total_loans_issued: u64,
    pub total_loan_value: Coins,
    pub total_interest_paid: Coins,
    pub total_shops_created: u64,
    pub total_auctions_completed: u64,
    pub last_reset: DateTime<Utc>,
}

impl EconomyStats {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_transactions: 0,
            total_transaction_value: 0,
            total_tax_collected: 0,
            total_loans_issued: 0,
            total_loan_value: 0,
            total_interest_paid: 0,
            total_shops_created: 0,
            total_auctions_completed: 0,
            last_reset: now,
        }
    }

    pub fn add_transaction(&mut self, gross: Coins) {
        self.total_transactions += 1;
        self.total_transaction_value += gross;
    }

    pub fn add_tax(&mut self, tax: Coins) {
        self.total_tax_collected += tax;
    }

    pub fn add_loan(&mut self, amount: Coins) {
        self.total_loans_issued += 1;
        self.total_loan_value += amount;
    }

    pub fn add_interest(&mut self, interest: Coins) {
        self.total_interest_paid += interest;
    }

    pub fn add_shop(&mut self) {
        self.total_shops_created += 1;
    }

    pub fn add_auction(&mut self) {
        self.total_auctions_completed += 1;
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    pub fn average_transaction_value(&self) -> f64 {
        if self.total_transactions == 0 {
            return 0.0;
        }
        self.total_transaction_value as f64 / self.total_transactions as f64
    }

    pub fn average_loan_amount(&self) -> f64 {
        if self.total_loans_issued == 0 {
            return 0.0;
        }
        self.total_loan_value as f64 / self.total_loans_issued as f64
    }
}
