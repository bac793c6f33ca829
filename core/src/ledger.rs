//! The ledger engine — owns every player's financial state.
//!
//! CONCURRENCY MODEL:
//!   - One `Mutex<PlayerLedger>` per player holds that player's liquid
//!     account, bank account, active loan and transaction history, so a
//!     single lock serializes all mutations to one player's state.
//!   - The table itself sits behind an `RwLock`; writers only take it
//!     to materialize a missing entry.
//!   - Two-party operations (transfer, settlement) lock both entries in
//!     canonical id order.
//!   - `EconomyStats` is a separate mutex, taken last and briefly.
//!
//! Sweeps (`apply_interest`, `reset_daily_claims`) iterate a snapshot
//! of the entry list; each entry update is atomic, the sweep is not.

use crate::{
    config::EconomyConfig,
    error::{EconomyError, EconomyResult},
    money::{Account, BankAccount, EconomyStats, Loan, Transaction, TransactionKind},
    types::{Coins, PlayerId},
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Everything the ledger tracks for one player. Account and bank
/// account have independent lifecycles but share the entry lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerLedger {
    pub account: Account,
    pub bank: BankAccount,
    pub loan: Option<Loan>,
    pub history: VecDeque<Transaction>,
}

impl PlayerLedger {
    fn push(&mut self, txn: Transaction, cap: usize) {
        self.history.push_back(txn);
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }
}

/// Read-only view of a loan with the derived overdue figures filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanStatus {
    pub principal: Coins,
    pub interest_rate: f64,
    pub remaining_owed: Coins,
    pub total_repaid: Coins,
    pub overdue: bool,
    pub overdue_days: i64,
    pub remaining_days: i64,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

pub struct LedgerEngine {
    config: Arc<EconomyConfig>,
    players: RwLock<HashMap<PlayerId, Arc<Mutex<PlayerLedger>>>>,
    stats: Mutex<EconomyStats>,
    txn_seq: AtomicU64,
}

impl LedgerEngine {
    pub fn new(config: Arc<EconomyConfig>, now: DateTime<Utc>) -> Self {
        Self {
            config,
            players: RwLock::new(HashMap::new()),
            stats: Mutex::new(EconomyStats::new(now)),
            txn_seq: AtomicU64::new(0),
        }
    }

    /// Fetch (or lazily materialize) a player's entry.
    fn entry(&self, player: PlayerId) -> Arc<Mutex<PlayerLedger>> {
        if let Some(entry) = self.players.read().get(&player) {
            return entry.clone();
        }
        self.players.write().entry(player).or_default().clone()
    }

    fn next_txn(
        &self,
        kind: TransactionKind,
        magnitude: Coins,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Transaction {
        let seq = self.txn_seq.fetch_add(1, Ordering::Relaxed) + 1;
        Transaction::new(seq, kind, magnitude, description, now)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn balance(&self, player: PlayerId) -> Coins {
        self.entry(player).lock().account.balance
    }

    pub fn savings(&self, player: PlayerId) -> Coins {
        self.entry(player).lock().bank.savings
    }

    pub fn account_of(&self, player: PlayerId) -> Account {
        self.entry(player).lock().account.clone()
    }

    pub fn bank_of(&self, player: PlayerId) -> BankAccount {
        self.entry(player).lock().bank.clone()
    }

    /// Transaction history, oldest first (most recent last).
    pub fn history(&self, player: PlayerId) -> Vec<Transaction> {
        self.entry(player).lock().history.iter().cloned().collect()
    }

    pub fn stats(&self) -> EconomyStats {
        self.stats.lock().clone()
    }

    pub fn loan_of(&self, player: PlayerId, now: DateTime<Utc>) -> Option<LoanStatus> {
        let entry = self.entry(player);
        let mut led = entry.lock();
        let loan = led.loan.as_mut()?;
        loan.check_overdue(now);
        Some(LoanStatus {
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            remaining_owed: loan.remaining_owed(now),
            total_repaid: loan.total_repaid,
            overdue: loan.overdue,
            overdue_days: loan.overdue_days(now),
            remaining_days: loan.remaining_days(now),
            issued_at: loan.issued_at,
            due_at: loan.due_at,
        })
    }

    // ── Single-party mutations ─────────────────────────────────

    /// Seed a fresh account with the configured starting balance.
    /// Returns true if the grant happened; a player with any prior
    /// ledger activity is left untouched.
    pub fn initialize_player(&self, player: PlayerId, now: DateTime<Utc>) -> bool {
        let entry = self.entry(player);
        let mut led = entry.lock();
        let pristine = led.account.balance == 0
            && led.account.total_earned == 0
            && led.account.total_spent == 0;
        if !pristine {
            return false;
        }
        let amount = self.config.starting_balance;
        led.account.credit(amount);
        let txn = self.next_txn(TransactionKind::Initial, amount, "starting funds", now);
        led.push(txn, self.config.history_cap);
        log::info!("initialized account for {player} with {amount} coins");
        true
    }

    pub fn credit(&self, player: PlayerId, amount: Coins, now: DateTime<Utc>) -> EconomyResult<()> {
        self.credit_as(player, amount, TransactionKind::Credit, "system credit", now)
    }

    /// Credit with an explicit kind/description. Used by the market and
    /// auction engines so their entries carry their own tags.
    pub fn credit_as(
        &self,
        player: PlayerId,
        amount: Coins,
        kind: TransactionKind,
        description: &str,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        led.account.credit(amount);
        let txn = self.next_txn(kind, amount, description, now);
        led.push(txn, self.config.history_cap);
        Ok(())
    }

    pub fn debit(&self, player: PlayerId, amount: Coins, now: DateTime<Utc>) -> EconomyResult<()> {
        self.debit_as(player, amount, TransactionKind::Debit, "system debit", now)
    }

    pub fn debit_as(
        &self,
        player: PlayerId,
        amount: Coins,
        kind: TransactionKind,
        description: &str,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        if !led.account.debit(amount) {
            return Err(EconomyError::InsufficientFunds);
        }
        let txn = self.next_txn(kind, amount, description, now);
        led.push(txn, self.config.history_cap);
        Ok(())
    }

    /// Move coins from the liquid account into savings. Logged on the
    /// moving (wallet) side only.
    pub fn deposit(&self, player: PlayerId, amount: Coins, now: DateTime<Utc>) -> EconomyResult<()> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        if !led.account.debit(amount) {
            return Err(EconomyError::InsufficientFunds);
        }
        led.bank.deposit(amount);
        let txn = self.next_txn(TransactionKind::BankDeposit, amount, "deposit to savings", now);
        led.push(txn, self.config.history_cap);
        Ok(())
    }

    pub fn withdraw(&self, player: PlayerId, amount: Coins, now: DateTime<Utc>) -> EconomyResult<()> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        if !led.bank.withdraw(amount) {
            return Err(EconomyError::InsufficientFunds);
        }
        led.account.credit(amount);
        let txn = self.next_txn(
            TransactionKind::BankWithdrawal,
            amount,
            "withdrawal from savings",
            now,
        );
        led.push(txn, self.config.history_cap);
        Ok(())
    }

    // ── Transfers ──────────────────────────────────────────────

    /// Player-to-player transfer. The sender pays the full amount; the
    /// receiver gets it net of the transaction tax. Atomic: both locks
    /// are held across the whole movement.
    pub fn transfer(
        &self,
        from: PlayerId,
        to: PlayerId,
        amount: Coins,
        memo: &str,
        now: DateTime<Utc>,
    ) -> EconomyResult<Coins> {
        if from == to {
            return Err(EconomyError::SelfTransfer);
        }
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }

        let tax = (amount as f64 * self.config.transaction_tax_rate) as Coins;
        let net = amount - tax;

        let from_entry = self.entry(from);
        let to_entry = self.entry(to);
        let (mut from_led, mut to_led) = lock_pair(&from_entry, &to_entry, from, to);

        if !from_led.account.debit(amount) {
            return Err(EconomyError::InsufficientFunds);
        }
        to_led.account.credit(net);

        let out = self.next_txn(
            TransactionKind::TransferOut,
            amount,
            format!("transfer to {to} (tax {tax}; memo: {memo})"),
            now,
        );
        from_led.push(out, self.config.history_cap);
        let inc = self.next_txn(
            TransactionKind::TransferIn,
            net,
            format!("transfer from {from} (memo: {memo})"),
            now,
        );
        to_led.push(inc, self.config.history_cap);
        drop(from_led);
        drop(to_led);

        let mut stats = self.stats.lock();
        stats.add_transaction(amount);
        stats.add_tax(tax);
        drop(stats);

        log::debug!("transfer {from} -> {to}: {amount} gross, {tax} tax");
        Ok(tax)
    }

    /// Two-party settlement used by the auction house: full amount
    /// moves, no transfer tax, each side tagged with its own kind.
    pub fn settle_payment(
        &self,
        from: PlayerId,
        to: PlayerId,
        amount: Coins,
        from_kind: TransactionKind,
        to_kind: TransactionKind,
        description: &str,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        if from == to {
            return Err(EconomyError::SelfTransfer);
        }
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let from_entry = self.entry(from);
        let to_entry = self.entry(to);
        let (mut from_led, mut to_led) = lock_pair(&from_entry, &to_entry, from, to);

        if !from_led.account.debit(amount) {
            return Err(EconomyError::InsufficientFunds);
        }
        to_led.account.credit(amount);

        let out = self.next_txn(from_kind, amount, description, now);
        from_led.push(out, self.config.history_cap);
        let inc = self.next_txn(to_kind, amount, description, now);
        to_led.push(inc, self.config.history_cap);
        Ok(())
    }

    // ── Loans ──────────────────────────────────────────────────

    pub fn request_loan(
        &self,
        player: PlayerId,
        amount: Coins,
        now: DateTime<Utc>,
    ) -> EconomyResult<LoanStatus> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        if amount > self.config.max_loan_amount {
            return Err(EconomyError::LoanLimitExceeded {
                limit: self.config.max_loan_amount,
            });
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        if led.loan.is_some() {
            return Err(EconomyError::LoanAlreadyActive);
        }

        led.account.credit(amount);
        let loan = Loan::issue(
            player,
            amount,
            self.config.loan_interest_rate,
            self.config.loan_term_days,
            now,
        );
        let status = LoanStatus {
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            remaining_owed: loan.remaining,
            total_repaid: 0,
            overdue: false,
            overdue_days: 0,
            remaining_days: loan.remaining_days(now),
            issued_at: loan.issued_at,
            due_at: loan.due_at,
        };
        led.loan = Some(loan);
        let txn = self.next_txn(TransactionKind::Loan, amount, "bank loan", now);
        led.push(txn, self.config.history_cap);
        drop(led);

        self.stats.lock().add_loan(amount);
        log::info!("loan of {amount} issued to {player}");
        Ok(status)
    }

    /// Repay against the active loan. The debit is capped at what is
    /// still owed, so overpaying never burns coins. Repaying the exact
    /// remainder removes the loan.
    pub fn repay_loan(
        &self,
        player: PlayerId,
        amount: Coins,
        now: DateTime<Utc>,
    ) -> EconomyResult<Coins> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let entry = self.entry(player);
        let mut led = entry.lock();
        let remaining = match &led.loan {
            Some(loan) => loan.remaining,
            None => return Err(EconomyError::NoActiveLoan),
        };
        let pay = amount.min(remaining);
        if !led.account.debit(pay) {
            return Err(EconomyError::InsufficientFunds);
        }
        if let Some(loan) = led.loan.as_mut() {
            loan.repay(pay);
            if loan.is_fully_repaid() {
                led.loan = None;
                log::info!("loan fully repaid by {player}");
            }
        }
        let txn = self.next_txn(TransactionKind::LoanRepayment, pay, "loan repayment", now);
        led.push(txn, self.config.history_cap);
        Ok(pay)
    }

    // ── Daily reward ───────────────────────────────────────────

    pub fn claim_daily_reward(&self, player: PlayerId, now: DateTime<Utc>) -> EconomyResult<Coins> {
        if !self.config.daily_rewards_enabled {
            return Err(EconomyError::RewardsDisabled);
        }
        let today = now.date_naive();
        let entry = self.entry(player);
        let mut led = entry.lock();
        if led.account.has_claimed_today(today) {
            return Err(EconomyError::AlreadyClaimed);
        }
        let reward = self.config.daily_reward_amount;
        led.account.credit(reward);
        led.account.mark_claimed(today);
        let txn = self.next_txn(TransactionKind::DailyReward, reward, "daily reward", now);
        led.push(txn, self.config.history_cap);
        Ok(reward)
    }

    // ── Sweeps (host-invoked) ──────────────────────────────────

    /// Credit interest on every positive savings balance. Intended to
    /// be invoked once per simulated day by the host; the engine never
    /// schedules it. Returns the number of accounts credited.
    pub fn apply_interest(&self, now: DateTime<Utc>) -> usize {
        let entries: Vec<Arc<Mutex<PlayerLedger>>> =
            self.players.read().values().cloned().collect();

        let mut credited = 0usize;
        let mut total: Coins = 0;
        for entry in entries {
            let mut led = entry.lock();
            if led.bank.savings <= 0 {
                continue;
            }
            let interest = (led.bank.savings as f64 * self.config.bank_interest_rate) as Coins;
            if interest <= 0 {
                continue;
            }
            led.bank.add_interest(interest, now);
            let txn = self.next_txn(TransactionKind::Interest, interest, "savings interest", now);
            led.push(txn, self.config.history_cap);
            credited += 1;
            total += interest;
        }
        if credited > 0 {
            self.stats.lock().add_interest(total);
        }
        log::debug!("interest sweep credited {credited} accounts ({total} coins)");
        credited
    }

    /// Clear the daily-claim flag on every account.
    pub fn reset_daily_claims(&self) {
        let entries: Vec<Arc<Mutex<PlayerLedger>>> =
            self.players.read().values().cloned().collect();
        for entry in entries {
            entry.lock().account.daily_claimed = false;
        }
    }

    // ── Stats hooks for the other engines ──────────────────────

    pub fn note_auction_completed(&self) {
        self.stats.lock().add_auction();
    }

    pub fn note_shop_created(&self) {
        self.stats.lock().add_shop();
    }

    // ── Snapshot support ───────────────────────────────────────

    pub(crate) fn export_tables(&self) -> (HashMap<PlayerId, PlayerLedger>, EconomyStats, u64) {
        let players = self
            .players
            .read()
            .iter()
            .map(|(id, entry)| (*id, entry.lock().clone()))
            .collect();
        (players, self.stats.lock().clone(), self.txn_seq.load(Ordering::Relaxed))
    }

    pub(crate) fn import_tables(
        &self,
        players: HashMap<PlayerId, PlayerLedger>,
        stats: EconomyStats,
        txn_seq: u64,
    ) {
        let mut table = self.players.write();
        table.clear();
        for (id, led) in players {
            table.insert(id, Arc::new(Mutex::new(led)));
        }
        drop(table);
        *self.stats.lock() = stats;
        self.txn_seq.store(txn_seq, Ordering::Relaxed);
    }
}

/// Lock two player entries in canonical id order to keep two-party
/// operations deadlock-free, returning the guards in (a, b) order.
fn lock_pair<'a>(
    a: &'a Arc<Mutex<PlayerLedger>>,
    b: &'a Arc<Mutex<PlayerLedger>>,
    a_id: PlayerId,
    b_id: PlayerId,
) -> (MutexGuard<'a, PlayerLedger>, MutexGuard<'a, PlayerLedger>) {
    if a_id.as_u128() < b_id.as_u128() {
        let ga = a.lock();
        let gb = b.lock();
        (ga, gb)
    } else {
        let gb = b.lock();
        let ga = a.lock();
        (ga, gb)
    }
}
