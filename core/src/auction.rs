//! The auction house — a bid state machine with time-based expiry.
//!
//! Lifecycle per auction: Active → Completed{winner?}. Completion
//! happens either through the host's settlement sweep or lazily when a
//! bid arrives after the deadline. Settlement is idempotent: the first
//! settle records an outcome, and every later settle returns it
//! unchanged without moving funds again.
//!
//! The engine holds no items; the host moves the physical item to
//! whoever the settlement outcome names.

use crate::{
    error::{EconomyError, EconomyResult},
    ledger::LedgerEngine,
    money::TransactionKind,
    types::{AuctionId, Coins, PlayerId},
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a completed auction ended, and therefore who the item goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// The winner paid the seller; the item goes to the winner.
    Sold { winner: PlayerId, price: Coins },
    /// No bids, or the winning bidder could not pay at settlement
    /// time; the item returns to the seller.
    NoSale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub seller: PlayerId,
    pub item: String,
    pub starting_bid: Coins,
    pub current_bid: Coins,
    pub current_bidder: Option<PlayerId>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub active: bool,
    pub completed: bool,
    /// Highest bid placed by each bidder.
    pub bids: HashMap<PlayerId, Coins>,
    /// Recorded once; the idempotency anchor for settlement.
    pub outcome: Option<SettlementOutcome>,
}

impl Auction {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_at
    }

    /// Remaining time is always derived, never stored as a countdown.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        if self.completed || self.is_expired(now) {
            return 0;
        }
        (self.end_at - now).num_minutes().max(0)
    }

    pub fn minimum_bid(&self) -> Coins {
        self.current_bid + 1
    }

    pub fn has_winner(&self) -> bool {
        self.completed && self.current_bidder.is_some()
    }

    fn complete(&mut self) {
        self.active = false;
        self.completed = true;
    }
}

pub struct AuctionEngine {
    auctions: Mutex<HashMap<AuctionId, Auction>>,
    next_id: AtomicU64,
}

impl Default for AuctionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionEngine {
    pub fn new() -> Self {
        Self {
            auctions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn open(
        &self,
        seller: PlayerId,
        item: &str,
        starting_bid: Coins,
        duration_hours: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<AuctionId> {
        if starting_bid <= 0 || duration_hours <= 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let auction = Auction {
            id,
            seller,
            item: item.to_string(),
            starting_bid,
            current_bid: starting_bid,
            current_bidder: None,
            start_at: now,
            end_at: now + Duration::hours(duration_hours),
            active: true,
            completed: false,
            bids: HashMap::new(),
            outcome: None,
        };
        log::info!("auction {id} opened by {seller}: '{item}' starting at {starting_bid}");
        self.auctions.lock().insert(id, auction);
        Ok(id)
    }

    pub fn bid(
        &self,
        id: AuctionId,
        bidder: PlayerId,
        amount: Coins,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        let mut auctions = self.auctions.lock();
        let auction = auctions
            .get_mut(&id)
            .ok_or(EconomyError::AuctionNotFound { id })?;

        if auction.completed || !auction.active {
            return Err(EconomyError::AuctionNotActive);
        }
        if auction.is_expired(now) {
            // Too late: the deadline passed before the settlement sweep
            // got here. Flip to Completed; the sweep will settle it.
            auction.complete();
            return Err(EconomyError::AuctionExpired);
        }
        if bidder == auction.seller {
            return Err(EconomyError::SelfBid);
        }
        if amount <= auction.current_bid {
            return Err(EconomyError::BidTooLow {
                current: auction.current_bid,
            });
        }

        auction.current_bid = amount;
        auction.current_bidder = Some(bidder);
        auction.bids.insert(bidder, amount);
        Ok(())
    }

    /// Finalize one auction. Funds move bidder→seller through the
    /// ledger; a winner who cannot pay degrades the auction to a
    /// no-sale rather than wedging the sweep. Idempotent: a recorded
    /// outcome is returned as-is.
    pub fn settle(
        &self,
        ledger: &LedgerEngine,
        id: AuctionId,
        now: DateTime<Utc>,
    ) -> EconomyResult<SettlementOutcome> {
        let mut auctions = self.auctions.lock();
        let auction = auctions
            .get_mut(&id)
            .ok_or(EconomyError::AuctionNotFound { id })?;

        if let Some(outcome) = &auction.outcome {
            return Ok(outcome.clone());
        }
        if !auction.completed && !auction.is_expired(now) {
            return Err(EconomyError::AuctionNotActive);
        }
        auction.complete();

        let outcome = match auction.current_bidder {
            Some(winner) => {
                let price = auction.current_bid;
                let description =
                    format!("auction #{id}: '{}' sold for {price}", auction.item);
                match ledger.settle_payment(
                    winner,
                    auction.seller,
                    price,
                    TransactionKind::AuctionWin,
                    TransactionKind::AuctionSale,
                    &description,
                    now,
                ) {
                    Ok(()) => SettlementOutcome::Sold { winner, price },
                    Err(EconomyError::InsufficientFunds) => {
                        log::warn!("auction {id}: winner {winner} cannot pay {price}, no-sale");
                        SettlementOutcome::NoSale
                    }
                    Err(err) => return Err(err),
                }
            }
            None => SettlementOutcome::NoSale,
        };

        auction.outcome = Some(outcome.clone());
        ledger.note_auction_completed();
        log::info!("auction {id} settled: {outcome:?}");
        Ok(outcome)
    }

    /// Sweep: settle every active auction whose deadline has passed.
    /// Safe to invoke at-least-once from an external timer.
    pub fn sweep_expired(
        &self,
        ledger: &LedgerEngine,
        now: DateTime<Utc>,
    ) -> Vec<(AuctionId, SettlementOutcome)> {
        let due: Vec<AuctionId> = self
            .auctions
            .lock()
            .values()
            .filter(|a| a.outcome.is_none() && a.is_expired(now))
            .map(|a| a.id)
            .collect();

        let mut settled = Vec::new();
        for id in due {
            match self.settle(ledger, id, now) {
                Ok(outcome) => settled.push((id, outcome)),
                Err(err) => log::warn!("settlement of auction {id} failed: {err}"),
            }
        }
        settled
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn auction(&self, id: AuctionId) -> Option<Auction> {
        self.auctions.lock().get(&id).cloned()
    }

    /// Auctions still open for bidding at `now`, soonest-ending first.
    pub fn active_auctions(&self, now: DateTime<Utc>) -> Vec<Auction> {
        let mut open: Vec<Auction> = self
            .auctions
            .lock()
            .values()
            .filter(|a| a.active && !a.completed && !a.is_expired(now))
            .cloned()
            .collect();
        open.sort_by_key(|a| a.end_at);
        open
    }

    // ── Snapshot support ───────────────────────────────────────

    pub(crate) fn export_tables(&self) -> (HashMap<AuctionId, Auction>, u64) {
        (
            self.auctions.lock().clone(),
            self.next_id.load(Ordering::Relaxed),
        )
    }

    pub(crate) fn import_tables(&self, auctions: HashMap<AuctionId, Auction>, next_id: u64) {
        *self.auctions.lock() = auctions;
        self.next_id.store(next_id, Ordering::Relaxed);
    }
}
