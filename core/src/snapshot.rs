//! Snapshot serialization — full engine state to/from a serializable
//! value.
//!
//! A snapshot covers every table the engine owns, keyed by stable
//! identifiers (player id, stock symbol, auction id), so snapshots are
//! order-independent and merge only by full replacement. The host
//! decides where snapshots live; `store::SnapshotStore` is the bundled
//! SQLite shelf for them.

use crate::{
    auction::Auction,
    clock::SimClock,
    ledger::PlayerLedger,
    market::Portfolio,
    money::EconomyStats,
    stock::Stock,
    types::{AuctionId, PlayerId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub saved_at: DateTime<Utc>,
    pub clock: SimClock,

    // Ledger tables
    pub players: HashMap<PlayerId, PlayerLedger>,
    pub stats: EconomyStats,
    pub txn_seq: u64,

    // Market tables
    pub stocks: HashMap<String, Stock>,
    pub portfolios: HashMap<PlayerId, Portfolio>,
    pub market_open: bool,
    pub trade_seq: u64,

    // Auction tables
    pub auctions: HashMap<AuctionId, Auction>,
    pub next_auction_id: u64,
}
