//! The host-facing command surface.
//!
//! The host parses whatever its own grammar is (chat commands, HTTP,
//! stdin) into a `PlayerCommand` and hands it to
//! `EconomyEngine::execute`, which returns a JSON value ready for the
//! host to render. Variants are append-only.

use crate::types::{AuctionId, Coins, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Ledger ────────────────────────────────
    Balance { player: PlayerId },
    InitializePlayer { player: PlayerId },
    Transfer { from: PlayerId, to: PlayerId, amount: Coins, memo: String },
    Deposit { player: PlayerId, amount: Coins },
    Withdraw { player: PlayerId, amount: Coins },
    RequestLoan { player: PlayerId, amount: Coins },
    RepayLoan { player: PlayerId, amount: Coins },
    LoanStatus { player: PlayerId },
    ClaimDaily { player: PlayerId },
    History { player: PlayerId },
    Stats,

    // ── Stock market ──────────────────────────
    BuyStock { player: PlayerId, symbol: String, shares: i64 },
    SellStock { player: PlayerId, symbol: String, shares: i64 },
    Quote { symbol: String },
    SearchStocks { keyword: String },
    TopGainers { limit: usize },
    TopLosers { limit: usize },
    MarketSummary,
    PortfolioView { player: PlayerId },
    CollectDividends { player: PlayerId },

    // ── Auctions ──────────────────────────────
    OpenAuction { seller: PlayerId, item: String, starting_bid: Coins, duration_hours: i64 },
    Bid { auction_id: AuctionId, bidder: PlayerId, amount: Coins },
    AuctionInfo { auction_id: AuctionId },
    ActiveAuctions,
}
