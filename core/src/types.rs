//! Shared primitive types used across the entire engine.

/// A quantity of currency. All money is integral coins: no fractional
/// currency exists, and every fee computation truncates toward zero.
pub type Coins = i64;

/// A stable, unique identifier for a player.
pub type PlayerId = uuid::Uuid;

/// A stable identifier for an auction, assigned from a counter.
pub type AuctionId = u64;

/// Canonical form of a stock symbol: trimmed, upper-case.
/// Symbols are case-insensitive everywhere in the public surface.
pub fn canonical_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
