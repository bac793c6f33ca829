use thiserror::Error;

/// Every expected business failure of the engine, as a closed set.
/// Operations return these rather than panicking, and no failure
/// leaves partially-applied state behind.
#[derive(Error, Debug)]
pub enum EconomyError {
    #[error("amount must be positive")]
    InvalidAmount,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("cannot transfer to yourself")]
    SelfTransfer,

    #[error("a loan is already active")]
    LoanAlreadyActive,

    #[error("loan amount exceeds the ceiling of {limit}")]
    LoanLimitExceeded { limit: i64 },

    #[error("no active loan")]
    NoActiveLoan,

    #[error("daily reward already claimed today")]
    AlreadyClaimed,

    #[error("daily rewards are disabled")]
    RewardsDisabled,

    #[error("unknown stock symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    #[error("symbol '{symbol}' is already listed")]
    SymbolAlreadyListed { symbol: String },

    #[error("the market is closed")]
    MarketClosed,

    #[error("only {available} shares available")]
    SharesUnavailable { available: i64 },

    #[error("insufficient holdings")]
    InsufficientHoldings,

    #[error("auction {id} not found")]
    AuctionNotFound { id: u64 },

    #[error("auction is not active")]
    AuctionNotActive,

    #[error("auction has expired")]
    AuctionExpired,

    #[error("bid must exceed the current bid of {current}")]
    BidTooLow { current: i64 },

    #[error("the seller cannot bid on their own auction")]
    SelfBid,

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EconomyResult<T> = Result<T, EconomyError>;
