//! Error types for the network core

use thiserror::Error;

/// Result type for network-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Network core errors
#[derive(Error, Debug)]
pub enum Error {
    /// Withdraw request exceeds balance plus overdraft headroom
    #[error("Insufficient funds: requested {requested}, available {available} (incl. overdraft)")]
    InsufficientFunds {
        /// Amount requested, in minor units
        requested: i64,
        /// Balance plus overdraft headroom at the time of the attempt
        available: i64,
    },

    /// Transaction queue has been closed (bank no longer operating)
    #[error("Transaction queue closed")]
    QueueClosed,

    /// Unexpected queue fault; never fatal to a processor
    #[error("Queue fault: {0}")]
    Queue(String),

    /// Bank id does not resolve in the network registry
    #[error("Unknown bank: {0}")]
    UnknownBank(usize),

    /// Account index does not resolve within a bank
    #[error("Unknown account {account} in bank {bank}")]
    UnknownAccount {
        /// Bank the lookup was made against
        bank: usize,
        /// Offending account index
        account: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
