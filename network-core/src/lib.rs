//! Core domain model for the interbank payment network
//!
//! This crate holds the shared mutable state of the simulated network
//! and the concurrency primitives that guard it:
//!
//! 1. **Accounts**: balance holders with an overdraft limit, every
//!    balance mutation serialized through a per-account mutex
//! 2. **Banks**: customer accounts + per-currency reserves + a bounded
//!    FIFO queue of pending transactions
//! 3. **Queue**: the bounded producer/consumer buffer with a broadcast
//!    close signal for shutdown
//! 4. **Network**: the read-mostly registry resolving bank ids during
//!    cross-border settlement, plus the exchange-rate table
//!
//! The running parts (generators, processors, orchestration) live in
//! the `simulation` crate.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod account;
pub mod bank;
pub mod currency;
pub mod error;
pub mod network;
pub mod queue;
pub mod rates;
pub mod transaction;

// Re-exports
pub use account::Account;
pub use bank::{Bank, BankId, BankStats, CurrencyReserves};
pub use currency::{Currency, CURRENCY_COUNT};
pub use error::{Error, Result};
pub use network::Network;
pub use queue::TransactionQueue;
pub use rates::RateTable;
pub use transaction::{AccountRef, Transaction, TransactionStatus};
