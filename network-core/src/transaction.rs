//! Transfer requests and their settlement outcome

use crate::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Instant;
use uuid::Uuid;

/// Location of an account in the network: bank id + account index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRef {
    /// Bank id in the network registry
    pub bank: usize,
    /// Account index within that bank
    pub account: usize,
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Created, not yet settled
    Pending,
    /// Settled: origin debited, destination credited (terminal)
    Successful,
    /// Withdraw refused; no balance was mutated (terminal)
    Failed,
}

/// A transfer request plus its settlement outcome.
///
/// The request fields (`origin`, `destination`, `amount`, `currency`)
/// are immutable after creation. The outcome fields (`status`,
/// `taxes`, `exchange_rate`) are written exactly once, by the single
/// processor that dequeued the transaction. A transaction that is
/// never dequeued — or abandoned because its bank closed — stays
/// `Pending` and is counted in the shutdown report instead.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Unique, time-ordered id
    pub id: Uuid,

    /// Origin account (always within the generating bank)
    pub origin: AccountRef,

    /// Destination account (any bank in the network)
    pub destination: AccountRef,

    /// Transfer amount in minor units of the origin currency
    pub amount: i64,

    /// Target currency (the destination bank's national currency)
    pub currency: Currency,

    /// Accumulated fees in minor units of the origin currency
    pub taxes: Decimal,

    /// Exchange rate applied during settlement (1 until set)
    pub exchange_rate: Decimal,

    /// Settlement outcome
    pub status: TransactionStatus,

    /// Creation instant, for incomplete-transaction wait accounting
    pub created_at: Instant,

    /// Wall-clock creation time, for logs and reports
    pub created_at_utc: DateTime<Utc>,
}

impl Transaction {
    /// Create a new pending transaction.
    pub fn new(
        origin: AccountRef,
        destination: AccountRef,
        amount: i64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            origin,
            destination,
            amount,
            currency,
            taxes: Decimal::ZERO,
            exchange_rate: Decimal::ONE,
            status: TransactionStatus::Pending,
            created_at: Instant::now(),
            created_at_utc: Utc::now(),
        }
    }

    /// Whether the transaction reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Successful | TransactionStatus::Failed
        )
    }

    /// Whether origin and destination live in the same bank.
    pub fn is_domestic(&self) -> bool {
        self.origin.bank == self.destination.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_defaults() {
        let tx = Transaction::new(
            AccountRef { bank: 0, account: 1 },
            AccountRef { bank: 2, account: 3 },
            10_000,
            Currency::GBP,
        );
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.taxes, Decimal::ZERO);
        assert_eq!(tx.exchange_rate, Decimal::ONE);
        assert!(!tx.is_terminal());
        assert!(!tx.is_domestic());
    }

    #[test]
    fn test_domestic_detection() {
        let tx = Transaction::new(
            AccountRef { bank: 1, account: 0 },
            AccountRef { bank: 1, account: 4 },
            500,
            Currency::EUR,
        );
        assert!(tx.is_domestic());
    }

    #[test]
    fn test_terminal_statuses() {
        let mut tx = Transaction::new(
            AccountRef { bank: 0, account: 0 },
            AccountRef { bank: 0, account: 1 },
            1,
            Currency::USD,
        );
        tx.status = TransactionStatus::Failed;
        assert!(tx.is_terminal());
        tx.status = TransactionStatus::Successful;
        assert!(tx.is_terminal());
    }
}
