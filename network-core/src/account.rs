//! Customer and reserve accounts
//!
//! Every balance mutation is a single short critical section on the
//! account's own mutex. There is deliberately no two-account atomic
//! section: a settlement's withdraw and deposit are independent
//! operations, and conservation is argued at the settlement level.

use crate::{Currency, Error, Result};
use parking_lot::Mutex;

/// A balance holder with an overdraft limit.
///
/// Balances are integer minor units (cents, pence, ...). The invariant
/// `balance >= -overdraft_limit` holds after every completed operation.
#[derive(Debug)]
pub struct Account {
    /// Account index within its owning bank
    id: usize,

    /// Owning bank
    bank_id: usize,

    /// Account currency (the owning bank's for customer accounts)
    currency: Currency,

    /// Balance in minor units, serialized through the mutex
    balance: Mutex<i64>,

    /// Permitted negative balance, in minor units
    overdraft_limit: i64,
}

impl Account {
    /// Create a new account.
    pub fn new(
        id: usize,
        bank_id: usize,
        currency: Currency,
        balance: i64,
        overdraft_limit: i64,
    ) -> Self {
        Self {
            id,
            bank_id,
            currency,
            balance: Mutex::new(balance),
            overdraft_limit,
        }
    }

    /// Account index within its owning bank
    pub fn id(&self) -> usize {
        self.id
    }

    /// Owning bank id
    pub fn bank_id(&self) -> usize {
        self.bank_id
    }

    /// Account currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Overdraft limit in minor units
    pub fn overdraft_limit(&self) -> i64 {
        self.overdraft_limit
    }

    /// Current balance in minor units.
    ///
    /// A point-in-time read; the balance may change as soon as the
    /// internal lock is released.
    pub fn balance(&self) -> i64 {
        *self.balance.lock()
    }

    /// Add `amount` minor units to the balance. Always succeeds.
    ///
    /// Returns the post-deposit balance, observed inside the critical
    /// section.
    pub fn deposit(&self, amount: i64) -> i64 {
        debug_assert!(amount >= 0, "deposit amount must be non-negative");
        let mut balance = self.balance.lock();
        *balance += amount;
        *balance
    }

    /// Remove `amount` minor units from the balance.
    ///
    /// Succeeds iff `balance - amount >= -overdraft_limit`; the balance
    /// may go negative (overdraft use). Fails without mutation
    /// otherwise. Returns the post-withdraw balance on success so the
    /// caller can detect overdraft use without a second, racy read.
    pub fn withdraw(&self, amount: i64) -> Result<i64> {
        debug_assert!(amount >= 0, "withdraw amount must be non-negative");
        let mut balance = self.balance.lock();
        if *balance - amount >= -self.overdraft_limit {
            *balance -= amount;
            Ok(*balance)
        } else {
            Err(Error::InsufficientFunds {
                requested: amount,
                available: *balance + self.overdraft_limit,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: i64, overdraft_limit: i64) -> Account {
        Account::new(0, 0, Currency::USD, balance, overdraft_limit)
    }

    #[test]
    fn test_deposit_accumulates() {
        let acc = account(0, 0);
        assert_eq!(acc.deposit(1_000), 1_000);
        assert_eq!(acc.deposit(250), 1_250);
        assert_eq!(acc.balance(), 1_250);
    }

    #[test]
    fn test_withdraw_within_balance() {
        let acc = account(1_000, 0);
        assert_eq!(acc.withdraw(400).unwrap(), 600);
        assert_eq!(acc.balance(), 600);
    }

    #[test]
    fn test_withdraw_into_overdraft_then_refused() {
        // Scenario: balance 1000, overdraft 500.
        let acc = account(1_000, 500);

        // 1200 > 1000 but the 200 shortfall fits the overdraft.
        assert_eq!(acc.withdraw(1_200).unwrap(), -200);
        assert_eq!(acc.balance(), -200);

        // -200 - 400 = -600 < -500: refused, balance untouched.
        let err = acc.withdraw(400).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { requested: 400, .. }));
        assert_eq!(acc.balance(), -200);
    }

    #[test]
    fn test_withdraw_exact_overdraft_boundary() {
        let acc = account(0, 500);
        assert_eq!(acc.withdraw(500).unwrap(), -500);
        assert!(acc.withdraw(1).is_err());
    }

    #[test]
    fn test_failed_withdraw_reports_headroom() {
        let acc = account(100, 50);
        match acc.withdraw(200) {
            Err(Error::InsufficientFunds { requested, available }) => {
                assert_eq!(requested, 200);
                assert_eq!(available, 150);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_deposits_serialize() {
        use std::sync::Arc;

        let acc = Arc::new(account(0, 0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let acc = Arc::clone(&acc);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1_000 {
                    acc.deposit(1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(acc.balance(), 8_000);
    }
}
