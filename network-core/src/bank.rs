//! Banks: customer accounts, currency reserves, and the pending queue

use crate::currency::CURRENCY_COUNT;
use crate::{Account, Currency, Error, Result, Transaction, TransactionQueue};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Bank identifier: index into the network registry.
pub type BankId = usize;

/// One reserve account per supported currency, owned by a single bank
/// and used to net cross-currency flows.
///
/// Reserves are addressed through [`Currency::index`], never by
/// scanning an account list.
#[derive(Debug)]
pub struct CurrencyReserves {
    accounts: [Account; CURRENCY_COUNT],
}

impl CurrencyReserves {
    /// Create the six reserve accounts for `bank_id`, each seeded with
    /// `initial_balance` and allowed `overdraft_limit` of headroom.
    pub fn new(bank_id: BankId, initial_balance: i64, overdraft_limit: i64) -> Self {
        let accounts = Currency::ALL
            .map(|c| Account::new(c.index(), bank_id, c, initial_balance, overdraft_limit));
        Self { accounts }
    }

    /// Reserve account for `currency`.
    pub fn account(&self, currency: Currency) -> &Account {
        &self.accounts[currency.index()]
    }

    /// Reserve balances per currency, in minor units.
    pub fn balances(&self) -> [(Currency, i64); CURRENCY_COUNT] {
        Currency::ALL.map(|c| (c, self.account(c).balance()))
    }
}

/// Monotonic per-bank counters, updated lock-free by generators and
/// processors and read at report time.
#[derive(Debug, Default)]
pub struct BankStats {
    /// Transactions synthesized by the bank's generator
    pub generated: AtomicU64,
    /// Settlements completed within the bank, same currency
    pub national: AtomicU64,
    /// Cross-border settlements completed
    pub international: AtomicU64,
    /// Settlements refused for insufficient funds
    pub failed: AtomicU64,
    /// Accumulated fees in minor units (overdraft penalties plus
    /// international fees); a report counter only, never deposited
    pub profit_minor: AtomicI64,
}

impl BankStats {
    /// Record fees collected by a successful settlement.
    pub fn add_profit(&self, minor_units: i64) {
        self.profit_minor.fetch_add(minor_units, Ordering::Relaxed);
    }
}

/// A national bank: customer accounts, currency reserves, and the
/// bounded queue its generator and processors share.
#[derive(Debug)]
pub struct Bank {
    /// Bank id in the network registry
    id: BankId,

    /// National currency; every customer account is denominated in it
    currency: Currency,

    /// Per-currency reserve accounts
    reserves: CurrencyReserves,

    /// Lifecycle flag. Read without further synchronization: the only
    /// consequence of a stale read is a slightly delayed observation
    /// of closure, never balance corruption.
    operating: AtomicBool,

    /// Customer accounts, append-only during a run
    accounts: RwLock<Vec<Arc<Account>>>,

    /// Pending transactions awaiting a processor
    queue: TransactionQueue,

    /// Transactions dequeued but abandoned because the bank had
    /// already closed; kept for the shutdown accounting
    abandoned: Mutex<Vec<Transaction>>,

    /// When the bank closed, for incomplete-transaction wait times
    closed_at: OnceLock<Instant>,

    /// Run counters
    stats: BankStats,
}

impl Bank {
    /// Create a bank. It starts closed; call [`open`](Self::open)
    /// before running generators or processors against it.
    pub fn new(
        id: BankId,
        currency: Currency,
        queue_capacity: usize,
        reserve_initial_balance: i64,
        reserve_overdraft_limit: i64,
    ) -> Self {
        Self {
            id,
            currency,
            reserves: CurrencyReserves::new(id, reserve_initial_balance, reserve_overdraft_limit),
            operating: AtomicBool::new(false),
            accounts: RwLock::new(Vec::new()),
            queue: TransactionQueue::new(queue_capacity),
            abandoned: Mutex::new(Vec::new()),
            closed_at: OnceLock::new(),
            stats: BankStats::default(),
        }
    }

    /// Bank id in the network registry
    pub fn id(&self) -> BankId {
        self.id
    }

    /// National currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Pending-transaction queue
    pub fn queue(&self) -> &TransactionQueue {
        &self.queue
    }

    /// Run counters
    pub fn stats(&self) -> &BankStats {
        &self.stats
    }

    /// Reserve account for `currency`
    pub fn reserve(&self, currency: Currency) -> &Account {
        self.reserves.account(currency)
    }

    /// Reserve balances per currency
    pub fn reserve_balances(&self) -> [(Currency, i64); CURRENCY_COUNT] {
        self.reserves.balances()
    }

    /// Start operating.
    pub fn open(&self) {
        self.operating.store(true, Ordering::Relaxed);
        tracing::info!(bank = self.id, currency = %self.currency, "Bank open");
    }

    /// Stop operating and close the queue, waking every producer and
    /// consumer blocked on it.
    pub fn close(&self) {
        self.operating.store(false, Ordering::Relaxed);
        self.queue.close();
        let _ = self.closed_at.set(Instant::now());
        tracing::info!(bank = self.id, "Bank closed");
    }

    /// Whether the bank is currently operating.
    pub fn is_operating(&self) -> bool {
        self.operating.load(Ordering::Relaxed)
    }

    /// When the bank closed, if it has.
    pub fn closed_at(&self) -> Option<Instant> {
        self.closed_at.get().copied()
    }

    /// Open a customer account with the given starting balance and
    /// overdraft limit, both in minor units of the bank's currency.
    /// Returns the new account's index.
    pub fn new_account(&self, balance: i64, overdraft_limit: i64) -> usize {
        let mut accounts = self.accounts.write();
        let index = accounts.len();
        accounts.push(Arc::new(Account::new(
            index,
            self.id,
            self.currency,
            balance,
            overdraft_limit,
        )));
        index
    }

    /// Resolve a customer account by index.
    pub fn account(&self, index: usize) -> Result<Arc<Account>> {
        self.accounts
            .read()
            .get(index)
            .cloned()
            .ok_or(Error::UnknownAccount {
                bank: self.id,
                account: index,
            })
    }

    /// Number of customer accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Sum of all customer balances, in minor units.
    pub fn total_customer_balance(&self) -> i64 {
        self.accounts.read().iter().map(|a| a.balance()).sum()
    }

    /// Record a transaction that was dequeued but abandoned because
    /// the bank had already closed.
    pub fn record_abandoned(&self, transaction: Transaction) {
        self.abandoned.lock().push(transaction);
    }

    /// Take the abandoned transactions recorded so far.
    pub fn take_abandoned(&self) -> Vec<Transaction> {
        std::mem::take(&mut *self.abandoned.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Bank {
        Bank::new(0, Currency::USD, 5, 1_000_000, 0)
    }

    #[test]
    fn test_lifecycle_flag() {
        let bank = bank();
        assert!(!bank.is_operating());
        bank.open();
        assert!(bank.is_operating());
        bank.close();
        assert!(!bank.is_operating());
        assert!(bank.closed_at().is_some());
        assert!(bank.queue().is_closed());
    }

    #[test]
    fn test_new_account_indices_append_only() {
        let bank = bank();
        assert_eq!(bank.new_account(1_000, 0), 0);
        assert_eq!(bank.new_account(2_000, 500), 1);
        assert_eq!(bank.account_count(), 2);
        assert_eq!(bank.account(1).unwrap().overdraft_limit(), 500);
        assert!(matches!(
            bank.account(2),
            Err(Error::UnknownAccount { bank: 0, account: 2 })
        ));
    }

    #[test]
    fn test_accounts_carry_bank_currency() {
        let bank = Bank::new(3, Currency::JPY, 5, 0, 0);
        let idx = bank.new_account(500, 0);
        let account = bank.account(idx).unwrap();
        assert_eq!(account.currency(), Currency::JPY);
        assert_eq!(account.bank_id(), 3);
    }

    #[test]
    fn test_reserves_addressed_by_currency() {
        let bank = Bank::new(2, Currency::GBP, 5, 7_000, 100);
        for c in Currency::ALL {
            let reserve = bank.reserve(c);
            assert_eq!(reserve.currency(), c);
            assert_eq!(reserve.bank_id(), 2);
            assert_eq!(reserve.balance(), 7_000);
        }
    }

    #[test]
    fn test_total_customer_balance() {
        let bank = bank();
        bank.new_account(1_000, 0);
        bank.new_account(-200, 500);
        assert_eq!(bank.total_customer_balance(), 800);
    }
}
