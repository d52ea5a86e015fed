//! Payment processor: the settlement engine's consumer side
//!
//! Several processors per bank contend on the bank's bounded queue
//! and on whichever accounts a transaction touches. Settlement is a
//! multi-step algorithm: withdraw from the origin (overdraft rules
//! apply), compute fees, convert through the bank's currency reserves
//! for cross-border transfers, deposit into the destination. The only
//! abort path — bank closed after dequeue — fires strictly before the
//! first balance mutation, so a partially-applied transfer cannot be
//! observed.

use crate::SimulationConfig;
use network_core::{Bank, Error as CoreError, Network, Transaction, TransactionStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Overdraft penalty applied when a withdraw pushes the origin
/// balance negative: 5% of the transfer amount.
const OVERDRAFT_PENALTY_RATE: Decimal = dec!(0.05);

/// Flat fee on cross-border transfers: 1% of the transfer amount.
const INTERNATIONAL_FEE_RATE: Decimal = dec!(0.01);

/// Consumes transactions from one bank's queue and settles them.
pub struct PaymentProcessor {
    id: usize,
    bank: Arc<Bank>,
    network: Arc<Network>,
    settlement_delay: Duration,
}

impl PaymentProcessor {
    /// Create a processor for `bank`.
    pub fn new(
        id: usize,
        bank: Arc<Bank>,
        network: Arc<Network>,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            id,
            bank,
            network,
            settlement_delay: config.settlement_delay(),
        }
    }

    /// Consume and settle transactions until the bank closes.
    ///
    /// An item that was already dequeued when closure happened is
    /// still taken through [`settle`](Self::settle); the bank-state
    /// check inside settlement decides whether it is abandoned. A
    /// closed queue ends the loop; any other dequeue fault is logged
    /// and the loop continues.
    pub async fn run(self) {
        tracing::info!(processor = self.id, bank = self.bank.id(), "Processor started");

        loop {
            match self.bank.queue().pop().await {
                Ok(transaction) => {
                    self.settle(transaction).await;
                }
                Err(CoreError::QueueClosed) => break,
                Err(err) => {
                    tracing::warn!(
                        processor = self.id,
                        bank = self.bank.id(),
                        error = %err,
                        "Dequeue fault, continuing"
                    );
                }
            }
        }

        tracing::info!(processor = self.id, bank = self.bank.id(), "Processor finished");
    }

    /// Settle one transaction to a terminal status, or abandon it if
    /// the bank closed before any balance was touched.
    ///
    /// Returns the transaction with its outcome fields written, so
    /// scenario tests can inspect fees and status directly.
    pub async fn settle(&self, mut transaction: Transaction) -> Transaction {
        // Simulated settlement latency. Unconditional: it elapses in
        // full even for a transaction that aborts right after.
        tokio::time::sleep(self.settlement_delay).await;

        // Closure abort, strictly before the first mutation. The
        // transaction stays non-terminal and is counted at shutdown.
        if !self.bank.is_operating() {
            tracing::debug!(
                processor = self.id,
                bank = self.bank.id(),
                transaction = %transaction.id,
                "Bank closed mid-settlement, abandoning"
            );
            self.bank.record_abandoned(transaction.clone());
            return transaction;
        }

        let (origin, destination) = match self.resolve_accounts(&transaction) {
            Ok(accounts) => accounts,
            Err(err) => {
                tracing::warn!(
                    processor = self.id,
                    transaction = %transaction.id,
                    error = %err,
                    "Account resolution failed"
                );
                transaction.status = TransactionStatus::Failed;
                self.bank.stats().failed.fetch_add(1, Ordering::Relaxed);
                return transaction;
            }
        };

        // Withdraw from the origin; a refusal is terminal and inert.
        let new_balance = match origin.withdraw(transaction.amount) {
            Ok(balance) => balance,
            Err(err) => {
                tracing::info!(
                    processor = self.id,
                    transaction = %transaction.id,
                    error = %err,
                    "Transaction failed"
                );
                transaction.status = TransactionStatus::Failed;
                self.bank.stats().failed.fetch_add(1, Ordering::Relaxed);
                return transaction;
            }
        };

        // Overdraft was used: flat 5% penalty.
        if new_balance < 0 {
            transaction.taxes = Decimal::from(transaction.amount) * OVERDRAFT_PENALTY_RATE;
        }

        if transaction.is_domestic() {
            debug_assert_eq!(transaction.currency, self.bank.currency());
            let final_value = Decimal::from(transaction.amount) - transaction.taxes;
            destination.deposit(to_minor_units(final_value));
            self.bank.stats().national.fetch_add(1, Ordering::Relaxed);
        } else {
            self.settle_cross_border(&mut transaction, &destination);
            self.bank.stats().international.fetch_add(1, Ordering::Relaxed);
        }

        self.bank.stats().add_profit(to_minor_units(transaction.taxes));
        transaction.status = TransactionStatus::Successful;
        tracing::debug!(
            processor = self.id,
            transaction = %transaction.id,
            taxes = %transaction.taxes,
            "Transaction settled"
        );
        transaction
    }

    /// The cross-border legs: park the withdrawn funds in the origin
    /// bank's own-currency reserve, apply the international fee,
    /// convert, draw the converted value from the destination-currency
    /// reserve, and credit the destination account.
    fn settle_cross_border(
        &self,
        transaction: &mut Transaction,
        destination: &network_core::Account,
    ) {
        let own_currency = self.bank.currency();

        // Withdrawn funds move into the national reserve first; they
        // leave the country only as converted value.
        self.bank.reserve(own_currency).deposit(transaction.amount);

        transaction.taxes += Decimal::from(transaction.amount) * INTERNATIONAL_FEE_RATE;
        let value_to_convert = Decimal::from(transaction.amount) - transaction.taxes;

        let rate = self.network.rates().rate(own_currency, transaction.currency);
        transaction.exchange_rate = rate;
        let final_value = to_minor_units(value_to_convert * rate);

        // Reserve accounts carry a configured overdraft ceiling large
        // enough that this leg cannot fail after the origin was
        // already debited.
        if let Err(err) = self.bank.reserve(transaction.currency).withdraw(final_value) {
            tracing::error!(
                processor = self.id,
                transaction = %transaction.id,
                error = %err,
                "Reserve withdraw refused; check reserve overdraft configuration"
            );
        }

        destination.deposit(final_value);
    }

    fn resolve_accounts(
        &self,
        transaction: &Transaction,
    ) -> network_core::Result<(Arc<network_core::Account>, Arc<network_core::Account>)> {
        let origin = self.bank.account(transaction.origin.account)?;
        let destination = self
            .network
            .bank(transaction.destination.bank)?
            .account(transaction.destination.account)?;
        Ok((origin, destination))
    }
}

/// Round a decimal amount to whole minor units.
fn to_minor_units(value: Decimal) -> i64 {
    value
        .round_dp(0)
        .to_i64()
        .expect("minor-unit amounts fit in i64")
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_core::{AccountRef, Currency, RateTable};

    #[test]
    fn test_to_minor_units_rounds_to_whole_units() {
        assert_eq!(to_minor_units(dec!(1980.0)), 1_980);
        assert_eq!(to_minor_units(dec!(9500)), 9_500);
        assert_eq!(to_minor_units(dec!(12.4)), 12);
        assert_eq!(to_minor_units(dec!(12.6)), 13);
    }

    fn two_bank_network() -> Arc<Network> {
        let banks = vec![
            Arc::new(Bank::new(0, Currency::USD, 5, 1_000_000, i64::MAX / 4)),
            Arc::new(Bank::new(1, Currency::BRL, 5, 1_000_000, i64::MAX / 4)),
        ];
        for bank in &banks {
            bank.new_account(100_000, 0);
            bank.new_account(0, 0);
        }
        let rates = RateTable::default().with_rate(Currency::USD, Currency::BRL, dec!(0.2));
        Arc::new(Network::new(banks, rates).unwrap())
    }

    fn fast_config() -> SimulationConfig {
        SimulationConfig {
            time_unit_ms: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_domestic_settlement_without_overdraft() {
        let network = two_bank_network();
        let bank = network.banks()[0].clone();
        bank.open();
        let processor = PaymentProcessor::new(0, bank.clone(), network.clone(), &fast_config());

        let tx = Transaction::new(
            AccountRef { bank: 0, account: 0 },
            AccountRef { bank: 0, account: 1 },
            10_000,
            Currency::USD,
        );
        let settled = processor.settle(tx).await;

        assert_eq!(settled.status, TransactionStatus::Successful);
        assert_eq!(settled.taxes, Decimal::ZERO);
        assert_eq!(bank.account(0).unwrap().balance(), 90_000);
        assert_eq!(bank.account(1).unwrap().balance(), 10_000);
    }

    #[tokio::test]
    async fn test_failed_withdraw_is_inert() {
        let network = two_bank_network();
        let bank = network.banks()[0].clone();
        bank.open();
        let processor = PaymentProcessor::new(0, bank.clone(), network.clone(), &fast_config());

        // Account 1 holds 0 with no overdraft.
        let tx = Transaction::new(
            AccountRef { bank: 0, account: 1 },
            AccountRef { bank: 0, account: 0 },
            500,
            Currency::USD,
        );
        let settled = processor.settle(tx).await;

        assert_eq!(settled.status, TransactionStatus::Failed);
        assert_eq!(bank.account(0).unwrap().balance(), 100_000);
        assert_eq!(bank.account(1).unwrap().balance(), 0);
        assert_eq!(bank.stats().failed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_closed_bank_abandons_before_mutation() {
        let network = two_bank_network();
        let bank = network.banks()[0].clone();
        // Never opened: the closure check fires after the delay.
        let processor = PaymentProcessor::new(0, bank.clone(), network.clone(), &fast_config());

        let tx = Transaction::new(
            AccountRef { bank: 0, account: 0 },
            AccountRef { bank: 0, account: 1 },
            10_000,
            Currency::USD,
        );
        let settled = processor.settle(tx).await;

        assert_eq!(settled.status, TransactionStatus::Pending);
        assert_eq!(bank.account(0).unwrap().balance(), 100_000);
        assert_eq!(bank.account(1).unwrap().balance(), 0);
        assert_eq!(bank.take_abandoned().len(), 1);
    }
}
