//! Transaction generator: one producer task per bank

use crate::SimulationConfig;
use network_core::{AccountRef, Bank, Network, Transaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Synthesizes random transfers and feeds them to the owning bank's
/// bounded queue while the bank operates.
///
/// The producer loop per iteration: wait for a free queue slot,
/// re-check that the bank still operates (the bank may have closed
/// while the wait was pending), synthesize, enqueue, sleep the
/// inter-arrival delay. The re-check after the wait means no
/// transaction is synthesized that cannot be enqueued.
pub struct TransactionGenerator {
    id: usize,
    bank: Arc<Bank>,
    network: Arc<Network>,
    interarrival: Duration,
    amount_min: i64,
    amount_max: i64,
    rng: StdRng,
}

impl TransactionGenerator {
    /// Create the generator for `bank`.
    ///
    /// With a configured seed the transaction stream is reproducible
    /// per bank; otherwise the RNG is seeded from the OS.
    pub fn new(
        id: usize,
        bank: Arc<Bank>,
        network: Arc<Network>,
        config: &SimulationConfig,
    ) -> Self {
        let rng = match config.generator.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(bank.id() as u64)),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            bank,
            network,
            interarrival: config.interarrival_delay(),
            amount_min: config.generator.amount_min,
            amount_max: config.generator.amount_max,
            rng,
        }
    }

    /// Produce transactions until the bank closes.
    pub async fn run(mut self) {
        tracing::info!(generator = self.id, bank = self.bank.id(), "Generator started");

        while self.bank.is_operating() {
            // Blocking point: admission to the bounded queue.
            if self.bank.queue().reserve_slot().await.is_err() {
                break;
            }

            // Mandatory re-check: the bank may have closed while the
            // slot wait was pending.
            if !self.bank.is_operating() {
                break;
            }

            let transaction = self.synthesize();
            tracing::debug!(
                generator = self.id,
                bank = self.bank.id(),
                transaction = %transaction.id,
                amount = transaction.amount,
                currency = %transaction.currency,
                "Transaction enqueued"
            );
            self.bank.queue().push_reserved(transaction);
            self.bank.stats().generated.fetch_add(1, Ordering::Relaxed);

            tokio::time::sleep(self.interarrival).await;
        }

        tracing::info!(generator = self.id, bank = self.bank.id(), "Generator finished");
    }

    /// Build one random transfer: origin within the owning bank,
    /// destination anywhere in the network, currency derived from the
    /// destination bank.
    fn synthesize(&mut self) -> Transaction {
        let origin = AccountRef {
            bank: self.bank.id(),
            account: self.rng.gen_range(0..self.bank.account_count()),
        };

        let destination_bank = self.rng.gen_range(0..self.network.bank_count());
        // Registry lookup cannot fail for an index below bank_count.
        let dest = &self.network.banks()[destination_bank];
        let destination = AccountRef {
            bank: destination_bank,
            account: self.rng.gen_range(0..dest.account_count()),
        };

        let amount = self.rng.gen_range(self.amount_min..=self.amount_max);
        Transaction::new(origin, destination, amount, dest.currency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_core::{Currency, RateTable};

    fn test_network() -> Arc<Network> {
        let banks = vec![
            Arc::new(Bank::new(0, Currency::USD, 5, 0, 0)),
            Arc::new(Bank::new(1, Currency::EUR, 5, 0, 0)),
        ];
        for bank in &banks {
            for _ in 0..4 {
                bank.new_account(10_000, 0);
            }
        }
        Arc::new(Network::new(banks, RateTable::default()).unwrap())
    }

    fn config() -> SimulationConfig {
        let mut config = SimulationConfig {
            time_unit_ms: 1,
            ..Default::default()
        };
        config.generator.seed = Some(42);
        config
    }

    #[test]
    fn test_synthesize_stays_within_network() {
        let network = test_network();
        let bank = network.banks()[0].clone();
        let mut generator = TransactionGenerator::new(0, bank.clone(), network.clone(), &config());

        for _ in 0..200 {
            let tx = generator.synthesize();
            assert_eq!(tx.origin.bank, bank.id());
            assert!(tx.origin.account < bank.account_count());
            let dest = network.bank(tx.destination.bank).unwrap();
            assert!(tx.destination.account < dest.account_count());
            assert_eq!(tx.currency, dest.currency());
            assert!(tx.amount >= 100 && tx.amount <= 100_000);
        }
    }

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let network = test_network();
        let bank = network.banks()[0].clone();

        let mut a = TransactionGenerator::new(0, bank.clone(), network.clone(), &config());
        let mut b = TransactionGenerator::new(0, bank, network, &config());

        for _ in 0..50 {
            let ta = a.synthesize();
            let tb = b.synthesize();
            assert_eq!(ta.amount, tb.amount);
            assert_eq!(ta.origin, tb.origin);
            assert_eq!(ta.destination, tb.destination);
        }
    }

    #[tokio::test]
    async fn test_generator_stops_on_close() {
        let network = test_network();
        let bank = network.banks()[0].clone();
        bank.open();

        let generator = TransactionGenerator::new(0, bank.clone(), network, &config());
        let handle = tokio::spawn(generator.run());

        tokio::time::sleep(Duration::from_millis(50)).await;
        bank.close();

        // The close broadcast must unblock the producer promptly.
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("generator did not observe closure")
            .unwrap();
    }
}
