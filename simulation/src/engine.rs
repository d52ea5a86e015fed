//! Simulation orchestration
//!
//! Builds the network from configuration, opens every bank, runs one
//! generator and a pool of processors per bank for the configured
//! span, closes the banks mid-flight, joins every task, and assembles
//! the shutdown report.

use crate::{
    Error, PaymentProcessor, Result, SimulationConfig, SimulationReport, TransactionGenerator,
};
use chrono::Utc;
use network_core::{Bank, Network, RateTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Drives one simulation run end to end.
pub struct SimulationEngine {
    config: SimulationConfig,
    network: Arc<Network>,
}

impl SimulationEngine {
    /// Build the network described by `config`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let rates = match &config.usd_values {
            Some(values) => RateTable::from_usd_values(values.clone())?,
            None => RateTable::default(),
        };

        let mut rng = match config.generator.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut banks = Vec::with_capacity(config.banks.len());
        for (id, bank_config) in config.banks.iter().enumerate() {
            let bank = Bank::new(
                id,
                bank_config.currency,
                config.queue_capacity,
                config.reserves.initial_balance,
                config.reserves.overdraft_limit,
            );
            for _ in 0..bank_config.accounts {
                let balance = rng
                    .gen_range(bank_config.account_balance.min..=bank_config.account_balance.max);
                let overdraft = rng.gen_range(
                    bank_config.account_overdraft.min..=bank_config.account_overdraft.max,
                );
                bank.new_account(balance, overdraft);
            }
            banks.push(Arc::new(bank));
        }

        let network = Arc::new(Network::new(banks, rates)?);
        Ok(Self { config, network })
    }

    /// The assembled network; mainly useful to tests and the report.
    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// Run the simulation to completion and return the shutdown
    /// report.
    pub async fn run(self) -> Result<SimulationReport> {
        let started_at = Utc::now();
        tracing::info!(
            banks = self.network.bank_count(),
            processors_per_bank = self.config.processors_per_bank,
            runtime_ms = self.config.total_simulation_time_ms,
            "Simulation starting"
        );

        self.network.open_all();

        let mut tasks = Vec::new();
        for bank in self.network.banks() {
            let generator = TransactionGenerator::new(
                bank.id(),
                Arc::clone(bank),
                Arc::clone(&self.network),
                &self.config,
            );
            tasks.push(tokio::spawn(generator.run()));

            for p in 0..self.config.processors_per_bank {
                let processor = PaymentProcessor::new(
                    p,
                    Arc::clone(bank),
                    Arc::clone(&self.network),
                    &self.config,
                );
                tasks.push(tokio::spawn(processor.run()));
            }
        }

        tokio::time::sleep(self.config.total_runtime()).await;
        self.network.close_all();

        // Every task observes the close broadcast and exits; a settle
        // already past its dequeue finishes (or abandons) first.
        for task in tasks {
            task.await.map_err(|e| Error::Task(e.to_string()))?;
        }

        let report = SimulationReport::collect(&self.network, started_at);
        report.log_summary();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_core::Currency;

    #[test]
    fn test_engine_builds_configured_network() {
        let mut config = SimulationConfig::default();
        config.generator.seed = Some(7);
        let engine = SimulationEngine::new(config).unwrap();

        let network = engine.network();
        assert_eq!(network.bank_count(), Currency::ALL.len());
        for bank in network.banks() {
            assert_eq!(bank.account_count(), 10);
            assert!(!bank.is_operating());
        }
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = SimulationConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert!(SimulationEngine::new(config).is_err());
    }
}
