//! Configuration for a simulation run

use network_core::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Base time unit in milliseconds; every simulated delay scales
    /// with it
    pub time_unit_ms: u64,

    /// How long banks stay open, in milliseconds
    pub total_simulation_time_ms: u64,

    /// Bounded queue capacity per bank
    pub queue_capacity: usize,

    /// Payment processors per bank
    pub processors_per_bank: usize,

    /// Banks to create, one entry per bank; ids follow entry order
    pub banks: Vec<BankConfig>,

    /// Transaction generator parameters
    pub generator: GeneratorConfig,

    /// Payment processor parameters
    pub processor: ProcessorConfig,

    /// Reserve account parameters
    pub reserves: ReserveConfig,

    /// USD value per currency for the rate table; `None` uses the
    /// built-in defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_values: Option<HashMap<Currency, Decimal>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: 100,
            total_simulation_time_ms: 5_000,
            queue_capacity: 5,
            processors_per_bank: 2,
            banks: Currency::ALL.iter().map(|c| BankConfig::for_currency(*c)).collect(),
            generator: GeneratorConfig::default(),
            processor: ProcessorConfig::default(),
            reserves: ReserveConfig::default(),
            usd_values: None,
        }
    }
}

/// One bank's setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankConfig {
    /// The bank's national currency
    pub currency: Currency,

    /// Customer accounts to open before the run
    pub accounts: usize,

    /// Starting balance range for customer accounts, minor units
    pub account_balance: RangeConfig,

    /// Overdraft limit range for customer accounts, minor units
    pub account_overdraft: RangeConfig,
}

impl BankConfig {
    /// Default setup for a bank in `currency`.
    pub fn for_currency(currency: Currency) -> Self {
        Self {
            currency,
            accounts: 10,
            account_balance: RangeConfig {
                min: 100_000,
                max: 10_000_000,
            },
            account_overdraft: RangeConfig {
                min: 0,
                max: 1_000_000,
            },
        }
    }
}

/// Inclusive integer range used for randomized account parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Lower bound, inclusive
    pub min: i64,
    /// Upper bound, inclusive
    pub max: i64,
}

/// Transaction generator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Inter-arrival delay, as a multiple of the time unit
    pub interarrival_factor: f64,

    /// Smallest generated amount, minor units
    pub amount_min: i64,

    /// Largest generated amount, minor units
    pub amount_max: i64,

    /// RNG seed; a fixed seed gives reproducible transaction streams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interarrival_factor: 0.2,
            amount_min: 100,
            amount_max: 100_000,
            seed: None,
        }
    }
}

/// Payment processor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Simulated settlement latency, as a multiple of the time unit
    pub settlement_delay_factor: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            settlement_delay_factor: 3.0,
        }
    }
}

/// Reserve account parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveConfig {
    /// Starting balance of every reserve account, minor units
    pub initial_balance: i64,

    /// Overdraft ceiling for reserve accounts. Kept very large so the
    /// reserve leg of a cross-border settlement cannot fail after the
    /// origin account was already debited.
    pub overdraft_limit: i64,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100_000_000,
            overdraft_limit: i64::MAX / 4,
        }
    }
}

impl SimulationConfig {
    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulationConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults with environment overrides.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = SimulationConfig::default();

        if let Ok(ms) = std::env::var("SIM_TIME_UNIT_MS") {
            config.time_unit_ms = ms
                .parse()
                .map_err(|_| crate::Error::Config(format!("bad SIM_TIME_UNIT_MS: {ms}")))?;
        }

        if let Ok(ms) = std::env::var("SIM_TOTAL_TIME_MS") {
            config.total_simulation_time_ms = ms
                .parse()
                .map_err(|_| crate::Error::Config(format!("bad SIM_TOTAL_TIME_MS: {ms}")))?;
        }

        if let Ok(n) = std::env::var("SIM_PROCESSORS_PER_BANK") {
            config.processors_per_bank = n
                .parse()
                .map_err(|_| crate::Error::Config(format!("bad SIM_PROCESSORS_PER_BANK: {n}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> crate::Result<()> {
        if self.banks.is_empty() {
            return Err(crate::Error::Config("at least one bank required".into()));
        }
        if self.queue_capacity == 0 {
            return Err(crate::Error::Config("queue_capacity must be positive".into()));
        }
        if self.processors_per_bank == 0 {
            return Err(crate::Error::Config(
                "processors_per_bank must be positive".into(),
            ));
        }
        if self.generator.amount_min <= 0 || self.generator.amount_min > self.generator.amount_max
        {
            return Err(crate::Error::Config(format!(
                "bad amount range [{}, {}]",
                self.generator.amount_min, self.generator.amount_max
            )));
        }
        for (id, bank) in self.banks.iter().enumerate() {
            if bank.accounts == 0 {
                return Err(crate::Error::Config(format!(
                    "bank {id} must have at least one account"
                )));
            }
            for range in [bank.account_balance, bank.account_overdraft] {
                if range.min < 0 || range.min > range.max {
                    return Err(crate::Error::Config(format!(
                        "bank {id} has a bad range [{}, {}]",
                        range.min, range.max
                    )));
                }
            }
        }
        Ok(())
    }

    /// One simulated time unit.
    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// Delay between generated transactions.
    pub fn interarrival_delay(&self) -> Duration {
        self.scaled(self.generator.interarrival_factor)
    }

    /// Simulated settlement latency.
    pub fn settlement_delay(&self) -> Duration {
        self.scaled(self.processor.settlement_delay_factor)
    }

    /// How long banks stay open.
    pub fn total_runtime(&self) -> Duration {
        Duration::from_millis(self.total_simulation_time_ms)
    }

    fn scaled(&self, factor: f64) -> Duration {
        Duration::from_secs_f64(factor * self.time_unit_ms as f64 / 1_000.0)
    }
}
