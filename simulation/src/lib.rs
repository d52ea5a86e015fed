//! Interbank payment network simulation
//!
//! Runs a synthetic multi-currency payment network: each national bank
//! gets one transaction generator (producer) and a pool of payment
//! processors (consumers) contending on the bank's bounded queue and
//! on whichever accounts a transaction touches. Banks open, operate
//! for a configured span, then close mid-flight; transactions caught
//! by the closure are counted rather than settled.
//!
//! # Example
//!
//! ```no_run
//! use simulation::{SimulationConfig, SimulationEngine};
//!
//! #[tokio::main]
//! async fn main() -> simulation::Result<()> {
//!     let config = SimulationConfig::default();
//!     let report = SimulationEngine::new(config)?.run().await?;
//!     println!("{} incomplete transactions", report.total_incomplete());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod processor;
pub mod report;

// Re-exports
pub use config::SimulationConfig;
pub use engine::SimulationEngine;
pub use error::{Error, Result};
pub use generator::TransactionGenerator;
pub use processor::PaymentProcessor;
pub use report::{BankReport, SimulationReport};
