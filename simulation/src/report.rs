//! Shutdown accounting and per-bank statistics
//!
//! Assembled once, after every generator and processor task has
//! joined. Incomplete transactions are the ones the closure caught:
//! still buffered in the queue, or dequeued and then abandoned by the
//! bank-state check inside settlement.

use chrono::{DateTime, Utc};
use network_core::{Bank, Currency, Network};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

/// Balance of one reserve account at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveBalance {
    /// Reserve currency
    pub currency: Currency,
    /// Balance in minor units
    pub balance: i64,
}

/// End-of-run accounting for one bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankReport {
    /// Bank id
    pub bank: usize,

    /// National currency
    pub currency: Currency,

    /// Transactions the bank's generator created
    pub generated: u64,

    /// Domestic settlements completed
    pub national: u64,

    /// Cross-border settlements completed
    pub international: u64,

    /// Settlements refused for insufficient funds
    pub failed: u64,

    /// Transactions still queued at closure
    pub left_in_queue: u64,

    /// Transactions dequeued but abandoned by the closure check
    pub abandoned: u64,

    /// Average wait of incomplete transactions from creation to bank
    /// closure, in milliseconds; `None` when nothing was incomplete
    pub avg_incomplete_wait_ms: Option<f64>,

    /// Customer accounts registered
    pub account_count: usize,

    /// Sum of customer balances, minor units
    pub total_customer_balance: i64,

    /// Reserve balances per currency
    pub reserves: Vec<ReserveBalance>,

    /// Accumulated fees (overdraft penalties + international fees),
    /// minor units; a counter, not a balance
    pub profit: i64,
}

impl BankReport {
    /// Total incomplete transactions: queued at closure plus abandoned
    /// mid-settlement.
    pub fn incomplete(&self) -> u64 {
        self.left_in_queue + self.abandoned
    }

    /// Collect the report for `bank`. Drains the bank's queue and
    /// abandoned list; call once, after the bank's tasks have joined.
    pub fn collect(bank: &Bank) -> Self {
        let closed_at = bank.closed_at();

        let queued = bank.queue().drain();
        let abandoned = bank.take_abandoned();

        let incomplete_count = queued.len() + abandoned.len();
        let avg_incomplete_wait_ms = closed_at.and_then(|closed| {
            if incomplete_count == 0 {
                return None;
            }
            let total_ms: f64 = queued
                .iter()
                .chain(abandoned.iter())
                .map(|tx| closed.saturating_duration_since(tx.created_at).as_secs_f64() * 1_000.0)
                .sum();
            Some(total_ms / incomplete_count as f64)
        });

        let stats = bank.stats();
        Self {
            bank: bank.id(),
            currency: bank.currency(),
            generated: stats.generated.load(Ordering::Relaxed),
            national: stats.national.load(Ordering::Relaxed),
            international: stats.international.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
            left_in_queue: queued.len() as u64,
            abandoned: abandoned.len() as u64,
            avg_incomplete_wait_ms,
            account_count: bank.account_count(),
            total_customer_balance: bank.total_customer_balance(),
            reserves: bank
                .reserve_balances()
                .into_iter()
                .map(|(currency, balance)| ReserveBalance { currency, balance })
                .collect(),
            profit: stats.profit_minor.load(Ordering::Relaxed),
        }
    }
}

/// End-of-run accounting for the whole network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (all tasks joined)
    pub finished_at: DateTime<Utc>,

    /// Per-bank accounting, in bank-id order
    pub banks: Vec<BankReport>,
}

impl SimulationReport {
    /// Collect reports for every bank in the network.
    pub fn collect(network: &Network, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            banks: network.banks().iter().map(|b| BankReport::collect(b)).collect(),
        }
    }

    /// Transactions created across all banks.
    pub fn total_generated(&self) -> u64 {
        self.banks.iter().map(|b| b.generated).sum()
    }

    /// Transactions that reached a terminal status.
    pub fn total_settled(&self) -> u64 {
        self.banks
            .iter()
            .map(|b| b.national + b.international + b.failed)
            .sum()
    }

    /// Transactions the closure caught before a terminal status.
    pub fn total_incomplete(&self) -> u64 {
        self.banks.iter().map(|b| b.incomplete()).sum()
    }

    /// Log a per-bank summary at info level.
    pub fn log_summary(&self) {
        for bank in &self.banks {
            tracing::info!(
                bank = bank.bank,
                currency = %bank.currency,
                generated = bank.generated,
                national = bank.national,
                international = bank.international,
                failed = bank.failed,
                incomplete = bank.incomplete(),
                avg_incomplete_wait_ms = bank.avg_incomplete_wait_ms,
                total_customer_balance = bank.total_customer_balance,
                profit = bank.profit,
                "Bank summary"
            );
        }
        tracing::info!(
            generated = self.total_generated(),
            settled = self.total_settled(),
            incomplete = self.total_incomplete(),
            "Run summary"
        );
    }
}
