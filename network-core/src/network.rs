//! The shared bank registry
//!
//! Cross-border settlement resolves destination accounts through this
//! registry. It is built once, before any generator or processor task
//! starts, and is read-mostly afterwards; it is handed to constructors
//! as an `Arc` rather than living in ambient global state.

use crate::{Bank, BankId, Error, RateTable, Result};
use std::sync::Arc;

/// The interbank network: every bank plus the exchange-rate table.
#[derive(Debug)]
pub struct Network {
    banks: Vec<Arc<Bank>>,
    rates: RateTable,
}

impl Network {
    /// Assemble the network. Bank ids must match their position in
    /// `banks`; the registry resolves by index.
    pub fn new(banks: Vec<Arc<Bank>>, rates: RateTable) -> Result<Self> {
        for (index, bank) in banks.iter().enumerate() {
            if bank.id() != index {
                return Err(Error::Config(format!(
                    "bank id {} registered at position {index}",
                    bank.id()
                )));
            }
        }
        Ok(Self { banks, rates })
    }

    /// Resolve a bank by id.
    pub fn bank(&self, id: BankId) -> Result<&Arc<Bank>> {
        self.banks.get(id).ok_or(Error::UnknownBank(id))
    }

    /// All banks, in id order.
    pub fn banks(&self) -> &[Arc<Bank>] {
        &self.banks
    }

    /// Number of registered banks.
    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    /// Exchange-rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Open every bank.
    pub fn open_all(&self) {
        for bank in &self.banks {
            bank.open();
        }
    }

    /// Close every bank, waking all blocked producers and consumers.
    pub fn close_all(&self) {
        for bank in &self.banks {
            bank.close();
        }
    }
}
