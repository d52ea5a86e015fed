//! Bounded FIFO transaction queue
//!
//! The classic bounded-buffer protocol: a "free slots" semaphore
//! (initialized to capacity) admits producers, an "items" semaphore
//! (initialized to zero) admits consumers, and the FIFO itself sits
//! behind its own mutex. Capacity is enforced entirely by the permits;
//! there is no size check anywhere.
//!
//! Shutdown is a broadcast: `close()` closes both semaphores, so every
//! producer or consumer blocked on a permit — however many there are —
//! wakes with [`Error::QueueClosed`]. Items still buffered at close
//! time are never delivered; [`drain`](TransactionQueue::drain)
//! returns them for the shutdown accounting.

use crate::{Error, Result, Transaction};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Semaphore;

/// Bounded FIFO queue of pending transactions.
#[derive(Debug)]
pub struct TransactionQueue {
    /// Free-slot permits; producers block here when the queue is full
    free_slots: Semaphore,

    /// Available-item permits; consumers block here when it is empty
    items: Semaphore,

    /// The FIFO proper, guarded by its own lock
    fifo: Mutex<VecDeque<Transaction>>,
}

impl TransactionQueue {
    /// Create a queue admitting at most `capacity` buffered items.
    pub fn new(capacity: usize) -> Self {
        Self {
            free_slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            fifo: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Wait until a slot is free and claim it, without inserting yet.
    ///
    /// This is the producer's blocking point. Returns
    /// [`Error::QueueClosed`] once the queue has been closed. Callers
    /// that claim a slot and then decide not to insert (bank closed
    /// between the wait and the insert) simply walk away; the slot is
    /// unreachable after close anyway.
    pub async fn reserve_slot(&self) -> Result<()> {
        let permit = self
            .free_slots
            .acquire()
            .await
            .map_err(|_| Error::QueueClosed)?;
        // The slot is consumed for good; the consumer side returns it
        // after the matching pop.
        permit.forget();
        Ok(())
    }

    /// Insert a transaction into a slot claimed with
    /// [`reserve_slot`](Self::reserve_slot). Never blocks.
    pub fn push_reserved(&self, transaction: Transaction) {
        self.fifo.lock().push_back(transaction);
        self.items.add_permits(1);
    }

    /// Insert a transaction, waiting for a free slot if the queue is
    /// full.
    ///
    /// Returns [`Error::QueueClosed`] once the queue has been closed.
    pub async fn push(&self, transaction: Transaction) -> Result<()> {
        self.reserve_slot().await?;
        self.push_reserved(transaction);
        Ok(())
    }

    /// Remove the oldest transaction, waiting for one if the queue is
    /// empty.
    ///
    /// Returns [`Error::QueueClosed`] once the queue has been closed,
    /// including for items that were still buffered at close time —
    /// those are only reachable through [`drain`](Self::drain).
    pub async fn pop(&self) -> Result<Transaction> {
        let permit = self.items.acquire().await.map_err(|_| Error::QueueClosed)?;
        permit.forget();

        let transaction = self
            .fifo
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Queue("item permit held but FIFO empty".to_string()))?;
        self.free_slots.add_permits(1);
        Ok(transaction)
    }

    /// Close the queue, waking every blocked producer and consumer.
    ///
    /// Idempotent. After this call `push` and `pop` fail immediately
    /// with [`Error::QueueClosed`].
    pub fn close(&self) {
        self.free_slots.close();
        self.items.close();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.free_slots.is_closed()
    }

    /// Number of currently buffered items.
    pub fn len(&self) -> usize {
        self.fifo.lock().len()
    }

    /// Whether the buffer is currently empty.
    pub fn is_empty(&self) -> bool {
        self.fifo.lock().is_empty()
    }

    /// Take every still-buffered transaction, in FIFO order.
    ///
    /// Intended for shutdown accounting after `close()`; the queue is
    /// left empty.
    pub fn drain(&self) -> Vec<Transaction> {
        self.fifo.lock().drain(..).collect()
    }
}
