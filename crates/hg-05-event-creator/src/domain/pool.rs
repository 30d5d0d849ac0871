//! Transaction pool
//!
//! FIFO of application transactions waiting for an event, bounded by count
//! and total bytes.

use super::{CreatorError, CreatorResult, PoolConfig};
use std::collections::VecDeque;

#[derive(Debug)]
pub struct TransactionPool {
    config: PoolConfig,
    queue: VecDeque<Vec<u8>>,
    bytes: usize,
}

impl TransactionPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            bytes: 0,
        }
    }

    pub fn submit(&mut self, transaction: Vec<u8>) -> CreatorResult<()> {
        if transaction.is_empty() {
            return Err(CreatorError::EmptyTransaction);
        }
        if transaction.len() > self.config.max_transaction_size {
            return Err(CreatorError::TransactionTooLarge {
                size: transaction.len(),
                max: self.config.max_transaction_size,
            });
        }
        if self.queue.len() >= self.config.max_transactions
            || self.bytes + transaction.len() > self.config.max_bytes
        {
            return Err(CreatorError::PoolFull);
        }
        self.bytes += transaction.len();
        self.queue.push_back(transaction);
        Ok(())
    }

    /// Oldest transactions fitting both limits.
    pub fn take_batch(&mut self, max_count: usize, max_bytes: usize) -> Vec<Vec<u8>> {
        let mut batch = Vec::new();
        let mut batch_bytes = 0;
        while batch.len() < max_count {
            let fits = self
                .queue
                .front()
                .is_some_and(|tx| batch_bytes + tx.len() <= max_bytes);
            if !fits {
                break;
            }
            if let Some(tx) = self.queue.pop_front() {
                batch_bytes += tx.len();
                self.bytes -= tx.len();
                batch.push(tx);
            }
        }
        batch
    }

    /// Put a batch back at the head, e.g. when its event was not submitted.
    pub fn restore(&mut self, batch: Vec<Vec<u8>>) {
        for tx in batch.into_iter().rev() {
            self.bytes += tx.len();
            self.queue.push_front(tx);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}
