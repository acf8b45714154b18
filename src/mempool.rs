//! Pending transaction pool

use std::collections::HashMap;

use crate::types::*;

/// Transactions awaiting inclusion in a block, keyed by transaction identity.
///
/// No validation happens here; transactions are checked against a UTXO
/// snapshot only when a block is assembled or accepted.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: HashMap<Hash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`. Re-submitting an identity already present is a no-op.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.entry(tx.hash()).or_insert(tx);
    }

    /// Remove the transaction with identity `tx_hash`, if present.
    pub fn remove_transaction(&mut self, tx_hash: &Hash) -> Option<Transaction> {
        self.transactions.remove(tx_hash)
    }

    pub fn get_transaction(&self, tx_hash: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_hash)
    }

    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.transactions.contains_key(tx_hash)
    }

    /// Current contents. Order is unspecified.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
