//! UTXO snapshots
//!
//! A `UtxoSet` behaves like an owned map from `OutPoint` to `TransactionOutput`:
//! cloning it yields an independent snapshot. A clone shares the underlying map
//! only until its first write, which copies the whole map. Deriving a block's
//! snapshot writes its coinbase outputs, so in practice each retained block
//! holds its own full copy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::*;

#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    utxos: Arc<HashMap<OutPoint, TransactionOutput>>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) the output stored under `outpoint`.
    pub fn add_utxo(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        Arc::make_mut(&mut self.utxos).insert(outpoint, output);
    }

    /// Remove `outpoint`, returning the output it held.
    pub fn remove_utxo(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        if !self.utxos.contains_key(outpoint) {
            return None;
        }
        Arc::make_mut(&mut self.utxos).remove(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.utxos.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Every outpoint in the snapshot, in no particular order
    pub fn outpoints(&self) -> impl Iterator<Item = &OutPoint> {
        self.utxos.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Add every output of `tx` under `tx_hash`, indexed by position.
    pub fn add_outputs(&mut self, tx_hash: Hash, tx: &Transaction) {
        if tx.outputs.is_empty() {
            return;
        }
        let utxos = Arc::make_mut(&mut self.utxos);
        for (i, output) in tx.outputs.iter().enumerate() {
            utxos.insert(OutPoint::new(tx_hash, i as u32), output.clone());
        }
    }
}

impl PartialEq for UtxoSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.utxos, &other.utxos) || self.utxos == other.utxos
    }
}

impl Eq for UtxoSet {}

impl FromIterator<(OutPoint, TransactionOutput)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: Arc::new(iter.into_iter().collect()),
        }
    }
}
