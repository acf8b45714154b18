//! Transaction conflict resolution
//!
//! Selects a mutually compatible subset of candidate transactions: every
//! selected transaction is valid on its own, and no two selected transactions
//! claim the same outpoint.

use std::collections::{BTreeSet, HashSet};

use secp256k1::Secp256k1;
use tracing::debug;

use crate::transaction::{are_compatible, check_transaction_with, is_valid_transaction};
use crate::types::*;
use crate::utxo::UtxoSet;

/// Validates transactions against its own copy of a UTXO snapshot.
///
/// Every batch accepted by `handle_txs` removes the outpoints it spends from
/// that copy, so one handler can screen a sequence of batches.
#[derive(Debug, Clone)]
pub struct TxHandler {
    utxo_set: UtxoSet,
}

impl TxHandler {
    pub fn new(utxo_set: &UtxoSet) -> Self {
        Self {
            utxo_set: utxo_set.clone(),
        }
    }

    /// Current view of unspent outputs
    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        is_valid_transaction(tx, &self.utxo_set)
    }

    /// HandleTxs: 𝒯𝒳* → 𝒯𝒳*
    ///
    /// 1. Keep the individually valid candidates (first occurrence of an identity wins)
    /// 2. Connect every pair that claims no common outpoint
    /// 3. Return the transactions of one maximal clique, in candidate order
    /// 4. Remove every outpoint they spend from this handler's view
    ///
    /// The result is maximal, not necessarily the largest compatible subset.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        if candidates.len() == 1 {
            if !self.is_valid_tx(&candidates[0]) {
                return Vec::new();
            }
            self.spend(&candidates[0]);
            return candidates.to_vec();
        }

        let secp = Secp256k1::verification_only();
        let mut seen = HashSet::new();
        let valid: Vec<&Transaction> = candidates
            .iter()
            .filter(|tx| seen.insert(tx.hash()))
            .filter(|tx| check_transaction_with(&secp, tx, &self.utxo_set).is_valid())
            .collect();

        let graph = compatibility_graph(&valid);
        let clique: BTreeSet<usize> = find_maximal_clique(&graph).into_iter().collect();

        let accepted: Vec<Transaction> = clique.iter().map(|&v| valid[v].clone()).collect();
        for tx in &accepted {
            self.spend(tx);
        }

        debug!(
            candidates = candidates.len(),
            valid = valid.len(),
            accepted = accepted.len(),
            "resolved transaction batch"
        );
        accepted
    }

    fn spend(&mut self, tx: &Transaction) {
        for outpoint in tx.spent_outpoints() {
            self.utxo_set.remove_utxo(outpoint);
        }
    }
}

/// Adjacency sets: `graph[i]` holds every vertex compatible with `i`.
fn compatibility_graph(transactions: &[&Transaction]) -> Vec<BTreeSet<usize>> {
    let mut graph = vec![BTreeSet::new(); transactions.len()];
    for i in 0..transactions.len() {
        for j in (i + 1)..transactions.len() {
            if are_compatible(transactions[i], transactions[j]) {
                graph[i].insert(j);
                graph[j].insert(i);
            }
        }
    }
    graph
}

/// One level of the Bron–Kerbosch expansion.
struct Frame {
    clique: Vec<usize>,
    candidates: BTreeSet<usize>,
    excluded: BTreeSet<usize>,
}

/// Bron–Kerbosch without pivoting, driven by an explicit stack.
///
/// Returns the first maximal clique reached when candidates are expanded in
/// ascending vertex order. An empty graph yields an empty clique.
fn find_maximal_clique(graph: &[BTreeSet<usize>]) -> Vec<usize> {
    let mut stack = vec![Frame {
        clique: Vec::new(),
        candidates: (0..graph.len()).collect(),
        excluded: BTreeSet::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.candidates.is_empty() && frame.excluded.is_empty() {
            return std::mem::take(&mut frame.clique);
        }

        let vertex = match frame.candidates.pop_first() {
            Some(vertex) => vertex,
            None => {
                // Every extension of this clique is already covered.
                stack.pop();
                continue;
            }
        };

        let neighbours = &graph[vertex];
        let mut clique = frame.clique.clone();
        clique.push(vertex);
        let child = Frame {
            clique,
            candidates: frame.candidates.intersection(neighbours).copied().collect(),
            excluded: frame.excluded.intersection(neighbours).copied().collect(),
        };
        frame.excluded.insert(vertex);
        stack.push(child);
    }

    Vec::new()
}

/// CheckBlockTransactions: 𝒯𝒳* × 𝒰𝒮 → {valid, invalid}
///
/// A block's transaction list is admissible against its parent snapshot us iff
/// every transaction is valid against us and no outpoint is claimed by two
/// transactions of the list.
pub fn check_block_transactions(transactions: &[Transaction], utxo_set: &UtxoSet) -> ValidationResult {
    let secp = Secp256k1::verification_only();
    let mut claimed = HashSet::new();
    for (i, tx) in transactions.iter().enumerate() {
        if let ValidationResult::Invalid(reason) = check_transaction_with(&secp, tx, utxo_set) {
            return ValidationResult::Invalid(format!("Invalid transaction at index {}: {}", i, reason));
        }
        for outpoint in tx.spent_outpoints() {
            if !claimed.insert(*outpoint) {
                return ValidationResult::Invalid(format!(
                    "Transaction at index {} double-spends an outpoint within the block",
                    i
                ));
            }
        }
    }
    ValidationResult::Valid
}
