//! Block identity and UTXO snapshot derivation

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};

use crate::constants::NULL_HASH;
use crate::types::*;
use crate::utxo::UtxoSet;

impl Block {
    /// Block identity: double SHA-256 over the parent hash, the coinbase and
    /// every transaction.
    pub fn hash(&self) -> Hash {
        calculate_block_hash(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_none()
    }
}

/// Calculate block hash
pub fn calculate_block_hash(block: &Block) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(block.prev_block_hash.as_ref().unwrap_or(&NULL_HASH));
    engine.input(&block.coinbase.raw_tx());
    engine.input(&(block.transactions.len() as u32).to_le_bytes());
    for tx in &block.transactions {
        engine.input(&tx.raw_tx());
    }
    sha256d::Hash::from_engine(engine).into_inner()
}

/// Snapshot of a trusted genesis block.
///
/// Coinbase outputs first, then every output of every included transaction.
/// Inputs are not consumed.
pub fn genesis_utxo_set(genesis: &Block) -> UtxoSet {
    let mut utxo_set = UtxoSet::new();
    utxo_set.add_outputs(genesis.coinbase.hash(), &genesis.coinbase);
    for tx in &genesis.transactions {
        utxo_set.add_outputs(tx.hash(), tx);
    }
    utxo_set
}

/// ConnectBlock: ℬ × 𝒰𝒮 → 𝒰𝒮
///
/// For block b = (parent, cb, txs) applied on top of the parent snapshot us:
/// 1. us' = us ∪ outputs(cb)
/// 2. For each tx ∈ txs, in order:
///    - us' = us' \ { i.prevout | i ∈ tx.inputs }
///    - us' = us' ∪ outputs(tx)
/// 3. Return us'
///
/// The caller is responsible for validating `block` first. `parent` is left
/// untouched.
pub fn connect_block(block: &Block, parent: &UtxoSet) -> UtxoSet {
    let mut utxo_set = parent.clone();
    utxo_set.add_outputs(block.coinbase.hash(), &block.coinbase);
    for tx in &block.transactions {
        for outpoint in tx.spent_outpoints() {
            utxo_set.remove_utxo(outpoint);
        }
        utxo_set.add_outputs(tx.hash(), tx);
    }
    utxo_set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(value: Integer) -> TransactionOutput {
        TransactionOutput {
            value,
            address: vec![0x03; 33],
        }
    }

    fn coinbase(value: Integer) -> Transaction {
        Transaction {
            inputs: vec![],
            outputs: vec![output(value)],
        }
    }

    fn create_test_block(prev_block_hash: Option<Hash>) -> Block {
        Block {
            prev_block_hash,
            coinbase: coinbase(25),
            transactions: vec![],
        }
    }

    #[test]
    fn test_block_hash_depends_on_parent() {
        let a = create_test_block(None);
        let b = create_test_block(Some([1; 32]));
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), calculate_block_hash(&a));
        assert!(a.is_genesis());
        assert!(!b.is_genesis());
    }

    #[test]
    fn test_block_hash_depends_on_transactions() {
        let a = create_test_block(Some([1; 32]));
        let mut b = a.clone();
        b.transactions.push(coinbase(1));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_genesis_utxo_set_does_not_consume_inputs() {
        let existing = OutPoint::new([4; 32], 0);
        let tx = Transaction {
            inputs: vec![TransactionInput {
                prevout: existing,
                signature: vec![],
            }],
            outputs: vec![output(3), output(4)],
        };
        let mut genesis = create_test_block(None);
        genesis.transactions.push(tx.clone());

        let utxo_set = genesis_utxo_set(&genesis);
        assert_eq!(utxo_set.len(), 3);
        assert!(utxo_set.contains(&OutPoint::new(genesis.coinbase.hash(), 0)));
        assert!(utxo_set.contains(&OutPoint::new(tx.hash(), 1)));
    }

    #[test]
    fn test_connect_block_spends_and_creates() {
        let funding = OutPoint::new([4; 32], 0);
        let untouched = OutPoint::new([4; 32], 1);
        let parent: UtxoSet = vec![(funding, output(10)), (untouched, output(1))]
            .into_iter()
            .collect();

        let tx = Transaction {
            inputs: vec![TransactionInput {
                prevout: funding,
                signature: vec![],
            }],
            outputs: vec![output(4), output(6)],
        };
        let mut block = create_test_block(Some([1; 32]));
        block.transactions.push(tx.clone());

        let child = connect_block(&block, &parent);
        assert!(!child.contains(&funding));
        assert!(child.contains(&untouched));
        assert!(child.contains(&OutPoint::new(tx.hash(), 0)));
        assert!(child.contains(&OutPoint::new(tx.hash(), 1)));
        assert!(child.contains(&OutPoint::new(block.coinbase.hash(), 0)));
        assert_eq!(child.len(), 4);

        // Parent snapshot is unchanged
        assert!(parent.contains(&funding));
        assert_eq!(parent.len(), 2);
    }
}
