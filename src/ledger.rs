//! Block tree with longest-branch fork choice
//!
//! The chain keeps one `BlockNode` per retained block in an arena keyed by
//! block hash. Each node owns the UTXO snapshot at that block, so any retained
//! block can be extended without replaying history. Blocks that fall more than
//! the retention window below the max height are evicted for good; later
//! blocks naming them as parent are rejected as unknown.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::block::{connect_block, genesis_utxo_set};
use crate::config::LedgerConfig;
use crate::constants::GENESIS_HEIGHT;
use crate::mempool::TransactionPool;
use crate::resolver::check_block_transactions;
use crate::types::*;
use crate::utxo::UtxoSet;

/// Per-block ledger state
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub parent: Option<Hash>,
    pub height: Natural,
    pub utxo_set: UtxoSet,
}

/// Outcome of a successful admission check
enum Admission {
    /// Not yet retained; extends `parent_hash`
    New { parent_hash: Hash, parent_height: Natural },
    /// Already retained; accepting it again changes nothing
    Known,
}

#[derive(Debug, Clone)]
pub struct BlockChain {
    config: LedgerConfig,
    max_height: Natural,
    max_height_block: Block,
    max_height_hash: Hash,
    tx_pool: TransactionPool,
    blocks: HashMap<Hash, BlockNode>,
}

impl BlockChain {
    /// Create a chain holding only `genesis`, which is trusted and not validated.
    pub fn new(genesis: Block) -> Self {
        Self::with_config(genesis, LedgerConfig::default())
    }

    pub fn with_config(genesis: Block, config: LedgerConfig) -> Self {
        let hash = genesis.hash();
        let node = BlockNode {
            parent: genesis.prev_block_hash,
            height: GENESIS_HEIGHT,
            utxo_set: genesis_utxo_set(&genesis),
        };
        info!(block = %hex::encode(hash), utxos = node.utxo_set.len(), "initialized chain at genesis");

        let mut blocks = HashMap::new();
        blocks.insert(hash, node);
        Self {
            config,
            max_height: GENESIS_HEIGHT,
            max_height_block: genesis,
            max_height_hash: hash,
            tx_pool: TransactionPool::new(),
            blocks,
        }
    }

    /// Block at the tip of the preferred branch
    pub fn max_height_block(&self) -> &Block {
        &self.max_height_block
    }

    /// Snapshot to build the next block on top of the tip
    pub fn max_height_utxo_set(&self) -> &UtxoSet {
        &self.blocks[&self.max_height_hash].utxo_set
    }

    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.tx_pool
    }

    pub fn max_height(&self) -> Natural {
        self.max_height
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn height_of(&self, block_hash: &Hash) -> Option<Natural> {
        self.blocks.get(block_hash).map(|node| node.height)
    }

    pub fn utxo_set_at(&self, block_hash: &Hash) -> Option<&UtxoSet> {
        self.blocks.get(block_hash).map(|node| &node.utxo_set)
    }

    pub fn block_node(&self, block_hash: &Hash) -> Option<&BlockNode> {
        self.blocks.get(block_hash)
    }

    pub fn contains_block(&self, block_hash: &Hash) -> bool {
        self.blocks.contains_key(block_hash)
    }

    /// Hashes of every retained block, in no particular order
    pub fn block_hashes(&self) -> impl Iterator<Item = &Hash> {
        self.blocks.keys()
    }

    /// Number of retained blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Queue `tx` for a future block. Validation is deferred to block acceptance.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.tx_pool.add_transaction(tx);
    }

    /// CheckBlock: ℬ → {valid, invalid}
    ///
    /// For block b with parent p, b is admissible iff:
    /// 1. p is declared (b is not a second genesis)
    /// 2. p is retained
    /// 3. height(p) + 1 > max_height - window
    /// 4. txs(b) pass `check_block_transactions` against utxo(p)
    ///
    /// A block already retained that passes these checks is admissible too.
    /// Never mutates the chain.
    pub fn check_block(&self, block: &Block) -> ValidationResult {
        self.admit(block, &block.hash()).map_or_else(ValidationResult::Invalid, |_| ValidationResult::Valid)
    }

    /// Add `block` if it is valid. Returns whether it was accepted.
    ///
    /// A rejected block leaves the chain exactly as it was, and so does
    /// re-delivering a block that is already retained.
    pub fn add_block(&mut self, block: Block) -> bool {
        let block_hash = block.hash();
        let (parent_hash, parent_height) = match self.admit(&block, &block_hash) {
            Ok(Admission::New { parent_hash, parent_height }) => (parent_hash, parent_height),
            Ok(Admission::Known) => {
                debug!(block = %hex::encode(block_hash), "block already in chain");
                return true;
            }
            Err(reason) => {
                debug!(block = %hex::encode(block_hash), %reason, "rejected block");
                return false;
            }
        };

        let height = parent_height + 1;
        let utxo_set = connect_block(&block, &self.blocks[&parent_hash].utxo_set);

        for tx in &block.transactions {
            self.tx_pool.remove_transaction(&tx.hash());
        }

        self.blocks.insert(
            block_hash,
            BlockNode {
                parent: Some(parent_hash),
                height,
                utxo_set,
            },
        );

        if parent_hash == self.max_height_hash {
            info!(block = %hex::encode(block_hash), height, "extended main branch");
            self.set_tip(block, block_hash, height);
        } else if height > self.max_height {
            info!(
                block = %hex::encode(block_hash),
                height,
                previous_tip = %hex::encode(self.max_height_hash),
                reorg = true,
                "side branch overtook main branch"
            );
            self.set_tip(block, block_hash, height);
        } else {
            debug!(block = %hex::encode(block_hash), height, "accepted block on side branch");
        }

        self.prune();
        true
    }

    /// Run every admission check and classify the block.
    fn admit(&self, block: &Block, block_hash: &Hash) -> Result<Admission, String> {
        let parent_hash = block
            .prev_block_hash
            .ok_or_else(|| "Block declares no parent".to_string())?;

        let parent = self
            .blocks
            .get(&parent_hash)
            .ok_or_else(|| format!("Unknown parent {}", hex::encode(parent_hash)))?;

        if parent.height + 1 + self.config.retention_window <= self.max_height {
            return Err(format!(
                "Block height {} too far below max height {}",
                parent.height + 1,
                self.max_height
            ));
        }

        if let ValidationResult::Invalid(reason) =
            check_block_transactions(&block.transactions, &parent.utxo_set)
        {
            return Err(reason);
        }

        if self.blocks.contains_key(block_hash) {
            return Ok(Admission::Known);
        }

        Ok(Admission::New {
            parent_hash,
            parent_height: parent.height,
        })
    }

    fn set_tip(&mut self, block: Block, block_hash: Hash, height: Natural) {
        self.max_height = height;
        self.max_height_block = block;
        self.max_height_hash = block_hash;
    }

    /// Evict every block with height < max_height - window.
    fn prune(&mut self) {
        let window = self.config.retention_window;
        let max_height = self.max_height;
        let before = self.blocks.len();
        self.blocks.retain(|_, node| node.height + window >= max_height);

        let evicted = before - self.blocks.len();
        if evicted > 0 {
            debug!(evicted, retained = self.blocks.len(), "pruned old blocks");
        }
    }
}
