//! # UTXO Ledger
//!
//! Single-node ledger core for an unspent-output cryptocurrency.
//!
//! The crate maintains a tree of blocks, follows the highest branch, keeps a
//! UTXO snapshot for every retained block, and selects mutually compatible
//! subsets of pending transactions for new blocks.
//!
//! ## Architecture
//!
//! - `utxo`: copy-on-write UTXO snapshots
//! - `transaction`: identities, signing payloads and single-transaction validity
//! - `resolver`: batch admission through a maximal clique over the compatibility graph
//! - `mempool`: pending transactions keyed by identity
//! - `ledger`: block arena, fork choice and pruning
//!
//! ## Design Principles
//!
//! 1. **No faults on bad input**: invalid blocks and transactions are rejected, never raised
//! 2. **All-or-nothing acceptance**: a rejected block leaves the chain untouched
//! 3. **Bounded history**: blocks older than the retention window are evicted
//!
//! ## Usage
//!
//! ```rust
//! use utxo_ledger::*;
//!
//! let genesis = Block {
//!     prev_block_hash: None,
//!     coinbase: Transaction {
//!         inputs: vec![],
//!         outputs: vec![TransactionOutput { value: 25, address: vec![0x02; 33] }],
//!     },
//!     transactions: vec![],
//! };
//! let mut chain = BlockChain::new(genesis.clone());
//!
//! let next = Block {
//!     prev_block_hash: Some(genesis.hash()),
//!     coinbase: Transaction {
//!         inputs: vec![],
//!         outputs: vec![TransactionOutput { value: 25, address: vec![0x03; 33] }],
//!     },
//!     transactions: vec![],
//! };
//! assert!(chain.add_block(next));
//! assert_eq!(chain.max_height(), 2);
//! ```

pub mod types;
pub mod constants;
pub mod config;
pub mod crypto;
pub mod transaction;
pub mod block;
pub mod utxo;
pub mod resolver;
pub mod mempool;
pub mod ledger;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{BlockChain, BlockNode};
pub use mempool::TransactionPool;
pub use resolver::TxHandler;
pub use utxo::UtxoSet;
