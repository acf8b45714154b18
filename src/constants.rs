//! Ledger constants

/// Number of blocks of history kept below the current max height.
///
/// A branch whose next block would sit at or below `max_height - RETENTION_WINDOW`
/// can no longer be extended, and blocks below that floor are pruned.
pub const RETENTION_WINDOW: u64 = 10;

/// Height of the genesis block
pub const GENESIS_HEIGHT: u64 = 1;

/// Parent hash used when hashing a block without a parent
pub const NULL_HASH: [u8; 32] = [0u8; 32];
