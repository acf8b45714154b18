//! Shared fixtures for integration tests

#![allow(dead_code)]

use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use utxo_ledger::crypto::signing_digest;
use utxo_ledger::*;

pub fn secret(seed: u8) -> SecretKey {
    SecretKey::from_slice(&[seed; 32]).unwrap()
}

pub fn address(seed: u8) -> ByteString {
    let secp = Secp256k1::new();
    PublicKey::from_secret_key(&secp, &secret(seed)).serialize().to_vec()
}

pub fn output(value: Integer, owner: u8) -> TransactionOutput {
    TransactionOutput {
        value,
        address: address(owner),
    }
}

pub fn coinbase(value: Integer, owner: u8) -> Transaction {
    Transaction {
        inputs: vec![],
        outputs: vec![output(value, owner)],
    }
}

/// Build a transaction spending `prevouts` (all owned by `signer`) and sign every input.
pub fn signed_tx(prevouts: &[OutPoint], outputs: Vec<TransactionOutput>, signer: u8) -> Transaction {
    let mut tx = Transaction {
        inputs: prevouts
            .iter()
            .map(|prevout| TransactionInput {
                prevout: *prevout,
                signature: vec![],
            })
            .collect(),
        outputs,
    };
    let secp = Secp256k1::new();
    for i in 0..tx.inputs.len() {
        let payload = tx.raw_data_to_sign(i).unwrap();
        let msg = Message::from_digest_slice(&signing_digest(&payload)).unwrap();
        tx.inputs[i].signature = secp.sign_ecdsa(&msg, &secret(signer)).serialize_der().to_vec();
    }
    tx
}

pub fn genesis(value: Integer, owner: u8) -> Block {
    Block {
        prev_block_hash: None,
        coinbase: coinbase(value, owner),
        transactions: vec![],
    }
}

/// Block on `parent`; `tag` varies the coinbase so sibling blocks differ.
pub fn child(parent: Hash, tag: Integer, transactions: Vec<Transaction>) -> Block {
    Block {
        prev_block_hash: Some(parent),
        coinbase: coinbase(tag, 2),
        transactions,
    }
}

/// Append `count` empty blocks starting from `from`; returns the last hash.
pub fn extend(chain: &mut BlockChain, from: Hash, count: usize, tag: Integer) -> Hash {
    let mut tip = from;
    for _ in 0..count {
        let block = child(tip, tag, vec![]);
        tip = block.hash();
        assert!(chain.add_block(block));
    }
    tip
}
