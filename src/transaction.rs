//! Transaction identity, signing payloads and single-transaction validation

use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use secp256k1::{Secp256k1, Verification};
use std::collections::HashSet;

use crate::crypto::verify_signature_with;
use crate::types::*;
use crate::utxo::UtxoSet;

impl Transaction {
    /// Transaction identity: double SHA-256 of the raw transaction bytes.
    pub fn hash(&self) -> Hash {
        calculate_tx_id(self)
    }

    /// Bytes that the signature on input `index` commits to: that input's
    /// outpoint followed by every output. `None` if the index is out of range.
    pub fn raw_data_to_sign(&self, index: usize) -> Option<ByteString> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::with_capacity(36 + self.outputs.len() * 45);
        write_outpoint(&mut data, &input.prevout);
        for output in &self.outputs {
            write_output(&mut data, output);
        }
        Some(data)
    }

    /// Full serialization used for hashing, signatures included.
    pub fn raw_tx(&self) -> ByteString {
        let mut data = Vec::new();
        data.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            write_outpoint(&mut data, &input.prevout);
            write_bytes(&mut data, &input.signature);
        }
        data.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            write_output(&mut data, output);
        }
        data
    }

    /// Outpoint claimed by each input, in input order
    pub fn spent_outpoints(&self) -> impl Iterator<Item = &OutPoint> {
        self.inputs.iter().map(|input| &input.prevout)
    }
}

/// Calculate transaction ID
pub fn calculate_tx_id(tx: &Transaction) -> Hash {
    sha256d::Hash::hash(&tx.raw_tx()).into_inner()
}

fn write_outpoint(data: &mut ByteString, outpoint: &OutPoint) {
    data.extend_from_slice(&outpoint.hash);
    data.extend_from_slice(&outpoint.index.to_le_bytes());
}

fn write_output(data: &mut ByteString, output: &TransactionOutput) {
    data.extend_from_slice(&output.value.to_le_bytes());
    write_bytes(data, &output.address);
}

fn write_bytes(data: &mut ByteString, bytes: &[u8]) {
    data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    data.extend_from_slice(bytes);
}

/// CheckTransaction: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid}
///
/// A transaction tx = (ins, outs) is valid against UTXO set us if and only if:
/// 1. ∀i ∈ ins: i.prevout ∈ us
/// 2. ∀i ∈ ins: the signature on i verifies under us(i.prevout).address
/// 3. no outpoint is claimed by two inputs of tx
/// 4. ∀o ∈ outs: o.value ≥ 0
/// 5. Σᵢ us(i.prevout).value ≥ Σₒ o.value
pub fn check_transaction(tx: &Transaction, utxo_set: &UtxoSet) -> ValidationResult {
    let secp = Secp256k1::verification_only();
    check_transaction_with(&secp, tx, utxo_set)
}

/// [`check_transaction`] with a caller-owned verification context, for batches.
pub fn check_transaction_with<C: Verification>(
    secp: &Secp256k1<C>,
    tx: &Transaction,
    utxo_set: &UtxoSet,
) -> ValidationResult {
    let mut claimed = HashSet::with_capacity(tx.inputs.len());
    let mut total_input_value: Integer = 0;

    for (i, input) in tx.inputs.iter().enumerate() {
        // 1. Referenced output must be unspent
        let utxo = match utxo_set.get(&input.prevout) {
            Some(utxo) => utxo,
            None => {
                return ValidationResult::Invalid(format!("Input {} not found in UTXO set", i));
            }
        };

        // 2. Signature must unlock the referenced output
        let message = match tx.raw_data_to_sign(i) {
            Some(message) => message,
            None => return ValidationResult::Invalid(format!("Input {} has no signing payload", i)),
        };
        if !verify_signature_with(secp, &utxo.address, &message, &input.signature) {
            return ValidationResult::Invalid(format!("Invalid signature at input {}", i));
        }

        // 3. Intra-transaction double spend
        if !claimed.insert(input.prevout) {
            return ValidationResult::Invalid(format!("Input {} claims an outpoint twice", i));
        }

        if utxo.value < 0 {
            return ValidationResult::Invalid(format!("Negative input value at input {}", i));
        }
        total_input_value = match total_input_value.checked_add(utxo.value) {
            Some(total) => total,
            None => return ValidationResult::Invalid("Input value overflow".to_string()),
        };
    }

    // 4. Output values
    let mut total_output_value: Integer = 0;
    for (i, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 {
            return ValidationResult::Invalid(format!(
                "Invalid output value {} at index {}",
                output.value, i
            ));
        }
        total_output_value = match total_output_value.checked_add(output.value) {
            Some(total) => total,
            None => return ValidationResult::Invalid("Output value overflow".to_string()),
        };
    }

    // 5. No value creation
    if total_input_value < total_output_value {
        return ValidationResult::Invalid("Insufficient input value".to_string());
    }

    ValidationResult::Valid
}

pub fn is_valid_transaction(tx: &Transaction, utxo_set: &UtxoSet) -> bool {
    check_transaction(tx, utxo_set).is_valid()
}

/// Two transactions are compatible when they claim no common outpoint.
pub fn are_compatible(tx1: &Transaction, tx2: &Transaction) -> bool {
    let claimed: HashSet<&OutPoint> = tx1.spent_outpoints().collect();
    !tx2.spent_outpoints().any(|outpoint| claimed.contains(outpoint))
}
