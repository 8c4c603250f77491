//! Transaction types used at the chain-delivery boundary.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// An unsigned transaction ready for submission by the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Recipient contract address.
	pub to: Address,
	/// ABI-encoded calldata.
	pub data: Vec<u8>,
	/// Native value attached to the call.
	pub value: U256,
	/// Chain the transaction targets.
	pub chain_id: u64,
	/// Optional gas limit override.
	pub gas_limit: Option<u64>,
}

/// Blockchain transaction hash, stored as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

/// Receipt details after a transaction has been included in a block.
///
/// `success` is the call-contract boundary's definition of outcome: a
/// reverted execution reports `false`, anything else is out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// Block number the transaction was included in.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}
