//! Chain delivery module for the gasless swap relayer.
//!
//! This module owns every suspension point in the system: reading the
//! Permit2 nonce bitmap, submitting relayer transactions, and waiting for
//! confirmations. Everything above it is synchronous and side-effect-free.
//!
//! Reads (`nonce_bitmap`, receipts) are idempotent and safe to retry.
//! Writes are not: a caller must re-check on-chain state before retrying a
//! submission, since a prior attempt may have already landed.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use relayer_nonce::{NonceBitmapSource, NonceError};
use relayer_types::{Transaction, TransactionHash, TransactionReceipt};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during chain delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// RPC communication failure. Retried with backoff by the caller, not
	/// internally.
	#[error("network error: {0}")]
	Network(String),
	/// The transaction was mined but reverted, or could not be submitted.
	#[error("transaction failed: {0}")]
	TransactionFailed(String),
}

/// Trait defining the interface for chain delivery providers.
///
/// Implementations submit relayer transactions and expose the narrow set
/// of reads the core needs (the Permit2 nonce bitmap and receipts).
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Submits a transaction signed with the relayer key, returning its hash.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Reads the Permit2 nonce bitmap word for an owner (view call).
	async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, DeliveryError>;

	/// Retrieves the receipt for a transaction if it has been mined.
	async fn get_receipt(&self, hash: &TransactionHash)
		-> Result<TransactionReceipt, DeliveryError>;

	/// Blocks until the transaction has the required confirmations.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Current block number.
	async fn get_block_number(&self) -> Result<u64, DeliveryError>;
}

/// Service wrapping a delivery provider with the configured confirmation
/// policy.
///
/// Also adapts the provider to [`NonceBitmapSource`] so the nonce manager
/// can scan bitmaps without depending on the delivery stack.
pub struct DeliveryService {
	/// The underlying chain provider.
	implementation: Box<dyn DeliveryInterface>,
	/// Confirmations required before a submission is considered final.
	min_confirmations: u64,
}

impl DeliveryService {
	/// Creates a new DeliveryService with the specified provider and
	/// confirmation requirement.
	pub fn new(implementation: Box<dyn DeliveryInterface>, min_confirmations: u64) -> Self {
		Self {
			implementation,
			min_confirmations,
		}
	}

	/// Submits a transaction through the provider.
	pub async fn deliver(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		self.implementation.submit(tx).await
	}

	/// Waits for the configured number of confirmations.
	pub async fn confirm(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.implementation
			.wait_for_confirmation(hash, self.min_confirmations)
			.await
	}

	/// Retrieves the current receipt without waiting.
	pub async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.implementation.get_receipt(hash).await
	}

	/// Reads a Permit2 nonce bitmap word.
	pub async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, DeliveryError> {
		self.implementation.nonce_bitmap(owner, word).await
	}
}

#[async_trait]
impl NonceBitmapSource for DeliveryService {
	async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, NonceError> {
		self.implementation
			.nonce_bitmap(owner, word)
			.await
			.map_err(|e| NonceError::ChainRead(e.to_string()))
	}
}
