//! Alloy-based EVM delivery implementation.
//!
//! Uses the Alloy provider stack to submit relayer transactions and to
//! read the Permit2 nonce bitmap. The provider's wallet signs with the
//! relayer key; maker signatures never pass through here.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use relayer_types::{with_0x_prefix, Transaction, TransactionHash, TransactionReceipt};
use std::sync::Arc;

/// Function selector of Permit2's `nonceBitmap(address,uint256)` view.
const NONCE_BITMAP_SELECTOR: [u8; 4] = [0x4f, 0xe0, 0x2b, 0x44];

/// Alloy-backed delivery provider for a single EVM network.
pub struct AlloyDelivery {
	/// Alloy provider with the relayer wallet attached.
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	/// Chain this provider is connected to.
	chain_id: u64,
	/// Permit2 deployment queried for nonce bitmaps.
	permit2_address: Address,
}

impl AlloyDelivery {
	/// Creates a new AlloyDelivery for `rpc_url`, signing submissions with
	/// the relayer key.
	pub async fn new(
		rpc_url: &str,
		chain_id: u64,
		permit2_address: Address,
		signer: PrivateKeySigner,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("invalid RPC URL: {}", e)))?;

		let chain_signer = signer.with_chain_id(Some(chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			chain_id,
			permit2_address,
		})
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		if tx.chain_id != self.chain_id {
			return Err(DeliveryError::Network(format!(
				"transaction targets chain {}, provider is on {}",
				tx.chain_id, self.chain_id
			)));
		}

		let mut request = TransactionRequest::default()
			.to(tx.to)
			.input(tx.data.into());
		request.value = Some(tx.value);
		request.chain_id = Some(tx.chain_id);
		request.gas = tx.gas_limit;

		// The provider's wallet handles signing
		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::TransactionFailed(format!("failed to send: {}", e)))?;

		let tx_hash = *pending_tx.tx_hash();
		tracing::info!(
			tx_hash = %with_0x_prefix(&hex::encode(tx_hash.0)),
			chain_id = self.chain_id,
			"submitted transaction"
		);

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}

	async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, DeliveryError> {
		// nonceBitmap(address,uint256): two static words after the selector
		let mut call_data = Vec::with_capacity(4 + 64);
		call_data.extend_from_slice(&NONCE_BITMAP_SELECTOR);
		call_data.extend_from_slice(&[0; 12]);
		call_data.extend_from_slice(owner.as_slice());
		call_data.extend_from_slice(&word.to_be_bytes::<32>());

		let call_result = self
			.provider
			.call(
				&TransactionRequest::default()
					.to(self.permit2_address)
					.input(call_data.into()),
			)
			.await
			.map_err(|e| DeliveryError::Network(format!("failed to call nonceBitmap: {}", e)))?;

		if call_result.len() < 32 {
			return Err(DeliveryError::Network(
				"invalid nonceBitmap response".to_string(),
			));
		}

		Ok(U256::from_be_slice(&call_result[..32]))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		let tx_hash = FixedBytes::<32>::from_slice(&hash.0);

		match self.provider.get_transaction_receipt(tx_hash).await {
			Ok(Some(receipt)) => Ok(TransactionReceipt {
				hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
				block_number: receipt.block_number.unwrap_or(0),
				success: receipt.status(),
			}),
			Ok(None) => Err(DeliveryError::Network("transaction not found".to_string())),
			Err(e) => Err(DeliveryError::Network(format!("failed to get receipt: {}", e))),
		}
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let tx_hash = FixedBytes::<32>::from_slice(&hash.0);

		let poll_interval = tokio::time::Duration::from_secs(7);
		// ~15s block time plus buffer, capped at one hour
		let seconds_per_confirmation = 20;
		let max_timeout = 3600;
		let timeout_seconds = (confirmations * seconds_per_confirmation)
			.max(seconds_per_confirmation)
			.min(max_timeout);
		let max_wait_time = tokio::time::Duration::from_secs(timeout_seconds);
		let start_time = tokio::time::Instant::now();

		tracing::info!(
			confirmations,
			timeout_seconds,
			"waiting for transaction confirmation"
		);

		loop {
			if start_time.elapsed() > max_wait_time {
				return Err(DeliveryError::Network(format!(
					"timeout waiting for {} confirmations after {} seconds",
					confirmations,
					max_wait_time.as_secs()
				)));
			}

			let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					// Not yet mined
					tokio::time::sleep(poll_interval).await;
					continue;
				}
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"failed to get receipt: {}",
						e
					)));
				}
			};

			let current_block = self
				.provider
				.get_block_number()
				.await
				.map_err(|e| DeliveryError::Network(format!("failed to get block number: {}", e)))?;

			let tx_block = receipt.block_number.unwrap_or(0);
			let current_confirmations = current_block.saturating_sub(tx_block);

			if current_confirmations >= confirmations {
				return Ok(TransactionReceipt {
					hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
					block_number: tx_block,
					success: receipt.status(),
				});
			}

			tracing::debug!(
				remaining = confirmations.saturating_sub(current_confirmations),
				"waiting for more confirmations"
			);

			tokio::time::sleep(poll_interval).await;
		}
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| DeliveryError::Network(format!("failed to get block number: {}", e)))
	}
}
