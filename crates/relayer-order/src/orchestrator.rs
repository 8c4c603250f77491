//! Trade authorization orchestration.
//!
//! Composes the order model, the typed-data encoder and the permit types
//! into (a) a signable payload for the maker's wallet and (b) an assembled
//! [`Trade`] that has passed every local check and is safe to hand to the
//! relayer. This layer never touches private key material and performs no
//! cryptographic verification; the contract does that on-chain.

use crate::eip712::{hash_order, signing_digest, typed_data};
use crate::{validate_order, OrderError};
use alloy_primitives::{Address, Bytes, B256, U256};
use relayer_types::{Eip712Domain, Order, PermitWitnessTransferFrom, TokenPermissions, Trade};
use serde::Serialize;

/// Standard ECDSA signature length expected by the verifying contract.
const SIGNATURE_LENGTH: usize = 65;

/// Everything an external signer needs to produce the permit signature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
	/// The Permit2 signing domain.
	pub domain: Eip712Domain,
	/// Full EIP-712 typed-data object for `eth_signTypedData_v4`.
	pub typed_data: serde_json::Value,
	/// The digest the signature must recover against, for signers that
	/// take a raw 32-byte hash.
	pub digest: B256,
}

/// Authorizes trades against one Permit2 deployment.
///
/// The domain (chain id, verifying contract) is injected configuration;
/// nothing here reaches for ambient state.
pub struct TradeAuthorizer {
	domain: Eip712Domain,
}

impl TradeAuthorizer {
	/// Creates an authorizer for the Permit2 deployment at
	/// `permit2_address` on `chain_id`.
	pub fn new(chain_id: u64, permit2_address: Address) -> Self {
		Self {
			domain: Eip712Domain::permit2(chain_id, permit2_address),
		}
	}

	/// The signing domain this authorizer binds permits to.
	pub fn domain(&self) -> &Eip712Domain {
		&self.domain
	}

	/// Builds the Permit2 message for an order, ready for signing.
	///
	/// The permitted token and amount are taken from the order itself, so
	/// the permit/order cross-field invariant holds by construction. The
	/// witness is the order's struct hash, binding the permit to exactly
	/// this order.
	pub fn prepare_for_signing(
		&self,
		order: &Order,
		spender: Address,
		permit2_nonce: U256,
		deadline: u64,
		now: u64,
	) -> Result<PermitWitnessTransferFrom, OrderError> {
		validate_order(order, now)?;
		if deadline <= now {
			return Err(OrderError::SignatureExpired { deadline, now });
		}

		Ok(PermitWitnessTransferFrom {
			permitted: TokenPermissions {
				token: order.input_token,
				amount: order.input_amount,
			},
			spender,
			nonce: permit2_nonce,
			deadline,
			witness: hash_order(order),
		})
	}

	/// Produces the payload handed to the maker's wallet.
	pub fn signing_request(
		&self,
		order: &Order,
		permit: &PermitWitnessTransferFrom,
	) -> SigningRequest {
		SigningRequest {
			domain: self.domain.clone(),
			typed_data: typed_data(&self.domain, order, permit),
			digest: signing_digest(&self.domain, permit),
		}
	}

	/// Assembles a submittable trade from an externally signed permit.
	///
	/// This is the fail-fast boundary before relayer submission: shape and
	/// freshness are checked locally so a trade guaranteed to revert never
	/// costs gas. Signature validity itself is only proven on-chain.
	pub fn assemble_trade(
		&self,
		order: Order,
		permit: PermitWitnessTransferFrom,
		signature: Bytes,
		now: u64,
	) -> Result<Trade, OrderError> {
		if permit.permitted.token != order.input_token {
			return Err(OrderError::InconsistentPermit(format!(
				"permitted token {} does not match order input token {}",
				permit.permitted.token, order.input_token
			)));
		}
		if permit.permitted.amount != order.input_amount {
			return Err(OrderError::InconsistentPermit(format!(
				"permitted amount {} does not match order input amount {}",
				permit.permitted.amount, order.input_amount
			)));
		}
		let expected_witness = hash_order(&order);
		if permit.witness != expected_witness {
			return Err(OrderError::InconsistentPermit(
				"witness does not match the order struct hash".into(),
			));
		}
		if signature.len() != SIGNATURE_LENGTH {
			return Err(OrderError::InvalidSignature(format!(
				"expected {} bytes, got {}",
				SIGNATURE_LENGTH,
				signature.len()
			)));
		}
		if order.expiry <= now {
			return Err(OrderError::OrderExpired {
				expiry: order.expiry,
				now,
			});
		}
		if permit.deadline <= now {
			return Err(OrderError::SignatureExpired {
				deadline: permit.deadline,
				now,
			});
		}

		tracing::debug!(
			maker = %order.maker,
			permit_nonce = %permit.nonce,
			"assembled trade"
		);

		Ok(Trade {
			order,
			permit,
			signature,
		})
	}
}
