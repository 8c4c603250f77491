//! Permit2 signature-transfer message types.
//!
//! These mirror `ISignatureTransfer` of the Permit2 contract. The witness
//! field carries the struct hash of the [`Order`](crate::Order) the permit
//! is bound to; the wallet-facing typed-data message expands it back into
//! the full `Order` object (inline-struct witness encoding).

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Token and amount the permit authorizes the spender to pull.
///
/// `amount` must equal the order's `input_amount` for the witness binding
/// to be meaningful; the orchestrator enforces this cross-field invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPermissions {
	/// ERC-20 token to transfer.
	pub token: Address,
	/// Maximum amount transferable under this permit.
	pub amount: U256,
}

/// The Permit2 message the maker actually signs.
///
/// `nonce` is the Permit2 replay-protection nonce, addressing one bit of
/// the owner's on-chain nonce bitmap. It is a distinct namespace from the
/// order nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitWitnessTransferFrom {
	/// Token and amount being permitted.
	pub permitted: TokenPermissions,
	/// Contract authorized to pull the funds (the executor).
	pub spender: Address,
	/// Permit2 unordered nonce, `(word << 8) | bit`.
	pub nonce: U256,
	/// Unix seconds after which the signature is invalid.
	pub deadline: u64,
	/// Struct hash of the order this permit is bound to.
	pub witness: B256,
}
