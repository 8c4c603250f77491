//! Maker order types for the relayer system.
//!
//! An [`Order`] is a maker's immutable trade intent: it is constructed by
//! the client, hashed and signed once, and is then either consumed exactly
//! once on-chain or discarded. The serde field names match the EIP-712
//! struct declaration of the verifying contract, so a serialized order can
//! be embedded verbatim as the `witness` member of a typed-data message.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A maker's signed trade intent.
///
/// All integer fields are encoded as 256-bit words in the EIP-712 struct
/// hash regardless of their logical range. `nonce` here is the order-level
/// nonce; the Permit2 replay-protection nonce lives in a distinct namespace
/// on the permit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Signer and owner of the input funds.
	pub maker: Address,
	/// Token the maker sells.
	pub input_token: Address,
	/// Amount of `input_token` pulled through Permit2. Must be > 0.
	pub input_amount: U256,
	/// Token the maker buys. Must differ from `input_token`.
	pub output_token: Address,
	/// Slippage floor for the swap output. Zero disables the floor.
	pub min_amount_out: U256,
	/// Unix seconds after which the order is invalid.
	pub expiry: u64,
	/// Order nonce, unique per maker across time.
	pub nonce: U256,
}

/// Lifecycle state of a single order.
///
/// `Submitted` is entered at most once per nonce; the exactly-once guarantee
/// is enforced by the contract's nonce bitmap, not locally. `Executed`,
/// `Reverted`, `Expired` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order constructed but not yet signed by the maker.
	Drafted,
	/// Maker has produced the Permit2 witness signature.
	Signed,
	/// Relayer has submitted the execution transaction.
	Submitted,
	/// Execution transaction succeeded.
	Executed,
	/// Execution transaction reverted (e.g. lost a nonce race).
	Reverted,
	/// Order passed its expiry without submission.
	Expired,
	/// Maker invalidated the nonce before submission.
	Cancelled,
}

impl OrderStatus {
	/// Returns true for states from which no further transition exists.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			OrderStatus::Executed
				| OrderStatus::Reverted
				| OrderStatus::Expired
				| OrderStatus::Cancelled
		)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Drafted => write!(f, "Drafted"),
			OrderStatus::Signed => write!(f, "Signed"),
			OrderStatus::Submitted => write!(f, "Submitted"),
			OrderStatus::Executed => write!(f, "Executed"),
			OrderStatus::Reverted => write!(f, "Reverted"),
			OrderStatus::Expired => write!(f, "Expired"),
			OrderStatus::Cancelled => write!(f, "Cancelled"),
		}
	}
}
