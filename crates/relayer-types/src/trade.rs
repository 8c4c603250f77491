//! Fully-authorized trade unit and swap routing metadata.

use crate::{Order, PermitWitnessTransferFrom};
use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// The on-chain-submittable unit: order, permit and maker signature.
///
/// Created once per execution attempt and never mutated; the contract
/// either consumes it or rejects it atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
	/// The maker's trade intent.
	pub order: Order,
	/// The Permit2 message bound to the order.
	pub permit: PermitWitnessTransferFrom,
	/// 65-byte ECDSA signature over the permit's EIP-712 digest.
	pub signature: Bytes,
}

/// DEX protocol selector for the executor's routing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
	UniswapV2,
	UniswapV3,
}

impl Protocol {
	/// Numeric discriminant as encoded in the executor calldata.
	pub fn as_u8(&self) -> u8 {
		match self {
			Protocol::UniswapV2 => 0,
			Protocol::UniswapV3 => 1,
		}
	}
}

/// Routing metadata passed alongside a trade to `executeTrade`.
///
/// The relayer carries this opaquely; route finding and pricing happen
/// upstream. The tuple layout must match the executor ABI exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
	/// Which DEX protocol the executor should route through.
	pub protocol: Protocol,
	/// Swap path for single-hop style routing.
	pub path: Vec<Address>,
	/// Pool fee tier, a uint24 on-chain.
	pub fee: u32,
	/// Whether `encoded_path` carries a multi-hop route.
	pub is_multi_hop: bool,
	/// Packed multi-hop path, empty for single-hop routes.
	pub encoded_path: Bytes,
}
