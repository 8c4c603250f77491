//! EIP-712 struct hashing for Permit2 witness orders.
//!
//! The byte layout produced here must exactly match the verifying
//! contract's `abi.encode` of the same structs; any deviation yields a
//! valid-looking digest that no deployment will ever accept. Field order
//! and type names in the constants below mirror the contract's struct
//! declarations and its `WITNESS_TYPE_STRING`, which pins the
//! inline-`Order`-struct witness encoding (the witness slot of the permit
//! hash carries `hashStruct(Order)`, and the typed-data message expands it
//! into the full `Order` object).

use alloy_primitives::{keccak256, B256};
use relayer_types::{
	compute_final_digest, Eip712AbiEncoder, Eip712Domain, Order, PermitWitnessTransferFrom,
	TokenPermissions,
};
use serde_json::{json, Value};

/// Canonical struct signature of the order, as declared on-chain.
pub const ORDER_TYPE: &str = "Order(address maker,address inputToken,uint256 inputAmount,address outputToken,uint256 minAmountOut,uint256 expiry,uint256 nonce)";

/// Permit2's token permissions struct signature.
pub const TOKEN_PERMISSIONS_TYPE: &str = "TokenPermissions(address token,uint256 amount)";

/// The executor contract's `WITNESS_TYPE_STRING`: the tail of the permit
/// type signature starting at the witness member, with referenced struct
/// types appended in EIP-712 alphabetical order.
pub const WITNESS_TYPE_STRING: &str = "Order witness)Order(address maker,address inputToken,uint256 inputAmount,address outputToken,uint256 minAmountOut,uint256 expiry,uint256 nonce)TokenPermissions(address token,uint256 amount)";

/// Full type signature of the signed permit message.
pub const PERMIT_WITNESS_TRANSFER_FROM_TYPE: &str = "PermitWitnessTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline,Order witness)Order(address maker,address inputToken,uint256 inputAmount,address outputToken,uint256 minAmountOut,uint256 expiry,uint256 nonce)TokenPermissions(address token,uint256 amount)";

/// keccak256 of [`ORDER_TYPE`].
pub fn order_typehash() -> B256 {
	keccak256(ORDER_TYPE.as_bytes())
}

/// keccak256 of [`TOKEN_PERMISSIONS_TYPE`].
pub fn token_permissions_typehash() -> B256 {
	keccak256(TOKEN_PERMISSIONS_TYPE.as_bytes())
}

/// keccak256 of [`PERMIT_WITNESS_TRANSFER_FROM_TYPE`].
pub fn permit_witness_typehash() -> B256 {
	keccak256(PERMIT_WITNESS_TRANSFER_FROM_TYPE.as_bytes())
}

/// Computes `hashStruct(Order)`.
///
/// Every field occupies one 32-byte word in declared order; `expiry` and
/// `nonce` are widened to uint256 regardless of their logical range.
pub fn hash_order(order: &Order) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&order_typehash());
	enc.push_address(&order.maker);
	enc.push_address(&order.input_token);
	enc.push_u256(order.input_amount);
	enc.push_address(&order.output_token);
	enc.push_u256(order.min_amount_out);
	enc.push_u64(order.expiry);
	enc.push_u256(order.nonce);
	keccak256(enc.finish())
}

/// Computes `hashStruct(TokenPermissions)`.
pub fn hash_token_permissions(permitted: &TokenPermissions) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&token_permissions_typehash());
	enc.push_address(&permitted.token);
	enc.push_u256(permitted.amount);
	keccak256(enc.finish())
}

/// Computes `hashStruct(PermitWitnessTransferFrom)`.
///
/// The `witness` slot carries the order struct hash already stored on the
/// permit; nested structs contribute their own hashStruct per EIP-712.
pub fn hash_permit(permit: &PermitWitnessTransferFrom) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&permit_witness_typehash());
	enc.push_b256(&hash_token_permissions(&permit.permitted));
	enc.push_address(&permit.spender);
	enc.push_u256(permit.nonce);
	enc.push_u64(permit.deadline);
	enc.push_b256(&permit.witness);
	keccak256(enc.finish())
}

/// Computes the final signing digest for a permit under the given domain:
/// keccak256(0x1901 || domainSeparator || hashStruct(permit)).
pub fn signing_digest(domain: &Eip712Domain, permit: &PermitWitnessTransferFrom) -> B256 {
	compute_final_digest(&domain.separator(), &hash_permit(permit))
}

/// Builds the EIP-712 typed-data object handed to an external signer.
///
/// Wallets hash this themselves, so the `witness` member carries the full
/// `Order` object with its own type entry rather than the pre-computed
/// struct hash. Signing over this payload and signing the digest from
/// [`signing_digest`] produce the same signature.
pub fn typed_data(domain: &Eip712Domain, order: &Order, permit: &PermitWitnessTransferFrom) -> Value {
	json!({
		"types": {
			"EIP712Domain": [
				{ "name": "name", "type": "string" },
				{ "name": "chainId", "type": "uint256" },
				{ "name": "verifyingContract", "type": "address" },
			],
			"PermitWitnessTransferFrom": [
				{ "name": "permitted", "type": "TokenPermissions" },
				{ "name": "spender", "type": "address" },
				{ "name": "nonce", "type": "uint256" },
				{ "name": "deadline", "type": "uint256" },
				{ "name": "witness", "type": "Order" },
			],
			"Order": [
				{ "name": "maker", "type": "address" },
				{ "name": "inputToken", "type": "address" },
				{ "name": "inputAmount", "type": "uint256" },
				{ "name": "outputToken", "type": "address" },
				{ "name": "minAmountOut", "type": "uint256" },
				{ "name": "expiry", "type": "uint256" },
				{ "name": "nonce", "type": "uint256" },
			],
			"TokenPermissions": [
				{ "name": "token", "type": "address" },
				{ "name": "amount", "type": "uint256" },
			],
		},
		"primaryType": "PermitWitnessTransferFrom",
		"domain": domain,
		"message": {
			"permitted": permit.permitted,
			"spender": permit.spender,
			"nonce": permit.nonce,
			"deadline": permit.deadline.to_string(),
			"witness": order,
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, U256};

	fn maker() -> Address {
		"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
			.parse()
			.unwrap()
	}

	fn permit2() -> Address {
		"0x000000000022D473030F116dDEE9F6B43aC78BA3"
			.parse()
			.unwrap()
	}

	fn golden_order() -> Order {
		// Conformance fixture: all-zero token addresses, 10^19 input,
		// expiry 1700000000, nonce 0.
		Order {
			maker: maker(),
			input_token: Address::ZERO,
			input_amount: U256::from(10u64).pow(U256::from(19u64)),
			output_token: Address::ZERO,
			min_amount_out: U256::ZERO,
			expiry: 1_700_000_000,
			nonce: U256::ZERO,
		}
	}

	#[test]
	fn test_permit_type_embeds_witness_type_string() {
		assert_eq!(
			PERMIT_WITNESS_TRANSFER_FROM_TYPE,
			format!(
				"PermitWitnessTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline,{}",
				WITNESS_TYPE_STRING
			)
		);
	}

	#[test]
	fn test_typehashes_match_contract_constants() {
		assert_eq!(
			hex::encode(order_typehash()),
			"031b60121fc54f4aa3df46f7496c8a19e3bd99d2bf342d1c160527b25240bec6"
		);
		// Permit2's published _TOKEN_PERMISSIONS_TYPEHASH
		assert_eq!(
			hex::encode(token_permissions_typehash()),
			"618358ac3db8dc274f0cd8829da7e234bd48cd73c4a740aede1adec9846d06a1"
		);
		assert_eq!(
			hex::encode(permit_witness_typehash()),
			"3e286a54b045f959655ebc9f51e1deba36310a8d139ea97bae4f21b1ed19eedd"
		);
	}

	#[test]
	fn test_golden_order_hash() {
		// Primary cross-implementation conformance vector: any
		// implementation hashing this fixture must reproduce this digest.
		assert_eq!(
			hex::encode(hash_order(&golden_order())),
			"ae3926f66068d70c7538bdad371110e79312381ff531986685acfebff1f23df8"
		);
	}

	#[test]
	fn test_order_hash_is_deterministic() {
		let order = golden_order();
		assert_eq!(hash_order(&order), hash_order(&order));
	}

	#[test]
	fn test_order_hash_sensitive_to_every_field() {
		let base = hash_order(&golden_order());
		let mut order = golden_order();
		order.min_amount_out = U256::from(1u64);
		assert_ne!(hash_order(&order), base);

		let mut order = golden_order();
		order.expiry += 1;
		assert_ne!(hash_order(&order), base);

		let mut order = golden_order();
		order.nonce = U256::from(1u64);
		assert_ne!(hash_order(&order), base);
	}

	#[test]
	fn test_full_signing_digest_vector() {
		let order = Order {
			maker: maker(),
			input_token: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
				.parse()
				.unwrap(),
			input_amount: U256::from(10u64).pow(U256::from(19u64)),
			output_token: "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
				.parse()
				.unwrap(),
			min_amount_out: U256::ZERO,
			expiry: 1_700_000_000,
			nonce: U256::ZERO,
		};
		let permit = PermitWitnessTransferFrom {
			permitted: TokenPermissions {
				token: order.input_token,
				amount: order.input_amount,
			},
			spender: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
				.parse()
				.unwrap(),
			nonce: U256::ZERO,
			deadline: 1_700_000_000,
			witness: hash_order(&order),
		};
		let domain = Eip712Domain::permit2(1, permit2());

		assert_eq!(
			hex::encode(hash_permit(&permit)),
			"fe192e23b6686e7bfd0d2694d44181fe48092fb05908c37a7adcb5739f3ff777"
		);
		assert_eq!(
			hex::encode(signing_digest(&domain, &permit)),
			"81b81ba38a19e8504f90b834a63177a4634c0f50d491cc1f7356711f327d728c"
		);
	}

	#[test]
	fn test_typed_data_shape() {
		let order = golden_order();
		let permit = PermitWitnessTransferFrom {
			permitted: TokenPermissions {
				token: order.input_token,
				amount: order.input_amount,
			},
			spender: Address::repeat_byte(0x42),
			nonce: U256::ZERO,
			deadline: 1_700_000_000,
			witness: hash_order(&order),
		};
		let domain = Eip712Domain::permit2(1, permit2());

		let td = typed_data(&domain, &order, &permit);
		assert_eq!(td["primaryType"], "PermitWitnessTransferFrom");
		assert_eq!(td["domain"]["name"], "Permit2");
		// The wallet payload carries the full order as the witness member
		assert_eq!(td["message"]["witness"]["inputToken"], td["message"]["permitted"]["token"]);
		assert!(td["types"]["Order"].as_array().unwrap().len() == 7);
	}
}
