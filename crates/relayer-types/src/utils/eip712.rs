//! Generic EIP-712 utilities shared across the relayer.
//!
//! These helpers provide:
//! - The Permit2 signing domain and its hash
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the static field types used in struct hashing
//!
//! The encoding must stay bit-exact with the verifying contract's
//! `abi.encode` layout: every field occupies one 32-byte word, addresses
//! left-padded with zeros, uint256 big-endian as-is.

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Permit2's EIP-712 domain type. No version or salt fields.
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";
/// Domain name fixed by the Permit2 contract.
pub const NAME_PERMIT2: &str = "Permit2";

/// The EIP-712 signing domain handed to external signers.
///
/// Chain id and verifying contract are supplied configuration; this core
/// never computes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
	/// Domain name, always "Permit2" for the signature-transfer flow.
	pub name: String,
	/// Chain the verifying contract is deployed on.
	pub chain_id: u64,
	/// Address of the verifying Permit2 deployment.
	pub verifying_contract: Address,
}

impl Eip712Domain {
	/// Builds the Permit2 domain for the given chain and deployment.
	pub fn permit2(chain_id: u64, verifying_contract: Address) -> Self {
		Self {
			name: NAME_PERMIT2.to_string(),
			chain_id,
			verifying_contract,
		}
	}

	/// Computes the domain separator for this domain.
	pub fn separator(&self) -> B256 {
		compute_domain_hash(&self.name, self.chain_id, &self.verifying_contract)
	}
}

/// Compute the EIP-712 domain hash:
/// keccak256(abi.encode(typeHash, nameHash, chainId, verifyingContract)).
pub fn compute_domain_hash(name: &str, chain_id: u64, verifying_contract: &Address) -> B256 {
	let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
	let name_hash = keccak256(name.as_bytes());
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&domain_type_hash);
	enc.push_b256(&name_hash);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for static types used in EIP-712 struct hashing.
///
/// All order and permit fields are static-width, so no dynamic-length
/// encoding is ever needed here.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u64(&mut self, v: u64) {
		self.push_u256(U256::from(v));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// Canonical Permit2 deployment on mainnet.
	const PERMIT2: [u8; 20] = [
		0x00, 0x00, 0x00, 0x00, 0x00, 0x22, 0xD4, 0x73, 0x03, 0x0F, 0x11, 0x6d, 0xDE, 0xE9, 0xF6,
		0xB4, 0x3a, 0xC7, 0x8B, 0xA3,
	];

	#[test]
	fn test_static_word_layout() {
		let addr = Address::from(PERMIT2);
		let mut enc = Eip712AbiEncoder::new();
		enc.push_address(&addr);
		enc.push_u256(U256::from(1u64));
		let buf = enc.finish();

		assert_eq!(buf.len(), 64);
		// Address is left-padded to 32 bytes
		assert_eq!(&buf[..12], &[0u8; 12]);
		assert_eq!(&buf[12..32], addr.as_slice());
		// uint256 big-endian
		assert_eq!(buf[63], 1);
	}

	#[test]
	fn test_permit2_mainnet_domain_separator() {
		// Permit2's published mainnet domain separator. Any drift in the
		// domain type string or encoding breaks signature verification.
		let sep = compute_domain_hash(NAME_PERMIT2, 1, &Address::from(PERMIT2));
		assert_eq!(
			hex::encode(sep),
			"866a5aba21966af95d6c7ab78eb2b2fc913915c28be3b9aa07cc04ff903e3f28"
		);
	}

	#[test]
	fn test_domain_struct_matches_free_function() {
		let domain = Eip712Domain::permit2(1, Address::from(PERMIT2));
		assert_eq!(
			domain.separator(),
			compute_domain_hash(NAME_PERMIT2, 1, &Address::from(PERMIT2))
		);
	}

	#[test]
	fn test_final_digest_prefix() {
		let domain_hash = B256::ZERO;
		let struct_hash = B256::ZERO;
		let digest = compute_final_digest(&domain_hash, &struct_hash);
		// keccak256 of 0x1901 followed by 64 zero bytes, stable by construction
		let again = compute_final_digest(&domain_hash, &struct_hash);
		assert_eq!(digest, again);
	}
}
