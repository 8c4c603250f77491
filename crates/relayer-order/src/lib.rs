//! Order authorization module for the gasless swap relayer.
//!
//! This crate owns the protocol-critical path between a maker's trade
//! intent and an on-chain-submittable trade: order validation, the EIP-712
//! typed-data encoding that must byte-exactly match the verifying
//! contract, trade assembly with fail-fast local checks, and calldata
//! generation for the executor and Permit2 contracts.

use thiserror::Error;

/// On-chain calldata generation for trade execution and nonce invalidation.
pub mod calldata;
/// EIP-712 struct hashing and typed-data construction for Permit2 witness orders.
pub mod eip712;
/// Trade authorization orchestration: signing preparation and trade assembly.
pub mod orchestrator;
/// Pure order validation.
pub mod validation;

pub use orchestrator::{SigningRequest, TradeAuthorizer};
pub use validation::validate_order;

/// Errors that can occur while authorizing an order.
///
/// All of these are the caller's fault and must never be retried
/// automatically; a trade failing these local checks would be guaranteed
/// to revert on-chain and only waste relayer gas.
#[derive(Debug, Error)]
pub enum OrderError {
	/// A zero address where a real one is required, or identical
	/// input/output tokens.
	#[error("invalid address: {0}")]
	InvalidAddress(String),
	/// Zero input amount.
	#[error("invalid amount: {0}")]
	InvalidAmount(String),
	/// Order expiry has passed at authorization time.
	#[error("order expired at {expiry}, now {now}")]
	OrderExpired { expiry: u64, now: u64 },
	/// Permit deadline has passed.
	#[error("signature deadline passed at {deadline}, now {now}")]
	SignatureExpired { deadline: u64, now: u64 },
	/// Permit fields disagree with the order they claim to authorize.
	#[error("inconsistent permit: {0}")]
	InconsistentPermit(String),
	/// Signature bytes do not have the contract-specified ECDSA shape.
	#[error("invalid signature: {0}")]
	InvalidSignature(String),
	/// Route metadata cannot be encoded for the executor ABI.
	#[error("invalid route: {0}")]
	InvalidRoute(String),
}
