//! Common types module for the gasless swap relayer.
//!
//! This module defines the core data types shared across the relayer
//! components: the maker's order, the Permit2 signature-transfer message
//! that wraps it, the fully-authorized trade unit, and the transaction
//! types used at the chain boundary.

/// Blockchain transaction types used at the delivery boundary.
pub mod delivery;
/// Maker order model and lifecycle states.
pub mod order;
/// Permit2 signature-transfer message types.
pub mod permit;
/// Secret wrapper for sensitive strings like the relayer signing key.
pub mod secret_string;
/// Fully-authorized trade unit and swap routing metadata.
pub mod trade;
/// Shared utility functions (EIP-712 helpers, hex formatting).
pub mod utils;

// Re-export all types for convenient access
pub use delivery::*;
pub use order::*;
pub use permit::*;
pub use secret_string::SecretString;
pub use trade::*;
pub use utils::{
	compute_domain_hash, compute_final_digest, with_0x_prefix, without_0x_prefix, Eip712AbiEncoder,
	Eip712Domain, DOMAIN_TYPE, NAME_PERMIT2,
};
