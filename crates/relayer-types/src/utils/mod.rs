//! Shared utility functions for the relayer.

pub mod eip712;
pub mod formatting;

pub use eip712::{
	compute_domain_hash, compute_final_digest, Eip712AbiEncoder, Eip712Domain, DOMAIN_TYPE,
	NAME_PERMIT2,
};
pub use formatting::{with_0x_prefix, without_0x_prefix};
