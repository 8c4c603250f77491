//! Permit2 nonce bitmap management for the relayer.
//!
//! Permit2 stores replay protection per owner as a mapping from a word
//! position to a 256-bit bitmap; bit `pos` of word `word` is set exactly
//! when nonce `(word << 8) | pos` has been consumed or invalidated. This
//! module owns the allocation and invalidation arithmetic over that layout
//! and scans for free nonces through an injected chain reader.
//!
//! Allocation is advisory only: two concurrent scans for the same owner may
//! return the same nonce, and the authoritative exactly-once check happens
//! on-chain at submission time. Bitmap state is never cached across calls;
//! every decision re-reads the source of truth.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Bits per bitmap word. A nonce splits into `(nonce >> 8, nonce & 0xFF)`.
pub const BITS_PER_WORD: u16 = 256;

/// Errors that can occur during nonce bitmap operations.
#[derive(Debug, Error)]
pub enum NonceError {
	/// No free bit was found within the configured scan ceiling. Fatal;
	/// requires operator intervention rather than a retry.
	#[error("no available nonce found after scanning {0} bitmap words")]
	SpaceExhausted(u64),
	/// The underlying chain read failed. Safe to retry with backoff since
	/// bitmap reads are idempotent.
	#[error("chain read failed: {0}")]
	ChainRead(String),
}

/// Read access to an owner's on-chain nonce bitmap.
///
/// Implemented by the delivery layer against the Permit2 `nonceBitmap`
/// view function. Reads suspend the caller; no other operation in this
/// module blocks.
#[async_trait]
pub trait NonceBitmapSource: Send + Sync {
	/// Returns the 256-bit bitmap at `word` for `owner`.
	async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, NonceError>;
}

/// Splits a nonce into its `(word, bit position)` coordinates.
///
/// Total function: `pos` is always in `[0, 255]`.
pub fn split_nonce(nonce: U256) -> (U256, u8) {
	let word = nonce >> 8usize;
	let pos = (nonce & U256::from(0xffu64)).to::<u8>();
	(word, pos)
}

/// Composes a nonce from its `(word, bit position)` coordinates.
pub fn compose_nonce(word: U256, pos: u8) -> U256 {
	(word << 8usize) | U256::from(pos)
}

/// ORs `1 << pos` for each position into a single invalidation mask.
///
/// Used to batch-cancel multiple nonces of one word in a single
/// `invalidateUnorderedNonces` call. An empty slice yields the zero mask.
pub fn build_invalidation_mask(positions: &[u8]) -> U256 {
	positions
		.iter()
		.fold(U256::ZERO, |mask, pos| mask | (U256::from(1u8) << *pos as usize))
}

/// All-ones mask that burns every remaining nonce in a word.
///
/// Invalidating an already-set bit is a no-op on-chain, so applying this
/// mask is idempotent.
pub fn full_word_mask() -> U256 {
	U256::MAX
}

/// Groups nonces by word position and builds one invalidation mask per word.
///
/// Nonces spanning multiple words require one on-chain call per word; that
/// is a contract storage constraint, so callers submit one transaction per
/// returned entry.
pub fn group_by_word(nonces: &[U256]) -> BTreeMap<U256, U256> {
	let mut masks: BTreeMap<U256, U256> = BTreeMap::new();
	for nonce in nonces {
		let (word, pos) = split_nonce(*nonce);
		let entry = masks.entry(word).or_insert(U256::ZERO);
		*entry |= U256::from(1u8) << pos as usize;
	}
	masks
}

/// Stateless nonce allocator over an injected bitmap reader.
///
/// The scan ceiling bounds worst-case latency; unbounded scanning against
/// an adversarial bitmap would be a liveness risk.
pub struct NonceService {
	/// Chain reader for per-owner bitmap words.
	source: Arc<dyn NonceBitmapSource>,
	/// Maximum number of words scanned before giving up.
	scan_ceiling_words: u64,
}

impl NonceService {
	/// Creates a new service reading through `source`, scanning at most
	/// `scan_ceiling_words` words per allocation.
	pub fn new(source: Arc<dyn NonceBitmapSource>, scan_ceiling_words: u64) -> Self {
		Self {
			source,
			scan_ceiling_words,
		}
	}

	/// Finds the lowest free nonce for `owner`.
	///
	/// Scans words in ascending order and bit positions within each word in
	/// ascending order, returning the first unset bit composed as
	/// `(word << 8) | pos`. Fully exhausted words are skipped without error.
	///
	/// The result is advisory; the loser of a race between two concurrent
	/// allocations sees a reverted submission and should re-scan.
	pub async fn find_next_available_nonce(&self, owner: Address) -> Result<U256, NonceError> {
		for word_pos in 0..self.scan_ceiling_words {
			let word = U256::from(word_pos);
			let bitmap = self.source.nonce_bitmap(owner, word).await?;

			if bitmap == U256::MAX {
				tracing::trace!(%owner, word = word_pos, "bitmap word exhausted, skipping");
				continue;
			}

			// First unset bit, scanning positions 0..=255 in order.
			let pos = (!bitmap).trailing_zeros() as u8;
			let nonce = compose_nonce(word, pos);
			tracing::debug!(%owner, word = word_pos, pos, %nonce, "allocated free nonce");
			return Ok(nonce);
		}

		Err(NonceError::SpaceExhausted(self.scan_ceiling_words))
	}

	/// Returns whether `nonce` has been consumed or invalidated for `owner`.
	pub async fn is_nonce_used(&self, owner: Address, nonce: U256) -> Result<bool, NonceError> {
		let (word, pos) = split_nonce(nonce);
		let bitmap = self.source.nonce_bitmap(owner, word).await?;
		Ok(bitmap.bit(pos as usize))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::sync::Mutex;

	/// In-memory bitmap store standing in for contract storage.
	struct MemoryBitmap {
		words: Mutex<HashMap<(Address, U256), U256>>,
	}

	impl MemoryBitmap {
		fn new() -> Self {
			Self {
				words: Mutex::new(HashMap::new()),
			}
		}

		fn set_word(&self, owner: Address, word: u64, bitmap: U256) {
			self.words
				.lock()
				.unwrap()
				.insert((owner, U256::from(word)), bitmap);
		}
	}

	#[async_trait]
	impl NonceBitmapSource for MemoryBitmap {
		async fn nonce_bitmap(&self, owner: Address, word: U256) -> Result<U256, NonceError> {
			Ok(self
				.words
				.lock()
				.unwrap()
				.get(&(owner, word))
				.copied()
				.unwrap_or(U256::ZERO))
		}
	}

	fn owner() -> Address {
		Address::repeat_byte(0x11)
	}

	fn service_with(source: Arc<MemoryBitmap>, ceiling: u64) -> NonceService {
		NonceService::new(source, ceiling)
	}

	#[test]
	fn test_split_compose_round_trip() {
		for (word, pos) in [(0u64, 0u8), (0, 1), (1, 0), (7, 255), (1_000_000, 128)] {
			let word = U256::from(word);
			let nonce = compose_nonce(word, pos);
			assert_eq!(split_nonce(nonce), (word, pos));
		}
	}

	#[test]
	fn test_split_nonce_pos_always_in_range() {
		let (word, pos) = split_nonce(U256::MAX);
		assert_eq!(pos, 255);
		assert_eq!(word, U256::MAX >> 8usize);
	}

	#[test]
	fn test_build_invalidation_mask() {
		assert_eq!(build_invalidation_mask(&[]), U256::ZERO);
		assert_eq!(build_invalidation_mask(&[0, 1, 2]), U256::from(0b111u64));
		assert_eq!(
			build_invalidation_mask(&[255]),
			U256::from(1u8) << 255usize
		);
		// Duplicate positions collapse
		assert_eq!(build_invalidation_mask(&[3, 3]), U256::from(8u64));
	}

	#[test]
	fn test_full_word_mask_is_all_ones() {
		assert_eq!(full_word_mask(), U256::MAX);
	}

	#[test]
	fn test_group_by_word_one_mask_per_word() {
		let nonces = vec![
			compose_nonce(U256::ZERO, 0),
			compose_nonce(U256::ZERO, 5),
			compose_nonce(U256::from(2u64), 1),
		];
		let masks = group_by_word(&nonces);
		assert_eq!(masks.len(), 2);
		assert_eq!(masks[&U256::ZERO], U256::from(0b100001u64));
		assert_eq!(masks[&U256::from(2u64)], U256::from(2u64));
	}

	#[tokio::test]
	async fn test_find_next_on_empty_bitmap() {
		let source = Arc::new(MemoryBitmap::new());
		let service = service_with(source, 10);
		let nonce = service.find_next_available_nonce(owner()).await.unwrap();
		assert_eq!(nonce, compose_nonce(U256::ZERO, 0));
	}

	#[tokio::test]
	async fn test_find_next_skips_set_bits() {
		let source = Arc::new(MemoryBitmap::new());
		source.set_word(owner(), 0, U256::from(1u64));
		let service = service_with(source, 10);
		let nonce = service.find_next_available_nonce(owner()).await.unwrap();
		assert_eq!(nonce, compose_nonce(U256::ZERO, 1));
	}

	#[tokio::test]
	async fn test_find_next_skips_exhausted_word() {
		let source = Arc::new(MemoryBitmap::new());
		source.set_word(owner(), 0, U256::MAX);
		let service = service_with(source, 10);
		let nonce = service.find_next_available_nonce(owner()).await.unwrap();
		assert_eq!(nonce, compose_nonce(U256::from(1u64), 0));
	}

	#[tokio::test]
	async fn test_scan_ceiling_exhaustion_is_fatal() {
		let source = Arc::new(MemoryBitmap::new());
		source.set_word(owner(), 0, U256::MAX);
		source.set_word(owner(), 1, U256::MAX);
		let service = service_with(source, 2);
		let err = service.find_next_available_nonce(owner()).await.unwrap_err();
		assert!(matches!(err, NonceError::SpaceExhausted(2)));
	}

	#[tokio::test]
	async fn test_allocated_nonce_reports_unused() {
		let source = Arc::new(MemoryBitmap::new());
		source.set_word(owner(), 0, U256::from(0b1011u64));
		let service = service_with(source, 10);

		let nonce = service.find_next_available_nonce(owner()).await.unwrap();
		assert_eq!(nonce, compose_nonce(U256::ZERO, 2));
		assert!(!service.is_nonce_used(owner(), nonce).await.unwrap());
		// Bits the scan skipped are reported used
		assert!(service.is_nonce_used(owner(), U256::ZERO).await.unwrap());
		assert!(service
			.is_nonce_used(owner(), U256::from(1u64))
			.await
			.unwrap());
	}
}
