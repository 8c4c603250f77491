//! Pure validation of maker orders.

use crate::OrderError;
use alloy_primitives::{Address, U256};
use relayer_types::Order;

/// Validates a maker order at authorization time.
///
/// Pure function over the value; a later freshness re-check at submission
/// time is the orchestrator's job.
pub fn validate_order(order: &Order, now: u64) -> Result<(), OrderError> {
	if order.maker == Address::ZERO {
		return Err(OrderError::InvalidAddress("maker is the zero address".into()));
	}
	if order.input_token == Address::ZERO {
		return Err(OrderError::InvalidAddress(
			"input token is the zero address".into(),
		));
	}
	if order.output_token == Address::ZERO {
		return Err(OrderError::InvalidAddress(
			"output token is the zero address".into(),
		));
	}
	if order.input_token == order.output_token {
		return Err(OrderError::InvalidAddress(
			"input and output token are identical".into(),
		));
	}
	if order.input_amount == U256::ZERO {
		return Err(OrderError::InvalidAmount("input amount is zero".into()));
	}
	if order.expiry <= now {
		return Err(OrderError::OrderExpired {
			expiry: order.expiry,
			now,
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid_order() -> Order {
		Order {
			maker: Address::repeat_byte(0x11),
			input_token: Address::repeat_byte(0x22),
			input_amount: U256::from(10u64).pow(U256::from(19u64)),
			output_token: Address::repeat_byte(0x33),
			min_amount_out: U256::ZERO,
			expiry: 1_700_000_000,
			nonce: U256::ZERO,
		}
	}

	const NOW: u64 = 1_600_000_000;

	#[test]
	fn test_valid_order_passes() {
		assert!(validate_order(&valid_order(), NOW).is_ok());
	}

	#[test]
	fn test_zero_addresses_rejected() {
		for mutate in [
			(|o: &mut Order| o.maker = Address::ZERO) as fn(&mut Order),
			|o| o.input_token = Address::ZERO,
			|o| o.output_token = Address::ZERO,
		] {
			let mut order = valid_order();
			mutate(&mut order);
			assert!(matches!(
				validate_order(&order, NOW),
				Err(OrderError::InvalidAddress(_))
			));
		}
	}

	#[test]
	fn test_identical_tokens_rejected() {
		let mut order = valid_order();
		order.output_token = order.input_token;
		assert!(matches!(
			validate_order(&order, NOW),
			Err(OrderError::InvalidAddress(_))
		));
	}

	#[test]
	fn test_zero_amount_rejected() {
		let mut order = valid_order();
		order.input_amount = U256::ZERO;
		assert!(matches!(
			validate_order(&order, NOW),
			Err(OrderError::InvalidAmount(_))
		));
	}

	#[test]
	fn test_expired_order_rejected() {
		let order = valid_order();
		// expiry == now is already expired
		assert!(matches!(
			validate_order(&order, order.expiry),
			Err(OrderError::OrderExpired { .. })
		));
		// min_amount_out of zero is allowed (no slippage floor)
		assert!(validate_order(&order, order.expiry - 1).is_ok());
	}
}
