//! Calldata generation for the executor and Permit2 contracts.
//!
//! The tuple layouts below must match the deployed ABIs exactly; the
//! `sol!` definitions are the single source of truth for the call shapes
//! this relayer emits.

use crate::OrderError;
use alloy_primitives::{aliases::U24, Address, U256};
use alloy_sol_types::SolCall;
use relayer_types::{RouteData, Trade, Transaction};

mod abi {
	use alloy_sol_types::sol;

	sol! {
		/// Maker order as declared by the executor contract.
		struct Order {
			address maker;
			address inputToken;
			uint256 inputAmount;
			address outputToken;
			uint256 minAmountOut;
			uint256 expiry;
			uint256 nonce;
		}

		/// ISignatureTransfer.TokenPermissions
		struct TokenPermissions {
			address token;
			uint256 amount;
		}

		/// ISignatureTransfer.PermitTransferFrom as it appears in calldata.
		/// The spender and witness are implied by the call context and the
		/// signature, so they are not part of the tuple.
		struct PermitTransferFrom {
			TokenPermissions permitted;
			uint256 nonce;
			uint256 deadline;
		}

		/// The fully-authorized trade unit.
		struct Trade {
			Order order;
			PermitTransferFrom permit;
			bytes signature;
		}

		/// Routing metadata for the executor's swap step.
		struct RouteData {
			uint8 protocol;
			address[] path;
			uint24 fee;
			bool isMultiHop;
			bytes encodedPath;
		}

		interface IExecutor {
			function executeTrade(Trade trade, RouteData routeData) external;
		}

		interface IPermit2 {
			function invalidateUnorderedNonces(uint256 wordPos, uint256 mask) external;
		}
	}
}

fn encode_trade(trade: &Trade) -> abi::Trade {
	abi::Trade {
		order: abi::Order {
			maker: trade.order.maker,
			inputToken: trade.order.input_token,
			inputAmount: trade.order.input_amount,
			outputToken: trade.order.output_token,
			minAmountOut: trade.order.min_amount_out,
			expiry: U256::from(trade.order.expiry),
			nonce: trade.order.nonce,
		},
		permit: abi::PermitTransferFrom {
			permitted: abi::TokenPermissions {
				token: trade.permit.permitted.token,
				amount: trade.permit.permitted.amount,
			},
			nonce: trade.permit.nonce,
			deadline: U256::from(trade.permit.deadline),
		},
		signature: trade.signature.clone(),
	}
}

fn encode_route(route: &RouteData) -> Result<abi::RouteData, OrderError> {
	let fee = U24::try_from(route.fee)
		.map_err(|_| OrderError::InvalidRoute(format!("fee {} exceeds uint24", route.fee)))?;

	Ok(abi::RouteData {
		protocol: route.protocol.as_u8(),
		path: route.path.clone(),
		fee,
		isMultiHop: route.is_multi_hop,
		encodedPath: route.encoded_path.clone(),
	})
}

/// Builds the `executeTrade` transaction consuming an authorized trade.
pub fn execute_trade_transaction(
	trade: &Trade,
	route: &RouteData,
	executor: Address,
	chain_id: u64,
) -> Result<Transaction, OrderError> {
	let data = abi::IExecutor::executeTradeCall {
		trade: encode_trade(trade),
		routeData: encode_route(route)?,
	}
	.abi_encode();

	Ok(Transaction {
		to: executor,
		data,
		value: U256::ZERO,
		chain_id,
		gas_limit: None,
	})
}

/// Builds one `invalidateUnorderedNonces` transaction for a single bitmap
/// word. Nonces spanning multiple words need one transaction per word.
pub fn invalidate_nonces_transaction(
	word: U256,
	mask: U256,
	permit2: Address,
	chain_id: u64,
) -> Transaction {
	let data = abi::IPermit2::invalidateUnorderedNoncesCall {
		wordPos: word,
		mask,
	}
	.abi_encode();

	Transaction {
		to: permit2,
		data,
		value: U256::ZERO,
		chain_id,
		gas_limit: None,
	}
}
