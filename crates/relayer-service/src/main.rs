//! Command-line entry point for the gasless swap relayer.
//!
//! A thin transport shim over the core crates: it loads configuration,
//! wires the delivery, nonce and authorization services together, and
//! serializes results. All protocol logic lives in the library crates.

use alloy_primitives::{Address, Bytes, U256};
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use relayer_config::Config;
use relayer_delivery::implementations::evm::alloy::AlloyDelivery;
use relayer_delivery::DeliveryService;
use relayer_nonce::{group_by_word, NonceBitmapSource, NonceService};
use relayer_order::calldata::{execute_trade_transaction, invalidate_nonces_transaction};
use relayer_order::TradeAuthorizer;
use relayer_types::{with_0x_prefix, Order, PermitWitnessTransferFrom, RouteData};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the relayer service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Scan the Permit2 bitmap for the lowest free nonce of an owner.
	NextNonce {
		/// Owner address to scan for
		#[arg(long)]
		owner: Address,
	},
	/// Check whether a specific nonce has been consumed or invalidated.
	CheckNonce {
		/// Owner address
		#[arg(long)]
		owner: Address,
		/// Nonce to check, decimal or 0x-prefixed hex
		#[arg(long)]
		nonce: U256,
	},
	/// Build a signing payload for an order, allocating a fresh permit nonce.
	Prepare {
		/// Path to a JSON file containing the order
		#[arg(long)]
		order: PathBuf,
		/// Signature validity window in seconds from now
		#[arg(long, default_value_t = 3600)]
		deadline_secs: u64,
	},
	/// Invalidate nonces on-chain, one transaction per bitmap word.
	Cancel {
		/// Nonces to invalidate, decimal or 0x-prefixed hex
		#[arg(long, required = true, num_args = 1..)]
		nonces: Vec<U256>,
	},
	/// Burn every remaining nonce in one bitmap word.
	CancelWord {
		/// Word position to burn
		#[arg(long)]
		word: U256,
	},
	/// Submit a fully-signed trade with its routing data.
	Execute {
		/// Path to a JSON file containing order, permit, signature and route
		#[arg(long)]
		trade: PathBuf,
	},
}

/// Wire format of the file consumed by `execute`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRequest {
	order: Order,
	permit: PermitWitnessTransferFrom,
	signature: Bytes,
	route: RouteData,
}

fn unix_now() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
	fmt().with_env_filter(env_filter).with_target(true).init();

	let config_path = args
		.config
		.to_str()
		.ok_or("config path is not valid UTF-8")?;
	let config = Config::from_file(config_path)?;
	tracing::info!(
		chain_id = config.network.chain_id,
		"loaded relayer configuration"
	);

	// The only place the key leaves its redacted wrapper
	let signer: PrivateKeySigner = config
		.account
		.private_key
		.expose_secret()
		.parse()
		.map_err(|_| "invalid relayer private key")?;

	let delivery = AlloyDelivery::new(
		&config.network.rpc_url,
		config.network.chain_id,
		config.network.permit2_address,
		signer,
	)
	.await?;
	let delivery = Arc::new(DeliveryService::new(
		Box::new(delivery),
		config.delivery.min_confirmations,
	));
	let nonces = NonceService::new(
		delivery.clone() as Arc<dyn NonceBitmapSource>,
		config.nonce.scan_ceiling_words,
	);
	let authorizer = TradeAuthorizer::new(config.network.chain_id, config.network.permit2_address);

	match args.command {
		Command::NextNonce { owner } => {
			let nonce = nonces.find_next_available_nonce(owner).await?;
			println!("{}", nonce);
		}
		Command::CheckNonce { owner, nonce } => {
			let used = nonces.is_nonce_used(owner, nonce).await?;
			println!("{}", if used { "used" } else { "available" });
		}
		Command::Prepare {
			order,
			deadline_secs,
		} => {
			let order: Order = serde_json::from_str(&std::fs::read_to_string(order)?)?;
			let now = unix_now();
			let permit_nonce = nonces.find_next_available_nonce(order.maker).await?;
			let permit = authorizer.prepare_for_signing(
				&order,
				config.network.executor_address,
				permit_nonce,
				now + deadline_secs,
				now,
			)?;
			let request = authorizer.signing_request(&order, &permit);
			println!("{}", serde_json::to_string_pretty(&request)?);
		}
		Command::Cancel { nonces: to_cancel } => {
			// One invalidation transaction per bitmap word
			for (word, mask) in group_by_word(&to_cancel) {
				let tx = invalidate_nonces_transaction(
					word,
					mask,
					config.network.permit2_address,
					config.network.chain_id,
				);
				let hash = delivery.deliver(tx).await?;
				let receipt = delivery.confirm(&hash).await?;
				tracing::info!(
					%word,
					tx_hash = %with_0x_prefix(&hex::encode(&receipt.hash.0)),
					success = receipt.success,
					"nonce invalidation confirmed"
				);
			}
		}
		Command::CancelWord { word } => {
			let tx = invalidate_nonces_transaction(
				word,
				relayer_nonce::full_word_mask(),
				config.network.permit2_address,
				config.network.chain_id,
			);
			let hash = delivery.deliver(tx).await?;
			let receipt = delivery.confirm(&hash).await?;
			tracing::info!(
				%word,
				success = receipt.success,
				"word invalidation confirmed"
			);
		}
		Command::Execute { trade } => {
			let request: TradeRequest = serde_json::from_str(&std::fs::read_to_string(trade)?)?;
			let now = unix_now();

			// Fail-fast boundary: a trade rejected here would only waste
			// relayer gas on a guaranteed revert.
			let trade = authorizer.assemble_trade(
				request.order,
				request.permit,
				request.signature,
				now,
			)?;
			let maker = trade.order.maker;
			let permit_nonce = trade.permit.nonce;

			let tx = execute_trade_transaction(
				&trade,
				&request.route,
				config.network.executor_address,
				config.network.chain_id,
			)?;
			let hash = delivery.deliver(tx).await?;
			let receipt = delivery.confirm(&hash).await?;

			if receipt.success {
				tracing::info!(
					%maker,
					tx_hash = %with_0x_prefix(&hex::encode(&receipt.hash.0)),
					block = receipt.block_number,
					"trade executed"
				);
				println!("executed");
			} else {
				// Distinguish a lost nonce race (retryable with a fresh
				// nonce) from other reverts.
				let raced = nonces.is_nonce_used(maker, permit_nonce).await.unwrap_or(false);
				if raced {
					tracing::warn!(
						%maker,
						%permit_nonce,
						"trade reverted: permit nonce already consumed; re-scan and re-sign"
					);
					println!("reverted: nonce race, retry with a fresh nonce");
				} else {
					tracing::error!(
						%maker,
						tx_hash = %with_0x_prefix(&hex::encode(&receipt.hash.0)),
						"trade reverted"
					);
					println!("reverted");
				}
				std::process::exit(1);
			}
		}
	}

	Ok(())
}
