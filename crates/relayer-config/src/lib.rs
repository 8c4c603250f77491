//! Configuration module for the gasless swap relayer.
//!
//! Loads configuration from TOML with `${ENV_VAR}` (and `${ENV_VAR:-default}`)
//! resolution, and validates it before anything else starts. Chain id and
//! the Permit2/executor contract addresses are externally supplied here and
//! passed explicitly to the components that need them; there is no ambient
//! registry.

use alloy_primitives::Address;
use regex::Regex;
use relayer_types::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the relayer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Network and contract deployment settings.
	pub network: NetworkConfig,
	/// Nonce bitmap scan settings.
	#[serde(default)]
	pub nonce: NonceConfig,
	/// Transaction delivery settings.
	#[serde(default)]
	pub delivery: DeliveryConfig,
	/// Relayer account settings.
	pub account: AccountConfig,
}

/// Network and contract deployment settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Chain the Permit2 and executor deployments live on.
	pub chain_id: u64,
	/// HTTP RPC endpoint.
	pub rpc_url: String,
	/// Address of the Permit2 deployment.
	pub permit2_address: Address,
	/// Address of the executor contract (the permit spender).
	pub executor_address: Address,
}

/// Nonce bitmap scan settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NonceConfig {
	/// Maximum number of bitmap words scanned when allocating a nonce.
	/// Bounds worst-case allocation latency; exhaustion is fatal.
	#[serde(default = "default_scan_ceiling_words")]
	pub scan_ceiling_words: u64,
}

impl Default for NonceConfig {
	fn default() -> Self {
		Self {
			scan_ceiling_words: default_scan_ceiling_words(),
		}
	}
}

/// Returns the default nonce scan ceiling.
///
/// One million words is 256 million nonces per owner, far beyond any
/// realistic allocation while still bounding a scan against a poisoned
/// bitmap.
fn default_scan_ceiling_words() -> u64 {
	1_000_000
}

/// Transaction delivery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
	/// Confirmations required before a submission is considered final.
	#[serde(default = "default_confirmations")]
	pub min_confirmations: u64,
}

impl Default for DeliveryConfig {
	fn default() -> Self {
		Self {
			min_confirmations: default_confirmations(),
		}
	}
}

/// Returns the default confirmation count.
fn default_confirmations() -> u64 {
	1
}

/// Relayer account settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded relayer private key, normally injected via
	/// `${RELAYER_PRIVATE_KEY}`. Zeroed on drop and redacted in debug
	/// and serialized output.
	pub private_key: SecretString,
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation("chain_id cannot be zero".into()));
		}
		if self.network.rpc_url.is_empty() {
			return Err(ConfigError::Validation("rpc_url cannot be empty".into()));
		}
		if self.network.permit2_address == Address::ZERO {
			return Err(ConfigError::Validation(
				"permit2_address cannot be the zero address".into(),
			));
		}
		if self.network.executor_address == Address::ZERO {
			return Err(ConfigError::Validation(
				"executor_address cannot be the zero address".into(),
			));
		}
		if self.nonce.scan_ceiling_words == 0 {
			return Err(ConfigError::Validation(
				"nonce scan ceiling must be at least one word".into(),
			));
		}
		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"relayer private key cannot be empty".into(),
			));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Resolves `${VAR}` and `${VAR:-default}` references against the process
/// environment.
fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"environment variable '{}' not found",
						var_name
					)))
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply in reverse order to keep byte positions valid
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(*start..*end, value);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const SAMPLE: &str = r#"
[network]
chain_id = 31337
rpc_url = "http://127.0.0.1:8545"
permit2_address = "0x000000000022D473030F116dDEE9F6B43aC78BA3"
executor_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"

[nonce]
scan_ceiling_words = 1000

[delivery]
min_confirmations = 2

[account]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;

	#[test]
	fn test_parse_sample_config() {
		let config: Config = SAMPLE.parse().unwrap();
		assert_eq!(config.network.chain_id, 31337);
		assert_eq!(config.nonce.scan_ceiling_words, 1000);
		assert_eq!(config.delivery.min_confirmations, 2);
	}

	#[test]
	fn test_defaults_applied() {
		let minimal = r#"
[network]
chain_id = 1
rpc_url = "http://127.0.0.1:8545"
permit2_address = "0x000000000022D473030F116dDEE9F6B43aC78BA3"
executor_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"

[account]
private_key = "0x01"
"#;
		let config: Config = minimal.parse().unwrap();
		assert_eq!(config.nonce.scan_ceiling_words, 1_000_000);
		assert_eq!(config.delivery.min_confirmations, 1);
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_RELAYER_RPC", "http://10.0.0.1:8545");
		let input = "rpc_url = \"${TEST_RELAYER_RPC}\"";
		assert_eq!(
			resolve_env_vars(input).unwrap(),
			"rpc_url = \"http://10.0.0.1:8545\""
		);
		std::env::remove_var("TEST_RELAYER_RPC");
	}

	#[test]
	fn test_env_var_default_value() {
		let input = "rpc_url = \"${TEST_RELAYER_MISSING:-http://fallback:8545}\"";
		assert_eq!(
			resolve_env_vars(input).unwrap(),
			"rpc_url = \"http://fallback:8545\""
		);
	}

	#[test]
	fn test_missing_env_var_is_an_error() {
		let input = "key = \"${TEST_RELAYER_DEFINITELY_MISSING}\"";
		assert!(matches!(
			resolve_env_vars(input),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_zero_addresses_rejected() {
		let bad = SAMPLE.replace(
			"0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
			"0x0000000000000000000000000000000000000000",
		);
		assert!(matches!(
			bad.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_zero_scan_ceiling_rejected() {
		let bad = SAMPLE.replace("scan_ceiling_words = 1000", "scan_ceiling_words = 0");
		assert!(matches!(
			bad.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_serialized_config_redacts_private_key() {
		let config: Config = SAMPLE.parse().unwrap();
		let json = serde_json::to_string(&config).unwrap();
		assert!(!json.contains("ac0974bec39a17e3"));
		assert!(json.contains("***REDACTED***"));
		assert!(!format!("{:?}", config).contains("ac0974bec39a17e3"));
	}

	#[test]
	fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(SAMPLE.as_bytes()).unwrap();
		let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
		assert_eq!(config.network.chain_id, 31337);
	}
}
