//! Configuration module for the transaction batcher.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}`
//! references are resolved from the environment before parsing, and the
//! parsed configuration is validated before it is handed out.

use alloy_primitives::Address;
use batcher_types::Quantity;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the batcher.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// RPC endpoint settings.
	pub network: NetworkConfig,
	/// Worker pool and retry settings.
	#[serde(default)]
	pub executor: ExecutorConfig,
	/// Wallet file locations.
	pub wallets: WalletsConfig,
	/// Target contract and per-stage parameters.
	pub campaign: CampaignConfig,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	/// JSON-RPC HTTP endpoint.
	pub rpc_url: String,
	/// Chain identifier used for EIP-155 signing.
	pub chain_id: u64,
	/// Optional outbound proxy (`http://`, `https://` or `socks5://`).
	#[serde(default)]
	pub proxy: Option<String>,
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	/// How long to wait for a receipt before giving up.
	#[serde(default = "default_receipt_timeout_seconds")]
	pub receipt_timeout_seconds: u64,
	/// Delay between receipt polls.
	#[serde(default = "default_receipt_poll_interval_ms")]
	pub receipt_poll_interval_ms: u64,
}

impl NetworkConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_seconds)
	}

	pub fn receipt_timeout(&self) -> Duration {
		Duration::from_secs(self.receipt_timeout_seconds)
	}

	pub fn receipt_poll_interval(&self) -> Duration {
		Duration::from_millis(self.receipt_poll_interval_ms)
	}
}

fn default_timeout_seconds() -> u64 {
	30
}

fn default_receipt_timeout_seconds() -> u64 {
	120
}

fn default_receipt_poll_interval_ms() -> u64 {
	1000
}

/// Worker pool and retry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
	/// Maximum number of tasks submitted concurrently.
	pub max_workers: usize,
	/// Attempts per task before it is reported as exhausted.
	pub max_attempts: u32,
	/// First backoff delay between attempts.
	pub initial_backoff_ms: u64,
	/// Upper bound for a single backoff delay.
	pub max_backoff_ms: u64,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		Self {
			max_workers: 5,
			max_attempts: 5,
			initial_backoff_ms: 500,
			max_backoff_ms: 8000,
		}
	}
}

impl ExecutorConfig {
	pub fn initial_backoff(&self) -> Duration {
		Duration::from_millis(self.initial_backoff_ms)
	}

	pub fn max_backoff(&self) -> Duration {
		Duration::from_millis(self.max_backoff_ms)
	}
}

/// Wallet file locations.
///
/// Both files are line oriented, one `address,private_key_hex` per line,
/// and are paired by line index.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletsConfig {
	/// Accounts that sign and send every stage.
	pub source: PathBuf,
	/// Recipients for the transfer and attack stages.
	pub destination: PathBuf,
}

/// Target contract configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
	/// Contract every stage calls.
	pub contract: Address,
	/// Gas limit for every stage; integer or hex string.
	#[serde(default = "default_gas_limit")]
	pub gas_limit: Quantity,
	/// Native value sent with every stage; integer or hex string.
	#[serde(default)]
	pub value: Quantity,
	/// Token id moved by the transfer stage.
	#[serde(default)]
	pub transfer_token_id: u64,
	/// Token id destroyed by the burn stage.
	#[serde(default = "default_burn_token_id")]
	pub burn_token_id: u64,
}

fn default_gas_limit() -> Quantity {
	Quantity::from(280_000u64)
}

fn default_burn_token_id() -> u64 {
	1
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file.
	///
	/// Relative wallet paths are resolved against the directory holding the
	/// configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;

		let mut config: Config = content.parse()?;
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		config.wallets.source = resolve_relative(base_dir, &config.wallets.source);
		config.wallets.destination = resolve_relative(base_dir, &config.wallets.destination);
		Ok(config)
	}

	/// Validates the configuration to ensure all values are usable.
	fn validate(&self) -> Result<(), ConfigError> {
		let network = &self.network;
		if network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("network.rpc_url cannot be empty".into()));
		}
		if !network.rpc_url.starts_with("http://") && !network.rpc_url.starts_with("https://") {
			return Err(ConfigError::Validation(format!(
				"network.rpc_url must be an http(s) URL, got '{}'",
				network.rpc_url
			)));
		}
		if network.chain_id == 0 {
			return Err(ConfigError::Validation("network.chain_id must be greater than 0".into()));
		}
		if network.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"network.timeout_seconds must be greater than 0".into(),
			));
		}
		if network.receipt_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"network.receipt_timeout_seconds must be greater than 0".into(),
			));
		}
		if network.receipt_poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"network.receipt_poll_interval_ms must be greater than 0".into(),
			));
		}
		if let Some(proxy) = &network.proxy {
			if proxy.trim().is_empty() {
				return Err(ConfigError::Validation("network.proxy cannot be empty".into()));
			}
		}

		let executor = &self.executor;
		if executor.max_workers == 0 || executor.max_workers > 64 {
			return Err(ConfigError::Validation(format!(
				"executor.max_workers must be between 1 and 64, got {}",
				executor.max_workers
			)));
		}
		if executor.max_attempts == 0 || executor.max_attempts > 20 {
			return Err(ConfigError::Validation(format!(
				"executor.max_attempts must be between 1 and 20, got {}",
				executor.max_attempts
			)));
		}
		if executor.max_backoff_ms < executor.initial_backoff_ms {
			return Err(ConfigError::Validation(
				"executor.max_backoff_ms cannot be lower than executor.initial_backoff_ms".into(),
			));
		}

		if self.wallets.source.as_os_str().is_empty() {
			return Err(ConfigError::Validation("wallets.source cannot be empty".into()));
		}
		if self.wallets.destination.as_os_str().is_empty() {
			return Err(ConfigError::Validation("wallets.destination cannot be empty".into()));
		}

		if self.campaign.contract.is_zero() {
			return Err(ConfigError::Validation(
				"campaign.contract cannot be the zero address".into(),
			));
		}
		let gas_limit = self
			.campaign
			.gas_limit
			.to_u64()
			.map_err(|e| ConfigError::Validation(format!("campaign.gas_limit: {}", e)))?;
		if gas_limit == 0 {
			return Err(ConfigError::Validation(
				"campaign.gas_limit must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

fn resolve_relative(base_dir: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		base_dir.join(path)
	}
}

/// Parses a TOML string, resolving environment variables and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
