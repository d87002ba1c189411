//! JSON-RPC gateway.
//!
//! A stateless wrapper over the four node primitives the pipeline needs.
//! Responses are returned as parsed envelopes; interpreting an `error`
//! member is left to the caller. Receipt polling is the exception since it
//! has to look inside the result to know when to stop.

use crate::DeliveryError;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use batcher_config::NetworkConfig;
use batcher_types::{truncate_id, JsonRpcRequest, JsonRpcResponse, Quantity, Receipt};
use rand::seq::SliceRandom;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;

/// Client identities rotated across requests.
const USER_AGENTS: &[&str] = &[
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
	"Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 13_2_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15",
];

fn random_user_agent() -> &'static str {
	USER_AGENTS
		.choose(&mut rand::thread_rng())
		.copied()
		.unwrap_or(USER_AGENTS[0])
}

/// Node primitives used by the builder, submitter and executor.
#[async_trait]
pub trait RpcGateway: Send + Sync {
	/// `eth_gasPrice`.
	async fn gas_price(&self) -> Result<JsonRpcResponse, DeliveryError>;

	/// `eth_getTransactionCount` at the `latest` block.
	async fn transaction_count(&self, address: Address) -> Result<JsonRpcResponse, DeliveryError>;

	/// `eth_sendRawTransaction` with the hex-encoded signed bytes.
	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<JsonRpcResponse, DeliveryError>;

	/// Blocks until a receipt for `tx_hash` is available or the wait times out.
	async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, DeliveryError>;
}

/// HTTP implementation of [`RpcGateway`].
pub struct HttpGateway {
	client: reqwest::Client,
	rpc_url: String,
	receipt_timeout: Duration,
	poll_interval: Duration,
}

impl HttpGateway {
	/// Builds a gateway with the endpoint's timeout and optional proxy.
	pub fn new(config: &NetworkConfig) -> Result<Self, DeliveryError> {
		let mut builder = reqwest::Client::builder().timeout(config.timeout());

		if let Some(proxy) = &config.proxy {
			let proxy = reqwest::Proxy::all(proxy.as_str())
				.map_err(|e| DeliveryError::InvalidInput(format!("Invalid proxy '{}': {}", proxy, e)))?;
			builder = builder.proxy(proxy);
		}

		let client = builder
			.build()
			.map_err(|e| DeliveryError::Transport(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			rpc_url: config.rpc_url.clone(),
			receipt_timeout: config.receipt_timeout(),
			poll_interval: config.receipt_poll_interval(),
		})
	}

	/// Issues one JSON-RPC call and parses the response envelope.
	pub async fn call(&self, method: &str, params: Value) -> Result<JsonRpcResponse, DeliveryError> {
		let request = JsonRpcRequest::new(method, params);

		let response = self
			.client
			.post(&self.rpc_url)
			.header(CONTENT_TYPE, "application/json")
			.header(USER_AGENT, random_user_agent())
			.json(&request)
			.send()
			.await
			.map_err(|e| transport_error(method, e))?;

		let status = response.status();
		let body = response
			.bytes()
			.await
			.map_err(|e| transport_error(method, e))?;

		serde_json::from_slice::<JsonRpcResponse>(&body).map_err(|e| {
			DeliveryError::Parse(format!(
				"{} returned malformed JSON (HTTP {}): {}",
				method, status, e
			))
		})
	}
}

fn transport_error(method: &str, error: reqwest::Error) -> DeliveryError {
	if error.is_timeout() {
		DeliveryError::Timeout(format!("{} timed out: {}", method, error))
	} else {
		DeliveryError::Transport(format!("{} failed: {}", method, error))
	}
}

/// Converts an `eth_getTransactionReceipt` result into a [`Receipt`].
pub(crate) fn parse_receipt(value: &Value) -> Result<Receipt, DeliveryError> {
	let field = |name: &str| {
		value
			.get(name)
			.and_then(Value::as_str)
			.ok_or_else(|| DeliveryError::Parse(format!("receipt is missing '{}'", name)))
	};

	let tx_hash = B256::from_str(field("transactionHash")?)
		.map_err(|e| DeliveryError::Parse(format!("invalid receipt transactionHash: {}", e)))?;
	let block_number = Quantity::from_str(field("blockNumber")?)
		.and_then(|q| q.to_u64())
		.map_err(|e| DeliveryError::Parse(format!("invalid receipt blockNumber: {}", e)))?;
	let status = Quantity::from_str(field("status")?)
		.map_err(|e| DeliveryError::Parse(format!("invalid receipt status: {}", e)))?;

	Ok(Receipt {
		tx_hash,
		block_number,
		success: !status.is_zero(),
	})
}

#[async_trait]
impl RpcGateway for HttpGateway {
	async fn gas_price(&self) -> Result<JsonRpcResponse, DeliveryError> {
		self.call("eth_gasPrice", json!([])).await
	}

	async fn transaction_count(&self, address: Address) -> Result<JsonRpcResponse, DeliveryError> {
		self.call("eth_getTransactionCount", json!([address, "latest"]))
			.await
	}

	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<JsonRpcResponse, DeliveryError> {
		self.call("eth_sendRawTransaction", json!([raw])).await
	}

	async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, DeliveryError> {
		let hash_str = tx_hash.to_string();
		let start_time = tokio::time::Instant::now();

		loop {
			let response = self
				.call("eth_getTransactionReceipt", json!([hash_str]))
				.await?;

			if let Some(error) = response.error {
				return Err(error.into());
			}

			if let Some(result) = response.result.as_ref().filter(|r| !r.is_null()) {
				let receipt = parse_receipt(result)?;
				tracing::debug!(
					tx_hash = %truncate_id(&hash_str),
					block_number = receipt.block_number,
					success = receipt.success,
					"Receipt available"
				);
				return Ok(receipt);
			}

			if start_time.elapsed() >= self.receipt_timeout {
				return Err(DeliveryError::Timeout(format!(
					"no receipt for {} after {} seconds",
					hash_str,
					self.receipt_timeout.as_secs()
				)));
			}

			tokio::time::sleep(self.poll_interval).await;
		}
	}
}
