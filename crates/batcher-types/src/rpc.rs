//! JSON-RPC 2.0 envelopes.
//!
//! The gateway hands responses back untouched; callers decide what an
//! `error` member means for them.

use crate::quantity::{Quantity, QuantityError};
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Outgoing JSON-RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
	pub jsonrpc: &'static str,
	pub method: String,
	pub params: Value,
	pub id: u64,
}

impl JsonRpcRequest {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			jsonrpc: "2.0",
			method: method.into(),
			params,
			id: 1,
		}
	}
}

/// Error member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

/// Parsed JSON-RPC response carrying either `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
	#[serde(default)]
	pub jsonrpc: Option<String>,
	#[serde(default)]
	pub id: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
	/// Builds a successful response around `result`.
	pub fn success(result: Value) -> Self {
		Self {
			jsonrpc: Some("2.0".to_string()),
			id: Value::from(1),
			result: Some(result),
			error: None,
		}
	}

	/// Builds an error response.
	pub fn failure(code: i64, message: impl Into<String>) -> Self {
		Self {
			jsonrpc: Some("2.0".to_string()),
			id: Value::from(1),
			result: None,
			error: Some(JsonRpcError {
				code,
				message: message.into(),
				data: None,
			}),
		}
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Returns the `result` member when it is a string.
	pub fn result_str(&self) -> Option<&str> {
		self.result.as_ref().and_then(Value::as_str)
	}

	/// Interprets `result` as a hex quantity such as `eth_gasPrice` returns.
	pub fn quantity(&self) -> Result<Quantity, QuantityError> {
		let raw = self
			.result_str()
			.ok_or_else(|| QuantityError::Invalid(format!("{:?}", self.result)))?;
		Quantity::from_str(raw)
	}

	/// Extracts a transaction hash from `result`.
	///
	/// Fails when the response carries an error, has no result, or the result
	/// is not a 32-byte hex string.
	pub fn tx_hash(&self) -> Result<B256, String> {
		if let Some(error) = &self.error {
			return Err(format!("RPC error {}: {}", error.code, error.message));
		}
		let raw = self
			.result_str()
			.ok_or_else(|| "response carries no transaction hash".to_string())?;
		B256::from_str(raw).map_err(|e| format!("malformed transaction hash '{}': {}", raw, e))
	}
}
