//! Transaction delivery for the batcher.
//!
//! Everything between a task and the network: the JSON-RPC gateway, the
//! builder that turns a task into a signed raw transaction, and the nonce
//! manager that keeps submissions from one signer in order.

use thiserror::Error;

pub mod builder;
pub mod gateway;
pub mod nonce;

pub use builder::TransactionBuilder;
pub use gateway::{HttpGateway, RpcGateway};
pub use nonce::{NonceLease, NonceManager};

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The request never produced a response (connection, DNS, TLS, proxy).
	#[error("Transport error: {0}")]
	Transport(String),
	/// The node answered with a JSON-RPC `error` member.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The response could not be parsed or had an unexpected shape.
	#[error("Parse error: {0}")]
	Parse(String),
	/// The account refused to sign the record.
	#[error("Signing error: {0}")]
	Signing(String),
	/// A request or receipt wait exceeded its time budget.
	#[error("Timeout: {0}")]
	Timeout(String),
	/// Task parameters cannot be turned into a transaction.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

impl From<batcher_types::JsonRpcError> for DeliveryError {
	fn from(error: batcher_types::JsonRpcError) -> Self {
		DeliveryError::Rpc {
			code: error.code,
			message: error.message,
		}
	}
}
