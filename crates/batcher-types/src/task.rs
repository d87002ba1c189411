//! Tasks and the transaction records built from them.

use crate::quantity::Quantity;
use alloy_primitives::{Address, Bytes, U256};
use std::fmt;

/// Position of a task within the batch it was submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A single contract call to be submitted for one account.
///
/// The payload is opaque to the submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
	/// Human-readable stage name used in logs.
	pub label: String,
	/// Destination contract or recipient.
	pub to: Address,
	/// Native value to transfer.
	pub value: Quantity,
	/// Gas limit for the call.
	pub gas_limit: Quantity,
	/// Call data.
	pub data: Bytes,
}

impl Task {
	pub fn new(
		label: impl Into<String>,
		to: Address,
		value: Quantity,
		gas_limit: Quantity,
		data: Bytes,
	) -> Self {
		Self {
			label: label.into(),
			to,
			value,
			gas_limit,
			data,
		}
	}

	/// Overrides carried by this task when its record is built.
	pub fn overrides(&self) -> TransactionOverrides {
		TransactionOverrides {
			data: Some(self.data.clone()),
			..Default::default()
		}
	}
}

/// Caller-supplied fields merged into a record after defaults are fetched.
///
/// Any field set here wins over the value fetched from the network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOverrides {
	pub data: Option<Bytes>,
	pub gas_price: Option<u128>,
	pub nonce: Option<u64>,
}

impl TransactionOverrides {
	pub fn with_nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	pub fn with_gas_price(mut self, gas_price: u128) -> Self {
		self.gas_price = Some(gas_price);
		self
	}
}

/// Fully resolved legacy transaction ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
	pub from: Address,
	pub to: Address,
	pub value: U256,
	pub gas_limit: u64,
	pub gas_price: u128,
	pub nonce: u64,
	pub chain_id: u64,
	pub data: Bytes,
}

impl TransactionRecord {
	/// Applies overrides on top of the fetched defaults.
	pub fn merge(mut self, overrides: TransactionOverrides) -> Self {
		if let Some(data) = overrides.data {
			self.data = data;
		}
		if let Some(gas_price) = overrides.gas_price {
			self.gas_price = gas_price;
		}
		if let Some(nonce) = overrides.nonce {
			self.nonce = nonce;
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, bytes};

	fn record() -> TransactionRecord {
		TransactionRecord {
			from: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
			to: address!("DDB6DcCE6B794415145Eb5cAa6CD335AEdA9C272"),
			value: U256::ZERO,
			gas_limit: 280_000,
			gas_price: 1_000_000_000,
			nonce: 7,
			chain_id: 84531,
			data: Bytes::new(),
		}
	}

	#[test]
	fn test_overrides_take_precedence() {
		let merged = record().merge(
			TransactionOverrides {
				data: Some(bytes!("be895ece")),
				..Default::default()
			}
			.with_nonce(9)
			.with_gas_price(5),
		);
		assert_eq!(merged.nonce, 9);
		assert_eq!(merged.gas_price, 5);
		assert_eq!(merged.data, bytes!("be895ece"));
		assert_eq!(merged.gas_limit, 280_000);
	}

	#[test]
	fn test_empty_overrides_keep_defaults() {
		assert_eq!(record().merge(TransactionOverrides::default()), record());
	}

	#[test]
	fn test_task_overrides_carry_payload() {
		let task = Task::new(
			"claim",
			address!("DDB6DcCE6B794415145Eb5cAa6CD335AEdA9C272"),
			Quantity::ZERO,
			Quantity::from(280_000u64),
			bytes!("be895ece"),
		);
		let overrides = task.overrides();
		assert_eq!(overrides.data, Some(bytes!("be895ece")));
		assert!(overrides.nonce.is_none());
		assert_eq!(TaskId(3).to_string(), "#3");
	}
}
