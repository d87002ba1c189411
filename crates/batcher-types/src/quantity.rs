//! Integer quantities that may arrive as hex strings or plain numbers.
//!
//! Task values and gas limits come from configuration files and JSON-RPC
//! results in either form (`"0x1c9c380"` or `30000000`). Strings are always
//! hex, with or without the `0x` prefix; only native integers are decimal.
//! Everything is normalized to a `U256` before a transaction record is built.

use crate::utils::without_0x_prefix;
use alloy_primitives::U256;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while normalizing a quantity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
	#[error("Invalid quantity '{0}'")]
	Invalid(String),
	#[error("Quantity {0} does not fit in {1} bits")]
	Overflow(U256, u32),
}

/// A normalized non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Quantity(U256);

impl Quantity {
	pub const ZERO: Quantity = Quantity(U256::ZERO);

	pub fn new(value: U256) -> Self {
		Self(value)
	}

	pub fn value(&self) -> U256 {
		self.0
	}

	pub fn is_zero(&self) -> bool {
		self.0.is_zero()
	}

	pub fn to_u64(&self) -> Result<u64, QuantityError> {
		u64::try_from(self.0).map_err(|_| QuantityError::Overflow(self.0, 64))
	}

	pub fn to_u128(&self) -> Result<u128, QuantityError> {
		u128::try_from(self.0).map_err(|_| QuantityError::Overflow(self.0, 128))
	}
}

impl FromStr for Quantity {
	type Err = QuantityError;

	/// Parses hex digits; the `0x` prefix is optional.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = without_0x_prefix(s.trim());
		if digits.is_empty() {
			return Err(QuantityError::Invalid(s.to_string()));
		}

		U256::from_str_radix(digits, 16)
			.map(Quantity)
			.map_err(|_| QuantityError::Invalid(s.to_string()))
	}
}

impl From<u64> for Quantity {
	fn from(value: u64) -> Self {
		Self(U256::from(value))
	}
}

impl From<u128> for Quantity {
	fn from(value: u128) -> Self {
		Self(U256::from(value))
	}
}

impl From<U256> for Quantity {
	fn from(value: U256) -> Self {
		Self(value)
	}
}

impl fmt::Display for Quantity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<'de> Deserialize<'de> for Quantity {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Int(u64),
			Str(String),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Int(value) => Ok(Quantity::from(value)),
			Raw::Str(value) => value.parse().map_err(serde::de::Error::custom),
		}
	}
}
