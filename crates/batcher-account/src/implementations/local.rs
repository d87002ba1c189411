//! Local private-key account.
//!
//! Signs EIP-155 legacy transactions in-process with a `PrivateKeySigner`.

use crate::{AccountError, AccountInterface};
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSignerSync;
use alloy_primitives::{Address, Bytes, TxKind};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use batcher_types::{SecretString, TransactionRecord};

/// Account backed by a private key held in memory.
#[derive(Clone, Debug)]
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Builds an account from a hex private key, with or without `0x`.
	pub fn from_private_key(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			key.trim()
				.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		Ok(Self { signer })
	}

	/// Generates a fresh random keypair.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	/// Returns the private key as `0x`-prefixed hex.
	pub fn private_key(&self) -> SecretString {
		SecretString::new(self.signer.to_bytes().to_string())
	}

	fn build_legacy(record: &TransactionRecord) -> TxLegacy {
		TxLegacy {
			chain_id: Some(record.chain_id),
			nonce: record.nonce,
			gas_price: record.gas_price,
			gas_limit: record.gas_limit,
			to: TxKind::Call(record.to),
			value: record.value,
			input: record.data.clone(),
		}
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_transaction(&self, record: &TransactionRecord) -> Result<Bytes, AccountError> {
		if record.from != self.address() {
			return Err(AccountError::SigningFailed(format!(
				"record sender {} does not match account {}",
				record.from,
				self.address()
			)));
		}

		let mut tx = Self::build_legacy(record);
		let signature = self
			.signer
			.sign_transaction_sync(&mut tx)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		let envelope = TxEnvelope::from(tx.into_signed(signature));
		Ok(Bytes::from(envelope.encoded_2718()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_consensus::Transaction as _;
	use alloy_eips::eip2718::Decodable2718;
	use alloy_primitives::{address, bytes, U256};

	// Well-known development key (anvil account 0).
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn dev_account() -> LocalAccount {
		LocalAccount::from_private_key(&SecretString::from(DEV_KEY)).unwrap()
	}

	fn record(from: Address) -> TransactionRecord {
		TransactionRecord {
			from,
			to: address!("DDB6DcCE6B794415145Eb5cAa6CD335AEdA9C272"),
			value: U256::ZERO,
			gas_limit: 280_000,
			gas_price: 1_500_000_000,
			nonce: 4,
			chain_id: 84531,
			data: bytes!("be895ece"),
		}
	}

	#[test]
	fn test_address_from_key() {
		assert_eq!(
			dev_account().address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[test]
	fn test_key_without_prefix_accepted() {
		let bare = SecretString::from(DEV_KEY.trim_start_matches("0x"));
		let account = LocalAccount::from_private_key(&bare).unwrap();
		assert_eq!(account.address(), dev_account().address());
	}

	#[test]
	fn test_malformed_key_rejected() {
		let result = LocalAccount::from_private_key(&SecretString::from("0x1234"));
		assert!(matches!(result, Err(AccountError::InvalidKey(_))));
	}

	#[test]
	fn test_private_key_round_trips() {
		let account = LocalAccount::random();
		let restored = LocalAccount::from_private_key(&account.private_key()).unwrap();
		assert_eq!(restored.address(), account.address());
		assert!(account.private_key().expose_secret().starts_with("0x"));
	}

	#[tokio::test]
	async fn test_signed_bytes_decode_to_record() {
		let account = dev_account();
		let raw = account
			.sign_transaction(&record(account.address()))
			.await
			.unwrap();

		let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
		assert_eq!(envelope.nonce(), 4);
		assert_eq!(envelope.gas_limit(), 280_000);
		assert_eq!(envelope.chain_id(), Some(84531));
		assert_eq!(envelope.input(), &bytes!("be895ece"));
		assert_eq!(envelope.recover_signer().unwrap(), account.address());
	}

	#[tokio::test]
	async fn test_foreign_sender_rejected() {
		let account = dev_account();
		let result = account.sign_transaction(&record(Address::ZERO)).await;
		assert!(matches!(result, Err(AccountError::SigningFailed(_))));
	}
}
