//! Transaction builder.
//!
//! Turns a destination, value, gas limit and overrides into a signed raw
//! transaction. Gas price and nonce are fetched fresh from the gateway on
//! every build.

use crate::{DeliveryError, RpcGateway};
use alloy_primitives::{Address, Bytes};
use batcher_account::AccountInterface;
use batcher_types::{JsonRpcResponse, Quantity, TransactionOverrides, TransactionRecord};
use std::sync::Arc;

/// Builds and signs legacy transactions for one chain.
#[derive(Clone)]
pub struct TransactionBuilder {
	gateway: Arc<dyn RpcGateway>,
	chain_id: u64,
}

impl TransactionBuilder {
	pub fn new(gateway: Arc<dyn RpcGateway>, chain_id: u64) -> Self {
		Self { gateway, chain_id }
	}

	/// Current gas price reported by the node.
	pub async fn gas_price(&self) -> Result<u128, DeliveryError> {
		let response = self.gateway.gas_price().await?;
		quantity_from(response, "eth_gasPrice")?
			.to_u128()
			.map_err(|e| DeliveryError::Parse(format!("eth_gasPrice: {}", e)))
	}

	/// Transaction count of `address` at the latest block.
	pub async fn nonce(&self, address: Address) -> Result<u64, DeliveryError> {
		let response = self.gateway.transaction_count(address).await?;
		quantity_from(response, "eth_getTransactionCount")?
			.to_u64()
			.map_err(|e| DeliveryError::Parse(format!("eth_getTransactionCount: {}", e)))
	}

	/// Resolves an unsigned record, fetching gas price and nonce first.
	pub async fn build_record(
		&self,
		account: &dyn AccountInterface,
		to: Address,
		value: &Quantity,
		gas_limit: &Quantity,
		overrides: TransactionOverrides,
	) -> Result<TransactionRecord, DeliveryError> {
		let from = account.address();
		let gas_limit = gas_limit
			.to_u64()
			.map_err(|e| DeliveryError::InvalidInput(format!("gas limit: {}", e)))?;

		let gas_price = self.gas_price().await?;
		let nonce = self.nonce(from).await?;

		let record = TransactionRecord {
			from,
			to,
			value: value.value(),
			gas_limit,
			gas_price,
			nonce,
			chain_id: self.chain_id,
			data: Bytes::new(),
		};

		Ok(record.merge(overrides))
	}

	/// Signs a resolved record with `account`.
	pub async fn sign(
		&self,
		account: &dyn AccountInterface,
		record: &TransactionRecord,
	) -> Result<Bytes, DeliveryError> {
		account
			.sign_transaction(record)
			.await
			.map_err(|e| DeliveryError::Signing(e.to_string()))
	}

	/// Builds a record and signs it in one step.
	pub async fn build_and_sign(
		&self,
		account: &dyn AccountInterface,
		to: Address,
		value: &Quantity,
		gas_limit: &Quantity,
		overrides: TransactionOverrides,
	) -> Result<Bytes, DeliveryError> {
		let record = self
			.build_record(account, to, value, gas_limit, overrides)
			.await?;
		self.sign(account, &record).await
	}
}

fn quantity_from(response: JsonRpcResponse, method: &str) -> Result<Quantity, DeliveryError> {
	if let Some(error) = response.error {
		return Err(error.into());
	}
	response
		.quantity()
		.map_err(|e| DeliveryError::Parse(format!("{}: {}", method, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_consensus::{Transaction as _, TxEnvelope};
	use alloy_eips::eip2718::Decodable2718;
	use alloy_primitives::{address, bytes, B256};
	use async_trait::async_trait;
	use batcher_account::{AccountError, LocalAccount};
	use batcher_types::{Receipt, SecretString};
	use serde_json::json;
	use std::str::FromStr;
	use std::sync::atomic::{AtomicUsize, Ordering};

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const CONTRACT: Address = address!("DDB6DcCE6B794415145Eb5cAa6CD335AEdA9C272");

	struct StubGateway {
		gas_price: JsonRpcResponse,
		nonce: JsonRpcResponse,
		calls: AtomicUsize,
	}

	impl StubGateway {
		fn new(gas_price: JsonRpcResponse, nonce: JsonRpcResponse) -> Arc<Self> {
			Arc::new(Self {
				gas_price,
				nonce,
				calls: AtomicUsize::new(0),
			})
		}
	}

	#[async_trait]
	impl RpcGateway for StubGateway {
		async fn gas_price(&self) -> Result<JsonRpcResponse, DeliveryError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.gas_price.clone())
		}

		async fn transaction_count(&self, _address: Address) -> Result<JsonRpcResponse, DeliveryError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.nonce.clone())
		}

		async fn send_raw_transaction(&self, _raw: &Bytes) -> Result<JsonRpcResponse, DeliveryError> {
			unreachable!("builder never submits")
		}

		async fn wait_for_receipt(&self, _tx_hash: B256) -> Result<Receipt, DeliveryError> {
			unreachable!("builder never waits for receipts")
		}
	}

	struct RefusingAccount;

	#[async_trait]
	impl AccountInterface for RefusingAccount {
		fn address(&self) -> Address {
			Address::repeat_byte(0x42)
		}

		async fn sign_transaction(&self, _record: &TransactionRecord) -> Result<Bytes, AccountError> {
			Err(AccountError::SigningFailed("hardware wallet locked".into()))
		}
	}

	fn dev_account() -> LocalAccount {
		LocalAccount::from_private_key(&SecretString::from(DEV_KEY)).unwrap()
	}

	fn healthy() -> Arc<StubGateway> {
		StubGateway::new(
			JsonRpcResponse::success(json!("0x3b9aca00")),
			JsonRpcResponse::success(json!("0x7")),
		)
	}

	#[tokio::test]
	async fn test_build_record_fetches_defaults_each_call() {
		let gateway = healthy();
		let builder = TransactionBuilder::new(gateway.clone(), 84531);
		let account = dev_account();

		for _ in 0..2 {
			let record = builder
				.build_record(
					&account,
					CONTRACT,
					&Quantity::ZERO,
					&Quantity::from(280_000u64),
					TransactionOverrides::default(),
				)
				.await
				.unwrap();
			assert_eq!(record.gas_price, 1_000_000_000);
			assert_eq!(record.nonce, 7);
			assert_eq!(record.chain_id, 84531);
			assert_eq!(record.from, account.address());
		}

		assert_eq!(gateway.calls.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn test_hex_and_integer_gas_limits_agree() {
		let builder = TransactionBuilder::new(healthy(), 84531);
		let account = dev_account();

		let from_hex = builder
			.build_record(
				&account,
				CONTRACT,
				&Quantity::ZERO,
				&Quantity::from_str("0x1c9c380").unwrap(),
				TransactionOverrides::default(),
			)
			.await
			.unwrap();
		let from_int = builder
			.build_record(
				&account,
				CONTRACT,
				&Quantity::ZERO,
				&Quantity::from(30_000_000u64),
				TransactionOverrides::default(),
			)
			.await
			.unwrap();

		assert_eq!(from_hex.gas_limit, 30_000_000);
		assert_eq!(from_hex, from_int);
	}

	#[tokio::test]
	async fn test_overrides_win_over_fetched_values() {
		let builder = TransactionBuilder::new(healthy(), 84531);
		let overrides = TransactionOverrides {
			data: Some(bytes!("be895ece")),
			..Default::default()
		}
		.with_nonce(42)
		.with_gas_price(2);

		let record = builder
			.build_record(
				&dev_account(),
				CONTRACT,
				&Quantity::ZERO,
				&Quantity::from(280_000u64),
				overrides,
			)
			.await
			.unwrap();

		assert_eq!(record.nonce, 42);
		assert_eq!(record.gas_price, 2);
		assert_eq!(record.data, bytes!("be895ece"));
	}

	#[tokio::test]
	async fn test_rpc_error_surfaces_as_rpc() {
		let gateway = StubGateway::new(
			JsonRpcResponse::failure(-32000, "header not found"),
			JsonRpcResponse::success(json!("0x0")),
		);
		let builder = TransactionBuilder::new(gateway, 84531);

		let err = builder.gas_price().await.unwrap_err();
		assert!(matches!(err, DeliveryError::Rpc { code: -32000, .. }));
	}

	#[tokio::test]
	async fn test_non_hex_nonce_is_parse_error() {
		let gateway = StubGateway::new(
			JsonRpcResponse::success(json!("0x1")),
			JsonRpcResponse::success(json!("seven")),
		);
		let builder = TransactionBuilder::new(gateway, 84531);

		let err = builder.nonce(Address::ZERO).await.unwrap_err();
		assert!(matches!(err, DeliveryError::Parse(_)));
	}

	#[tokio::test]
	async fn test_signing_failure_maps_to_signing() {
		let builder = TransactionBuilder::new(healthy(), 84531);

		let err = builder
			.build_and_sign(
				&RefusingAccount,
				CONTRACT,
				&Quantity::ZERO,
				&Quantity::from(21_000u64),
				TransactionOverrides::default(),
			)
			.await
			.unwrap_err();
		assert!(matches!(err, DeliveryError::Signing(_)));
	}

	#[tokio::test]
	async fn test_build_and_sign_produces_decodable_transaction() {
		let builder = TransactionBuilder::new(healthy(), 84531);
		let account = dev_account();

		let raw = builder
			.build_and_sign(
				&account,
				CONTRACT,
				&Quantity::ZERO,
				&Quantity::from(280_000u64),
				TransactionOverrides {
					data: Some(bytes!("be895ece")),
					..Default::default()
				},
			)
			.await
			.unwrap();

		let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
		assert_eq!(envelope.nonce(), 7);
		assert_eq!(envelope.gas_limit(), 280_000);
		assert_eq!(envelope.to(), Some(CONTRACT));
		assert_eq!(envelope.recover_signer().unwrap(), account.address());
	}
}
