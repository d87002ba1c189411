//! In-memory gateway and account used by the pipeline tests.

use alloy_primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use batcher_account::{AccountError, AccountInterface};
use batcher_delivery::{DeliveryError, RpcGateway};
use batcher_types::{JsonRpcResponse, Receipt, TransactionRecord};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type SendFn = dyn Fn(&Bytes) -> Result<JsonRpcResponse, DeliveryError> + Send + Sync;

/// Gateway whose submission behavior is a closure over the raw bytes.
pub(crate) struct MockGateway {
	send: Box<SendFn>,
	send_delay: Duration,
	receipt_success: bool,
	receipt_error: bool,
	pub calls: AtomicUsize,
	pub send_calls: AtomicUsize,
	pub receipt_calls: AtomicUsize,
	in_flight: AtomicUsize,
	pub max_in_flight: AtomicUsize,
	pub sent: Mutex<Vec<Bytes>>,
}

impl MockGateway {
	pub fn new(
		send: impl Fn(&Bytes) -> Result<JsonRpcResponse, DeliveryError> + Send + Sync + 'static,
	) -> Self {
		Self {
			send: Box::new(send),
			send_delay: Duration::ZERO,
			receipt_success: true,
			receipt_error: false,
			calls: AtomicUsize::new(0),
			send_calls: AtomicUsize::new(0),
			receipt_calls: AtomicUsize::new(0),
			in_flight: AtomicUsize::new(0),
			max_in_flight: AtomicUsize::new(0),
			sent: Mutex::new(Vec::new()),
		}
	}

	/// Accepts every submission and answers with the keccak of the raw bytes.
	pub fn accepting() -> Self {
		Self::new(accept)
	}

	pub fn with_send_delay(mut self, delay: Duration) -> Self {
		self.send_delay = delay;
		self
	}

	pub fn reverting(mut self) -> Self {
		self.receipt_success = false;
		self
	}

	pub fn failing_receipts(mut self) -> Self {
		self.receipt_error = true;
		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn send_calls(&self) -> usize {
		self.send_calls.load(Ordering::SeqCst)
	}

	pub fn receipt_calls(&self) -> usize {
		self.receipt_calls.load(Ordering::SeqCst)
	}
}

pub(crate) fn accept(raw: &Bytes) -> Result<JsonRpcResponse, DeliveryError> {
	Ok(JsonRpcResponse::success(json!(keccak256(raw).to_string())))
}

#[async_trait]
impl RpcGateway for MockGateway {
	async fn gas_price(&self) -> Result<JsonRpcResponse, DeliveryError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(JsonRpcResponse::success(json!("0x3b9aca00")))
	}

	async fn transaction_count(&self, _address: Address) -> Result<JsonRpcResponse, DeliveryError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(JsonRpcResponse::success(json!("0x0")))
	}

	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<JsonRpcResponse, DeliveryError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.send_calls.fetch_add(1, Ordering::SeqCst);

		let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(current, Ordering::SeqCst);
		if !self.send_delay.is_zero() {
			tokio::time::sleep(self.send_delay).await;
		}
		self.in_flight.fetch_sub(1, Ordering::SeqCst);

		self.sent.lock().unwrap().push(raw.clone());
		(self.send)(raw)
	}

	async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, DeliveryError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.receipt_calls.fetch_add(1, Ordering::SeqCst);
		if self.receipt_error {
			return Err(DeliveryError::Timeout("no receipt".into()));
		}
		Ok(Receipt {
			tx_hash,
			block_number: 1,
			success: self.receipt_success,
		})
	}
}

/// Account that "signs" by emitting its address followed by the nonce.
pub(crate) struct MockAccount {
	address: Address,
}

impl MockAccount {
	pub fn new(byte: u8) -> Self {
		Self {
			address: Address::repeat_byte(byte),
		}
	}
}

#[async_trait]
impl AccountInterface for MockAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, record: &TransactionRecord) -> Result<Bytes, AccountError> {
		let mut raw = record.from.to_vec();
		raw.extend_from_slice(&record.nonce.to_be_bytes());
		Ok(Bytes::from(raw))
	}
}

/// Sender encoded by [`MockAccount`].
pub(crate) fn sender_of(raw: &Bytes) -> Address {
	Address::from_slice(&raw[..20])
}

/// Nonce encoded by [`MockAccount`].
pub(crate) fn nonce_of(raw: &Bytes) -> u64 {
	let mut word = [0u8; 8];
	word.copy_from_slice(&raw[20..28]);
	u64::from_be_bytes(word)
}
