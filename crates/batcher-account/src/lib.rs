//! Account management for the transaction batcher.
//!
//! Defines the signing interface the submission pipeline depends on, a
//! local private-key implementation, and the wallet files that list the
//! accounts a run operates on.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use batcher_types::TransactionRecord;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}
pub mod wallet;

pub use implementations::local::LocalAccount;
pub use wallet::{
	generate_wallets, load_wallet_file, load_wallet_pairs, parse_wallet_file, write_wallet_file,
	WalletEntry, WalletPair,
};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs while reading, parsing or writing a wallet file.
	#[error("Wallet file error: {0}")]
	WalletFile(String),
	/// The source and destination wallet files list a different number of accounts.
	#[error("Wallet files must list the same number of accounts: source has {source_count}, destination has {destination_count}")]
	WalletMismatch {
		source_count: usize,
		destination_count: usize,
	},
}

/// Anything that owns an address and can sign transaction records for it.
///
/// The submission pipeline only ever sees accounts through this trait and
/// never mutates them.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Returns the address associated with this account.
	fn address(&self) -> Address;

	/// Signs a transaction record and returns the raw, submission-ready bytes.
	///
	/// Fails if the record's sender is not this account or the signer rejects
	/// the record.
	async fn sign_transaction(&self, record: &TransactionRecord) -> Result<Bytes, AccountError>;
}
