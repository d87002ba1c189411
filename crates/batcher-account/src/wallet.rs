//! Wallet files.
//!
//! A wallet file lists one account per line as `address,private_key_hex`.
//! Blank lines are ignored. A run pairs the source file (the signing
//! accounts) with the destination file (the recipients) by line index.

use crate::{AccountError, AccountInterface, LocalAccount};
use alloy_primitives::Address;
use batcher_types::SecretString;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// One parsed wallet file line.
#[derive(Debug, Clone)]
pub struct WalletEntry {
	pub address: Address,
	pub private_key: Option<SecretString>,
}

/// A signing account paired with the recipient listed on the same line of
/// the destination file.
#[derive(Clone)]
pub struct WalletPair {
	pub account: Arc<dyn AccountInterface>,
	pub recipient: Address,
}

impl std::fmt::Debug for WalletPair {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WalletPair")
			.field("account", &self.account.address())
			.field("recipient", &self.recipient)
			.finish()
	}
}

/// Parses the contents of a wallet file.
///
/// `origin` only feeds error messages.
pub fn parse_wallet_file(content: &str, origin: &str) -> Result<Vec<WalletEntry>, AccountError> {
	let mut entries = Vec::new();

	for (index, line) in content.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let mut fields = line.split(',').map(str::trim);
		let address_field = fields.next().unwrap_or_default();
		let address = Address::from_str(address_field).map_err(|e| {
			AccountError::WalletFile(format!(
				"{}:{}: invalid address '{}': {}",
				origin,
				index + 1,
				address_field,
				e
			))
		})?;
		let private_key = fields
			.next()
			.filter(|key| !key.is_empty())
			.map(SecretString::from);

		entries.push(WalletEntry {
			address,
			private_key,
		});
	}

	Ok(entries)
}

/// Reads and parses a wallet file.
pub async fn load_wallet_file(path: &Path) -> Result<Vec<WalletEntry>, AccountError> {
	let content = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| AccountError::WalletFile(format!("cannot read {}: {}", path.display(), e)))?;
	parse_wallet_file(&content, &path.display().to_string())
}

/// Loads and validates the source and destination wallet files.
///
/// Every check happens here so a bad input aborts the run before any
/// network call: equal account counts, a parsable private key on every
/// source line, and a key that derives to the address listed beside it.
pub async fn load_wallet_pairs(
	source: &Path,
	destination: &Path,
) -> Result<Vec<WalletPair>, AccountError> {
	let sources = load_wallet_file(source).await?;
	let destinations = load_wallet_file(destination).await?;

	if sources.len() != destinations.len() {
		return Err(AccountError::WalletMismatch {
			source_count: sources.len(),
			destination_count: destinations.len(),
		});
	}

	let mut pairs = Vec::with_capacity(sources.len());
	for (index, (entry, recipient)) in sources.into_iter().zip(destinations).enumerate() {
		let key = entry.private_key.ok_or_else(|| {
			AccountError::WalletFile(format!(
				"{}:{}: missing private key for {}",
				source.display(),
				index + 1,
				entry.address
			))
		})?;
		let account = LocalAccount::from_private_key(&key)?;
		if account.address() != entry.address {
			return Err(AccountError::InvalidKey(format!(
				"{}:{}: key derives {} but the line lists {}",
				source.display(),
				index + 1,
				account.address(),
				entry.address
			)));
		}

		pairs.push(WalletPair {
			account: Arc::new(account),
			recipient: recipient.address,
		});
	}

	tracing::info!(
		count = pairs.len(),
		source = %source.display(),
		destination = %destination.display(),
		"Loaded wallet pairs"
	);

	Ok(pairs)
}

/// Generates `count` fresh random accounts.
pub fn generate_wallets(count: usize) -> Vec<LocalAccount> {
	(0..count).map(|_| LocalAccount::random()).collect()
}

/// Writes accounts to `path`, replacing any existing file.
pub async fn write_wallet_file(path: &Path, accounts: &[LocalAccount]) -> Result<(), AccountError> {
	let mut content = String::with_capacity(accounts.len() * 110);
	for account in accounts {
		content.push_str(&account.address().to_checksum(None));
		content.push(',');
		content.push_str(account.private_key().expose_secret());
		content.push('\n');
	}

	let mut file = tokio::fs::File::create(path)
		.await
		.map_err(|e| AccountError::WalletFile(format!("cannot create {}: {}", path.display(), e)))?;
	file.write_all(content.as_bytes())
		.await
		.map_err(|e| AccountError::WalletFile(format!("cannot write {}: {}", path.display(), e)))?;
	file.flush()
		.await
		.map_err(|e| AccountError::WalletFile(format!("cannot flush {}: {}", path.display(), e)))?;

	Ok(())
}
